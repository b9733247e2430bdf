use crate::model::project::Project;
use crate::model::split::Metrics;
use crate::repo::RepoResult;
use crate::split::{compute_split, ContributionLedger};
use log::{debug, error};

/// Aggregates dashboard metrics over `projects`.
///
/// Unpaid projects only count toward `open_projects`, whatever revenue they
/// carry. Each paid project's ledger is fetched through `ledger` and split
/// with `compute_split`.
///
/// # Errors
/// - The first ledger failure aborts the whole computation and is returned
///   unchanged. No partial result is produced.
pub fn compute_metrics<L>(projects: &[Project], ledger: &L) -> RepoResult<Metrics>
where
    L: ContributionLedger + ?Sized,
{
    let mut metrics = Metrics::default();

    for project in projects {
        if project.status.is_open() {
            metrics.open_projects += 1;
            continue;
        }

        metrics.paid_projects += 1;
        metrics.total_revenue += project.revenue;

        let contributions = ledger.contributions_for(project.id).map_err(|err| {
            error!(
                "event=metrics_compute module=split status=error project_id={} error={}",
                project.id, err
            );
            err
        })?;
        let split = compute_split(project, &contributions);
        metrics.noor_share += split.noor_share;
        metrics.ahmad_share += split.ahmad_share;
    }

    debug!(
        "event=metrics_compute module=split status=ok paid={} open={}",
        metrics.paid_projects, metrics.open_projects
    );

    Ok(metrics)
}
