//! Revenue split engine and dashboard metrics aggregation.
//!
//! # Responsibility
//! - Decide, per paid project, how revenue is attributed to each collaborator.
//! - Roll per-project splits up into dashboard `Metrics`.
//!
//! # Invariants
//! - `compute_split` is total and pure: every input maps to a result.
//! - Hours-based attribution needs positive hours from both collaborators.
//! - Aggregation aborts on the first contribution-ledger failure.

mod engine;
mod metrics;

pub use engine::{compute_split, hours_for};
pub use metrics::compute_metrics;

use crate::model::contribution::Contribution;
use crate::model::project::ProjectId;
use crate::repo::RepoResult;

/// Read-only view of the hours logged against a project.
pub trait ContributionLedger {
    /// Returns the 0-2 contribution entries for `project_id`.
    fn contributions_for(&self, project_id: ProjectId) -> RepoResult<Vec<Contribution>>;
}

impl<L: ContributionLedger + ?Sized> ContributionLedger for &L {
    fn contributions_for(&self, project_id: ProjectId) -> RepoResult<Vec<Contribution>> {
        (**self).contributions_for(project_id)
    }
}
