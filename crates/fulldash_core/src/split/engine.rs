use crate::model::contribution::{Collaborator, Contribution};
use crate::model::project::{Project, SecuredBy};
use crate::model::split::{RevenueSplit, SplitMethod};

/// Computes how one project's revenue is attributed.
///
/// Rules, in order:
/// 1. `revenue <= 0` yields `RevenueSplit::NONE` without looking at hours.
/// 2. If both collaborators logged strictly positive hours, revenue is split
///    in proportion to hours.
/// 3. Otherwise `secured_by` decides: all to the owner, or halves for `Both`.
///
/// Only `revenue` and `secured_by` are read from `project`. Shares are
/// returned unrounded.
pub fn compute_split(project: &Project, contributions: &[Contribution]) -> RevenueSplit {
    let revenue = project.revenue;
    if revenue.is_nan() || revenue <= 0.0 {
        return RevenueSplit::NONE;
    }

    let noor_hours = hours_for(contributions, Collaborator::Noor);
    let ahmad_hours = hours_for(contributions, Collaborator::Ahmad);

    if noor_hours > 0.0 && ahmad_hours > 0.0 {
        let total = noor_hours + ahmad_hours;
        return RevenueSplit {
            noor_share: revenue * (noor_hours / total),
            ahmad_share: revenue * (ahmad_hours / total),
            method: SplitMethod::Hours,
        };
    }

    split_by_owner(revenue, project.secured_by)
}

/// Hours logged by `collaborator`, or `0` when absent.
///
/// A duplicated entry resolves to the last one seen.
pub fn hours_for(contributions: &[Contribution], collaborator: Collaborator) -> f64 {
    contributions
        .iter()
        .rev()
        .find(|entry| entry.collaborator == collaborator)
        .map_or(0.0, |entry| entry.hours)
}

fn split_by_owner(revenue: f64, secured_by: SecuredBy) -> RevenueSplit {
    let (noor_share, ahmad_share) = match secured_by {
        SecuredBy::Noor => (revenue, 0.0),
        SecuredBy::Ahmad => (0.0, revenue),
        // Unknown stored tags are folded into `Both` when the row is read.
        SecuredBy::Both => {
            let half = revenue / 2.0;
            (half, half)
        }
    };

    RevenueSplit {
        noor_share,
        ahmad_share,
        method: SplitMethod::Owner,
    }
}
