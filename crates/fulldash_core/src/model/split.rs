//! Computed revenue split and dashboard metrics.

use serde::{Deserialize, Serialize};

/// Which rule produced a `RevenueSplit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitMethod {
    /// Revenue was zero or negative; nothing to split.
    None,
    /// Proportional to hours logged by both collaborators.
    Hours,
    /// Decided by who secured the project.
    Owner,
}

impl SplitMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Hours => "hours",
            Self::Owner => "owner",
        }
    }
}

/// Per-project attribution of revenue.
///
/// Shares are unrounded; for positive revenue they sum to the revenue up
/// to floating-point precision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RevenueSplit {
    pub noor_share: f64,
    pub ahmad_share: f64,
    pub method: SplitMethod,
}

impl RevenueSplit {
    pub const NONE: RevenueSplit = RevenueSplit {
        noor_share: 0.0,
        ahmad_share: 0.0,
        method: SplitMethod::None,
    };
}

/// Dashboard-wide aggregate, recomputed on every request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Sum of revenue across paid projects.
    pub total_revenue: f64,
    /// Count of projects not yet paid.
    pub open_projects: u64,
    pub paid_projects: u64,
    pub noor_share: f64,
    pub ahmad_share: f64,
}
