//! Project domain model.
//!
//! # Responsibility
//! - Define the project record tracked on the dashboard.
//! - Provide strict and lenient parsing for ownership tags.
//!
//! # Invariants
//! - `id` is stable and never reused for another project.
//! - `revenue` is finite and non-negative on write paths.
//! - Unknown stored ownership tags fold into `SecuredBy::Both` on read.

use log::warn;
use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a project.
pub type ProjectId = Uuid;

/// Lifecycle column a project sits in on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    New,
    InProgress,
    Done,
    /// Revenue received; the only status counted by revenue metrics.
    Paid,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 4] = [
        ProjectStatus::New,
        ProjectStatus::InProgress,
        ProjectStatus::Done,
        ProjectStatus::Paid,
    ];

    /// Returns the stable storage/wire tag.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::InProgress => "in_progress",
            Self::Done => "done",
            Self::Paid => "paid",
        }
    }

    /// Parses a storage/wire tag. Returns `None` for unknown values.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "new" => Some(Self::New),
            "in_progress" => Some(Self::InProgress),
            "done" => Some(Self::Done),
            "paid" => Some(Self::Paid),
            _ => None,
        }
    }

    /// Whether the project still counts as open work.
    pub fn is_open(self) -> bool {
        self != Self::Paid
    }
}

impl Display for ProjectStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who brought the project in.
///
/// Drives the ownership fallback of the split engine when hours do not
/// decide the split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SecuredBy {
    Noor,
    Ahmad,
    Both,
}

impl SecuredBy {
    /// Returns the stable storage/wire tag.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Noor => "noor",
            Self::Ahmad => "ahmad",
            Self::Both => "both",
        }
    }

    /// Strict parse used by write paths. Returns `None` for unknown tags.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "noor" => Some(Self::Noor),
            "ahmad" => Some(Self::Ahmad),
            "both" => Some(Self::Both),
            _ => None,
        }
    }

    /// Lenient parse used by read paths.
    ///
    /// Unknown tags resolve to `Both` so a bad stored value can never break
    /// dashboard rendering. Each fold is logged.
    pub fn parse_lenient(value: &str) -> Self {
        Self::parse(value).unwrap_or_else(|| {
            warn!(
                "event=secured_by_fallback module=model status=degraded value_len={} fallback=both",
                value.len()
            );
            Self::Both
        })
    }
}

impl Display for SecuredBy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SecuredBy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse_lenient(&raw))
    }
}

/// Validation failures for project write paths.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectValidationError {
    NilId,
    EmptyClient,
    InvalidRevenue(f64),
}

impl Display for ProjectValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "project id must not be nil"),
            Self::EmptyClient => write!(f, "project client must not be empty"),
            Self::InvalidRevenue(value) => {
                write!(f, "project revenue must be finite and >= 0, got {value}")
            }
        }
    }
}

impl Error for ProjectValidationError {}

/// Freelance project shared by the two collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub client: String,
    pub description: String,
    /// Single-unit monetary amount. Only counted once `status == Paid`.
    pub revenue: f64,
    pub status: ProjectStatus,
    pub secured_by: SecuredBy,
    /// External payment reference (e.g. a payment intent id).
    pub payment_ref: Option<String>,
    /// Unix epoch milliseconds, assigned by storage on insert.
    pub created_at: i64,
}

impl Project {
    /// Creates a new project with a generated stable ID.
    ///
    /// # Invariants
    /// - `status` starts as `New` and `revenue` as `0`.
    pub fn new(client: impl Into<String>, secured_by: SecuredBy) -> Self {
        Self::with_id(Uuid::new_v4(), client, secured_by)
    }

    /// Creates a project with a caller-provided ID.
    pub fn with_id(id: ProjectId, client: impl Into<String>, secured_by: SecuredBy) -> Self {
        Self {
            id,
            client: client.into(),
            description: String::new(),
            revenue: 0.0,
            status: ProjectStatus::New,
            secured_by,
            payment_ref: None,
            created_at: 0,
        }
    }

    /// Checks write-path invariants.
    ///
    /// The split engine never calls this; it accepts any stored value.
    pub fn validate(&self) -> Result<(), ProjectValidationError> {
        if self.id.is_nil() {
            return Err(ProjectValidationError::NilId);
        }
        if self.client.trim().is_empty() {
            return Err(ProjectValidationError::EmptyClient);
        }
        if !self.revenue.is_finite() || self.revenue < 0.0 {
            return Err(ProjectValidationError::InvalidRevenue(self.revenue));
        }
        Ok(())
    }
}
