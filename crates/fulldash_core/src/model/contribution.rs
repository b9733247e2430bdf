//! Contribution ledger entries.
//!
//! # Responsibility
//! - Model hours logged by one collaborator on one project.
//!
//! # Invariants
//! - Collaborators form a closed two-member set.
//! - `hours` is finite and non-negative on write paths.

use crate::model::project::ProjectId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One of the two people sharing the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collaborator {
    Noor,
    Ahmad,
}

impl Collaborator {
    pub const ALL: [Collaborator; 2] = [Collaborator::Noor, Collaborator::Ahmad];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Noor => "noor",
            Self::Ahmad => "ahmad",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "noor" => Some(Self::Noor),
            "ahmad" => Some(Self::Ahmad),
            _ => None,
        }
    }
}

impl Display for Collaborator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContributionValidationError {
    InvalidHours(f64),
}

impl Display for ContributionValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidHours(value) => {
                write!(f, "contribution hours must be finite and >= 0, got {value}")
            }
        }
    }
}

impl Error for ContributionValidationError {}

/// Hours one collaborator logged on one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub project_id: ProjectId,
    pub collaborator: Collaborator,
    pub hours: f64,
    pub notes: Option<String>,
}

impl Contribution {
    pub fn new(project_id: ProjectId, collaborator: Collaborator, hours: f64) -> Self {
        Self {
            project_id,
            collaborator,
            hours,
            notes: None,
        }
    }

    pub fn validate(&self) -> Result<(), ContributionValidationError> {
        if !self.hours.is_finite() || self.hours < 0.0 {
            return Err(ContributionValidationError::InvalidHours(self.hours));
        }
        Ok(())
    }
}
