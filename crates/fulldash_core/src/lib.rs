//! Core domain logic for FullDash.
//! This crate owns the revenue split rules and the storage they read from.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod split;

pub use config::{ConfigError, DashConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::contribution::{Collaborator, Contribution, ContributionValidationError};
pub use model::project::{Project, ProjectId, ProjectStatus, ProjectValidationError, SecuredBy};
pub use model::split::{Metrics, RevenueSplit, SplitMethod};
pub use repo::contribution_repo::{ContributionRepository, SqliteContributionRepository};
pub use repo::project_repo::{ProjectListQuery, ProjectRepository, SqliteProjectRepository};
pub use repo::{RepoError, RepoResult};
pub use service::dashboard_service::{
    Board, DashboardService, ProjectDetail, ProjectDraft, ServiceError, ServiceResult,
};
pub use split::{compute_metrics, compute_split, hours_for, ContributionLedger};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
