//! Dashboard use-case service.
//!
//! # Responsibility
//! - Create, edit, move, pay and delete projects together with their hours.
//! - Assemble the board, project detail and metrics views.
//!
//! # Invariants
//! - Drafts are validated before the first write; non-finite or negative
//!   hours reject the whole command.
//! - Hours are persisted only when strictly positive; editing a project to
//!   zero hours clears that collaborator's entry.
//! - A payment reference belongs to at most one project.
//! - Service layer remains storage-agnostic.

use crate::model::contribution::{Collaborator, Contribution, ContributionValidationError};
use crate::model::project::{Project, ProjectId, ProjectStatus, SecuredBy};
use crate::model::split::{Metrics, RevenueSplit};
use crate::repo::contribution_repo::ContributionRepository;
use crate::repo::project_repo::{ProjectListQuery, ProjectRepository};
use crate::repo::RepoError;
use crate::split::{compute_metrics, compute_split, hours_for, ContributionLedger};
use log::info;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for dashboard use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Target project does not exist.
    ProjectNotFound(ProjectId),
    /// Payment reference already recorded on another project.
    DuplicatePaymentRef {
        payment_ref: String,
        existing: ProjectId,
    },
    /// Draft hours cannot be stored.
    InvalidHours {
        collaborator: Collaborator,
        source: ContributionValidationError,
    },
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::DuplicatePaymentRef {
                payment_ref,
                existing,
            } => write!(
                f,
                "payment reference `{payment_ref}` is already recorded on project {existing}"
            ),
            Self::InvalidHours {
                collaborator,
                source,
            } => write!(f, "invalid hours for {collaborator}: {source}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent project state: {details}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::InvalidHours { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::ProjectNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Input for creating or fully replacing a project.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectDraft {
    pub client: String,
    pub description: String,
    pub revenue: f64,
    pub status: ProjectStatus,
    pub secured_by: SecuredBy,
    pub noor_hours: f64,
    pub ahmad_hours: f64,
}

impl ProjectDraft {
    /// Draft for a fresh `New` project with no revenue and no hours.
    pub fn new(client: impl Into<String>, secured_by: SecuredBy) -> Self {
        Self {
            client: client.into(),
            description: String::new(),
            revenue: 0.0,
            status: ProjectStatus::New,
            secured_by,
            noor_hours: 0.0,
            ahmad_hours: 0.0,
        }
    }

    fn hours(&self, collaborator: Collaborator) -> f64 {
        match collaborator {
            Collaborator::Noor => self.noor_hours,
            Collaborator::Ahmad => self.ahmad_hours,
        }
    }

    /// Checks every collaborator's hours before anything is written.
    pub fn validate_hours(&self) -> ServiceResult<()> {
        for collaborator in Collaborator::ALL {
            let hours = self.hours(collaborator);
            if !hours.is_finite() || hours < 0.0 {
                return Err(ServiceError::InvalidHours {
                    collaborator,
                    source: ContributionValidationError::InvalidHours(hours),
                });
            }
        }
        Ok(())
    }

    fn apply_to(&self, project: &mut Project) {
        project.client = self.client.trim().to_string();
        project.description = self.description.trim().to_string();
        project.revenue = self.revenue;
        project.status = self.status;
        project.secured_by = self.secured_by;
    }
}

/// Single-project view with its ledger and computed split.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectDetail {
    pub project: Project,
    pub contributions: Vec<Contribution>,
    pub noor_hours: f64,
    pub ahmad_hours: f64,
    pub split: RevenueSplit,
}

/// Projects grouped by board column, each ordered newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Board {
    pub new: Vec<Project>,
    pub in_progress: Vec<Project>,
    pub done: Vec<Project>,
    pub paid: Vec<Project>,
}

impl Board {
    /// Groups projects by status, preserving input order inside a column.
    pub fn from_projects(projects: Vec<Project>) -> Self {
        let mut board = Self::default();
        for project in projects {
            match project.status {
                ProjectStatus::New => board.new.push(project),
                ProjectStatus::InProgress => board.in_progress.push(project),
                ProjectStatus::Done => board.done.push(project),
                ProjectStatus::Paid => board.paid.push(project),
            }
        }
        board
    }

    pub fn len(&self) -> usize {
        self.new.len() + self.in_progress.len() + self.done.len() + self.paid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Dashboard facade over project and contribution repositories.
pub struct DashboardService<P, C>
where
    P: ProjectRepository,
    C: ContributionRepository + ContributionLedger,
{
    projects: P,
    contributions: C,
}

impl<P, C> DashboardService<P, C>
where
    P: ProjectRepository,
    C: ContributionRepository + ContributionLedger,
{
    pub fn new(projects: P, contributions: C) -> Self {
        Self {
            projects,
            contributions,
        }
    }

    /// Creates a project and records positive hours for each collaborator.
    ///
    /// Nothing is written when the draft fails validation.
    pub fn create_project(&self, draft: &ProjectDraft) -> ServiceResult<ProjectDetail> {
        draft.validate_hours()?;
        let mut project = Project::new(draft.client.as_str(), draft.secured_by);
        draft.apply_to(&mut project);
        project.validate().map_err(RepoError::from)?;

        let id = self.projects.create_project(&project)?;
        self.save_hours(id, draft)?;
        info!(
            "event=project_create module=service status=ok project_id={} status_tag={}",
            id, project.status
        );

        self.project_detail(id)?
            .ok_or(ServiceError::InconsistentState(
                "created project not found in read-back",
            ))
    }

    /// Replaces all editable fields of a project and its hours.
    pub fn update_project(
        &self,
        id: ProjectId,
        draft: &ProjectDraft,
    ) -> ServiceResult<ProjectDetail> {
        draft.validate_hours()?;
        let mut project = self
            .projects
            .get_project(id)?
            .ok_or(ServiceError::ProjectNotFound(id))?;
        draft.apply_to(&mut project);
        project.validate().map_err(RepoError::from)?;

        self.projects.update_project(&project)?;
        self.save_hours(id, draft)?;

        self.project_detail(id)?
            .ok_or(ServiceError::InconsistentState(
                "updated project not found in read-back",
            ))
    }

    /// Moves a project to another board column.
    pub fn move_project(&self, id: ProjectId, status: ProjectStatus) -> ServiceResult<()> {
        self.projects.set_status(id, status)?;
        info!(
            "event=project_move module=service status=ok project_id={} status_tag={}",
            id, status
        );
        Ok(())
    }

    /// Marks a project paid with the received revenue.
    ///
    /// # Errors
    /// - `DuplicatePaymentRef` when `payment_ref` is already recorded on a
    ///   different project.
    pub fn record_payment(
        &self,
        id: ProjectId,
        revenue: f64,
        payment_ref: Option<&str>,
    ) -> ServiceResult<ProjectDetail> {
        let payment_ref = payment_ref.map(str::trim).filter(|value| !value.is_empty());
        if let Some(reference) = payment_ref {
            if let Some(existing) = self.projects.get_project_by_payment_ref(reference)? {
                if existing.id != id {
                    return Err(ServiceError::DuplicatePaymentRef {
                        payment_ref: reference.to_string(),
                        existing: existing.id,
                    });
                }
            }
        }

        self.projects.record_payment(id, revenue, payment_ref)?;
        info!(
            "event=project_paid module=service status=ok project_id={} has_ref={}",
            id,
            payment_ref.is_some()
        );

        self.project_detail(id)?
            .ok_or(ServiceError::InconsistentState(
                "paid project not found in read-back",
            ))
    }

    pub fn delete_project(&self, id: ProjectId) -> ServiceResult<()> {
        self.projects.delete_project(id)?;
        info!(
            "event=project_delete module=service status=ok project_id={}",
            id
        );
        Ok(())
    }

    /// Loads one project with its ledger and split.
    pub fn project_detail(&self, id: ProjectId) -> ServiceResult<Option<ProjectDetail>> {
        let Some(project) = self.projects.get_project(id)? else {
            return Ok(None);
        };
        let contributions = self.contributions.list_contributions(id)?;
        let split = compute_split(&project, &contributions);

        Ok(Some(ProjectDetail {
            noor_hours: hours_for(&contributions, Collaborator::Noor),
            ahmad_hours: hours_for(&contributions, Collaborator::Ahmad),
            project,
            contributions,
            split,
        }))
    }

    /// Loads the board, optionally filtered by a client/description search.
    pub fn board(&self, search: Option<&str>) -> ServiceResult<Board> {
        let projects = self.projects.list_projects(&ProjectListQuery {
            status: None,
            search: search.map(str::to_string),
        })?;
        Ok(Board::from_projects(projects))
    }

    /// Computes dashboard metrics over every stored project.
    pub fn metrics(&self) -> ServiceResult<Metrics> {
        let projects = self.projects.list_projects(&ProjectListQuery::default())?;
        Ok(compute_metrics(&projects, &self.contributions)?)
    }

    fn save_hours(&self, id: ProjectId, draft: &ProjectDraft) -> ServiceResult<()> {
        for collaborator in Collaborator::ALL {
            let hours = draft.hours(collaborator);
            if hours > 0.0 {
                self.contributions
                    .set_contribution(&Contribution::new(id, collaborator, hours))?;
            } else {
                self.contributions.clear_contribution(id, collaborator)?;
            }
        }
        Ok(())
    }
}
