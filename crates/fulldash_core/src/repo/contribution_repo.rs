//! Contribution ledger repository and SQLite implementation.
//!
//! # Responsibility
//! - Read and upsert per-collaborator hours for a project.
//! - Serve as the `ContributionLedger` the metrics aggregator pulls from.
//!
//! # Invariants
//! - At most one row per (project, collaborator), enforced by the schema.
//! - Upserts on unknown projects return `NotFound`, not a FK error.

use crate::model::contribution::{Collaborator, Contribution};
use crate::model::project::ProjectId;
use crate::repo::project_repo::{parse_uuid, project_exists};
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use crate::split::ContributionLedger;
use rusqlite::{params, Connection, Row};

/// Repository interface for contribution ledgers.
pub trait ContributionRepository {
    /// Returns 0-2 entries, ordered by collaborator.
    fn list_contributions(&self, project_id: ProjectId) -> RepoResult<Vec<Contribution>>;
    /// Inserts or replaces the entry for `(project_id, collaborator)`.
    fn set_contribution(&self, contribution: &Contribution) -> RepoResult<()>;
    /// Removes one collaborator's entry. Missing entries are not an error.
    fn clear_contribution(&self, project_id: ProjectId, collaborator: Collaborator)
        -> RepoResult<()>;
}

/// SQLite-backed contribution repository.
pub struct SqliteContributionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteContributionRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["projects", "contributions"])?;
        Ok(Self { conn })
    }
}

impl ContributionRepository for SqliteContributionRepository<'_> {
    fn list_contributions(&self, project_id: ProjectId) -> RepoResult<Vec<Contribution>> {
        let mut stmt = self.conn.prepare(
            "SELECT project_uuid, collaborator, hours, notes
             FROM contributions
             WHERE project_uuid = ?1
             ORDER BY collaborator DESC;",
        )?;
        let mut rows = stmt.query([project_id.to_string()])?;
        let mut contributions = Vec::new();
        while let Some(row) = rows.next()? {
            contributions.push(parse_contribution_row(row)?);
        }
        Ok(contributions)
    }

    fn set_contribution(&self, contribution: &Contribution) -> RepoResult<()> {
        contribution.validate()?;

        if !project_exists(self.conn, contribution.project_id)? {
            return Err(RepoError::NotFound(contribution.project_id));
        }

        self.conn.execute(
            "INSERT INTO contributions (project_uuid, collaborator, hours, notes)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(project_uuid, collaborator)
             DO UPDATE SET hours = excluded.hours, notes = excluded.notes;",
            params![
                contribution.project_id.to_string(),
                contribution.collaborator.as_str(),
                contribution.hours,
                contribution.notes.as_deref(),
            ],
        )?;

        Ok(())
    }

    fn clear_contribution(
        &self,
        project_id: ProjectId,
        collaborator: Collaborator,
    ) -> RepoResult<()> {
        self.conn.execute(
            "DELETE FROM contributions WHERE project_uuid = ?1 AND collaborator = ?2;",
            params![project_id.to_string(), collaborator.as_str()],
        )?;
        Ok(())
    }
}

impl ContributionLedger for SqliteContributionRepository<'_> {
    fn contributions_for(&self, project_id: ProjectId) -> RepoResult<Vec<Contribution>> {
        self.list_contributions(project_id)
    }
}

fn parse_contribution_row(row: &Row<'_>) -> RepoResult<Contribution> {
    let uuid_text: String = row.get("project_uuid")?;
    let project_id = parse_uuid(&uuid_text, "contributions.project_uuid")?;

    let collaborator_text: String = row.get("collaborator")?;
    let collaborator = Collaborator::parse(&collaborator_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid collaborator `{collaborator_text}` in contributions.collaborator"
        ))
    })?;

    Ok(Contribution {
        project_id,
        collaborator,
        hours: row.get("hours")?,
        notes: row.get("notes")?,
    })
}
