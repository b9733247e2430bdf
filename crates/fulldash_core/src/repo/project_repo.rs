//! Project repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and payment bookkeeping over the `projects` table.
//! - Supply the project listings the metrics aggregator consumes.
//!
//! # Invariants
//! - Write paths call `Project::validate()` before SQL mutations.
//! - Listings are ordered by `created_at DESC, uuid ASC`.
//! - Unknown stored `secured_by` tags are folded, never rejected.

use crate::model::project::{Project, ProjectId, ProjectStatus, SecuredBy};
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use uuid::Uuid;

const PROJECT_SELECT_SQL: &str = "SELECT
    uuid,
    client,
    description,
    revenue,
    status,
    secured_by,
    payment_ref,
    created_at
FROM projects";

/// Filter options for listing projects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectListQuery {
    pub status: Option<ProjectStatus>,
    /// Case-insensitive substring match on client or description.
    pub search: Option<String>,
}

/// Repository interface for project persistence.
pub trait ProjectRepository {
    fn create_project(&self, project: &Project) -> RepoResult<ProjectId>;
    fn update_project(&self, project: &Project) -> RepoResult<()>;
    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>>;
    fn get_project_by_payment_ref(&self, payment_ref: &str) -> RepoResult<Option<Project>>;
    fn list_projects(&self, query: &ProjectListQuery) -> RepoResult<Vec<Project>>;
    /// Marks a project paid and records the received revenue.
    fn record_payment(
        &self,
        id: ProjectId,
        revenue: f64,
        payment_ref: Option<&str>,
    ) -> RepoResult<()>;
    fn set_status(&self, id: ProjectId, status: ProjectStatus) -> RepoResult<()>;
    /// Hard-deletes a project; its contributions cascade.
    fn delete_project(&self, id: ProjectId) -> RepoResult<()>;

    fn list_paid_projects(&self) -> RepoResult<Vec<Project>> {
        self.list_projects(&ProjectListQuery {
            status: Some(ProjectStatus::Paid),
            search: None,
        })
    }
}

/// SQLite-backed project repository.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["projects"])?;
        Ok(Self { conn })
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn create_project(&self, project: &Project) -> RepoResult<ProjectId> {
        project.validate()?;

        self.conn.execute(
            "INSERT INTO projects (
                uuid,
                client,
                description,
                revenue,
                status,
                secured_by,
                payment_ref
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                project.id.to_string(),
                project.client.as_str(),
                project.description.as_str(),
                project.revenue,
                project.status.as_str(),
                project.secured_by.as_str(),
                project.payment_ref.as_deref(),
            ],
        )?;

        Ok(project.id)
    }

    fn update_project(&self, project: &Project) -> RepoResult<()> {
        project.validate()?;

        let changed = self.conn.execute(
            "UPDATE projects
             SET
                client = ?1,
                description = ?2,
                revenue = ?3,
                status = ?4,
                secured_by = ?5,
                payment_ref = ?6
             WHERE uuid = ?7;",
            params![
                project.client.as_str(),
                project.description.as_str(),
                project.revenue,
                project.status.as_str(),
                project.secured_by.as_str(),
                project.payment_ref.as_deref(),
                project.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(project.id));
        }

        Ok(())
    }

    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROJECT_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_project_row(row)?));
        }

        Ok(None)
    }

    fn get_project_by_payment_ref(&self, payment_ref: &str) -> RepoResult<Option<Project>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PROJECT_SELECT_SQL}
             WHERE payment_ref = ?1
             ORDER BY created_at DESC, uuid ASC
             LIMIT 1;"
        ))?;
        let mut rows = stmt.query([payment_ref])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_project_row(row)?));
        }

        Ok(None)
    }

    fn list_projects(&self, query: &ProjectListQuery) -> RepoResult<Vec<Project>> {
        let mut sql = format!("{PROJECT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }

        if let Some(search) = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
        {
            sql.push_str(" AND (client LIKE ? ESCAPE '\\' OR description LIKE ? ESCAPE '\\')");
            let pattern = format!("%{}%", escape_like(search));
            bind_values.push(Value::Text(pattern.clone()));
            bind_values.push(Value::Text(pattern));
        }

        sql.push_str(" ORDER BY created_at DESC, uuid ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut projects = Vec::new();

        while let Some(row) = rows.next()? {
            projects.push(parse_project_row(row)?);
        }

        Ok(projects)
    }

    fn record_payment(
        &self,
        id: ProjectId,
        revenue: f64,
        payment_ref: Option<&str>,
    ) -> RepoResult<()> {
        let mut project = self.get_project(id)?.ok_or(RepoError::NotFound(id))?;
        project.status = ProjectStatus::Paid;
        project.revenue = revenue;
        if let Some(reference) = payment_ref {
            project.payment_ref = Some(reference.to_string());
        }
        self.update_project(&project)
    }

    fn set_status(&self, id: ProjectId, status: ProjectStatus) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE projects SET status = ?1 WHERE uuid = ?2;",
            params![status.as_str(), id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn delete_project(&self, id: ProjectId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM projects WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

/// Returns whether a project row exists, without decoding it.
pub(crate) fn project_exists(conn: &Connection, id: ProjectId) -> RepoResult<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM projects WHERE uuid = ?1;",
            [id.to_string()],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;
    Ok(found.is_some())
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    let uuid_text: String = row.get("uuid")?;
    let id = parse_uuid(&uuid_text, "projects.uuid")?;

    let status_text: String = row.get("status")?;
    let status = ProjectStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status `{status_text}` in projects.status"))
    })?;

    let secured_by_text: String = row.get("secured_by")?;

    Ok(Project {
        id,
        client: row.get("client")?,
        description: row.get("description")?,
        revenue: row.get("revenue")?,
        status,
        secured_by: SecuredBy::parse_lenient(&secured_by_text),
        payment_ref: row.get("payment_ref")?,
        created_at: row.get("created_at")?,
    })
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
