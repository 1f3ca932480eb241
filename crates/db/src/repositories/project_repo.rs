//! Repository for the `projects` table.

use portfolio_core::types::DbId;

use crate::manager::ConnectionManager;
use crate::models::project::{Project, ProjectFields};
use crate::DbError;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, technologies, imageUrl, projectLink, \
                       githubLink, status, startDate, endDate";

/// Row order for [`ProjectRepo::list`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectOrder {
    /// Most recent `startDate` first, ties broken by highest `id`.
    #[default]
    Recent,
    /// Whatever order the backend returns.
    Unordered,
}

impl ProjectOrder {
    fn clause(self) -> &'static str {
        match self {
            ProjectOrder::Recent => " ORDER BY startDate DESC, id DESC",
            ProjectOrder::Unordered => "",
        }
    }
}

/// Provides CRUD operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// List every project.
    pub async fn list(
        db: &ConnectionManager,
        order: ProjectOrder,
    ) -> Result<Vec<Project>, DbError> {
        let query = format!("SELECT {COLUMNS} FROM projects{}", order.clause());
        let mut conn = db.acquire().await?;
        db.bounded(sqlx::query_as::<_, Project>(&query).fetch_all(&mut *conn))
            .await
    }

    /// Find a project by its ID.
    pub async fn find_by_id(db: &ConnectionManager, id: DbId) -> Result<Option<Project>, DbError> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = ?");
        let mut conn = db.acquire().await?;
        db.bounded(
            sqlx::query_as::<_, Project>(&query)
                .bind(id)
                .fetch_optional(&mut *conn),
        )
        .await
    }

    /// Insert a new project, returning the backend-assigned ID.
    pub async fn create(db: &ConnectionManager, fields: &ProjectFields) -> Result<DbId, DbError> {
        let mut conn = db.acquire().await?;
        let result = db
            .bounded(
                sqlx::query(
                    "INSERT INTO projects
                        (title, description, technologies, imageUrl, projectLink,
                         githubLink, status, startDate, endDate)
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                )
                .bind(&fields.title)
                .bind(&fields.description)
                .bind(&fields.technologies)
                .bind(&fields.image_url)
                .bind(&fields.project_link)
                .bind(&fields.github_link)
                .bind(&fields.status)
                .bind(fields.start_date)
                .bind(fields.end_date)
                .execute(&mut *conn),
            )
            .await?;

        DbId::try_from(result.last_insert_id())
            .map_err(|e| DbError::Sqlx(sqlx::Error::Decode(Box::new(e))))
    }

    /// Replace every mutable column of a project.
    ///
    /// Optional fields absent from `fields` are written as NULL. Returns
    /// `false` when no row was affected.
    pub async fn update(
        db: &ConnectionManager,
        id: DbId,
        fields: &ProjectFields,
    ) -> Result<bool, DbError> {
        let mut conn = db.acquire().await?;
        let result = db
            .bounded(
                sqlx::query(
                    "UPDATE projects SET
                        title = ?, description = ?, technologies = ?, imageUrl = ?,
                        projectLink = ?, githubLink = ?, status = ?, startDate = ?,
                        endDate = ?
                     WHERE id = ?",
                )
                .bind(&fields.title)
                .bind(&fields.description)
                .bind(&fields.technologies)
                .bind(&fields.image_url)
                .bind(&fields.project_link)
                .bind(&fields.github_link)
                .bind(&fields.status)
                .bind(fields.start_date)
                .bind(fields.end_date)
                .bind(id)
                .execute(&mut *conn),
            )
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Permanently delete a project by ID. Returns `true` if a row was removed.
    pub async fn delete(db: &ConnectionManager, id: DbId) -> Result<bool, DbError> {
        let mut conn = db.acquire().await?;
        let result = db
            .bounded(
                sqlx::query("DELETE FROM projects WHERE id = ?")
                    .bind(id)
                    .execute(&mut *conn),
            )
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
