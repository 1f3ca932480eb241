//! Success payloads shared by the project handlers.

use portfolio_core::types::DbId;
use portfolio_db::models::project::Project;
use serde::Serialize;

/// `{ "message": ... }` acknowledgement for update and delete.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Body returned by `POST /api/projects`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedResponse {
    pub message: &'static str,
    pub project_id: DbId,
    /// The submitted fields as stored, with the new id.
    pub project: Project,
}
