//! Handlers for the `/projects` resource.
//!
//! Every handler first checks that the connection manager is ready, so an
//! unavailable database answers 503 without attempting a round-trip.
//! Extractor rejections are taken as `Result`s and turned into
//! `BAD_REQUEST` only after that check.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use portfolio_core::error::CoreError;
use portfolio_core::types::DbId;
use portfolio_db::models::project::{Project, ProjectInput};
use portfolio_db::repositories::{ProjectOrder, ProjectRepo};

use crate::error::{AppError, AppResult};
use crate::query::ListParams;
use crate::response::{CreatedResponse, MessageResponse};
use crate::state::AppState;

/// GET /api/projects
pub async fn list(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> AppResult<Json<Vec<Project>>> {
    state.db.ensure_ready().await?;
    let Query(params) = params.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let order = if params.sort {
        ProjectOrder::Recent
    } else {
        ProjectOrder::Unordered
    };
    let projects = ProjectRepo::list(&state.db, order).await?;
    Ok(Json(projects))
}

/// GET /api/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    id: Result<Path<DbId>, PathRejection>,
) -> AppResult<Json<Project>> {
    state.db.ensure_ready().await?;
    let id = parse_id(id)?;

    let project = ProjectRepo::find_by_id(&state.db, id)
        .await?
        .ok_or(not_found(id))?;
    Ok(Json(project))
}

/// POST /api/projects
pub async fn create(
    State(state): State<AppState>,
    input: Result<Json<ProjectInput>, JsonRejection>,
) -> AppResult<(StatusCode, Json<CreatedResponse>)> {
    state.db.ensure_ready().await?;
    let fields = parse_body(input)?.validate()?;

    let id = ProjectRepo::create(&state.db, &fields).await?;
    tracing::info!(project_id = id, "Project created");

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "Project created successfully.",
            project_id: id,
            project: fields.into_project(id),
        }),
    ))
}

/// PUT /api/projects/{id}
///
/// Full replace: optional fields left out of the body are cleared.
pub async fn update(
    State(state): State<AppState>,
    id: Result<Path<DbId>, PathRejection>,
    input: Result<Json<ProjectInput>, JsonRejection>,
) -> AppResult<Json<MessageResponse>> {
    state.db.ensure_ready().await?;
    let id = parse_id(id)?;
    let fields = parse_body(input)?.validate()?;

    if !ProjectRepo::update(&state.db, id, &fields).await? {
        return Err(not_found(id));
    }
    tracing::info!(project_id = id, "Project updated");

    Ok(Json(MessageResponse {
        message: "Project updated successfully.",
    }))
}

/// DELETE /api/projects/{id}
pub async fn delete(
    State(state): State<AppState>,
    id: Result<Path<DbId>, PathRejection>,
) -> AppResult<Json<MessageResponse>> {
    state.db.ensure_ready().await?;
    let id = parse_id(id)?;

    if !ProjectRepo::delete(&state.db, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(project_id = id, "Project deleted");

    Ok(Json(MessageResponse {
        message: "Project deleted successfully.",
    }))
}

fn parse_id(id: Result<Path<DbId>, PathRejection>) -> AppResult<DbId> {
    match id {
        Ok(Path(id)) => Ok(id),
        Err(e) => {
            tracing::debug!(error = %e, "Rejected project id");
            Err(AppError::BadRequest("Project id must be an integer".to_string()))
        }
    }
}

fn parse_body(input: Result<Json<ProjectInput>, JsonRejection>) -> AppResult<ProjectInput> {
    match input {
        Ok(Json(input)) => Ok(input),
        Err(e) => Err(AppError::BadRequest(format!(
            "Invalid request body: {}",
            e.body_text()
        ))),
    }
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Project",
        id,
    })
}
