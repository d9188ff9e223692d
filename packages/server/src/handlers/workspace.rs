use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{file, task, workspace};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::file::FileResponse;
use crate::models::shared::{UserRef, load_user_refs};
use crate::models::task::TaskResponse;
use crate::models::workspace::{
    CreateWorkspaceRequest, TaskSummary, UpdateWorkspaceRequest, WorkspaceDetailResponse,
    WorkspaceListItem, WorkspaceRef, WorkspaceResponse, WorkspaceStatsResponse,
    validate_create_workspace, validate_update_workspace,
};
use crate::state::AppState;
use crate::utils::ownership::find_owned_workspace;

#[utoipa::path(
    get,
    path = "/api/v1/workspaces",
    tag = "Workspaces",
    responses(
        (status = 200, description = "Workspaces owned by the caller", body = [WorkspaceListItem]),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn list_workspaces(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<WorkspaceListItem>>, AppError> {
    let workspaces = workspace::Entity::find()
        .filter(workspace::Column::OwnerId.eq(auth_user.user_id))
        .order_by_desc(workspace::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let ids: Vec<i32> = workspaces.iter().map(|w| w.id).collect();
    let tasks = if ids.is_empty() {
        Vec::new()
    } else {
        task::Entity::find()
            .filter(task::Column::WorkspaceId.is_in(ids))
            .order_by_desc(task::Column::CreatedAt)
            .all(&state.db)
            .await?
    };

    let mut tasks_by_workspace: HashMap<i32, Vec<TaskSummary>> = HashMap::new();
    for t in &tasks {
        tasks_by_workspace
            .entry(t.workspace_id)
            .or_default()
            .push(TaskSummary::from(t));
    }

    let users = load_user_refs(&state.db, workspaces.iter().map(|w| w.owner_id)).await?;

    let items = workspaces
        .into_iter()
        .map(|w| {
            let tasks = tasks_by_workspace.remove(&w.id).unwrap_or_default();
            let owner = users.get(&w.owner_id).cloned();
            WorkspaceListItem {
                workspace: WorkspaceResponse::from_model(w, owner),
                tasks,
            }
        })
        .collect();

    Ok(Json(items))
}

#[utoipa::path(
    get,
    path = "/api/v1/workspaces/{id}",
    tag = "Workspaces",
    params(("id" = i32, Path, description = "Workspace ID")),
    responses(
        (status = 200, description = "Workspace with nested tasks and files", body = WorkspaceDetailResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found or not owned (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn get_workspace(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<WorkspaceDetailResponse>, AppError> {
    let workspace = find_owned_workspace(&state.db, auth_user.user_id, id).await?;

    let tasks = task::Entity::find()
        .filter(task::Column::WorkspaceId.eq(workspace.id))
        .order_by_desc(task::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let files = file::Entity::find()
        .filter(file::Column::WorkspaceId.eq(workspace.id))
        .order_by_desc(file::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let user_ids = std::iter::once(workspace.owner_id)
        .chain(tasks.iter().map(|t| t.created_by_id))
        .chain(tasks.iter().filter_map(|t| t.assigned_to_id))
        .chain(files.iter().map(|f| f.uploaded_by_id));
    let users = load_user_refs(&state.db, user_ids).await?;

    let workspace_ref = WorkspaceRef::from(&workspace);
    let lookup = |id: i32| -> Option<UserRef> { users.get(&id).cloned() };

    let tasks = tasks
        .into_iter()
        .map(|t| {
            let creator = lookup(t.created_by_id);
            let assignee = t.assigned_to_id.and_then(&lookup);
            TaskResponse::from_model(t, Some(workspace_ref.clone()), creator, assignee)
        })
        .collect();

    let files = files
        .into_iter()
        .map(|f| {
            let uploader = lookup(f.uploaded_by_id);
            FileResponse::from_model(f, uploader)
        })
        .collect();

    let owner = lookup(workspace.owner_id);
    Ok(Json(WorkspaceDetailResponse {
        workspace: WorkspaceResponse::from_model(workspace, owner),
        tasks,
        files,
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/workspaces",
    tag = "Workspaces",
    request_body = CreateWorkspaceRequest,
    responses(
        (status = 201, description = "Workspace created", body = WorkspaceResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn create_workspace(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateWorkspaceRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_workspace(&payload)?;

    let now = chrono::Utc::now();
    let new_workspace = workspace::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        description: Set(payload.description),
        color: Set(payload
            .color
            .unwrap_or_else(|| workspace::DEFAULT_COLOR.to_string())),
        is_active: Set(true),
        owner_id: Set(auth_user.user_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let created = new_workspace.insert(&state.db).await?;

    let users = load_user_refs(&state.db, [created.owner_id]).await?;
    let owner = users.get(&created.owner_id).cloned();

    Ok((
        StatusCode::CREATED,
        Json(WorkspaceResponse::from_model(created, owner)),
    ))
}

#[utoipa::path(
    put,
    path = "/api/v1/workspaces/{id}",
    tag = "Workspaces",
    params(("id" = i32, Path, description = "Workspace ID")),
    request_body = UpdateWorkspaceRequest,
    responses(
        (status = 200, description = "Workspace updated", body = WorkspaceResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found or not owned (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn update_workspace(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateWorkspaceRequest>,
) -> Result<Json<WorkspaceResponse>, AppError> {
    validate_update_workspace(&payload)?;

    let workspace = find_owned_workspace(&state.db, auth_user.user_id, id).await?;

    let mut active: workspace::ActiveModel = workspace.into();
    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(color) = payload.color {
        active.color = Set(color);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    active.updated_at = Set(chrono::Utc::now());
    let updated = active.update(&state.db).await?;

    let users = load_user_refs(&state.db, [updated.owner_id]).await?;
    let owner = users.get(&updated.owner_id).cloned();

    Ok(Json(WorkspaceResponse::from_model(updated, owner)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/workspaces/{id}",
    tag = "Workspaces",
    params(("id" = i32, Path, description = "Workspace ID")),
    responses(
        (status = 204, description = "Workspace deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found or not owned (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Workspace still has tasks (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn delete_workspace(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let workspace = find_owned_workspace(&state.db, auth_user.user_id, id).await?;

    let task_count = task::Entity::find()
        .filter(task::Column::WorkspaceId.eq(workspace.id))
        .count(&state.db)
        .await?;
    if task_count > 0 {
        return Err(AppError::Conflict(format!(
            "Workspace still has {task_count} task(s); delete them first"
        )));
    }

    workspace::Entity::delete_by_id(workspace.id)
        .exec(&state.db)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v1/workspaces/{id}/stats",
    tag = "Workspaces",
    params(("id" = i32, Path, description = "Workspace ID")),
    responses(
        (status = 200, description = "Aggregate counters", body = WorkspaceStatsResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found or not owned (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn workspace_stats(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<WorkspaceStatsResponse>, AppError> {
    let workspace = find_owned_workspace(&state.db, auth_user.user_id, id).await?;

    let count_tasks = |status: Option<&'static str>| {
        let mut query =
            task::Entity::find().filter(task::Column::WorkspaceId.eq(workspace.id));
        if let Some(status) = status {
            query = query.filter(task::Column::Status.eq(status));
        }
        query.count(&state.db)
    };

    let total_tasks = count_tasks(None).await?;
    let open_tasks = count_tasks(Some("open")).await?;
    let in_progress_tasks = count_tasks(Some("in_progress")).await?;
    let completed_tasks = count_tasks(Some("completed")).await?;

    let total_files = file::Entity::find()
        .filter(file::Column::WorkspaceId.eq(workspace.id))
        .count(&state.db)
        .await?;

    let completion_rate = if total_tasks == 0 {
        0
    } else {
        (completed_tasks as f64 / total_tasks as f64 * 100.0).round() as u64
    };

    Ok(Json(WorkspaceStatsResponse {
        total_tasks,
        open_tasks,
        in_progress_tasks,
        completed_tasks,
        total_files,
        completion_rate,
    }))
}
