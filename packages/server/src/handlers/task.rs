use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, Query, State},
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
use crate::models::shared::load_user_refs;
use crate::models::task::{
    CreateTaskRequest, TaskDetailResponse, TaskListQuery, TaskResponse, UpdateTaskRequest,
    validate_create_task, validate_task_list_query, validate_update_task,
};
use crate::models::workspace::WorkspaceRef;
use crate::state::AppState;
use crate::utils::ownership::{find_owned_task, find_owned_workspace, owned_workspace_ids};

use super::comment::load_comment_thread;

#[utoipa::path(
    get,
    path = "/api/v1/tasks",
    tag = "Tasks",
    params(TaskListQuery),
    responses(
        (status = 200, description = "Tasks visible to the caller", body = [TaskResponse]),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Filtered workspace not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = auth_user.user_id))]
pub async fn list_tasks(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<TaskListQuery>,
) -> Result<Json<Vec<TaskResponse>>, AppError> {
    validate_task_list_query(&query)?;

    let mut find = task::Entity::find();
    match query.workspace_id {
        Some(workspace_id) => {
            find_owned_workspace(&state.db, auth_user.user_id, workspace_id).await?;
            find = find.filter(task::Column::WorkspaceId.eq(workspace_id));
        }
        None => {
            let ids = owned_workspace_ids(&state.db, auth_user.user_id).await?;
            find = find.filter(task::Column::WorkspaceId.is_in(ids));
        }
    }
    if let Some(ref status) = query.status {
        find = find.filter(task::Column::Status.eq(status));
    }
    if let Some(assigned_to_id) = query.assigned_to_id {
        find = find.filter(task::Column::AssignedToId.eq(assigned_to_id));
    }
    if let Some(ref priority) = query.priority {
        find = find.filter(task::Column::Priority.eq(priority));
    }

    let tasks = find
        .order_by_desc(task::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let workspace_ids: Vec<i32> = {
        let mut ids: Vec<i32> = tasks.iter().map(|t| t.workspace_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    };
    let workspaces: HashMap<i32, WorkspaceRef> = if workspace_ids.is_empty() {
        HashMap::new()
    } else {
        workspace::Entity::find()
            .filter(workspace::Column::Id.is_in(workspace_ids))
            .all(&state.db)
            .await?
            .iter()
            .map(|w| (w.id, WorkspaceRef::from(w)))
            .collect()
    };

    let user_ids = tasks
        .iter()
        .map(|t| t.created_by_id)
        .chain(tasks.iter().filter_map(|t| t.assigned_to_id));
    let users = load_user_refs(&state.db, user_ids).await?;

    let responses = tasks
        .into_iter()
        .map(|t| {
            let workspace = workspaces.get(&t.workspace_id).cloned();
            let creator = users.get(&t.created_by_id).cloned();
            let assignee = t.assigned_to_id.and_then(|id| users.get(&id).cloned());
            TaskResponse::from_model(t, workspace, creator, assignee)
        })
        .collect();

    Ok(Json(responses))
}

#[utoipa::path(
    get,
    path = "/api/v1/tasks/calendar/{year}/{month}",
    tag = "Tasks",
    params(
        ("year" = i32, Path, description = "Calendar year"),
        ("month" = u32, Path, description = "Calendar month (1-12)"),
    ),
    responses(
        (status = 200, description = "Tasks due in the month, ascending by due date", body = [TaskResponse]),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn calendar_tasks(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<Json<Vec<TaskResponse>>, AppError> {
    let (start, end) = month_bounds(year, month)
        .ok_or_else(|| AppError::Validation("Month must be 1-12".into()))?;

    let workspace_ids = owned_workspace_ids(&state.db, auth_user.user_id).await?;
    let tasks = task::Entity::find()
        .filter(task::Column::WorkspaceId.is_in(workspace_ids))
        .filter(task::Column::DueDate.gte(start))
        .filter(task::Column::DueDate.lt(end))
        .order_by_asc(task::Column::DueDate)
        .all(&state.db)
        .await?;

    let workspace_ids: Vec<i32> = {
        let mut ids: Vec<i32> = tasks.iter().map(|t| t.workspace_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    };
    let workspaces: HashMap<i32, WorkspaceRef> = if workspace_ids.is_empty() {
        HashMap::new()
    } else {
        workspace::Entity::find()
            .filter(workspace::Column::Id.is_in(workspace_ids))
            .all(&state.db)
            .await?
            .iter()
            .map(|w| (w.id, WorkspaceRef::from(w)))
            .collect()
    };

    let user_ids = tasks
        .iter()
        .map(|t| t.created_by_id)
        .chain(tasks.iter().filter_map(|t| t.assigned_to_id));
    let users = load_user_refs(&state.db, user_ids).await?;

    let responses = tasks
        .into_iter()
        .map(|t| {
            let workspace = workspaces.get(&t.workspace_id).cloned();
            let creator = users.get(&t.created_by_id).cloned();
            let assignee = t.assigned_to_id.and_then(|id| users.get(&id).cloned());
            TaskResponse::from_model(t, workspace, creator, assignee)
        })
        .collect();

    Ok(Json(responses))
}

/// Half-open UTC interval covering one calendar month.
fn month_bounds(
    year: i32,
    month: u32,
) -> Option<(chrono::DateTime<chrono::Utc>, chrono::DateTime<chrono::Utc>)> {
    use chrono::{NaiveDate, NaiveTime};

    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let end = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((
        start.and_time(NaiveTime::MIN).and_utc(),
        end.and_time(NaiveTime::MIN).and_utc(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/tasks/{id}",
    tag = "Tasks",
    params(("id" = i32, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task with files and comment thread", body = TaskDetailResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found or not owned (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn get_task(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<TaskDetailResponse>, AppError> {
    let task = find_owned_task(&state.db, auth_user.user_id, id).await?;

    let workspace = workspace::Entity::find_by_id(task.workspace_id)
        .one(&state.db)
        .await?;

    let files = file::Entity::find()
        .filter(file::Column::TaskId.eq(task.id))
        .order_by_desc(file::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let comments = load_comment_thread(&state.db, task.id).await?;

    let user_ids = std::iter::once(task.created_by_id)
        .chain(task.assigned_to_id)
        .chain(files.iter().map(|f| f.uploaded_by_id));
    let users = load_user_refs(&state.db, user_ids).await?;

    let creator = users.get(&task.created_by_id).cloned();
    let assignee = task.assigned_to_id.and_then(|id| users.get(&id).cloned());
    let workspace_ref = workspace.as_ref().map(WorkspaceRef::from);

    let files = files
        .into_iter()
        .map(|f| {
            let uploader = users.get(&f.uploaded_by_id).cloned();
            FileResponse::from_model(f, uploader)
        })
        .collect();

    Ok(Json(TaskDetailResponse {
        task: TaskResponse::from_model(task, workspace_ref, creator, assignee),
        files,
        comments,
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/tasks",
    tag = "Tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created", body = TaskResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Workspace not found or not owned (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn create_task(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateTaskRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_task(&payload)?;

    // Workspace ownership is proven before the child row is persisted.
    let workspace = find_owned_workspace(&state.db, auth_user.user_id, payload.workspace_id).await?;

    let now = chrono::Utc::now();
    let new_task = task::ActiveModel {
        title: Set(payload.title.trim().to_string()),
        description: Set(payload.description),
        status: Set(payload
            .status
            .unwrap_or_else(|| task::DEFAULT_STATUS.to_string())),
        priority: Set(payload
            .priority
            .unwrap_or_else(|| task::DEFAULT_PRIORITY.to_string())),
        due_date: Set(payload.due_date),
        workspace_id: Set(workspace.id),
        created_by_id: Set(auth_user.user_id),
        assigned_to_id: Set(payload.assigned_to_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let created = new_task.insert(&state.db).await?;

    let user_ids = std::iter::once(created.created_by_id).chain(created.assigned_to_id);
    let users = load_user_refs(&state.db, user_ids).await?;
    let creator = users.get(&created.created_by_id).cloned();
    let assignee = created.assigned_to_id.and_then(|id| users.get(&id).cloned());

    Ok((
        StatusCode::CREATED,
        Json(TaskResponse::from_model(
            created,
            Some(WorkspaceRef::from(&workspace)),
            creator,
            assignee,
        )),
    ))
}

#[utoipa::path(
    put,
    path = "/api/v1/tasks/{id}",
    tag = "Tasks",
    params(("id" = i32, Path, description = "Task ID")),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Task updated", body = TaskResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found or not owned (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn update_task(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateTaskRequest>,
) -> Result<Json<TaskResponse>, AppError> {
    validate_update_task(&payload)?;

    let task = find_owned_task(&state.db, auth_user.user_id, id).await?;
    let workspace = workspace::Entity::find_by_id(task.workspace_id)
        .one(&state.db)
        .await?;

    let mut active: task::ActiveModel = task.into();
    if let Some(title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(status) = payload.status {
        active.status = Set(status);
    }
    if let Some(priority) = payload.priority {
        active.priority = Set(priority);
    }
    if let Some(due_date) = payload.due_date {
        active.due_date = Set(due_date);
    }
    if let Some(assigned_to_id) = payload.assigned_to_id {
        active.assigned_to_id = Set(assigned_to_id);
    }
    active.updated_at = Set(chrono::Utc::now());
    let updated = active.update(&state.db).await?;

    let user_ids = std::iter::once(updated.created_by_id).chain(updated.assigned_to_id);
    let users = load_user_refs(&state.db, user_ids).await?;
    let creator = users.get(&updated.created_by_id).cloned();
    let assignee = updated.assigned_to_id.and_then(|id| users.get(&id).cloned());

    Ok(Json(TaskResponse::from_model(
        updated,
        workspace.as_ref().map(WorkspaceRef::from),
        creator,
        assignee,
    )))
}

#[utoipa::path(
    delete,
    path = "/api/v1/tasks/{id}",
    tag = "Tasks",
    params(("id" = i32, Path, description = "Task ID")),
    responses(
        (status = 204, description = "Task deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found or not owned (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn delete_task(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let task = find_owned_task(&state.db, auth_user.user_id, id).await?;

    task::Entity::delete_by_id(task.id).exec(&state.db).await?;

    Ok(StatusCode::NO_CONTENT)
}
