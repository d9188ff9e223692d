use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sea_orm::*;
use tracing::instrument;

use crate::entity::comment;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::comment::{
    CommentListQuery, CommentResponse, CreateCommentRequest, UpdateCommentRequest,
    validate_comment_content,
};
use crate::models::shared::load_user_refs;
use crate::state::AppState;
use crate::utils::ownership::find_owned_task;

/// Load a task's full comment thread: top-level comments ascending by
/// creation time, each carrying its direct replies and author projections.
pub(crate) async fn load_comment_thread<C: ConnectionTrait>(
    db: &C,
    task_id: i32,
) -> Result<Vec<CommentResponse>, AppError> {
    let comments = comment::Entity::find()
        .filter(comment::Column::TaskId.eq(task_id))
        .order_by_asc(comment::Column::CreatedAt)
        .all(db)
        .await?;

    let users = load_user_refs(db, comments.iter().map(|c| c.author_id)).await?;

    let mut replies_by_parent: HashMap<i32, Vec<CommentResponse>> = HashMap::new();
    let mut top_level: Vec<comment::Model> = Vec::new();
    for c in comments {
        match c.parent_id {
            Some(parent_id) => {
                let author = users.get(&c.author_id).cloned();
                replies_by_parent
                    .entry(parent_id)
                    .or_default()
                    .push(CommentResponse::from_model(c, author, Vec::new()));
            }
            None => top_level.push(c),
        }
    }

    Ok(top_level
        .into_iter()
        .map(|c| {
            let author = users.get(&c.author_id).cloned();
            let replies = replies_by_parent.remove(&c.id).unwrap_or_default();
            CommentResponse::from_model(c, author, replies)
        })
        .collect())
}

#[utoipa::path(
    get,
    path = "/api/v1/comments",
    tag = "Comments",
    params(CommentListQuery),
    responses(
        (status = 200, description = "Comment thread for a task", body = [CommentResponse]),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Task not found or not owned (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = auth_user.user_id))]
pub async fn list_comments(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<CommentListQuery>,
) -> Result<Json<Vec<CommentResponse>>, AppError> {
    let task = find_owned_task(&state.db, auth_user.user_id, query.task_id).await?;
    let thread = load_comment_thread(&state.db, task.id).await?;
    Ok(Json(thread))
}

#[utoipa::path(
    post,
    path = "/api/v1/comments",
    tag = "Comments",
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment created", body = CommentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Task or parent comment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn create_comment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_comment_content(&payload.content)?;

    let task = find_owned_task(&state.db, auth_user.user_id, payload.task_id).await?;

    if let Some(parent_id) = payload.parent_id {
        let parent = comment::Entity::find_by_id(parent_id)
            .one(&state.db)
            .await?
            .filter(|p| p.task_id == task.id)
            .ok_or_else(|| AppError::NotFound("Parent comment not found".into()))?;

        // Threads are strictly one level deep.
        if parent.parent_id.is_some() {
            return Err(AppError::Validation(
                "Cannot reply to a reply; threads are one level deep".into(),
            ));
        }
    }

    let now = chrono::Utc::now();
    let new_comment = comment::ActiveModel {
        content: Set(payload.content.trim().to_string()),
        task_id: Set(task.id),
        author_id: Set(auth_user.user_id),
        parent_id: Set(payload.parent_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let created = new_comment.insert(&state.db).await?;

    let users = load_user_refs(&state.db, [created.author_id]).await?;
    let author = users.get(&created.author_id).cloned();

    Ok((
        StatusCode::CREATED,
        Json(CommentResponse::from_model(created, author, Vec::new())),
    ))
}

#[utoipa::path(
    put,
    path = "/api/v1/comments/{id}",
    tag = "Comments",
    params(("id" = i32, Path, description = "Comment ID")),
    request_body = UpdateCommentRequest,
    responses(
        (status = 200, description = "Comment updated", body = CommentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the author (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Comment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn update_comment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateCommentRequest>,
) -> Result<Json<CommentResponse>, AppError> {
    validate_comment_content(&payload.content)?;

    // Mutation is author-only, unlike the workspace-ownership gate used
    // everywhere else. A visible comment by another author is Forbidden,
    // not NotFound.
    let comment = comment::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".into()))?;
    if comment.author_id != auth_user.user_id {
        return Err(AppError::PermissionDenied);
    }

    let mut active: comment::ActiveModel = comment.into();
    active.content = Set(payload.content.trim().to_string());
    active.updated_at = Set(chrono::Utc::now());
    let updated = active.update(&state.db).await?;

    let users = load_user_refs(&state.db, [updated.author_id]).await?;
    let author = users.get(&updated.author_id).cloned();

    Ok(Json(CommentResponse::from_model(updated, author, Vec::new())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/comments/{id}",
    tag = "Comments",
    params(("id" = i32, Path, description = "Comment ID")),
    responses(
        (status = 204, description = "Comment and its direct replies deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the author (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Comment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn delete_comment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let comment = comment::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".into()))?;
    if comment.author_id != auth_user.user_id {
        return Err(AppError::PermissionDenied);
    }

    // One level of cascade: direct replies only.
    comment::Entity::delete_many()
        .filter(comment::Column::ParentId.eq(comment.id))
        .exec(&state.db)
        .await?;
    comment::Entity::delete_by_id(comment.id)
        .exec(&state.db)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
