use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Condition, Func, LikeExpr};
use sea_orm::*;
use tracing::instrument;

use crate::entity::document;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::document::{
    CreateDocumentRequest, DocumentListQuery, DocumentResponse, UpdateDocumentRequest,
    validate_create_document, validate_update_document,
};
use crate::models::shared::{escape_like, load_user_refs, tags_to_json};
use crate::state::AppState;
use crate::utils::ownership::{find_owned_document, find_owned_workspace};

async fn to_responses(
    db: &DatabaseConnection,
    documents: Vec<document::Model>,
) -> Result<Vec<DocumentResponse>, AppError> {
    let user_ids = documents
        .iter()
        .map(|d| d.created_by_id)
        .chain(documents.iter().filter_map(|d| d.last_modified_by_id));
    let users = load_user_refs(db, user_ids).await?;

    Ok(documents
        .into_iter()
        .map(|d| {
            let creator = users.get(&d.created_by_id).cloned();
            let last_modifier = d.last_modified_by_id.and_then(|id| users.get(&id).cloned());
            DocumentResponse::from_model(d, creator, last_modifier)
        })
        .collect())
}

#[utoipa::path(
    get,
    path = "/api/v1/documents",
    tag = "Documents",
    params(DocumentListQuery),
    responses(
        (status = 200, description = "Documents in the workspace", body = [DocumentResponse]),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Workspace not found or not owned (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = auth_user.user_id))]
pub async fn list_documents(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<DocumentListQuery>,
) -> Result<Json<Vec<DocumentResponse>>, AppError> {
    let workspace = find_owned_workspace(&state.db, auth_user.user_id, query.workspace_id).await?;

    let documents = document::Entity::find()
        .filter(document::Column::WorkspaceId.eq(workspace.id))
        .order_by_desc(document::Column::UpdatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(to_responses(&state.db, documents).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/documents/{id}",
    tag = "Documents",
    params(("id" = i32, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Document", body = DocumentResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found or not owned (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn get_document(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<DocumentResponse>, AppError> {
    let document = find_owned_document(&state.db, auth_user.user_id, id).await?;

    let user_ids = std::iter::once(document.created_by_id).chain(document.last_modified_by_id);
    let users = load_user_refs(&state.db, user_ids).await?;
    let creator = users.get(&document.created_by_id).cloned();
    let last_modifier = document
        .last_modified_by_id
        .and_then(|id| users.get(&id).cloned());

    Ok(Json(DocumentResponse::from_model(
        document,
        creator,
        last_modifier,
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/documents",
    tag = "Documents",
    request_body = CreateDocumentRequest,
    responses(
        (status = 201, description = "Document created at version 1", body = DocumentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Workspace not found or not owned (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn create_document(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateDocumentRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_document(&payload)?;

    let workspace = find_owned_workspace(&state.db, auth_user.user_id, payload.workspace_id).await?;

    let now = chrono::Utc::now();
    let new_document = document::ActiveModel {
        title: Set(payload.title.trim().to_string()),
        content: Set(payload.content.unwrap_or_default()),
        workspace_id: Set(workspace.id),
        created_by_id: Set(auth_user.user_id),
        last_modified_by_id: Set(None),
        version: Set(1),
        tags: Set(tags_to_json(payload.tags)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let created = new_document.insert(&state.db).await?;

    let users = load_user_refs(&state.db, [created.created_by_id]).await?;
    let creator = users.get(&created.created_by_id).cloned();

    Ok((
        StatusCode::CREATED,
        Json(DocumentResponse::from_model(created, creator, None)),
    ))
}

#[utoipa::path(
    put,
    path = "/api/v1/documents/{id}",
    tag = "Documents",
    params(("id" = i32, Path, description = "Document ID")),
    request_body = UpdateDocumentRequest,
    responses(
        (status = 200, description = "Document updated, version bumped", body = DocumentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found or not owned (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Version mismatch (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn update_document(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateDocumentRequest>,
) -> Result<Json<DocumentResponse>, AppError> {
    validate_update_document(&payload)?;

    let document = find_owned_document(&state.db, auth_user.user_id, id).await?;

    // Last-writer-wins unless optimistic locking is switched on.
    if state.config.documents.optimistic_locking
        && let Some(expected) = payload.expected_version
        && expected != document.version
    {
        return Err(AppError::Conflict(format!(
            "Document is at version {}, expected {expected}",
            document.version
        )));
    }

    let next_version = document.version + 1;
    let mut active: document::ActiveModel = document.into();
    if let Some(title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(content) = payload.content {
        active.content = Set(content);
    }
    if let Some(tags) = payload.tags {
        active.tags = Set(tags_to_json(Some(tags)));
    }
    active.last_modified_by_id = Set(Some(auth_user.user_id));
    active.version = Set(next_version);
    active.updated_at = Set(chrono::Utc::now());
    let updated = active.update(&state.db).await?;

    let user_ids = std::iter::once(updated.created_by_id).chain(updated.last_modified_by_id);
    let users = load_user_refs(&state.db, user_ids).await?;
    let creator = users.get(&updated.created_by_id).cloned();
    let last_modifier = updated
        .last_modified_by_id
        .and_then(|id| users.get(&id).cloned());

    Ok(Json(DocumentResponse::from_model(
        updated,
        creator,
        last_modifier,
    )))
}

#[utoipa::path(
    delete,
    path = "/api/v1/documents/{id}",
    tag = "Documents",
    params(("id" = i32, Path, description = "Document ID")),
    responses(
        (status = 204, description = "Document deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found or not owned (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn delete_document(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let document = find_owned_document(&state.db, auth_user.user_id, id).await?;

    document::Entity::delete_by_id(document.id)
        .exec(&state.db)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v1/documents/search/{query}",
    tag = "Documents",
    params(
        ("query" = String, Path, description = "Search term"),
        DocumentListQuery,
    ),
    responses(
        (status = 200, description = "Matching documents", body = [DocumentResponse]),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Workspace not found or not owned (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, list_query), fields(user_id = auth_user.user_id))]
pub async fn search_documents(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(search): Path<String>,
    Query(list_query): Query<DocumentListQuery>,
) -> Result<Json<Vec<DocumentResponse>>, AppError> {
    let workspace =
        find_owned_workspace(&state.db, auth_user.user_id, list_query.workspace_id).await?;

    let term = escape_like(search.trim()).to_lowercase();
    let pattern = format!("%{term}%");

    let documents = document::Entity::find()
        .filter(document::Column::WorkspaceId.eq(workspace.id))
        .filter(
            Condition::any()
                .add(
                    Expr::expr(Func::lower(Expr::col(document::Column::Title)))
                        .like(LikeExpr::new(pattern.clone()).escape('\\')),
                )
                .add(
                    Expr::expr(Func::lower(Expr::col(document::Column::Content)))
                        .like(LikeExpr::new(pattern).escape('\\')),
                ),
        )
        .order_by_desc(document::Column::UpdatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(to_responses(&state.db, documents).await?))
}
