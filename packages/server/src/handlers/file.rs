use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use axum::{Json, body::Body};
use common::storage::{ArtifactStore, BoxReader, StorageKey};
use sea_orm::sea_query::Condition;
use sea_orm::*;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{file, task};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::file::{FileListQuery, FileResponse, UpdateFileRequest};
use crate::models::shared::{load_user_refs, tags_to_json};
use crate::state::AppState;
use crate::utils::filename::{content_disposition_value, validate_upload_filename};
use crate::utils::ownership::{
    find_owned_file, find_owned_task, find_owned_workspace, owned_workspace_ids,
};

pub fn file_upload_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(128 * 1024 * 1024) // 128 MB
}

#[utoipa::path(
    get,
    path = "/api/v1/files",
    tag = "Files",
    params(FileListQuery),
    responses(
        (status = 200, description = "Files visible to the caller", body = [FileResponse]),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Filtered parent not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = auth_user.user_id))]
pub async fn list_files(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<FileListQuery>,
) -> Result<Json<Vec<FileResponse>>, AppError> {
    let mut find = file::Entity::find();

    match (query.workspace_id, query.task_id) {
        (Some(workspace_id), task_id) => {
            find_owned_workspace(&state.db, auth_user.user_id, workspace_id).await?;
            find = find.filter(file::Column::WorkspaceId.eq(workspace_id));
            if let Some(task_id) = task_id {
                find_owned_task(&state.db, auth_user.user_id, task_id).await?;
                find = find.filter(file::Column::TaskId.eq(task_id));
            }
        }
        (None, Some(task_id)) => {
            find_owned_task(&state.db, auth_user.user_id, task_id).await?;
            find = find.filter(file::Column::TaskId.eq(task_id));
        }
        (None, None) => {
            // Unfiltered: everything resolving to an owned workspace,
            // directly or through a task.
            let workspace_ids = owned_workspace_ids(&state.db, auth_user.user_id).await?;
            let task_ids: Vec<i32> = task::Entity::find()
                .filter(task::Column::WorkspaceId.is_in(workspace_ids.clone()))
                .select_only()
                .column(task::Column::Id)
                .into_tuple::<i32>()
                .all(&state.db)
                .await?;
            find = find.filter(
                Condition::any()
                    .add(file::Column::WorkspaceId.is_in(workspace_ids))
                    .add(file::Column::TaskId.is_in(task_ids)),
            );
        }
    }

    let files = find
        .order_by_desc(file::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let users = load_user_refs(&state.db, files.iter().map(|f| f.uploaded_by_id)).await?;
    let responses = files
        .into_iter()
        .map(|f| {
            let uploader = users.get(&f.uploaded_by_id).cloned();
            FileResponse::from_model(f, uploader)
        })
        .collect();

    Ok(Json(responses))
}

#[utoipa::path(
    get,
    path = "/api/v1/files/{id}",
    tag = "Files",
    params(("id" = i32, Path, description = "File ID")),
    responses(
        (status = 200, description = "File metadata", body = FileResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found or not owned (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn get_file(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<FileResponse>, AppError> {
    let file = find_owned_file(&state.db, auth_user.user_id, id).await?;

    let users = load_user_refs(&state.db, [file.uploaded_by_id]).await?;
    let uploader = users.get(&file.uploaded_by_id).cloned();

    Ok(Json(FileResponse::from_model(file, uploader)))
}

#[utoipa::path(
    post,
    path = "/api/v1/files/upload",
    tag = "Files",
    request_body(content_type = "multipart/form-data",
        description = "A `file` field plus optional `workspace_id`, `task_id`, and `tags` fields"),
    responses(
        (status = 201, description = "File uploaded", body = FileResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Parent not found or not owned (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(user_id = auth_user.user_id))]
pub async fn upload_file(
    auth_user: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<FileResponse>), AppError> {
    let mut stored: Option<(StorageKey, i64)> = None;
    let mut file_name: Option<String> = None;
    let mut content_type: Option<String> = None;
    let mut workspace_id: Option<i32> = None;
    let mut task_id: Option<i32> = None;
    let mut tags: Option<Vec<String>> = None;

    // The artifact is written while the body is still being parsed, so any
    // failure from here on must delete it before returning.
    let parse_result: Result<(), AppError> = async {
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
        {
            match field.name() {
                Some("file") => {
                    // A second file part would orphan the already-stored
                    // artifact's key, so it is rejected outright.
                    if stored.is_some() {
                        return Err(AppError::Validation(
                            "Request may contain only one 'file' field".into(),
                        ));
                    }
                    file_name = field.file_name().map(|s| s.to_string());
                    content_type = field.content_type().map(|s| s.to_string());
                    stored = Some(
                        stream_field_to_store(
                            field,
                            &*state.store,
                            state.config.storage.max_artifact_size,
                        )
                        .await?,
                    );
                }
                Some("workspace_id") => {
                    workspace_id = Some(parse_id_field(field, "workspace_id").await?);
                }
                Some("task_id") => {
                    task_id = Some(parse_id_field(field, "task_id").await?);
                }
                Some("tags") => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| AppError::Validation(format!("Failed to read tags: {e}")))?;
                    tags = Some(parse_tags(&text));
                }
                _ => {} // Ignore unknown fields.
            }
        }
        Ok(())
    }
    .await;

    let outcome = async {
        parse_result?;

        let (storage_key, size) =
            stored.ok_or_else(|| AppError::Validation("Missing 'file' field".into()))?;

        persist_file_row(
            &state,
            &auth_user,
            storage_key,
            size,
            file_name,
            content_type,
            workspace_id,
            task_id,
            tags,
        )
        .await
    }
    .await;

    match outcome {
        Ok(response) => Ok((StatusCode::CREATED, Json(response))),
        Err(err) => {
            // Compensating cleanup: a rejected upload leaves no artifact.
            // Delete is idempotent, so this is safe whether or not the
            // failure happened before the metadata write.
            if let Some((storage_key, _)) = stored
                && let Err(e) = state.store.delete(&storage_key).await
            {
                tracing::warn!("Failed to clean up artifact {storage_key}: {e}");
            }
            Err(err)
        }
    }
}

async fn persist_file_row(
    state: &AppState,
    auth_user: &AuthUser,
    storage_key: StorageKey,
    size: i64,
    file_name: Option<String>,
    content_type: Option<String>,
    workspace_id: Option<i32>,
    task_id: Option<i32>,
    tags: Option<Vec<String>>,
) -> Result<FileResponse, AppError> {
    let filename =
        file_name.ok_or_else(|| AppError::Validation("File field must have a filename".into()))?;
    let filename = validate_upload_filename(&filename)
        .map_err(|e| AppError::Validation(e.message().into()))?
        .to_string();

    if workspace_id.is_none() && task_id.is_none() {
        return Err(AppError::Validation(
            "At least one of workspace_id or task_id is required".into(),
        ));
    }

    // Ownership is proven before any metadata write; the artifact already
    // exists and is cleaned up by the caller on failure.
    if let Some(workspace_id) = workspace_id {
        find_owned_workspace(&state.db, auth_user.user_id, workspace_id).await?;
    }
    if let Some(task_id) = task_id {
        let task = find_owned_task(&state.db, auth_user.user_id, task_id).await?;
        // When both parents are named they must agree, or the row would
        // resolve to two different workspaces.
        if let Some(workspace_id) = workspace_id
            && task.workspace_id != workspace_id
        {
            return Err(AppError::Validation(
                "task_id does not belong to the given workspace_id".into(),
            ));
        }
    }

    let mimetype = content_type
        .filter(|c| !c.is_empty())
        .or_else(|| {
            mime_guess::from_path(&filename)
                .first()
                .map(|m| m.to_string())
        })
        .unwrap_or_else(|| "application/octet-stream".to_string());

    let new_file = file::ActiveModel {
        storage_key: Set(storage_key.to_string()),
        original_name: Set(filename),
        mimetype: Set(mimetype),
        size: Set(size),
        path: Set(String::new()),
        workspace_id: Set(workspace_id),
        task_id: Set(task_id),
        uploaded_by_id: Set(auth_user.user_id),
        tags: Set(tags_to_json(tags)),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let created = new_file.insert(&state.db).await?;

    // The download URL needs the row id, so it is filled in after insert.
    let file_id = created.id;
    let mut active: file::ActiveModel = created.into();
    active.path = Set(format!("/api/v1/files/{file_id}/download"));
    let created = active.update(&state.db).await?;

    let users = load_user_refs(&state.db, [created.uploaded_by_id]).await?;
    let uploader = users.get(&created.uploaded_by_id).cloned();

    Ok(FileResponse::from_model(created, uploader))
}

#[utoipa::path(
    get,
    path = "/api/v1/files/{id}/download",
    tag = "Files",
    params(("id" = i32, Path, description = "File ID")),
    responses(
        (status = 200, description = "File content"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found or not owned (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Artifact missing from storage (STORAGE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn download_file(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let file = find_owned_file(&state.db, auth_user.user_id, id).await?;

    // An authorized row whose artifact is gone is a storage-layer fault,
    // reported distinctly from the NOT_FOUND used for authorization.
    let storage_key = StorageKey::parse(&file.storage_key)?;
    let reader = state.store.get_stream(&storage_key).await?;
    let body = Body::from_stream(ReaderStream::new(reader));

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, &file.mimetype)
        .header(header::CONTENT_LENGTH, file.size.to_string())
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_value(&file.original_name),
        )
        .body(body)
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))?;

    Ok(response)
}

#[utoipa::path(
    patch,
    path = "/api/v1/files/{id}",
    tag = "Files",
    params(("id" = i32, Path, description = "File ID")),
    request_body = UpdateFileRequest,
    responses(
        (status = 200, description = "Metadata updated", body = FileResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found or not owned (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn update_file(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateFileRequest>,
) -> Result<Json<FileResponse>, AppError> {
    let file = find_owned_file(&state.db, auth_user.user_id, id).await?;

    // Metadata only; the artifact is never touched here.
    let mut active: file::ActiveModel = file.into();
    if let Some(tags) = payload.tags {
        active.tags = Set(tags_to_json(Some(tags)));
    }
    if let Some(original_name) = payload.original_name {
        let original_name = validate_upload_filename(&original_name)
            .map_err(|e| AppError::Validation(e.message().into()))?
            .to_string();
        active.original_name = Set(original_name);
    }
    let updated = active.update(&state.db).await?;

    let users = load_user_refs(&state.db, [updated.uploaded_by_id]).await?;
    let uploader = users.get(&updated.uploaded_by_id).cloned();

    Ok(Json(FileResponse::from_model(updated, uploader)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/files/{id}",
    tag = "Files",
    params(("id" = i32, Path, description = "File ID")),
    responses(
        (status = 204, description = "File and artifact deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found or not owned (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn delete_file(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let file = find_owned_file(&state.db, auth_user.user_id, id).await?;

    // Artifact first, then the row: a metadata row must never outlive its
    // artifact. A missing artifact here is not an error.
    let storage_key = StorageKey::parse(&file.storage_key)?;
    state.store.delete(&storage_key).await?;

    file::Entity::delete_by_id(file.id).exec(&state.db).await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn parse_id_field(
    field: axum::extract::multipart::Field<'_>,
    name: &str,
) -> Result<i32, AppError> {
    let text = field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read {name}: {e}")))?;
    text.trim()
        .parse()
        .map_err(|_| AppError::Validation(format!("{name} must be an integer")))
}

/// Tags arrive either as a JSON array string or as a comma-separated list.
fn parse_tags(text: &str) -> Vec<String> {
    if let Ok(tags) = serde_json::from_str::<Vec<String>>(text) {
        return tags;
    }
    text.split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Stream a multipart field to artifact storage via a temp file.
async fn stream_field_to_store(
    mut field: axum::extract::multipart::Field<'_>,
    store: &dyn ArtifactStore,
    max_size: u64,
) -> Result<(StorageKey, i64), AppError> {
    let temp_path = std::env::temp_dir().join(format!("larkhub-upload-{}", Uuid::new_v4()));

    let result = async {
        let mut temp_file = tokio::fs::File::create(&temp_path)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create temp file: {e}")))?;

        let mut total_size: u64 = 0;

        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::Validation(format!("Upload read error: {e}")))?
        {
            total_size += chunk.len() as u64;
            if total_size > max_size {
                return Err(AppError::Validation(format!(
                    "File exceeds maximum size of {max_size} bytes"
                )));
            }
            temp_file
                .write_all(&chunk)
                .await
                .map_err(|e| AppError::Internal(format!("Temp file write failed: {e}")))?;
        }

        temp_file
            .flush()
            .await
            .map_err(|e| AppError::Internal(format!("Temp file flush failed: {e}")))?;
        drop(temp_file);

        let file = tokio::fs::File::open(&temp_path)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to reopen temp file: {e}")))?;
        let reader: BoxReader = Box::new(file);
        let key = store.put_stream(reader).await?;

        Ok((key, i64::try_from(total_size).unwrap_or(i64::MAX)))
    }
    .await;

    // Best effort.
    let _ = tokio::fs::remove_file(&temp_path).await;

    result
}
