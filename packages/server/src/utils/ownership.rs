//! The single choke point for ownership-scoped resource resolution.
//!
//! Every repository operation proves that its target resource belongs,
//! transitively, to a workspace owned by the calling principal. A resource
//! that does not exist and a resource owned by someone else produce the
//! same `NotFound` — callers must not be able to probe for the existence
//! of other users' resources.

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QuerySelect};

use crate::entity::{file, task, workspace};
use crate::error::AppError;

/// Resolve a workspace and prove the principal owns it.
pub async fn find_owned_workspace<C: sea_orm::ConnectionTrait>(
    db: &C,
    principal_id: i32,
    workspace_id: i32,
) -> Result<workspace::Model, AppError> {
    workspace::Entity::find_by_id(workspace_id)
        .one(db)
        .await?
        .filter(|w| w.owner_id == principal_id)
        .ok_or_else(|| AppError::NotFound("Workspace not found".into()))
}

/// Resolve a task through its workspace and prove the principal owns it.
pub async fn find_owned_task<C: sea_orm::ConnectionTrait>(
    db: &C,
    principal_id: i32,
    task_id: i32,
) -> Result<task::Model, AppError> {
    let not_found = || AppError::NotFound("Task not found".into());

    let task = task::Entity::find_by_id(task_id)
        .one(db)
        .await?
        .ok_or_else(not_found)?;

    find_owned_workspace(db, principal_id, task.workspace_id)
        .await
        .map_err(|_| not_found())?;

    Ok(task)
}

/// Resolve a file to its owning workspace (directly, or via its task) and
/// prove the principal owns it.
pub async fn find_owned_file<C: sea_orm::ConnectionTrait>(
    db: &C,
    principal_id: i32,
    file_id: i32,
) -> Result<file::Model, AppError> {
    let not_found = || AppError::NotFound("File not found".into());

    let file = file::Entity::find_by_id(file_id)
        .one(db)
        .await?
        .ok_or_else(not_found)?;

    match (file.workspace_id, file.task_id) {
        (Some(workspace_id), _) => {
            find_owned_workspace(db, principal_id, workspace_id)
                .await
                .map_err(|_| not_found())?;
        }
        (None, Some(task_id)) => {
            find_owned_task(db, principal_id, task_id)
                .await
                .map_err(|_| not_found())?;
        }
        // Unreachable for rows created through the upload path, which
        // requires at least one parent reference.
        (None, None) => return Err(not_found()),
    }

    Ok(file)
}

/// Resolve a document through its workspace and prove the principal owns it.
pub async fn find_owned_document<C: sea_orm::ConnectionTrait>(
    db: &C,
    principal_id: i32,
    document_id: i32,
) -> Result<crate::entity::document::Model, AppError> {
    let not_found = || AppError::NotFound("Document not found".into());

    let document = crate::entity::document::Entity::find_by_id(document_id)
        .one(db)
        .await?
        .ok_or_else(not_found)?;

    find_owned_workspace(db, principal_id, document.workspace_id)
        .await
        .map_err(|_| not_found())?;

    Ok(document)
}

/// IDs of all workspaces owned by the principal, for scoping list queries.
pub async fn owned_workspace_ids<C: sea_orm::ConnectionTrait>(
    db: &C,
    principal_id: i32,
) -> Result<Vec<i32>, AppError> {
    let ids = workspace::Entity::find()
        .filter(workspace::Column::OwnerId.eq(principal_id))
        .select_only()
        .column(workspace::Column::Id)
        .into_tuple::<i32>()
        .all(db)
        .await?;
    Ok(ids)
}
