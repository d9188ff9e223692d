use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::file;

use super::shared::UserRef;

/// Optional equality filters for the file list.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct FileListQuery {
    pub workspace_id: Option<i32>,
    pub task_id: Option<i32>,
}

#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct UpdateFileRequest {
    /// Replaces the whole tag list when present.
    pub tags: Option<Vec<String>>,
    pub original_name: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct FileResponse {
    pub id: i32,
    pub original_name: String,
    pub mimetype: String,
    pub size: i64,
    /// Path to stream the artifact from.
    pub path: String,
    pub workspace_id: Option<i32>,
    pub task_id: Option<i32>,
    pub uploader: Option<UserRef>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl FileResponse {
    pub fn from_model(m: file::Model, uploader: Option<UserRef>) -> Self {
        let tags = m
            .tags
            .as_array()
            .map(|a| {
                a.iter()
                    .filter_map(|v| v.as_str().map(str::to_owned))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            id: m.id,
            original_name: m.original_name,
            mimetype: m.mimetype,
            size: m.size,
            path: m.path,
            workspace_id: m.workspace_id,
            task_id: m.task_id,
            uploader,
            tags,
            created_at: m.created_at,
        }
    }
}
