use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::document;
use crate::error::AppError;

use super::shared::{UserRef, validate_title};

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateDocumentRequest {
    pub title: String,
    pub content: Option<String>,
    pub workspace_id: i32,
    pub tags: Option<Vec<String>>,
}

pub fn validate_create_document(payload: &CreateDocumentRequest) -> Result<(), AppError> {
    validate_title(&payload.title, "Title")
}

#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct UpdateDocumentRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    /// Only honored when optimistic locking is enabled in configuration;
    /// the update conflicts if the stored version differs.
    pub expected_version: Option<i32>,
}

pub fn validate_update_document(payload: &UpdateDocumentRequest) -> Result<(), AppError> {
    if let Some(ref title) = payload.title {
        validate_title(title, "Title")?;
    }
    Ok(())
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct DocumentListQuery {
    pub workspace_id: i32,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct DocumentResponse {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub workspace_id: i32,
    pub version: i32,
    pub tags: Vec<String>,
    pub creator: Option<UserRef>,
    pub last_modifier: Option<UserRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DocumentResponse {
    pub fn from_model(
        m: document::Model,
        creator: Option<UserRef>,
        last_modifier: Option<UserRef>,
    ) -> Self {
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
            title: m.title,
            content: m.content,
            workspace_id: m.workspace_id,
            version: m.version,
            tags,
            creator,
            last_modifier,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
