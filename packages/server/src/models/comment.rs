use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::comment;
use crate::error::AppError;

use super::shared::UserRef;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateCommentRequest {
    pub content: String,
    pub task_id: i32,
    /// When present, the new comment is a reply to this top-level comment.
    pub parent_id: Option<i32>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateCommentRequest {
    pub content: String,
}

pub fn validate_comment_content(content: &str) -> Result<(), AppError> {
    if content.trim().is_empty() {
        return Err(AppError::Validation("Comment content is required".into()));
    }
    Ok(())
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct CommentListQuery {
    pub task_id: i32,
}

/// A comment with its author projection and, for top-level comments, one
/// level of eagerly loaded replies.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CommentResponse {
    pub id: i32,
    pub content: String,
    pub task_id: i32,
    pub parent_id: Option<i32>,
    pub author: Option<UserRef>,
    pub replies: Vec<CommentResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CommentResponse {
    pub fn from_model(
        m: comment::Model,
        author: Option<UserRef>,
        replies: Vec<CommentResponse>,
    ) -> Self {
        Self {
            id: m.id,
            content: m.content,
            task_id: m.task_id,
            parent_id: m.parent_id,
            author,
            replies,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
