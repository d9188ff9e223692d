use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::task;
use crate::error::AppError;

use super::shared::{UserRef, double_option, validate_title};
use super::workspace::WorkspaceRef;

fn validate_status(status: &str) -> Result<(), AppError> {
    if task::STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "Status must be one of: {}",
            task::STATUSES.join(", ")
        )))
    }
}

fn validate_priority(priority: &str) -> Result<(), AppError> {
    if task::PRIORITIES.contains(&priority) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "Priority must be one of: {}",
            task::PRIORITIES.join(", ")
        )))
    }
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    pub workspace_id: i32,
    pub assigned_to_id: Option<i32>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
}

pub fn validate_create_task(payload: &CreateTaskRequest) -> Result<(), AppError> {
    validate_title(&payload.title, "Title")?;
    if let Some(ref status) = payload.status {
        validate_status(status)?;
    }
    if let Some(ref priority) = payload.priority {
        validate_priority(priority)?;
    }
    Ok(())
}

#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    pub status: Option<String>,
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<DateTime<Utc>>)]
    pub due_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub assigned_to_id: Option<Option<i32>>,
}

pub fn validate_update_task(payload: &UpdateTaskRequest) -> Result<(), AppError> {
    if let Some(ref title) = payload.title {
        validate_title(title, "Title")?;
    }
    if let Some(ref status) = payload.status {
        validate_status(status)?;
    }
    if let Some(ref priority) = payload.priority {
        validate_priority(priority)?;
    }
    Ok(())
}

/// Optional equality filters for the task list. Absent filters return all
/// tasks visible to the principal.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct TaskListQuery {
    pub workspace_id: Option<i32>,
    pub status: Option<String>,
    pub assigned_to_id: Option<i32>,
    pub priority: Option<String>,
}

pub fn validate_task_list_query(query: &TaskListQuery) -> Result<(), AppError> {
    if let Some(ref status) = query.status {
        validate_status(status)?;
    }
    if let Some(ref priority) = query.priority {
        validate_priority(priority)?;
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TaskResponse {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub due_date: Option<DateTime<Utc>>,
    pub workspace_id: i32,
    pub workspace: Option<WorkspaceRef>,
    pub creator: Option<UserRef>,
    pub assignee: Option<UserRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskResponse {
    pub fn from_model(
        m: task::Model,
        workspace: Option<WorkspaceRef>,
        creator: Option<UserRef>,
        assignee: Option<UserRef>,
    ) -> Self {
        Self {
            id: m.id,
            title: m.title,
            description: m.description,
            status: m.status,
            priority: m.priority,
            due_date: m.due_date,
            workspace_id: m.workspace_id,
            workspace,
            creator,
            assignee,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Task with its files and comment thread, as returned by the single-task
/// endpoint.
#[derive(Serialize, utoipa::ToSchema)]
pub struct TaskDetailResponse {
    #[serde(flatten)]
    pub task: TaskResponse,
    pub files: Vec<super::file::FileResponse>,
    pub comments: Vec<super::comment::CommentResponse>,
}
