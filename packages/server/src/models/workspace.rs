use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::workspace;
use crate::error::AppError;

use super::shared::{UserRef, validate_title};

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateWorkspaceRequest {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
}

pub fn validate_create_workspace(payload: &CreateWorkspaceRequest) -> Result<(), AppError> {
    validate_title(&payload.name, "Name")
}

#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct UpdateWorkspaceRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub is_active: Option<bool>,
}

pub fn validate_update_workspace(payload: &UpdateWorkspaceRequest) -> Result<(), AppError> {
    if let Some(ref name) = payload.name {
        validate_title(name, "Name")?;
    }
    Ok(())
}

/// Compact reference to a workspace for nesting inside other responses.
#[derive(Serialize, Clone, utoipa::ToSchema)]
pub struct WorkspaceRef {
    pub id: i32,
    pub name: String,
    pub color: String,
}

impl From<&workspace::Model> for WorkspaceRef {
    fn from(m: &workspace::Model) -> Self {
        Self {
            id: m.id,
            name: m.name.clone(),
            color: m.color.clone(),
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct WorkspaceResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub is_active: bool,
    pub owner: Option<UserRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkspaceResponse {
    pub fn from_model(m: workspace::Model, owner: Option<UserRef>) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            color: m.color,
            is_active: m.is_active,
            owner,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Workspace with its nested tasks and files, as returned by the
/// single-workspace endpoint.
#[derive(Serialize, utoipa::ToSchema)]
pub struct WorkspaceDetailResponse {
    #[serde(flatten)]
    pub workspace: WorkspaceResponse,
    pub tasks: Vec<super::task::TaskResponse>,
    pub files: Vec<super::file::FileResponse>,
}

/// Read-only derived counters for one workspace. Snapshot only — no
/// caching or invalidation.
#[derive(Serialize, utoipa::ToSchema)]
pub struct WorkspaceStatsResponse {
    pub total_tasks: u64,
    pub open_tasks: u64,
    pub in_progress_tasks: u64,
    pub completed_tasks: u64,
    pub total_files: u64,
    /// `round(completed / total * 100)`, or 0 when there are no tasks.
    pub completion_rate: u64,
}

/// Compact task projection nested in the workspace list.
#[derive(Serialize, utoipa::ToSchema)]
pub struct TaskSummary {
    pub id: i32,
    pub title: String,
    pub status: String,
    pub priority: String,
}

impl From<&crate::entity::task::Model> for TaskSummary {
    fn from(m: &crate::entity::task::Model) -> Self {
        Self {
            id: m.id,
            title: m.title.clone(),
            status: m.status.clone(),
            priority: m.priority.clone(),
        }
    }
}

/// Workspace list entry: the workspace plus summaries of its tasks.
#[derive(Serialize, utoipa::ToSchema)]
pub struct WorkspaceListItem {
    #[serde(flatten)]
    pub workspace: WorkspaceResponse,
    pub tasks: Vec<TaskSummary>,
}
