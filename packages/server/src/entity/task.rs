use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Allowed task statuses.
pub const STATUSES: &[&str] = &["open", "in_progress", "completed", "cancelled"];

/// Allowed task priorities.
pub const PRIORITIES: &[&str] = &["low", "medium", "high", "urgent"];

pub const DEFAULT_STATUS: &str = "open";
pub const DEFAULT_PRIORITY: &str = "medium";

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "task")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,
    pub description: Option<String>,
    /// One of: open, in_progress, completed, cancelled
    pub status: String,
    /// One of: low, medium, high, urgent
    pub priority: String,
    pub due_date: Option<DateTimeUtc>,

    pub workspace_id: i32,
    #[sea_orm(belongs_to, from = "workspace_id", to = "id")]
    pub workspace: HasOne<super::workspace::Entity>,

    pub created_by_id: i32,
    #[sea_orm(belongs_to, from = "created_by_id", to = "id", relation_enum = "Creator")]
    pub creator: HasOne<super::user::Entity>,

    pub assigned_to_id: Option<i32>,
    #[sea_orm(belongs_to, from = "assigned_to_id", to = "id", relation_enum = "Assignee")]
    pub assignee: Option<super::user::Entity>,

    #[sea_orm(has_many)]
    pub comments: HasMany<super::comment::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
