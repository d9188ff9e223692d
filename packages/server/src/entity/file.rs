use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "file")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Opaque key of the durable artifact backing this row. The artifact
    /// must exist for the lifetime of the row.
    pub storage_key: String,
    pub original_name: String,
    pub mimetype: String,
    pub size: i64,
    /// Download path served to clients.
    pub path: String,

    /// At least one of `workspace_id` / `task_id` is always set, so the
    /// row resolves to exactly one owning workspace.
    pub workspace_id: Option<i32>,
    #[sea_orm(belongs_to, from = "workspace_id", to = "id")]
    pub workspace: Option<super::workspace::Entity>,

    pub task_id: Option<i32>,
    #[sea_orm(belongs_to, from = "task_id", to = "id")]
    pub task: Option<super::task::Entity>,

    pub uploaded_by_id: i32,
    #[sea_orm(belongs_to, from = "uploaded_by_id", to = "id")]
    pub uploader: HasOne<super::user::Entity>,

    /// JSON array of string tags.
    #[sea_orm(column_type = "Json")]
    pub tags: Json,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
