use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "document")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,

    pub workspace_id: i32,
    #[sea_orm(belongs_to, from = "workspace_id", to = "id")]
    pub workspace: HasOne<super::workspace::Entity>,

    pub created_by_id: i32,
    #[sea_orm(belongs_to, from = "created_by_id", to = "id", relation_enum = "Creator")]
    pub creator: HasOne<super::user::Entity>,

    pub last_modified_by_id: Option<i32>,
    #[sea_orm(belongs_to, from = "last_modified_by_id", to = "id", relation_enum = "LastModifier")]
    pub last_modifier: Option<super::user::Entity>,

    /// Starts at 1 and increments by exactly 1 on every content-affecting
    /// update.
    pub version: i32,

    /// JSON array of string tags.
    #[sea_orm(column_type = "Json")]
    pub tags: Json,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
