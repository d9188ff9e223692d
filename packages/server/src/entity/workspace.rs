use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Default accent color assigned to new workspaces.
pub const DEFAULT_COLOR: &str = "#1A6ED8";

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "workspace")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub is_active: bool,

    /// Owner is set at creation and immutable thereafter. Every resource
    /// under this workspace is visible only to this user.
    pub owner_id: i32,
    #[sea_orm(belongs_to, from = "owner_id", to = "id")]
    pub owner: HasOne<super::user::Entity>,

    #[sea_orm(has_many)]
    pub tasks: HasMany<super::task::Entity>,

    #[sea_orm(has_many)]
    pub documents: HasMany<super::document::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
