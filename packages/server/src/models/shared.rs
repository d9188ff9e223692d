use std::collections::HashMap;

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Deserializer, Serialize};

use crate::entity::user;
use crate::error::AppError;

/// Public projection of a user: display identifiers only, never
/// credential material.
#[derive(Serialize, Clone, utoipa::ToSchema)]
pub struct UserRef {
    pub id: i32,
    pub username: String,
    pub display_name: String,
}

impl From<user::Model> for UserRef {
    fn from(m: user::Model) -> Self {
        Self {
            id: m.id,
            username: m.username,
            display_name: m.display_name,
        }
    }
}

/// Load projections for a set of user IDs in one query.
pub async fn load_user_refs<C: sea_orm::ConnectionTrait>(
    db: &C,
    ids: impl IntoIterator<Item = i32>,
) -> Result<HashMap<i32, UserRef>, AppError> {
    let mut ids: Vec<i32> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();

    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let users = user::Entity::find()
        .filter(user::Column::Id.is_in(ids))
        .all(db)
        .await?;

    Ok(users.into_iter().map(|u| (u.id, UserRef::from(u))).collect())
}

/// Escape LIKE wildcard characters in a search string.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Serde helper for PATCH semantics on nullable fields.
///
/// * JSON field absent  => `None`          (don't update)
/// * JSON field = null  => `Some(None)`    (set to NULL)
/// * JSON field = value => `Some(Some(v))` (set to value)
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

/// Validate a trimmed title-like field (1-255 Unicode characters).
pub fn validate_title(title: &str, name: &str) -> Result<(), AppError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > 255 {
        return Err(AppError::Validation(format!(
            "{name} must be 1-255 characters"
        )));
    }
    Ok(())
}

/// Convert an optional tag list into its stored JSON form.
pub fn tags_to_json(tags: Option<Vec<String>>) -> serde_json::Value {
    serde_json::Value::Array(
        tags.unwrap_or_default()
            .into_iter()
            .map(serde_json::Value::String)
            .collect(),
    )
}
