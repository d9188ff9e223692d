use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use tracing::info;

use crate::entity::user;
use crate::utils::hash;

/// Demo identities created when `seed.demo_users` is enabled.
const DEMO_USERS: &[(&str, &str)] = &[
    ("user1", "Demo User One"),
    ("user2", "Demo User Two"),
    ("user3", "Demo User Three"),
];

const DEMO_PASSWORD: &str = "pass123";

/// Seed the demo users. Idempotent across restarts.
pub async fn seed_demo_users(db: &DatabaseConnection) -> anyhow::Result<()> {
    let mut inserted = 0u32;

    for &(username, display_name) in DEMO_USERS {
        let password_hash = hash::hash_password(DEMO_PASSWORD)
            .map_err(|e| anyhow::anyhow!("Password hash error: {e}"))?;

        let model = user::ActiveModel {
            username: Set(username.to_string()),
            password: Set(password_hash),
            display_name: Set(display_name.to_string()),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        };

        let result = user::Entity::insert(model)
            .on_conflict(
                OnConflict::column(user::Column::Username)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await;

        match result {
            Ok(n) if n > 0 => inserted += 1,
            Ok(_) => {}
            Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e.into()),
        }
    }

    info!("Seeded {inserted} demo user(s)");
    Ok(())
}
