//! Profile repository for database operations

use anyhow::Result;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

/// Profile record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProfileRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub full_name: String,
}

/// Profile repository for database operations
pub struct ProfileRepository;

impl ProfileRepository {
    /// Insert the profile row for a user
    ///
    /// Takes any executor so it can run inside the user-creation transaction.
    pub async fn create<'e, E>(executor: E, user_id: Uuid, full_name: &str) -> Result<ProfileRecord>
    where
        E: PgExecutor<'e>,
    {
        let profile = sqlx::query_as::<_, ProfileRecord>(
            r#"
            INSERT INTO profiles (user_id, full_name)
            VALUES ($1, $2)
            RETURNING id, user_id, full_name
            "#,
        )
        .bind(user_id)
        .bind(full_name)
        .fetch_one(executor)
        .await?;

        Ok(profile)
    }

    /// Find the profile belonging to a user
    pub async fn find_by_user_id(pool: &PgPool, user_id: Uuid) -> Result<Option<ProfileRecord>> {
        let profile = sqlx::query_as::<_, ProfileRecord>(
            r#"
            SELECT id, user_id, full_name
            FROM profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(profile)
    }
}
