use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db::user_repository::UserRepository,
    models::user::{ProfileUpsert, User},
};

pub struct PostgresUserRepository {
    pub pool: PgPool,
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn upsert_profile(&self, profile: &ProfileUpsert) -> Result<(), sqlx::Error> {
        // `name` mirrors `full_name`; neither is cleared when the provider omits it.
        sqlx::query(
            r#"
            INSERT INTO users (id, email, name, full_name, created_at, updated_at)
            VALUES ($1, $2, $3, $3, now(), now())
            ON CONFLICT (id) DO UPDATE
            SET email = EXCLUDED.email,
                name = COALESCE(EXCLUDED.name, users.name),
                full_name = COALESCE(EXCLUDED.full_name, users.full_name),
                updated_at = now()
            "#,
        )
        .bind(profile.id)
        .bind(profile.email.as_deref())
        .bind(profile.full_name.as_deref())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, full_name, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }
}
