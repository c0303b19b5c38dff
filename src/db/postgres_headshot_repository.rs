use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db::headshot_repository::HeadshotRepository,
    models::headshot::{Headshot, NewHeadshot},
};

pub struct PostgresHeadshotRepository {
    pub pool: PgPool,
}

#[async_trait]
impl HeadshotRepository for PostgresHeadshotRepository {
    async fn insert_headshot(&self, new: &NewHeadshot) -> Result<Headshot, sqlx::Error> {
        sqlx::query_as::<_, Headshot>(
            r#"
            INSERT INTO headshots (user_id, image_url, style)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, image_url, style, created_at
            "#,
        )
        .bind(new.user_id)
        .bind(&new.image_url)
        .bind(&new.style)
        .fetch_one(&self.pool)
        .await
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Headshot>, sqlx::Error> {
        sqlx::query_as::<_, Headshot>(
            r#"
            SELECT id, user_id, image_url, style, created_at
            FROM headshots
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn count_for_user(&self, user_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM headshots WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
    }

    async fn delete_for_user(&self, headshot_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM headshots WHERE id = $1 AND user_id = $2")
            .bind(headshot_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
