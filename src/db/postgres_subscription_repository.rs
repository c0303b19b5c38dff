use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db::subscription_repository::SubscriptionRepository,
    models::subscription::{
        CancellationDetails, NewSubscription, Subscription, SubscriptionRefresh,
        SUBSCRIPTION_STATUS_ACTIVE, SUBSCRIPTION_STATUS_CANCELED, SUBSCRIPTION_STATUS_REVOKED,
    },
};

const SUBSCRIPTION_COLUMNS: &str = r#"
    id, polar_id, polar_price_id, user_id, customer_id, status, currency,
    billing_interval, amount, current_period_start, current_period_end,
    cancel_at_period_end, started_at, ended_at, canceled_at,
    customer_cancellation_reason, customer_cancellation_comment,
    metadata, custom_field_data, created_at, updated_at
"#;

pub struct PostgresSubscriptionRepository {
    pub pool: PgPool,
}

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn insert_subscription(&self, new: &NewSubscription) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO subscriptions (
                polar_id, polar_price_id, user_id, customer_id, status, currency,
                billing_interval, amount, current_period_start, current_period_end,
                cancel_at_period_end, started_at, ended_at, canceled_at,
                customer_cancellation_reason, customer_cancellation_comment,
                metadata, custom_field_data
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            ON CONFLICT (polar_id) DO NOTHING
            "#,
        )
        .bind(&new.polar_id)
        .bind(new.polar_price_id.as_deref())
        .bind(new.user_id)
        .bind(new.customer_id.as_deref())
        .bind(&new.status)
        .bind(new.currency.as_deref())
        .bind(new.billing_interval.as_deref())
        .bind(new.amount)
        .bind(new.current_period_start)
        .bind(new.current_period_end)
        .bind(new.cancel_at_period_end)
        .bind(new.started_at)
        .bind(new.ended_at)
        .bind(new.canceled_at)
        .bind(new.customer_cancellation_reason.as_deref())
        .bind(new.customer_cancellation_comment.as_deref())
        .bind(&new.metadata)
        .bind(&new.custom_field_data)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn refresh_subscription(
        &self,
        polar_id: &str,
        refresh: &SubscriptionRefresh,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions
            SET amount = $2,
                status = COALESCE($3, status),
                current_period_start = $4,
                current_period_end = $5,
                cancel_at_period_end = $6,
                metadata = $7,
                custom_field_data = $8,
                updated_at = now()
            WHERE polar_id = $1
            "#,
        )
        .bind(polar_id)
        .bind(refresh.amount)
        .bind(refresh.status.as_deref())
        .bind(refresh.current_period_start)
        .bind(refresh.current_period_end)
        .bind(refresh.cancel_at_period_end)
        .bind(&refresh.metadata)
        .bind(&refresh.custom_field_data)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn mark_active(
        &self,
        polar_id: &str,
        started_at: Option<i64>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions
            SET status = $2,
                started_at = COALESCE($3, started_at),
                updated_at = now()
            WHERE polar_id = $1
            "#,
        )
        .bind(polar_id)
        .bind(SUBSCRIPTION_STATUS_ACTIVE)
        .bind(started_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn mark_canceled(
        &self,
        polar_id: &str,
        details: &CancellationDetails,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions
            SET status = $2,
                canceled_at = $3,
                customer_cancellation_reason = $4,
                customer_cancellation_comment = $5,
                updated_at = now()
            WHERE polar_id = $1
            "#,
        )
        .bind(polar_id)
        .bind(SUBSCRIPTION_STATUS_CANCELED)
        .bind(details.canceled_at)
        .bind(details.reason.as_deref())
        .bind(details.comment.as_deref())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn clear_cancellation(
        &self,
        polar_id: &str,
        status: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions
            SET status = COALESCE($2, status),
                canceled_at = NULL,
                customer_cancellation_reason = NULL,
                customer_cancellation_comment = NULL,
                cancel_at_period_end = false,
                updated_at = now()
            WHERE polar_id = $1
            "#,
        )
        .bind(polar_id)
        .bind(status)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn mark_revoked(
        &self,
        polar_id: &str,
        ended_at: Option<i64>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions
            SET status = $2,
                ended_at = $3,
                updated_at = now()
            WHERE polar_id = $1
            "#,
        )
        .bind(polar_id)
        .bind(SUBSCRIPTION_STATUS_REVOKED)
        .bind(ended_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_active_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<Subscription>, sqlx::Error> {
        let sql = format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions \
             WHERE user_id = $1 AND status = $2 \
             ORDER BY started_at DESC NULLS LAST, created_at DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, Subscription>(&sql)
            .bind(user_id)
            .bind(SUBSCRIPTION_STATUS_ACTIVE)
            .fetch_optional(&self.pool)
            .await
    }
}
