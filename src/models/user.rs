use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, FromRow, Serialize, Deserialize, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub email: Option<String>,
    pub name: Option<String>,
    pub full_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile fields refreshed on every successful sign-in. `full_name` is only
/// written when the auth provider supplied one.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileUpsert {
    pub id: Uuid,
    pub email: Option<String>,
    pub full_name: Option<String>,
}
