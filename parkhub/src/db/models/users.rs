//! Record structs for the users table.

use crate::types::UserId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Fields for inserting a credential row
#[derive(Debug, Clone)]
pub struct UserCreateDBRequest {
    pub username: String,
    pub password_hash: String,
}

/// A stored credential row
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserDBResponse {
    pub id: UserId,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}
