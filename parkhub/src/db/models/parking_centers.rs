//! Record structs for the parking_centers table.

use crate::types::{ParkingCenterId, UserId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Fields for inserting a parking center
#[derive(Debug, Clone)]
pub struct ParkingCenterCreateDBRequest {
    /// Display name; not validated, the empty string is allowed
    pub name: String,
    pub user_id: UserId,
}

/// A stored parking center row
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ParkingCenterDBResponse {
    pub id: ParkingCenterId,
    pub name: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}
