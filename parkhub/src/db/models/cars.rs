//! Record structs for the cars table.

use crate::types::{CarId, ParkingCenterId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Fields for adding a car to a parking center
#[derive(Debug, Clone)]
pub struct CarCreateDBRequest {
    pub car_number: String,
    pub parking_center_id: ParkingCenterId,
}

/// A stored car row
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CarDBResponse {
    pub id: CarId,
    pub car_number: String,
    pub parking_center_id: ParkingCenterId,
    pub created_at: DateTime<Utc>,
}
