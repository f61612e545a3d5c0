//! Database repository for cars.

use crate::db::{
    errors::Result,
    models::cars::{CarCreateDBRequest, CarDBResponse},
};
use crate::types::ParkingCenterId;
use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::instrument;

pub struct Cars<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Cars<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    /// Insert a car into a parking center.
    ///
    /// `car_number` is unique across the whole system, not just per center; a
    /// collision anywhere surfaces as [`crate::db::errors::DbError::UniqueViolation`].
    #[instrument(skip(self, request), fields(car_number = %request.car_number, center_id = request.parking_center_id), err)]
    pub async fn create(&mut self, request: &CarCreateDBRequest) -> Result<CarDBResponse> {
        let car = sqlx::query_as::<_, CarDBResponse>(
            r#"
            INSERT INTO cars (car_number, parking_center_id, created_at)
            VALUES (?, ?, ?)
            RETURNING id, car_number, parking_center_id, created_at
            "#,
        )
        .bind(&request.car_number)
        .bind(request.parking_center_id)
        .bind(Utc::now())
        .fetch_one(&mut *self.db)
        .await?;

        Ok(car)
    }

    /// All cars in a parking center, in insertion order.
    #[instrument(skip(self), err)]
    pub async fn list_for_center(&mut self, center_id: ParkingCenterId) -> Result<Vec<CarDBResponse>> {
        let cars = sqlx::query_as::<_, CarDBResponse>(
            "SELECT id, car_number, parking_center_id, created_at FROM cars WHERE parking_center_id = ? ORDER BY id",
        )
        .bind(center_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(cars)
    }

    /// Delete the car matching both `car_number` and `center_id`.
    ///
    /// Returns whether a row was removed. A car number that exists under a
    /// different center does not match.
    #[instrument(skip(self, car_number), err)]
    pub async fn remove(&mut self, car_number: &str, center_id: ParkingCenterId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM cars WHERE car_number = ? AND parking_center_id = ?")
            .bind(car_number)
            .bind(center_id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
