//! Database repository for parking centers.

use crate::db::{
    errors::Result,
    models::parking_centers::{ParkingCenterCreateDBRequest, ParkingCenterDBResponse},
};
use crate::types::{ParkingCenterId, UserId};
use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::instrument;

pub struct ParkingCenters<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> ParkingCenters<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    /// Insert a new parking center. Always succeeds; the name is stored as given.
    #[instrument(skip(self, request), fields(user_id = request.user_id), err)]
    pub async fn create(&mut self, request: &ParkingCenterCreateDBRequest) -> Result<ParkingCenterDBResponse> {
        let center = sqlx::query_as::<_, ParkingCenterDBResponse>(
            r#"
            INSERT INTO parking_centers (name, user_id, created_at)
            VALUES (?, ?, ?)
            RETURNING id, name, user_id, created_at
            "#,
        )
        .bind(&request.name)
        .bind(request.user_id)
        .bind(Utc::now())
        .fetch_one(&mut *self.db)
        .await?;

        Ok(center)
    }

    #[instrument(skip(self), err)]
    pub async fn get_by_id(&mut self, id: ParkingCenterId) -> Result<Option<ParkingCenterDBResponse>> {
        let center = sqlx::query_as::<_, ParkingCenterDBResponse>(
            "SELECT id, name, user_id, created_at FROM parking_centers WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(center)
    }

    /// All centers owned by `user_id`, in insertion order.
    #[instrument(skip(self), err)]
    pub async fn list_for_owner(&mut self, user_id: UserId) -> Result<Vec<ParkingCenterDBResponse>> {
        let centers = sqlx::query_as::<_, ParkingCenterDBResponse>(
            "SELECT id, name, user_id, created_at FROM parking_centers WHERE user_id = ? ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(centers)
    }

    /// Delete a center only if `user_id` owns it.
    ///
    /// Returns whether a row was removed. A center belonging to another owner,
    /// or no center at all, deletes nothing.
    #[instrument(skip(self), err)]
    pub async fn delete_owned(&mut self, id: ParkingCenterId, user_id: UserId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM parking_centers WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
