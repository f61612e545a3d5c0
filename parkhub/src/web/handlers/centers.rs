//! Dashboard and parking center routes.

use axum::{
    extract::{Path, State},
    Form,
};
use minijinja::context;

use crate::{
    db::{handlers::ParkingCenters, models::parking_centers::ParkingCenterCreateDBRequest},
    errors::Error,
    types::ParkingCenterId,
    views,
    web::{
        flash::{Flash, FlashRedirect, IncomingFlash},
        models::{CreateCenterForm, CurrentUser},
    },
    AppState,
};

/// Render the dashboard with the user's parking centers.
#[tracing::instrument(skip_all)]
pub async fn dashboard(
    State(state): State<AppState>,
    user: CurrentUser,
    IncomingFlash(flash): IncomingFlash,
) -> Result<views::RenderedPage, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut center_repo = ParkingCenters::new(&mut conn);
    let centers = center_repo.list_for_owner(user.id).await?;

    let had_flash = flash.is_some();
    views::render(&state.templates, "dashboard.html", context! { user, centers, flash }, had_flash)
}

/// Create a parking center owned by the current user.
#[tracing::instrument(skip_all)]
pub async fn create_parking_center(
    State(state): State<AppState>,
    user: CurrentUser,
    Form(form): Form<CreateCenterForm>,
) -> Result<FlashRedirect, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut center_repo = ParkingCenters::new(&mut conn);

    // The name is not validated; an empty string is accepted
    center_repo
        .create(&ParkingCenterCreateDBRequest {
            name: form.center_name,
            user_id: user.id,
        })
        .await?;

    Ok(FlashRedirect::new("/dashboard", Flash::success("Parking center created.")))
}

/// Delete a parking center owned by the current user.
#[tracing::instrument(skip_all)]
pub async fn delete_parking_center(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(center_id): Path<ParkingCenterId>,
) -> Result<FlashRedirect, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut center_repo = ParkingCenters::new(&mut conn);

    // Row-scoped delete: someone else's center, or a missing id, removes
    // nothing, and the outcome reads as success either way.
    center_repo.delete_owned(center_id, user.id).await?;

    Ok(FlashRedirect::new("/dashboard", Flash::success("Parking center deleted.")))
}
