//! Car list and car management routes for a parking center.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Form,
};
use minijinja::context;
use sqlx::SqliteConnection;

use crate::{
    db::{
        errors::DbError,
        handlers::{Cars, ParkingCenters},
        models::{cars::CarCreateDBRequest, parking_centers::ParkingCenterDBResponse},
    },
    errors::Error,
    types::{authorize, Operation, ParkingCenterId, Resource},
    views,
    web::{
        flash::{Flash, FlashRedirect, IncomingFlash},
        models::{CarAction, CurrentUser, ManageCarForm},
    },
    AppState,
};

enum CenterAccess {
    Granted(ParkingCenterDBResponse),
    Denied(FlashRedirect),
}

/// Load a center and apply the capability check for `action`.
///
/// Both outcomes that end the request early (missing center, foreign owner)
/// bounce back to the dashboard with an error flash.
async fn check_center_access(
    db: &mut SqliteConnection,
    user: &CurrentUser,
    center_id: ParkingCenterId,
    action: Operation,
) -> Result<CenterAccess, Error> {
    let mut center_repo = ParkingCenters::new(db);
    let Some(center) = center_repo.get_by_id(center_id).await? else {
        return Ok(CenterAccess::Denied(FlashRedirect::new(
            "/dashboard",
            Flash::error("Parking center not found."),
        )));
    };

    match authorize(user, &center, action, Resource::Cars) {
        Ok(()) => Ok(CenterAccess::Granted(center)),
        Err(err) => {
            tracing::info!("Denied center access: {err}");
            Ok(CenterAccess::Denied(FlashRedirect::new(
                "/dashboard",
                Flash::error("You do not own this parking center."),
            )))
        }
    }
}

/// Render a parking center's car list.
#[tracing::instrument(skip_all)]
pub async fn view_parking_center(
    State(state): State<AppState>,
    user: CurrentUser,
    IncomingFlash(flash): IncomingFlash,
    Path(center_id): Path<ParkingCenterId>,
) -> Result<Response, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let center = match check_center_access(&mut conn, &user, center_id, Operation::Read).await? {
        CenterAccess::Granted(center) => center,
        CenterAccess::Denied(redirect) => return Ok(redirect.into_response()),
    };

    let mut car_repo = Cars::new(&mut conn);
    let cars = car_repo.list_for_center(center.id).await?;

    let had_flash = flash.is_some();
    Ok(views::render(
        &state.templates,
        "parking_center.html",
        context! { user, center, cars, flash },
        had_flash,
    )?
    .into_response())
}

/// Add or remove a car within a parking center.
#[tracing::instrument(skip_all)]
pub async fn manage_car(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(center_id): Path<ParkingCenterId>,
    Form(form): Form<ManageCarForm>,
) -> Result<Response, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let action = match form.action {
        CarAction::Add => Operation::Create,
        CarAction::Remove => Operation::Delete,
    };
    let center = match check_center_access(&mut conn, &user, center_id, action).await? {
        CenterAccess::Granted(center) => center,
        CenterAccess::Denied(redirect) => return Ok(redirect.into_response()),
    };

    let mut car_repo = Cars::new(&mut conn);
    let flash = match form.action {
        CarAction::Add => {
            let create_request = CarCreateDBRequest {
                car_number: form.car_number.clone(),
                parking_center_id: center.id,
            };
            match car_repo.create(&create_request).await {
                Ok(_) => Flash::success(format!("Car {} added successfully.", form.car_number)),
                // The plate is taken somewhere in the system, possibly
                // under a different center
                Err(DbError::UniqueViolation { .. }) => Flash::error(format!("Car {} is already in the list.", form.car_number)),
                Err(e) => return Err(e.into()),
            }
        }
        CarAction::Remove => {
            if car_repo.remove(&form.car_number, center.id).await? {
                Flash::success(format!("Car {} removed successfully.", form.car_number))
            } else {
                Flash::error(format!("Car {} is not in the list.", form.car_number))
            }
        }
    };

    Ok(FlashRedirect::new(format!("/parking_center/{}", center.id), flash).into_response())
}
