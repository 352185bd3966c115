//! Ride history and the driver dashboard.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::RideListResponse;
use crate::app_state::AppState;
use crate::error::{AppError, ErrorResponse};
use crate::service::DriverDashboard;

/// `GET /rides`: Ride history, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/rides",
    tag = "Rides",
    summary = "Ride history",
    responses(
        (status = 200, description = "Rides, newest first", body = RideListResponse),
    )
)]
pub async fn list_rides(State(state): State<AppState>) -> Json<RideListResponse> {
    let data = state.controller.history().await;
    Json(RideListResponse {
        total: data.len(),
        data,
    })
}

/// `GET /dashboard`: Earnings of the logged-in driver.
///
/// # Errors
///
/// Returns [`AppError`] unless a driver is logged in.
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    tag = "Rides",
    summary = "Driver dashboard",
    description = "Earnings, trip count, recent and pending rides of the logged-in driver.",
    responses(
        (status = 200, description = "Dashboard", body = DriverDashboard),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 403, description = "Logged in as a client", body = ErrorResponse),
    )
)]
pub async fn dashboard(State(state): State<AppState>) -> Result<Json<DriverDashboard>, AppError> {
    Ok(Json(state.controller.driver_dashboard().await?))
}

/// Ride routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/rides", get(list_rides))
        .route("/dashboard", get(dashboard))
}
