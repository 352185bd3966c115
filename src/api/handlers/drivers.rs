//! Driver directory.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{DriverDto, DriverListResponse, DriverQuery};
use crate::app_state::AppState;
use crate::error::{AppError, ErrorResponse};

/// `GET /drivers`: List drivers, optionally by vehicle category.
///
/// # Errors
///
/// Returns [`AppError::InvalidRequest`] for an unknown category.
#[utoipa::path(
    get,
    path = "/api/v1/drivers",
    tag = "Drivers",
    summary = "List drivers",
    description = "Returns the driver directory, optionally filtered by vehicle category. \
                   Each entry lists the services its vehicle takes.",
    params(DriverQuery),
    responses(
        (status = 200, description = "Driver directory", body = DriverListResponse),
        (status = 400, description = "Unknown vehicle category", body = ErrorResponse),
    )
)]
pub async fn list_drivers(
    State(state): State<AppState>,
    Query(query): Query<DriverQuery>,
) -> Result<Json<DriverListResponse>, AppError> {
    let data: Vec<DriverDto> = state
        .controller
        .drivers(query.filter()?)
        .await
        .into_iter()
        .map(DriverDto::from)
        .collect();
    Ok(Json(DriverListResponse {
        total: data.len(),
        data,
    }))
}

/// Driver directory routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/drivers", get(list_drivers))
}
