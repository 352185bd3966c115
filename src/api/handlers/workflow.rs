//! Request building: driver choice, trip inputs, quote, and confirmation.

use axum::extract::State;
use axum::routing::{get, patch, post};
use axum::{Json, Router};

use crate::api::dto::{SelectDriverRequest, StateResponse};
use crate::app_state::AppState;
use crate::error::{AppError, ErrorResponse};
use crate::service::TripEdit;

/// `GET /state`: Current workflow state.
#[utoipa::path(
    get,
    path = "/api/v1/state",
    tag = "Workflow",
    summary = "Workflow state",
    responses(
        (status = 200, description = "Current state", body = StateResponse),
    )
)]
pub async fn get_state(State(state): State<AppState>) -> Json<StateResponse> {
    Json(state.controller.snapshot().await.into())
}

/// `POST /workflow/driver`: Choose a driver and start a new request.
///
/// # Errors
///
/// Returns [`AppError`] without a client session, for an unknown driver, or
/// while a quote or order is in flight.
#[utoipa::path(
    post,
    path = "/api/v1/workflow/driver",
    tag = "Workflow",
    summary = "Select driver",
    request_body = SelectDriverRequest,
    responses(
        (status = 200, description = "Driver selected", body = StateResponse),
        (status = 404, description = "Unknown driver", body = ErrorResponse),
        (status = 409, description = "A quote or order is in flight", body = ErrorResponse),
    )
)]
pub async fn select_driver(
    State(state): State<AppState>,
    Json(req): Json<SelectDriverRequest>,
) -> Result<Json<StateResponse>, AppError> {
    Ok(Json(state.controller.select_driver(&req.driver_id).await?.into()))
}

/// `PATCH /workflow/trip`: Edit trip inputs.
///
/// # Errors
///
/// Returns [`AppError`] without a client session, for a service the
/// selected driver does not take, or while a quote or order is in flight.
#[utoipa::path(
    patch,
    path = "/api/v1/workflow/trip",
    tag = "Workflow",
    summary = "Edit trip",
    description = "Updates the given fields. Changing origin, destination, service, or details discards the current quote.",
    request_body = TripEdit,
    responses(
        (status = 200, description = "Trip updated", body = StateResponse),
        (status = 400, description = "Service not offered by the selected driver", body = ErrorResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 409, description = "A quote or order is in flight", body = ErrorResponse),
    )
)]
pub async fn edit_trip(
    State(state): State<AppState>,
    Json(edit): Json<TripEdit>,
) -> Result<Json<StateResponse>, AppError> {
    Ok(Json(state.controller.edit_trip(edit).await?.into()))
}

/// `POST /workflow/quote`: Price the current trip.
///
/// # Errors
///
/// Returns [`AppError`] when inputs are missing or a call is in flight.
#[utoipa::path(
    post,
    path = "/api/v1/workflow/quote",
    tag = "Workflow",
    summary = "Request quote",
    description = "Urban motorcycle trips get the fixed fare; other trips are priced by the model, with a fallback estimate when it fails.",
    responses(
        (status = 200, description = "Quote computed", body = StateResponse),
        (status = 400, description = "Trip incomplete, or service not offered by the driver", body = ErrorResponse),
        (status = 409, description = "Another request in progress", body = ErrorResponse),
    )
)]
pub async fn request_quote(State(state): State<AppState>) -> Result<Json<StateResponse>, AppError> {
    Ok(Json(state.controller.request_quote().await?.into()))
}

/// `POST /workflow/confirm`: Place the order for the current quote.
///
/// # Errors
///
/// Returns [`AppError`] without a current quote or while a call is in flight.
#[utoipa::path(
    post,
    path = "/api/v1/workflow/confirm",
    tag = "Workflow",
    summary = "Confirm order",
    description = "Records a pending ride. The confirmation stays displayed for a short delay, then the request resets.",
    responses(
        (status = 200, description = "Order placed", body = StateResponse),
        (status = 409, description = "No current quote, or another request in progress", body = ErrorResponse),
    )
)]
pub async fn confirm_order(State(state): State<AppState>) -> Result<Json<StateResponse>, AppError> {
    Ok(Json(state.controller.confirm_order().await?.into()))
}

/// Workflow routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/state", get(get_state))
        .route("/workflow/driver", post(select_driver))
        .route("/workflow/trip", patch(edit_trip))
        .route("/workflow/quote", post(request_quote))
        .route("/workflow/confirm", post(confirm_order))
}
