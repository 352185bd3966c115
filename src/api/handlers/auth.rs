//! Login, registration, and logout.

use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{LoginRequest, RegisterRequest, StateResponse};
use crate::app_state::AppState;
use crate::domain::AccountKind;
use crate::error::{AppError, ErrorResponse};

/// `POST /auth/{kind}/login`: Log in with a phone number.
///
/// # Errors
///
/// Returns [`AppError`] when the phone is unknown, belongs to the other
/// account kind, or a session already exists.
#[utoipa::path(
    post,
    path = "/api/v1/auth/{kind}/login",
    tag = "Auth",
    summary = "Log in",
    description = "Looks the phone up among drivers, then clients. The account must match the entry point.",
    params(("kind" = AccountKind, Path, description = "Entry point: `client` or `driver`")),
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = StateResponse),
        (status = 403, description = "Phone belongs to the other account kind", body = ErrorResponse),
        (status = 404, description = "No account with this phone", body = ErrorResponse),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<StateResponse>, AppError> {
    let kind: AccountKind = kind.parse()?;
    let next = state.controller.login(kind, &req.phone).await?;
    Ok(Json(next.into()))
}

/// `POST /auth/{kind}/register`: Create an account and log in.
///
/// # Errors
///
/// Returns [`AppError`] when the phone is already registered or required
/// fields are blank.
#[utoipa::path(
    post,
    path = "/api/v1/auth/{kind}/register",
    tag = "Auth",
    summary = "Register",
    description = "Creates a client or driver account. New drivers start with a motorcycle, a 5.0 rating, and the map centre as position.",
    params(("kind" = AccountKind, Path, description = "Entry point: `client` or `driver`")),
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered and logged in", body = StateResponse),
        (status = 400, description = "Blank name or phone", body = ErrorResponse),
        (status = 409, description = "Phone already registered", body = ErrorResponse),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(req): Json<RegisterRequest>,
) -> Result<(axum::http::StatusCode, Json<StateResponse>), AppError> {
    let next = match kind.parse::<AccountKind>()? {
        AccountKind::Client => state.controller.register_client(req.into()).await?,
        AccountKind::Driver => state.controller.register_driver(req.into()).await?,
    };
    Ok((axum::http::StatusCode::CREATED, Json(next.into())))
}

/// `POST /auth/logout`: End the session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "Auth",
    summary = "Log out",
    description = "Clears the stored session and any request in progress.",
    responses(
        (status = 200, description = "Logged out", body = StateResponse),
    )
)]
pub async fn logout(State(state): State<AppState>) -> Json<StateResponse> {
    Json(state.controller.logout().await.into())
}

/// Authentication routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/logout", post(logout))
        .route("/auth/{kind}/login", post(login))
        .route("/auth/{kind}/register", post(register))
}
