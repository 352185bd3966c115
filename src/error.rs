//! Service error types with HTTP status code mapping.
//!
//! [`AppError`] is the central error type for the service. Each variant
//! maps to a specific HTTP status code and structured JSON error response.
//! The persistence gateway and the pricing client never surface these to
//! the workflow; they are produced by the fallible backends underneath
//! them and by the workflow's own validation and authentication steps.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{AccountKind, ServiceType, VehicleType};

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "message": "account not found; please register",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see [`AppError`] for ranges).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category                 | HTTP Status                       |
/// |-----------|--------------------------|-----------------------------------|
/// | 1000–1999 | Validation               | 400 Bad Request                   |
/// | 2000–2999 | Authentication / State   | 401 / 403 / 404 / 409             |
/// | 3000–3999 | Server                   | 500 Internal Server Error         |
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A quote was requested without a driver, destination, service type,
    /// or (for pickup services) an origin.
    #[error("missing quote inputs: {0}")]
    MissingQuoteInputs(String),

    /// The selected driver's vehicle does not take this kind of service.
    #[error("a {vehicle} driver does not offer {service}")]
    UnsupportedService {
        /// Vehicle of the selected driver.
        vehicle: VehicleType,
        /// Service that was asked for.
        service: ServiceType,
    },

    /// No driver or client is registered under the phone number.
    #[error("account not found; please register")]
    AccountNotFound,

    /// Registration attempted with a phone number already in use.
    #[error("this phone is already registered; please log in")]
    DuplicatePhone,

    /// The phone belongs to the other kind of account.
    #[error("this phone belongs to a {found} account; use the {found} entry point")]
    AccountKindMismatch {
        /// Entry point the credential was submitted on.
        expected: AccountKind,
        /// Kind of the account the phone actually belongs to.
        found: AccountKind,
    },

    /// The operation requires an authenticated session.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The operation requires a session of a specific kind.
    #[error("operation requires a {0} session")]
    WrongSessionKind(AccountKind),

    /// Driver with the given id is not in the directory.
    #[error("driver not found: {0}")]
    DriverNotFound(String),

    /// Order confirmation attempted without a current quote.
    #[error("no current quote; request a quote first")]
    NoQuote,

    /// A previous request for the same step is still in flight.
    #[error("another request is in progress")]
    Busy,

    /// Persistence backend failure.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Pricing model failure.
    #[error("pricing error: {0}")]
    Pricing(String),

    /// Session storage failure.
    #[error("session storage error: {0}")]
    SessionStorage(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::MissingQuoteInputs(_) => 1002,
            Self::UnsupportedService { .. } => 1003,
            Self::AccountNotFound => 2001,
            Self::DuplicatePhone => 2002,
            Self::AccountKindMismatch { .. } => 2003,
            Self::NotAuthenticated => 2004,
            Self::WrongSessionKind(_) => 2005,
            Self::DriverNotFound(_) => 2006,
            Self::NoQuote => 2007,
            Self::Busy => 2008,
            Self::Internal(_) => 3000,
            Self::Persistence(_) => 3001,
            Self::Pricing(_) => 3002,
            Self::SessionStorage(_) => 3003,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_)
            | Self::MissingQuoteInputs(_)
            | Self::UnsupportedService { .. } => StatusCode::BAD_REQUEST,
            Self::AccountNotFound | Self::DriverNotFound(_) => StatusCode::NOT_FOUND,
            Self::NotAuthenticated => StatusCode::UNAUTHORIZED,
            Self::WrongSessionKind(_) | Self::AccountKindMismatch { .. } => StatusCode::FORBIDDEN,
            Self::DuplicatePhone | Self::NoQuote | Self::Busy => StatusCode::CONFLICT,
            Self::Persistence(_)
            | Self::Pricing(_)
            | Self::SessionStorage(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns `true` for authentication failures that are shown to the
    /// user as a short message and recovered from by re-submitting.
    #[must_use]
    pub const fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Self::AccountNotFound | Self::DuplicatePhone | Self::AccountKindMismatch { .. }
        )
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        Self::Pricing(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
