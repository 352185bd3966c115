//! Workflow state as rendered to clients.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{
    AccountKind, Driver, PIX_KEY, PaymentMethod, Phase, Quote, Ride, ServiceType, Session,
    Transaction, WorkflowState,
};

/// The logged-in identity.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionDto {
    /// Account kind.
    pub kind: AccountKind,
    /// Display name.
    pub name: String,
    /// Phone number.
    pub phone: String,
    /// Full driver record, for driver sessions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver: Option<Driver>,
}

impl From<&Session> for SessionDto {
    fn from(session: &Session) -> Self {
        Self {
            kind: session.kind(),
            name: session.name().to_string(),
            phone: session.phone().to_string(),
            driver: session.as_driver().cloned(),
        }
    }
}

/// The request being built.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TransactionDto {
    /// Chosen driver.
    pub selected_driver: Option<Driver>,
    /// Pickup address.
    pub origin: String,
    /// Drop-off address.
    pub destination: String,
    /// Chosen service.
    pub service_type: Option<ServiceType>,
    /// Notes for pricing.
    pub details: String,
    /// Current quote.
    pub quote: Option<Quote>,
    /// Payment method.
    pub payment_method: PaymentMethod,
}

impl From<&Transaction> for TransactionDto {
    fn from(t: &Transaction) -> Self {
        Self {
            selected_driver: t.selected_driver.clone(),
            origin: t.origin.clone(),
            destination: t.destination.clone(),
            service_type: t.service_type,
            details: t.details.clone(),
            quote: t.quote.clone(),
            payment_method: t.payment_method,
        }
    }
}

/// Response body of every workflow endpoint.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StateResponse {
    /// Current phase.
    pub phase: Phase,
    /// Logged-in identity.
    pub session: Option<SessionDto>,
    /// Current request.
    pub transaction: TransactionDto,
    /// A call for the current step is in flight.
    pub busy: bool,
    /// Message from the last failed step.
    pub message: Option<String>,
    /// Ride placed by the last confirmation, while displayed.
    pub confirmed_ride: Option<Ride>,
    /// PIX key to pay to, when the displayed ride is paid by PIX.
    pub pix_key: Option<String>,
    /// Whether `POST /workflow/quote` would be accepted.
    pub can_request_quote: bool,
    /// Whether `POST /workflow/confirm` would be accepted.
    pub can_confirm: bool,
}

impl From<&WorkflowState> for StateResponse {
    fn from(state: &WorkflowState) -> Self {
        let pix_key = state
            .confirmed_ride
            .as_ref()
            .filter(|r| r.payment_method == PaymentMethod::Pix)
            .map(|_| PIX_KEY.to_string());
        Self {
            phase: state.phase,
            session: state.session.as_ref().map(SessionDto::from),
            transaction: TransactionDto::from(&state.transaction),
            busy: state.busy,
            message: state.message.clone(),
            confirmed_ride: state.confirmed_ride.clone(),
            pix_key,
            can_request_quote: state.can_request_quote(),
            can_confirm: state.can_confirm(),
        }
    }
}

impl From<WorkflowState> for StateResponse {
    fn from(state: WorkflowState) -> Self {
        Self::from(&state)
    }
}
