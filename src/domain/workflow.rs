//! Request workflow state machine.
//!
//! [`WorkflowState`] is an immutable record; [`WorkflowState::apply`]
//! produces the next record for an [`Event`] without side effects. The
//! service layer owns the single mutable cell, performs the store and
//! pricing calls that state entry requires, and feeds their outcomes back
//! in as events.
//!
//! ```text
//! Unauthenticated ──AuthSubmitted──▶ Authenticating ──AuthSucceeded──▶ Browsing
//!        ▲                                 │                             │
//!        └──────────AuthFailed─────────────┘                      QuoteRequested
//!        ▲                                                               ▼
//!        │                                    Browsing ◀─Elapsed── Confirmed ◀─OrderConfirmed── Quoting
//!        └──────── LoggedOut (from any authenticated phase) ─────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use super::{Driver, PaymentMethod, Quote, Ride, RideId, RideStatus, ServiceType, Session};
use crate::error::AppError;

/// Origin recorded when the client did not enter one.
pub const DEFAULT_RIDE_ORIGIN: &str = "customer location";

/// Coarse workflow position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Nobody is logged in.
    #[default]
    Unauthenticated,
    /// A login or registration is being checked.
    Authenticating,
    /// Logged in; choosing a driver and filling in the trip.
    Browsing,
    /// A quote has been requested for the current trip.
    Quoting,
    /// An order was just placed and is on display.
    Confirmed,
}

impl Phase {
    /// Whether a session exists in this phase.
    #[must_use]
    pub const fn is_authenticated(self) -> bool {
        matches!(self, Self::Browsing | Self::Quoting | Self::Confirmed)
    }

    const fn is_editing(self) -> bool {
        matches!(self, Self::Browsing | Self::Quoting)
    }
}

/// Transaction-scoped inputs and results of one request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Transaction {
    /// Driver the client picked.
    pub selected_driver: Option<Driver>,
    /// Pickup address as typed.
    pub origin: String,
    /// Drop-off address as typed.
    pub destination: String,
    /// Chosen service.
    pub service_type: Option<ServiceType>,
    /// Free-text notes for the pricing model.
    pub details: String,
    /// Current quote; `None` whenever the inputs changed after pricing.
    pub quote: Option<Quote>,
    /// How the client will pay.
    pub payment_method: PaymentMethod,
    /// Bumped on every input change. A quote computed for an older
    /// revision is dropped on arrival.
    pub revision: u64,
}

impl Transaction {
    /// Names the first input still missing before a quote can be
    /// requested, or `None` when the request is complete.
    ///
    /// A service the selected driver does not take counts as missing.
    #[must_use]
    pub fn missing_quote_input(&self) -> Option<&'static str> {
        let Some(driver) = &self.selected_driver else {
            return Some("driver");
        };
        if self.destination.trim().is_empty() {
            return Some("destination");
        }
        let Some(service) = self.service_type.filter(|s| driver.vehicle_type.offers(*s)) else {
            return Some("service type");
        };
        if service.requires_origin() && self.origin.trim().is_empty() {
            return Some("origin");
        }
        None
    }

    /// Whether `service` may be chosen: always without a driver, otherwise
    /// only if the driver's vehicle takes it.
    #[must_use]
    pub fn accepts(&self, service: ServiceType) -> bool {
        self.selected_driver
            .as_ref()
            .is_none_or(|d| d.vehicle_type.offers(service))
    }

    /// Origin to price against: the typed origin for pickup services,
    /// `None` otherwise.
    #[must_use]
    pub fn pricing_origin(&self) -> Option<&str> {
        match self.service_type {
            Some(s) if s.requires_origin() => Some(self.origin.trim()),
            _ => None,
        }
    }

    /// Builds the pending ride this transaction describes.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NoQuote`] without a current quote,
    /// [`AppError::MissingQuoteInputs`] when inputs are incomplete, or
    /// [`AppError::InvalidRequest`] if the resulting record is invalid.
    pub fn build_ride(&self, id: RideId, date: NaiveDate) -> Result<Ride, AppError> {
        if let Some(missing) = self.missing_quote_input() {
            return Err(AppError::MissingQuoteInputs(missing.to_string()));
        }
        let (Some(driver), Some(service), Some(quote)) =
            (&self.selected_driver, self.service_type, &self.quote)
        else {
            return Err(AppError::NoQuote);
        };
        let origin = match self.origin.trim() {
            "" => DEFAULT_RIDE_ORIGIN.to_string(),
            typed => typed.to_string(),
        };
        let ride = Ride {
            id,
            driver_name: driver.name.clone(),
            vehicle_type: driver.vehicle_type,
            service_type: service.label().to_string(),
            origin: Some(origin),
            destination: self.destination.trim().to_string(),
            price: quote.price,
            payment_method: self.payment_method,
            date: date.format("%d/%m/%Y").to_string(),
            status: RideStatus::Pending,
        };
        ride.validate()?;
        Ok(ride)
    }

    fn reset_keeping_revision(&self) -> Self {
        Self {
            revision: self.revision.wrapping_add(1),
            ..Self::default()
        }
    }

    fn edited(&self, edit: impl FnOnce(&mut Self)) -> Self {
        let mut next = self.clone();
        edit(&mut next);
        next.quote = None;
        next.revision = next.revision.wrapping_add(1);
        next
    }
}

/// Everything the presentation layer renders.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorkflowState {
    /// Current phase.
    pub phase: Phase,
    /// Authenticated identity, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<Session>,
    /// Current request.
    pub transaction: Transaction,
    /// A store or pricing call for the current step is in flight.
    pub busy: bool,
    /// Short user-facing message from the last failed step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Ride placed by the last confirmation, while it is on display.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmed_ride: Option<Ride>,
}

/// Inputs to the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A stored session was found at startup.
    SessionRestored(Session),
    /// Login or registration form submitted.
    AuthSubmitted,
    /// Account found or created.
    AuthSucceeded(Session),
    /// Login or registration rejected, with a user-facing message.
    AuthFailed(String),
    /// Client picked a driver. Resets the rest of the transaction.
    DriverSelected(Driver),
    /// Origin field changed.
    OriginEdited(String),
    /// Destination field changed.
    DestinationEdited(String),
    /// Service type changed.
    ServiceTypeChosen(Option<ServiceType>),
    /// Details field changed.
    DetailsEdited(String),
    /// Payment method changed.
    PaymentChosen(PaymentMethod),
    /// Client asked for a price.
    QuoteRequested,
    /// Pricing finished for the given transaction revision.
    QuoteResolved {
        /// Revision the quote was computed for.
        revision: u64,
        /// The quote.
        quote: Quote,
    },
    /// Client confirmed the order; the write is in flight.
    ConfirmSubmitted,
    /// The ride was recorded.
    OrderConfirmed(Ride),
    /// The confirmation display delay for this ride ran out.
    ConfirmationElapsed(RideId),
    /// Logout.
    LoggedOut,
}

impl WorkflowState {
    /// Whether a quote may be requested right now.
    #[must_use]
    pub fn can_request_quote(&self) -> bool {
        self.phase.is_editing() && !self.busy && self.transaction.missing_quote_input().is_none()
    }

    /// Whether the order may be confirmed right now.
    #[must_use]
    pub fn can_confirm(&self) -> bool {
        self.phase == Phase::Quoting
            && !self.busy
            && self.transaction.quote.is_some()
            && self.transaction.missing_quote_input().is_none()
    }

    /// Computes the state that follows `event`.
    ///
    /// Events that do not apply in the current phase leave the state
    /// unchanged.
    #[must_use]
    pub fn apply(&self, event: Event) -> Self {
        use Phase::{Authenticating, Browsing, Confirmed, Quoting, Unauthenticated};

        match (self.phase, event) {
            (Unauthenticated, Event::SessionRestored(session)) => Self {
                phase: Browsing,
                session: Some(session),
                ..Self::default()
            },
            (Unauthenticated, Event::AuthSubmitted) => Self {
                phase: Authenticating,
                busy: true,
                message: None,
                ..self.clone()
            },
            (Authenticating, Event::AuthSucceeded(session)) => Self {
                phase: Browsing,
                session: Some(session),
                ..Self::default()
            },
            (Authenticating, Event::AuthFailed(message)) => Self {
                phase: Unauthenticated,
                busy: false,
                message: Some(message),
                ..self.clone()
            },
            // Trip inputs are frozen while a quote or order is in flight.
            (
                Browsing | Quoting,
                Event::DriverSelected(_)
                | Event::OriginEdited(_)
                | Event::DestinationEdited(_)
                | Event::ServiceTypeChosen(_)
                | Event::DetailsEdited(_)
                | Event::PaymentChosen(_),
            ) if self.busy => self.clone(),
            (Browsing | Quoting, Event::DriverSelected(driver)) => {
                let mut transaction = self.transaction.reset_keeping_revision();
                transaction.selected_driver = Some(driver);
                Self {
                    phase: Browsing,
                    transaction,
                    message: None,
                    ..self.clone()
                }
            }
            (Browsing | Quoting, Event::OriginEdited(origin)) => {
                self.with_inputs(self.transaction.edited(|t| t.origin = origin))
            }
            (Browsing | Quoting, Event::DestinationEdited(destination)) => {
                self.with_inputs(self.transaction.edited(|t| t.destination = destination))
            }
            (Browsing | Quoting, Event::ServiceTypeChosen(Some(service)))
                if !self.transaction.accepts(service) =>
            {
                self.clone()
            }
            (Browsing | Quoting, Event::ServiceTypeChosen(service)) => {
                self.with_inputs(self.transaction.edited(|t| t.service_type = service))
            }
            (Browsing | Quoting, Event::DetailsEdited(details)) => {
                self.with_inputs(self.transaction.edited(|t| t.details = details))
            }
            (Browsing | Quoting, Event::PaymentChosen(method)) => {
                let mut next = self.clone();
                next.transaction.payment_method = method;
                next
            }
            (Browsing | Quoting, Event::QuoteRequested) if self.can_request_quote() => {
                let mut next = self.clone();
                next.phase = Quoting;
                next.busy = true;
                next.message = None;
                next.transaction.quote = None;
                next
            }
            (Browsing | Quoting, Event::QuoteResolved { revision, quote }) => {
                let mut next = self.clone();
                next.busy = false;
                if self.phase == Quoting && revision == self.transaction.revision {
                    next.transaction.quote = Some(quote);
                }
                next
            }
            (Quoting, Event::ConfirmSubmitted) if self.can_confirm() => Self {
                busy: true,
                ..self.clone()
            },
            (Quoting, Event::OrderConfirmed(ride)) => Self {
                phase: Confirmed,
                busy: false,
                message: None,
                confirmed_ride: Some(ride),
                ..self.clone()
            },
            (Confirmed, Event::ConfirmationElapsed(ride_id))
                if self.confirmed_ride.as_ref().is_some_and(|r| r.id == ride_id) =>
            {
                Self {
                    phase: Browsing,
                    transaction: self.transaction.reset_keeping_revision(),
                    busy: false,
                    confirmed_ride: None,
                    ..self.clone()
                }
            }
            (phase, Event::LoggedOut) if phase.is_authenticated() => Self::default(),
            _ => self.clone(),
        }
    }

    /// Applies edited inputs. Any edit drops the quote, so a quoted price
    /// is never shown against inputs it was not computed for.
    fn with_inputs(&self, transaction: Transaction) -> Self {
        Self {
            transaction,
            message: None,
            ..self.clone()
        }
    }
}

/// Free-function form of [`WorkflowState::apply`].
#[must_use]
pub fn transition(state: &WorkflowState, event: Event) -> WorkflowState {
    state.apply(event)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::domain::{DriverRegistration, User, VehicleType};

    fn client() -> Session {
        Session::Client(User {
            name: "Ana".to_string(),
            phone: "35999990000".to_string(),
            address: "Rua Direita 5".to_string(),
        })
    }

    fn carro() -> Driver {
        let mut driver = Driver::register(DriverRegistration {
            name: "Maria Oliveira".to_string(),
            phone: "(35) 99901-0002".to_string(),
            ..DriverRegistration::default()
        });
        driver.vehicle_type = VehicleType::Carro;
        driver
    }

    fn browsing() -> WorkflowState {
        WorkflowState::default().apply(Event::SessionRestored(client()))
    }

    fn ready_to_quote() -> WorkflowState {
        browsing()
            .apply(Event::DriverSelected(carro()))
            .apply(Event::DestinationEdited("Rua Rural 10".to_string()))
            .apply(Event::ServiceTypeChosen(Some(ServiceType::Passenger)))
    }

    fn quoted() -> WorkflowState {
        let requested = ready_to_quote().apply(Event::QuoteRequested);
        let revision = requested.transaction.revision;
        requested.apply(Event::QuoteResolved {
            revision,
            quote: Quote::new(Decimal::new(2000, 2), "estimated fare"),
        })
    }

    #[test]
    fn login_success_enters_browsing() {
        let state = WorkflowState::default()
            .apply(Event::AuthSubmitted)
            .apply(Event::AuthSucceeded(client()));
        assert_eq!(state.phase, Phase::Browsing);
        assert!(!state.busy);
        assert!(state.session.is_some());
    }

    #[test]
    fn login_failure_returns_with_message() {
        let submitted = WorkflowState::default().apply(Event::AuthSubmitted);
        assert_eq!(submitted.phase, Phase::Authenticating);
        assert!(submitted.busy);

        let failed = submitted.apply(Event::AuthFailed("account not found".to_string()));
        assert_eq!(failed.phase, Phase::Unauthenticated);
        assert_eq!(failed.message.as_deref(), Some("account not found"));
        assert!(failed.session.is_none());
    }

    #[test]
    fn quote_requires_complete_inputs() {
        let state = browsing().apply(Event::DriverSelected(carro()));
        assert_eq!(state.transaction.missing_quote_input(), Some("destination"));
        assert!(!state.can_request_quote());
        assert_eq!(state.apply(Event::QuoteRequested), state);

        let package = ready_to_quote().apply(Event::ServiceTypeChosen(Some(ServiceType::Package)));
        assert_eq!(package.transaction.missing_quote_input(), Some("origin"));
    }

    #[test]
    fn quote_request_marks_busy_and_enters_quoting() {
        let state = ready_to_quote().apply(Event::QuoteRequested);
        assert_eq!(state.phase, Phase::Quoting);
        assert!(state.busy);
        assert!(!state.can_request_quote());
    }

    #[test]
    fn resolved_quote_enables_confirmation() {
        let state = quoted();
        assert!(!state.busy);
        assert!(state.transaction.quote.is_some());
        assert!(state.can_confirm());
    }

    #[test]
    fn editing_inputs_drops_quote() {
        for edit in [
            Event::DestinationEdited("Fazenda Boa Vista".to_string()),
            Event::OriginEdited("Praça Matriz".to_string()),
            Event::ServiceTypeChosen(Some(ServiceType::Freight)),
        ] {
            let state = quoted().apply(edit);
            assert!(state.transaction.quote.is_none());
            assert_eq!(state.phase, Phase::Quoting);
            assert!(!state.can_confirm());
        }
    }

    #[test]
    fn quote_for_other_revision_is_dropped() {
        let requested = ready_to_quote().apply(Event::QuoteRequested);
        let resolved = requested.apply(Event::QuoteResolved {
            revision: requested.transaction.revision.wrapping_sub(1),
            quote: Quote::new(Decimal::new(3000, 2), "rural"),
        });
        assert!(resolved.transaction.quote.is_none());
        assert!(!resolved.busy);
    }

    #[test]
    fn inputs_are_frozen_while_busy() {
        let pricing = ready_to_quote().apply(Event::QuoteRequested);
        let confirming = quoted().apply(Event::ConfirmSubmitted);
        for state in [pricing, confirming] {
            assert!(state.busy);
            for event in [
                Event::DriverSelected(carro()),
                Event::OriginEdited("Praça Matriz".to_string()),
                Event::DestinationEdited("Sítio Alegre".to_string()),
                Event::ServiceTypeChosen(Some(ServiceType::Package)),
                Event::DetailsEdited("two bags".to_string()),
                Event::PaymentChosen(PaymentMethod::Pix),
            ] {
                assert_eq!(state.apply(event), state);
            }
        }
    }

    #[test]
    fn unsupported_service_is_not_chosen() {
        let mut moto = carro();
        moto.vehicle_type = VehicleType::Moto;
        let state = browsing()
            .apply(Event::DriverSelected(moto))
            .apply(Event::DestinationEdited("Rua Nova 3".to_string()));
        let refused = state.apply(Event::ServiceTypeChosen(Some(ServiceType::Freight)));
        assert_eq!(refused, state);
        assert_eq!(refused.transaction.missing_quote_input(), Some("service type"));

        let mut van = carro();
        van.vehicle_type = VehicleType::Van;
        let van_state = browsing().apply(Event::DriverSelected(van));
        assert_eq!(
            van_state.apply(Event::ServiceTypeChosen(Some(ServiceType::Delivery))),
            van_state
        );
    }

    #[test]
    fn payment_choice_keeps_quote() {
        let state = quoted().apply(Event::PaymentChosen(PaymentMethod::Pix));
        assert!(state.transaction.quote.is_some());
        assert_eq!(state.transaction.payment_method, PaymentMethod::Pix);
    }

    #[test]
    fn selecting_driver_resets_transaction() {
        let state = quoted()
            .apply(Event::PaymentChosen(PaymentMethod::Pix))
            .apply(Event::DriverSelected(carro()));
        assert_eq!(state.phase, Phase::Browsing);
        assert!(state.transaction.destination.is_empty());
        assert!(state.transaction.quote.is_none());
        assert_eq!(state.transaction.payment_method, PaymentMethod::Dinheiro);
    }

    #[test]
    fn confirmation_then_elapse_resets() {
        let state = quoted().apply(Event::ConfirmSubmitted);
        assert!(state.busy);
        let Ok(ride) = state
            .transaction
            .build_ride(RideId::from("r-1"), NaiveDate::default())
        else {
            panic!("ride should build");
        };
        let confirmed = state.apply(Event::OrderConfirmed(ride));
        assert_eq!(confirmed.phase, Phase::Confirmed);

        let unrelated = confirmed.apply(Event::ConfirmationElapsed(RideId::from("other")));
        assert_eq!(unrelated.phase, Phase::Confirmed);

        let reset = confirmed.apply(Event::ConfirmationElapsed(RideId::from("r-1")));
        assert_eq!(reset.phase, Phase::Browsing);
        assert!(reset.transaction.selected_driver.is_none());
        assert!(reset.transaction.quote.is_none());
        assert!(reset.confirmed_ride.is_none());
        assert!(reset.session.is_some());
    }

    #[test]
    fn built_ride_defaults_origin_and_formats_date() {
        let Some(date) = NaiveDate::from_ymd_opt(2026, 10, 16) else {
            panic!("valid date");
        };
        let Ok(ride) = quoted().transaction.build_ride(RideId::from("r-2"), date) else {
            panic!("ride should build");
        };
        assert_eq!(ride.origin.as_deref(), Some(DEFAULT_RIDE_ORIGIN));
        assert_eq!(ride.date, "16/10/2026");
        assert_eq!(ride.status, RideStatus::Pending);
        assert_eq!(ride.vehicle_type, VehicleType::Carro);
    }

    #[test]
    fn logout_clears_everything() {
        let state = quoted().apply(Event::LoggedOut);
        assert_eq!(state, WorkflowState::default());
    }

    #[test]
    fn logout_ignored_when_not_authenticated() {
        let state = WorkflowState::default().apply(Event::AuthSubmitted);
        assert_eq!(transition(&state, Event::LoggedOut), state);
    }
}
