//! Workflow controller: sequences login, quoting and ordering.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use utoipa::ToSchema;

use super::pricing::{PricingClient, QuoteRequest};
use super::session_store::SessionStore;
use crate::domain::{
    AccountKind, Driver, DriverId, DriverRegistration, Event, PaymentMethod, Phase, Ride, RideId,
    RideStatus, ServiceType, Session, User, UserRegistration, VehicleType, WorkflowState,
};
use crate::error::AppError;
use crate::persistence::PersistenceGateway;

/// Number of rides shown in a driver's recent list.
pub const RECENT_RIDES: usize = 5;

/// Tunables for [`WorkflowController`].
#[derive(Debug, Clone)]
pub struct WorkflowSettings {
    /// How long a confirmation stays on display.
    pub confirmation_delay: Duration,
    /// Default client address.
    pub city_name: String,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            confirmation_delay: Duration::from_secs(3),
            city_name: crate::config::DEFAULT_CITY_NAME.to_string(),
        }
    }
}

/// A partial update of the trip inputs. Absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct TripEdit {
    /// New pickup address.
    #[serde(default)]
    pub origin: Option<String>,
    /// New drop-off address.
    #[serde(default)]
    pub destination: Option<String>,
    /// New service type.
    #[serde(default)]
    pub service_type: Option<ServiceType>,
    /// New notes for pricing.
    #[serde(default)]
    pub details: Option<String>,
    /// New payment method.
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
}

/// Earnings overview for a driver session.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DriverDashboard {
    /// Sum of the prices of the driver's rides.
    #[schema(value_type = f64)]
    pub earnings: Decimal,
    /// Number of rides naming the driver.
    pub trips: usize,
    /// The driver's most recent rides, newest first.
    pub recent_rides: Vec<Ride>,
    /// Rides still waiting for the driver.
    pub pending_rides: Vec<Ride>,
}

impl DriverDashboard {
    /// Summarises the rides in `history` that name `driver_name`.
    ///
    /// Rides reference drivers by display name, so this is an exact name
    /// match.
    #[must_use]
    pub fn for_driver(driver_name: &str, history: &[Ride]) -> Self {
        let mine: Vec<&Ride> = history
            .iter()
            .filter(|r| r.driver_name == driver_name)
            .collect();
        Self {
            earnings: mine.iter().map(|r| r.price).sum(),
            trips: mine.len(),
            recent_rides: mine.iter().take(RECENT_RIDES).map(|r| (*r).clone()).collect(),
            pending_rides: mine
                .iter()
                .filter(|r| r.status == RideStatus::Pending)
                .map(|r| (*r).clone())
                .collect(),
        }
    }
}

/// Orchestrates the request → quote → confirm flow for the one session
/// this process serves.
///
/// State changes go through [`WorkflowState::apply`]; this type performs
/// the store, pricing and session writes that entering a state requires.
/// The state lock is never held across an external call; the `busy` flag
/// rejects duplicate submissions while one is in flight.
#[derive(Debug)]
pub struct WorkflowController {
    state: Mutex<WorkflowState>,
    drivers: RwLock<Vec<Driver>>,
    history: RwLock<Vec<Ride>>,
    gateway: PersistenceGateway,
    pricing: PricingClient,
    sessions: SessionStore,
    settings: WorkflowSettings,
}

impl WorkflowController {
    /// Creates a controller in the unauthenticated state.
    #[must_use]
    pub fn new(
        gateway: PersistenceGateway,
        pricing: PricingClient,
        sessions: SessionStore,
        settings: WorkflowSettings,
    ) -> Self {
        Self {
            state: Mutex::new(WorkflowState::default()),
            drivers: RwLock::new(Vec::new()),
            history: RwLock::new(Vec::new()),
            gateway,
            pricing,
            sessions,
            settings,
        }
    }

    /// Restores a stored session, if any, and loads the driver directory
    /// and ride history.
    pub async fn startup(&self) -> WorkflowState {
        if let Some(session) = self.sessions.load().await {
            tracing::info!(kind = %session.kind(), "restored stored session");
            self.apply(Event::SessionRestored(session)).await;
        }
        self.refresh_drivers().await;
        self.refresh_history().await;
        self.snapshot().await
    }

    /// Returns the current state.
    pub async fn snapshot(&self) -> WorkflowState {
        self.state.lock().await.clone()
    }

    // ── Authentication ──────────────────────────────────────────────────

    /// Logs in through the `entry` point with `phone`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::AccountNotFound`] or
    /// [`AppError::AccountKindMismatch`] (the state returns to
    /// unauthenticated with the message), [`AppError::Busy`] while another
    /// attempt is running, or [`AppError::InvalidRequest`] for a blank
    /// phone or an existing session.
    pub async fn login(&self, entry: AccountKind, phone: &str) -> Result<WorkflowState, AppError> {
        let phone = required("phone", phone)?;
        self.begin_auth().await?;

        let outcome = match self.gateway.find_account_by_phone(&phone).await {
            None => Err(AppError::AccountNotFound),
            Some(session) if session.kind() != entry => Err(AppError::AccountKindMismatch {
                expected: entry,
                found: session.kind(),
            }),
            Some(session) => Ok(session),
        };

        match outcome {
            Ok(session) => Ok(self.finish_auth(session).await),
            Err(e) => Err(self.fail_auth(e).await),
        }
    }

    /// Registers a client and logs them in.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::DuplicatePhone`] if any account already uses the
    /// phone (nothing is written), [`AppError::Busy`], or
    /// [`AppError::InvalidRequest`] for blank name or phone.
    pub async fn register_client(
        &self,
        form: UserRegistration,
    ) -> Result<WorkflowState, AppError> {
        required("name", &form.name)?;
        let phone = required("phone", &form.phone)?;
        self.begin_auth().await?;

        if self.gateway.find_account_by_phone(&phone).await.is_some() {
            return Err(self.fail_auth(AppError::DuplicatePhone).await);
        }

        let user = User::register(form, &self.settings.city_name);
        self.gateway.register_user(&user).await;
        Ok(self.finish_auth(Session::Client(user)).await)
    }

    /// Registers a driver and logs them in.
    ///
    /// # Errors
    ///
    /// Same as [`Self::register_client`].
    pub async fn register_driver(
        &self,
        form: DriverRegistration,
    ) -> Result<WorkflowState, AppError> {
        required("name", &form.name)?;
        let phone = required("phone", &form.phone)?;
        self.begin_auth().await?;

        if self.gateway.find_account_by_phone(&phone).await.is_some() {
            return Err(self.fail_auth(AppError::DuplicatePhone).await);
        }

        let driver = Driver::register(form);
        self.gateway.register_driver(&driver).await;
        self.refresh_drivers().await;
        Ok(self.finish_auth(Session::Driver(driver)).await)
    }

    /// Clears the session and all transaction state.
    pub async fn logout(&self) -> WorkflowState {
        if let Err(e) = self.sessions.clear().await {
            tracing::error!(error = %e, "failed to clear stored session");
        }
        let state = self.apply(Event::LoggedOut).await;
        tracing::info!("logged out");
        state
    }

    async fn begin_auth(&self) -> Result<(), AppError> {
        let mut state = self.state.lock().await;
        match state.phase {
            Phase::Unauthenticated => {
                *state = state.apply(Event::AuthSubmitted);
                Ok(())
            }
            Phase::Authenticating => Err(AppError::Busy),
            _ => Err(AppError::InvalidRequest(
                "already logged in; log out first".to_string(),
            )),
        }
    }

    async fn finish_auth(&self, session: Session) -> WorkflowState {
        if let Err(e) = self.sessions.save(&session).await {
            tracing::error!(error = %e, "failed to store session");
        }
        tracing::info!(kind = %session.kind(), "authenticated");
        self.apply(Event::AuthSucceeded(session)).await
    }

    async fn fail_auth(&self, err: AppError) -> AppError {
        if err.is_auth_failure() {
            tracing::info!(reason = %err, "authentication rejected");
        } else {
            tracing::warn!(error = %err, "authentication aborted");
        }
        self.apply(Event::AuthFailed(err.to_string())).await;
        err
    }

    // ── Trip building ───────────────────────────────────────────────────

    /// Picks a driver from the directory, starting a fresh request.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotAuthenticated`], [`AppError::WrongSessionKind`]
    /// for driver sessions, [`AppError::DriverNotFound`], or
    /// [`AppError::Busy`] while a quote or order is in flight.
    pub async fn select_driver(&self, id: &DriverId) -> Result<WorkflowState, AppError> {
        self.require_client().await?;
        let driver = self
            .drivers
            .read()
            .await
            .iter()
            .find(|d| &d.id == id)
            .cloned()
            .ok_or_else(|| AppError::DriverNotFound(id.to_string()))?;
        let mut state = self.state.lock().await;
        if state.busy {
            return Err(AppError::Busy);
        }
        *state = state.apply(Event::DriverSelected(driver));
        tracing::debug!(driver_id = %id, "driver selected");
        Ok(state.clone())
    }

    /// Applies edits to the trip inputs. Editing origin, destination,
    /// service type or details drops any current quote.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotAuthenticated`],
    /// [`AppError::WrongSessionKind`], [`AppError::Busy`] while a quote or
    /// order is in flight, or [`AppError::UnsupportedService`] when the
    /// selected driver does not take the chosen service. Nothing is applied
    /// on error.
    pub async fn edit_trip(&self, edit: TripEdit) -> Result<WorkflowState, AppError> {
        self.require_client().await?;
        let mut state = self.state.lock().await;
        if state.busy {
            return Err(AppError::Busy);
        }
        if let Some(service) = edit.service_type {
            ensure_offered(state.transaction.selected_driver.as_ref(), service)?;
        }
        let events = [
            edit.origin.map(Event::OriginEdited),
            edit.destination.map(Event::DestinationEdited),
            edit.service_type.map(|s| Event::ServiceTypeChosen(Some(s))),
            edit.details.map(Event::DetailsEdited),
            edit.payment_method.map(Event::PaymentChosen),
        ];
        for event in events.into_iter().flatten() {
            *state = state.apply(event);
        }
        Ok(state.clone())
    }

    /// Prices the current trip.
    ///
    /// If the inputs change while the price is being computed, the result
    /// is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::MissingQuoteInputs`] when the trip is
    /// incomplete, [`AppError::UnsupportedService`] when the driver does
    /// not take the service, [`AppError::Busy`] while another call is in
    /// flight, or the session errors of [`Self::edit_trip`].
    pub async fn request_quote(&self) -> Result<WorkflowState, AppError> {
        self.require_client().await?;
        let (request, revision) = {
            let mut state = self.state.lock().await;
            if state.busy {
                return Err(AppError::Busy);
            }
            if let Some(service) = state.transaction.service_type {
                ensure_offered(state.transaction.selected_driver.as_ref(), service)?;
            }
            if let Some(missing) = state.transaction.missing_quote_input() {
                return Err(AppError::MissingQuoteInputs(missing.to_string()));
            }
            if !state.can_request_quote() {
                return Err(AppError::InvalidRequest("no trip in progress".to_string()));
            }
            let t = &state.transaction;
            let (Some(driver), Some(service_type)) = (&t.selected_driver, t.service_type) else {
                return Err(AppError::MissingQuoteInputs("driver".to_string()));
            };
            let request = QuoteRequest {
                vehicle_type: driver.vehicle_type,
                service_type,
                origin: t.pricing_origin().map(str::to_string),
                destination: t.destination.trim().to_string(),
                details: t.details.clone(),
            };
            *state = state.apply(Event::QuoteRequested);
            (request, state.transaction.revision)
        };

        let quote = self.pricing.quote(&request).await;
        Ok(self.apply(Event::QuoteResolved { revision, quote }).await)
    }

    /// Places the order for the current quote.
    ///
    /// Records a pending ride, refreshes the history, and schedules the
    /// transaction reset after the confirmation delay.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NoQuote`] without a current quote,
    /// [`AppError::Busy`] while a call is in flight, or the session errors
    /// of [`Self::edit_trip`].
    pub async fn confirm_order(self: &Arc<Self>) -> Result<WorkflowState, AppError> {
        self.require_client().await?;
        let ride = {
            let mut state = self.state.lock().await;
            if state.busy {
                return Err(AppError::Busy);
            }
            if !state.can_confirm() {
                return Err(AppError::NoQuote);
            }
            let ride = state
                .transaction
                .build_ride(RideId::generate(), Local::now().date_naive())?;
            *state = state.apply(Event::ConfirmSubmitted);
            ride
        };

        self.gateway.record_ride(&ride).await;
        self.refresh_history().await;
        let state = self.apply(Event::OrderConfirmed(ride.clone())).await;
        tracing::info!(
            ride_id = %ride.id,
            driver = %ride.driver_name,
            payment = %ride.payment_method,
            "order confirmed"
        );

        let this = Arc::clone(self);
        let delay = self.settings.confirmation_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            this.finish_confirmation(&ride.id).await;
        });

        Ok(state)
    }

    /// Leaves the confirmation display for `ride_id` and resets the
    /// transaction. Ignored if that confirmation is no longer shown.
    pub async fn finish_confirmation(&self, ride_id: &RideId) -> WorkflowState {
        self.apply(Event::ConfirmationElapsed(ride_id.clone())).await
    }

    // ── Views ───────────────────────────────────────────────────────────

    /// Driver directory, optionally narrowed to one vehicle category.
    pub async fn drivers(&self, filter: Option<VehicleType>) -> Vec<Driver> {
        self.drivers
            .read()
            .await
            .iter()
            .filter(|d| filter.is_none_or(|vt| d.vehicle_type == vt))
            .cloned()
            .collect()
    }

    /// Ride history as last loaded, newest first.
    pub async fn history(&self) -> Vec<Ride> {
        self.history.read().await.clone()
    }

    /// Reloads the driver directory from the store.
    pub async fn refresh_drivers(&self) {
        let drivers = self.gateway.list_drivers().await;
        *self.drivers.write().await = drivers;
    }

    /// Reloads the ride history from the store.
    pub async fn refresh_history(&self) {
        let history = self.gateway.list_ride_history().await;
        *self.history.write().await = history;
    }

    /// Earnings overview for the logged-in driver.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotAuthenticated`] or
    /// [`AppError::WrongSessionKind`] for client sessions.
    pub async fn driver_dashboard(&self) -> Result<DriverDashboard, AppError> {
        let session = self.state.lock().await.session.clone();
        let Some(session) = session else {
            return Err(AppError::NotAuthenticated);
        };
        let Some(driver) = session.as_driver() else {
            return Err(AppError::WrongSessionKind(AccountKind::Driver));
        };
        let history = self.history.read().await;
        Ok(DriverDashboard::for_driver(&driver.name, &history))
    }

    // ── Internals ───────────────────────────────────────────────────────

    async fn apply(&self, event: Event) -> WorkflowState {
        let mut state = self.state.lock().await;
        *state = state.apply(event);
        state.clone()
    }

    async fn require_client(&self) -> Result<(), AppError> {
        match self.state.lock().await.session.as_ref().map(Session::kind) {
            None => Err(AppError::NotAuthenticated),
            Some(AccountKind::Client) => Ok(()),
            Some(AccountKind::Driver) => Err(AppError::WrongSessionKind(AccountKind::Client)),
        }
    }
}

fn ensure_offered(driver: Option<&Driver>, service: ServiceType) -> Result<(), AppError> {
    match driver {
        Some(d) if !d.vehicle_type.offers(service) => Err(AppError::UnsupportedService {
            vehicle: d.vehicle_type,
            service,
        }),
        _ => Ok(()),
    }
}

fn required(field: &str, value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidRequest(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}
