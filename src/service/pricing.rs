//! Pricing: the fixed urban motorcycle fare, the external model, and the
//! fallbacks that keep quoting infallible.

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::domain::{Quote, ServiceType, VehicleType};
use crate::error::AppError;

/// Flat fare for a motorcycle trip inside town.
pub const MOTO_FIXED_PRICE: Decimal = Decimal::from_parts(1000, 0, 0, false, 2);

/// Price substituted when the model answers without a usable price.
pub const MISSING_PRICE: Decimal = Decimal::from_parts(2000, 0, 0, false, 2);

/// Price returned whenever the model call fails.
pub const FALLBACK_PRICE: Decimal = Decimal::from_parts(2500, 0, 0, false, 2);

/// Reasoning attached to the flat motorcycle fare.
pub const URBAN_MOTO_REASONING: &str = "fixed urban moto fare";

/// Reasoning substituted when the model omits one.
pub const MISSING_REASONING: &str = "estimated fare";

/// Reasoning attached to the fallback quote.
pub const FALLBACK_REASONING: &str = "standard fallback estimate";

/// Origin text sent to the model for services without a pickup.
pub const CURRENT_LOCATION: &str = "current location";

/// Destination keywords (matched case-insensitively) that mark a trip as
/// leaving town.
pub const RURAL_KEYWORDS: [&str; 3] = ["rural", "sítio", "fazenda"];

/// What the client wants priced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuoteRequest {
    /// Vehicle category of the chosen driver.
    pub vehicle_type: VehicleType,
    /// Requested service.
    pub service_type: ServiceType,
    /// Pickup address, for services that have one.
    pub origin: Option<String>,
    /// Drop-off address.
    pub destination: String,
    /// Free-text notes.
    pub details: String,
}

impl QuoteRequest {
    /// Whether the destination names a rural place.
    #[must_use]
    pub fn is_rural(&self) -> bool {
        let destination = self.destination.to_lowercase();
        RURAL_KEYWORDS.iter().any(|k| destination.contains(k))
    }

    /// Whether the flat motorcycle fare applies: a motorcycle, an urban
    /// destination, and anything but freight.
    #[must_use]
    pub fn is_fixed_moto_fare(&self) -> bool {
        self.vehicle_type == VehicleType::Moto
            && !self.is_rural()
            && self.service_type != ServiceType::Freight
    }

    /// Origin text as the model sees it.
    #[must_use]
    pub fn origin_or_current(&self) -> &str {
        match self.origin.as_deref().map(str::trim) {
            Some(o) if !o.is_empty() => o,
            _ => CURRENT_LOCATION,
        }
    }
}

/// Unvalidated model answer. Either field may be missing or mistyped.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawQuote {
    /// Suggested price, expected to be a JSON number.
    #[serde(default)]
    pub price: Option<serde_json::Value>,
    /// Short explanation.
    #[serde(default)]
    pub reasoning: Option<String>,
}

impl RawQuote {
    /// Fills gaps: a missing, non-numeric, zero or negative price becomes
    /// [`MISSING_PRICE`]; a missing or blank reasoning becomes
    /// [`MISSING_REASONING`].
    #[must_use]
    pub fn into_quote(self) -> Quote {
        let price = self
            .price
            .as_ref()
            .and_then(serde_json::Value::as_f64)
            .filter(|p| p.is_finite() && *p > 0.0)
            .and_then(|p| Decimal::try_from(p).ok())
            .map(|p| p.round_dp(2))
            .filter(|p| *p > Decimal::ZERO)
            .unwrap_or(MISSING_PRICE);
        let reasoning = self
            .reasoning
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| MISSING_REASONING.to_string());
        Quote::new(price, reasoning)
    }
}

/// External price suggester.
#[async_trait]
pub trait PricingModel: Send + Sync + std::fmt::Debug {
    /// Asks the model for a price.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Pricing`] on any transport, status, or parse
    /// failure.
    async fn suggest(&self, request: &QuoteRequest) -> Result<RawQuote, AppError>;
}

/// Quote producer used by the workflow. Never fails.
#[derive(Debug, Clone)]
pub struct PricingClient {
    model: Arc<dyn PricingModel>,
}

impl PricingClient {
    /// Wraps a pricing model.
    #[must_use]
    pub fn new(model: Arc<dyn PricingModel>) -> Self {
        Self { model }
    }

    /// The fallback quote returned when the model fails.
    #[must_use]
    pub fn fallback_quote() -> Quote {
        Quote::new(FALLBACK_PRICE, FALLBACK_REASONING)
    }

    /// Prices a request.
    ///
    /// Urban motorcycle trips get [`MOTO_FIXED_PRICE`] without consulting
    /// the model. Everything else goes to the model exactly once; any
    /// failure yields [`Self::fallback_quote`].
    pub async fn quote(&self, request: &QuoteRequest) -> Quote {
        if request.is_fixed_moto_fare() {
            tracing::debug!(service = %request.service_type, "fixed urban moto fare");
            return Quote::new(MOTO_FIXED_PRICE, URBAN_MOTO_REASONING);
        }

        match self.model.suggest(request).await {
            Ok(raw) => {
                let quote = raw.into_quote();
                tracing::info!(
                    vehicle = %request.vehicle_type,
                    service = %request.service_type,
                    price = quote.price.to_f64().unwrap_or_default(),
                    "model quote"
                );
                quote
            }
            Err(e) => {
                tracing::warn!(error = %e, "pricing model failed; using fallback quote");
                Self::fallback_quote()
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    /// Pricing model double that counts calls and replays one answer,
    /// optionally after a delay.
    #[derive(Debug)]
    pub(crate) struct ScriptedModel {
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        delay: Duration,
        answer: Result<RawQuote, String>,
    }

    impl ScriptedModel {
        fn replaying(answer: Result<RawQuote, String>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                delay: Duration::ZERO,
                answer,
            }
        }

        pub(crate) fn answering(price: serde_json::Value, reasoning: &str) -> Self {
            Self::replaying(Ok(RawQuote {
                price: Some(price),
                reasoning: Some(reasoning.to_string()),
            }))
        }

        pub(crate) fn raw(raw: RawQuote) -> Self {
            Self::replaying(Ok(raw))
        }

        pub(crate) fn failing() -> Self {
            Self::replaying(Err("connection refused".to_string()))
        }

        /// Answers only after `delay`.
        pub(crate) fn slow(self, delay: Duration) -> Self {
            Self { delay, ..self }
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        /// Largest number of calls seen running at once.
        pub(crate) fn peak_concurrency(&self) -> usize {
            self.peak.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PricingModel for ScriptedModel {
        async fn suggest(&self, _request: &QuoteRequest) -> Result<RawQuote, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(running, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.answer.clone().map_err(AppError::Pricing)
        }
    }

    fn request(vehicle: VehicleType, service: ServiceType, destination: &str) -> QuoteRequest {
        QuoteRequest {
            vehicle_type: vehicle,
            service_type: service,
            origin: None,
            destination: destination.to_string(),
            details: String::new(),
        }
    }

    fn client(model: &Arc<ScriptedModel>) -> PricingClient {
        PricingClient::new(Arc::clone(model) as Arc<dyn PricingModel>)
    }

    #[tokio::test]
    async fn urban_moto_is_fixed_without_model_call() {
        let model = Arc::new(ScriptedModel::answering(serde_json::json!(99), "x"));
        let pricing = client(&model);

        for service in [ServiceType::Passenger, ServiceType::Delivery, ServiceType::Package] {
            let quote = pricing
                .quote(&request(VehicleType::Moto, service, "Rua Direita 5"))
                .await;
            assert_eq!(quote.price, Decimal::new(1000, 2));
        }
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn rural_keywords_route_to_model() {
        let model = Arc::new(ScriptedModel::answering(serde_json::json!(30), "rural trip"));
        let pricing = client(&model);

        for destination in ["Estrada RURAL km 3", "Sítio das Flores", "FAZENDA Boa Vista"] {
            let quote = pricing
                .quote(&request(VehicleType::Moto, ServiceType::Passenger, destination))
                .await;
            assert_eq!(quote.price, Decimal::new(30, 0));
        }
        assert_eq!(model.calls(), 3);
    }

    #[tokio::test]
    async fn moto_freight_routes_to_model() {
        let model = Arc::new(ScriptedModel::answering(serde_json::json!(60.5), "freight"));
        let quote = client(&model)
            .quote(&request(VehicleType::Moto, ServiceType::Freight, "Rua Direita 5"))
            .await;
        assert_eq!(quote.price, Decimal::new(6050, 2));
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn model_failure_yields_fallback() {
        let model = Arc::new(ScriptedModel::failing());
        let quote = client(&model)
            .quote(&request(VehicleType::Carro, ServiceType::Passenger, "Rua Rural 10"))
            .await;
        assert_eq!(quote.price, Decimal::new(2500, 2));
        assert_eq!(quote.reasoning, "standard fallback estimate");
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn unusable_price_is_substituted() {
        for price in [
            serde_json::json!("about thirty"),
            serde_json::json!(null),
            serde_json::json!(0),
            serde_json::json!(-15),
        ] {
            let model = Arc::new(ScriptedModel::answering(price, "odd"));
            let quote = client(&model)
                .quote(&request(VehicleType::Van, ServiceType::Freight, "Centro"))
                .await;
            assert_eq!(quote.price, Decimal::new(2000, 2));
            assert!(quote.price >= Decimal::ZERO);
        }
    }

    #[tokio::test]
    async fn missing_reasoning_gets_generic_label() {
        let model = Arc::new(ScriptedModel::raw(RawQuote {
            price: Some(serde_json::json!(18)),
            reasoning: None,
        }));
        let quote = client(&model)
            .quote(&request(VehicleType::Carro, ServiceType::Passenger, "Centro"))
            .await;
        assert_eq!(quote.reasoning, MISSING_REASONING);
        assert_eq!(quote.price, Decimal::new(18, 0));
    }

    #[test]
    fn origin_defaults_to_current_location() {
        let mut req = request(VehicleType::Carro, ServiceType::Passenger, "Centro");
        assert_eq!(req.origin_or_current(), CURRENT_LOCATION);
        req.origin = Some("Mercado Central".to_string());
        assert_eq!(req.origin_or_current(), "Mercado Central");
    }
}
