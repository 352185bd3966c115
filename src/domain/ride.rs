//! Ride requests and their vocabulary: service types, payment methods,
//! and status.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{RideId, VehicleType};
use crate::error::AppError;

/// Kind of service a client requests.
///
/// Serialized as the label stored in `rides.service_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum ServiceType {
    /// Carrying a passenger.
    #[serde(rename = "Passageiro")]
    Passenger,
    /// Food or small-item delivery with a pickup.
    #[serde(rename = "Entrega (Comida/Pequeno)")]
    Delivery,
    /// Parcel delivery with a pickup.
    #[serde(rename = "Encomenda/Pacote")]
    Package,
    /// Freight or house move.
    #[serde(rename = "Frete/Mudança")]
    Freight,
}

impl ServiceType {
    /// All service types in menu order.
    pub const ALL: [Self; 4] = [Self::Passenger, Self::Delivery, Self::Package, Self::Freight];

    /// Returns the stored label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Passenger => "Passageiro",
            Self::Delivery => "Entrega (Comida/Pequeno)",
            Self::Package => "Encomenda/Pacote",
            Self::Freight => "Frete/Mudança",
        }
    }

    /// Whether the service picks something up, so an origin is required.
    #[must_use]
    pub const fn requires_origin(self) -> bool {
        matches!(self, Self::Delivery | Self::Package)
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ServiceType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.label() == s.trim())
            .ok_or_else(|| AppError::InvalidRequest(format!("unknown service type: {s}")))
    }
}

/// PIX key shown to clients paying by instant transfer. The payment itself
/// is settled with the driver.
pub const PIX_KEY: &str = "saa.drivers@email.com";

/// How the client pays the driver. Settled directly between the two
/// parties; no money moves through this service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMethod {
    /// Cash.
    #[default]
    Dinheiro,
    /// Instant bank transfer.
    Pix,
}

impl PaymentMethod {
    /// Returns the stored label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dinheiro => "DINHEIRO",
            Self::Pix => "PIX",
        }
    }

    /// Parses a stored label. Anything unrecognised, including a missing
    /// value, reads as cash.
    #[must_use]
    pub fn from_stored(label: Option<&str>) -> Self {
        match label.map(str::trim) {
            Some(l) if l.eq_ignore_ascii_case("PIX") => Self::Pix,
            _ => Self::Dinheiro,
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a ride.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RideStatus {
    /// Requested, not yet handled by the driver.
    #[default]
    Pending,
    /// Finished.
    Completed,
    /// Called off.
    Cancelled,
}

impl RideStatus {
    /// Returns the stored label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl FromStr for RideStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(AppError::InvalidRequest(format!(
                "unknown ride status: {other}"
            ))),
        }
    }
}

/// One service request.
///
/// The driver is referenced by display name, which is how existing rows
/// are keyed; ownership queries match that name exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Ride {
    /// Opaque identifier.
    pub id: RideId,
    /// Display name of the assigned driver.
    pub driver_name: String,
    /// Vehicle category of the assigned driver.
    pub vehicle_type: VehicleType,
    /// Service label (one of the [`ServiceType`] labels).
    pub service_type: String,
    /// Pickup address, when any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    /// Drop-off address.
    pub destination: String,
    /// Agreed price in BRL.
    #[schema(value_type = f64)]
    pub price: Decimal,
    /// How the client pays.
    pub payment_method: PaymentMethod,
    /// Creation date, `dd/mm/YYYY`.
    pub date: String,
    /// Lifecycle status.
    pub status: RideStatus,
}

impl Ride {
    /// Checks the record invariants: non-negative price, non-empty
    /// destination, and an origin for pickup services.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidRequest`] naming the first violated rule.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.price < Decimal::ZERO {
            return Err(AppError::InvalidRequest(
                "ride price must not be negative".to_string(),
            ));
        }
        if self.destination.trim().is_empty() {
            return Err(AppError::InvalidRequest(
                "ride destination is required".to_string(),
            ));
        }
        let needs_origin = self
            .service_type
            .parse::<ServiceType>()
            .is_ok_and(ServiceType::requires_origin);
        let has_origin = self.origin.as_deref().is_some_and(|o| !o.trim().is_empty());
        if needs_origin && !has_origin {
            return Err(AppError::InvalidRequest(format!(
                "origin is required for {}",
                self.service_type
            )));
        }
        Ok(())
    }
}
