//! Database row models and their mapping to domain entities.
//!
//! Rows use the store's snake_case column names. The mapping in both
//! directions is field-for-field; the only adjustments happen on read,
//! where absent optional columns become empty strings (or cash, for the
//! payment method).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;

use crate::domain::{Driver, PaymentMethod, Position, Ride, User};
use crate::error::AppError;

/// A row of the `drivers` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DriverRow {
    /// Opaque driver id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Vehicle category label.
    pub vehicle_type: String,
    /// Vehicle make and model.
    pub vehicle_model: Option<String>,
    /// License plate.
    pub license_plate: Option<String>,
    /// Driver's license number.
    pub cnh: Option<String>,
    /// Average rating.
    pub rating: f64,
    /// Availability flag.
    pub available: bool,
    /// Completed trips.
    pub trips: i32,
    /// Login phone.
    pub phone: String,
    /// Map placement as JSONB `{x, y}`.
    pub coords: Json<Position>,
}

/// A row of the `users` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRow {
    /// Display name.
    pub name: String,
    /// Login phone.
    pub phone: String,
    /// Home address.
    pub address: Option<String>,
}

/// A row of the `rides` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RideRow {
    /// Opaque ride id.
    pub id: String,
    /// Driver display name.
    pub driver_name: String,
    /// Vehicle category label.
    pub vehicle_type: String,
    /// Service label.
    pub service_type: String,
    /// Pickup address.
    pub origin: Option<String>,
    /// Drop-off address.
    pub destination: String,
    /// Price in BRL.
    pub price: Decimal,
    /// Payment method label.
    pub payment_method: Option<String>,
    /// Creation date text.
    pub date: String,
    /// Status label.
    pub status: String,
    /// Server-side insertion timestamp; orders the history.
    pub created_at: DateTime<Utc>,
}

impl From<&Driver> for DriverRow {
    fn from(d: &Driver) -> Self {
        Self {
            id: d.id.to_string(),
            name: d.name.clone(),
            vehicle_type: d.vehicle_type.as_str().to_string(),
            vehicle_model: Some(d.vehicle_model.clone()),
            license_plate: Some(d.license_plate.clone()),
            cnh: Some(d.cnh.clone()),
            rating: d.rating,
            available: d.available,
            trips: i32::try_from(d.trips).unwrap_or(i32::MAX),
            phone: d.phone.clone(),
            coords: Json(d.coords),
        }
    }
}

impl TryFrom<DriverRow> for Driver {
    type Error = AppError;

    fn try_from(row: DriverRow) -> Result<Self, Self::Error> {
        let vehicle_type = row.vehicle_type.parse().map_err(|_| {
            AppError::Persistence(format!(
                "driver {} has unknown vehicle type {:?}",
                row.id, row.vehicle_type
            ))
        })?;
        Ok(Self {
            id: row.id.into(),
            name: row.name,
            vehicle_type,
            vehicle_model: row.vehicle_model.unwrap_or_default(),
            license_plate: row.license_plate.unwrap_or_default(),
            cnh: row.cnh.unwrap_or_default(),
            rating: row.rating,
            available: row.available,
            trips: u32::try_from(row.trips).unwrap_or(0),
            phone: row.phone,
            coords: row.coords.0,
        })
    }
}

impl From<&User> for UserRow {
    fn from(u: &User) -> Self {
        Self {
            name: u.name.clone(),
            phone: u.phone.clone(),
            address: Some(u.address.clone()),
        }
    }
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            name: row.name,
            phone: row.phone,
            address: row.address.unwrap_or_default(),
        }
    }
}

impl RideRow {
    /// Builds the row for a new ride stamped with `created_at`.
    #[must_use]
    pub fn new(ride: &Ride, created_at: DateTime<Utc>) -> Self {
        Self {
            id: ride.id.to_string(),
            driver_name: ride.driver_name.clone(),
            vehicle_type: ride.vehicle_type.as_str().to_string(),
            service_type: ride.service_type.clone(),
            origin: ride.origin.clone(),
            destination: ride.destination.clone(),
            price: ride.price,
            payment_method: Some(ride.payment_method.as_str().to_string()),
            date: ride.date.clone(),
            status: ride.status.as_str().to_string(),
            created_at,
        }
    }
}

impl TryFrom<RideRow> for Ride {
    type Error = AppError;

    fn try_from(row: RideRow) -> Result<Self, Self::Error> {
        let vehicle_type = row.vehicle_type.parse().map_err(|_| {
            AppError::Persistence(format!(
                "ride {} has unknown vehicle type {:?}",
                row.id, row.vehicle_type
            ))
        })?;
        let status = row.status.parse().map_err(|_| {
            AppError::Persistence(format!("ride {} has unknown status {:?}", row.id, row.status))
        })?;
        Ok(Self {
            id: row.id.into(),
            driver_name: row.driver_name,
            vehicle_type,
            service_type: row.service_type,
            origin: row.origin,
            destination: row.destination,
            price: row.price,
            payment_method: PaymentMethod::from_stored(row.payment_method.as_deref()),
            date: row.date,
            status,
        })
    }
}
