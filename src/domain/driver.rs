//! Driver accounts and vehicle categories.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{DriverId, ServiceType};
use crate::error::AppError;

/// Vehicle category a driver operates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum VehicleType {
    /// Motorcycle.
    Moto,
    /// Passenger car.
    Carro,
    /// Van, used for freight and moves.
    Van,
}

impl VehicleType {
    /// All categories in directory display order.
    pub const ALL: [Self; 3] = [Self::Moto, Self::Carro, Self::Van];

    /// Returns the stored label (`"Moto"`, `"Carro"`, `"Van"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Moto => "Moto",
            Self::Carro => "Carro",
            Self::Van => "Van",
        }
    }

    /// Whether drivers of this category take `service`. Motorcycles do
    /// not haul freight; vans do not run small deliveries.
    #[must_use]
    pub const fn offers(self, service: ServiceType) -> bool {
        !matches!(
            (self, service),
            (Self::Moto, ServiceType::Freight) | (Self::Van, ServiceType::Delivery)
        )
    }

    /// Services this category takes, in menu order.
    #[must_use]
    pub fn services(self) -> Vec<ServiceType> {
        ServiceType::ALL
            .into_iter()
            .filter(|s| self.offers(*s))
            .collect()
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AppError::InvalidRequest(format!("unknown vehicle type: {s}")))
    }
}

/// Display placement on the town map, in percent of width and height.
///
/// Not geospatial: it only positions a marker on a static background.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Position {
    /// Horizontal offset, 0–100.
    pub x: f64,
    /// Vertical offset, 0–100.
    pub y: f64,
}

impl Position {
    /// Creates a position, clamping both axes into `0..=100`.
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: clamp_percent(x),
            y: clamp_percent(y),
        }
    }

    /// Map centre, where newly registered drivers are placed.
    #[must_use]
    pub const fn centre() -> Self {
        Self { x: 50.0, y: 50.0 }
    }
}

fn clamp_percent(v: f64) -> f64 {
    if v.is_nan() { 50.0 } else { v.clamp(0.0, 100.0) }
}

/// A registered service provider.
///
/// `rating`, `trips` and `available` are maintained by processes outside
/// this service; nothing here mutates them after registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    /// Opaque identifier.
    pub id: DriverId,
    /// Display name. Rides reference drivers by this value.
    pub name: String,
    /// Vehicle category.
    pub vehicle_type: VehicleType,
    /// Vehicle make and model.
    pub vehicle_model: String,
    /// License plate.
    pub license_plate: String,
    /// Driver's license registration number (CNH). Empty when unknown.
    #[serde(default)]
    pub cnh: String,
    /// Average rating, 0.0–5.0.
    pub rating: f64,
    /// Whether the driver is currently taking requests.
    pub available: bool,
    /// Completed trip counter.
    pub trips: u32,
    /// Phone number; also the login key.
    pub phone: String,
    /// Map placement.
    pub coords: Position,
}

/// Fields a prospective driver submits to register.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DriverRegistration {
    /// Display name.
    pub name: String,
    /// Phone number (login key).
    pub phone: String,
    /// Vehicle make and model.
    #[serde(default)]
    pub vehicle_model: String,
    /// License plate.
    #[serde(default)]
    pub license_plate: String,
    /// Driver's license registration number.
    #[serde(default)]
    pub cnh: String,
}

impl Driver {
    /// Builds the record for a newly registered driver.
    ///
    /// New drivers start as available motorcycle riders with a perfect
    /// rating, no trips, and a marker at the map centre.
    #[must_use]
    pub fn register(form: DriverRegistration) -> Self {
        Self {
            id: DriverId::generate(),
            name: form.name.trim().to_string(),
            vehicle_type: VehicleType::Moto,
            vehicle_model: form.vehicle_model,
            license_plate: form.license_plate,
            cnh: form.cnh,
            rating: 5.0,
            available: true,
            trips: 0,
            phone: form.phone.trim().to_string(),
            coords: Position::centre(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vehicle_type_parses_case_insensitively() {
        assert_eq!("carro".parse::<VehicleType>().ok(), Some(VehicleType::Carro));
        assert_eq!(" VAN ".parse::<VehicleType>().ok(), Some(VehicleType::Van));
        assert!("truck".parse::<VehicleType>().is_err());
    }

    #[test]
    fn position_clamps_to_percent_range() {
        let p = Position::new(-5.0, 140.0);
        assert!((p.x - 0.0).abs() < f64::EPSILON);
        assert!((p.y - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn registration_defaults() {
        let driver = Driver::register(DriverRegistration {
            name: " Joana ".to_string(),
            phone: "35999990001".to_string(),
            vehicle_model: "Honda CG 160".to_string(),
            license_plate: "ABC-1234".to_string(),
            cnh: String::new(),
        });
        assert_eq!(driver.name, "Joana");
        assert_eq!(driver.vehicle_type, VehicleType::Moto);
        assert!(driver.available);
        assert_eq!(driver.trips, 0);
        assert!((driver.rating - 5.0).abs() < f64::EPSILON);
        assert_eq!(driver.coords, Position::centre());
    }

    #[test]
    fn missing_cnh_deserializes_as_empty() {
        let json = serde_json::json!({
            "id": "1",
            "name": "João Silva",
            "vehicleType": "Moto",
            "vehicleModel": "Honda CG 160",
            "licensePlate": "ABC-1234",
            "rating": 4.8,
            "available": true,
            "trips": 1240,
            "phone": "(35) 99901-0001",
            "coords": { "x": 45.0, "y": 55.0 }
        });
        let driver: Result<Driver, _> = serde_json::from_value(json);
        assert_eq!(driver.ok().map(|d| d.cnh), Some(String::new()));
    }

    #[test]
    fn motorcycles_skip_freight_and_vans_skip_delivery() {
        assert!(!VehicleType::Moto.offers(ServiceType::Freight));
        assert!(!VehicleType::Van.offers(ServiceType::Delivery));
        assert_eq!(VehicleType::Carro.services(), ServiceType::ALL.to_vec());
        assert_eq!(
            VehicleType::Moto.services(),
            vec![ServiceType::Passenger, ServiceType::Delivery, ServiceType::Package]
        );
        assert_eq!(
            VehicleType::Van.services(),
            vec![ServiceType::Passenger, ServiceType::Package, ServiceType::Freight]
        );
    }
}
