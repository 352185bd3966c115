//! Driver directory DTOs.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Driver, DriverId, ServiceType, VehicleType};
use crate::error::AppError;

/// Query parameters for `GET /drivers`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DriverQuery {
    /// Vehicle category (`moto`, `carro`, `van`; case-insensitive).
    /// Omitted or `all` lists every driver.
    #[serde(default)]
    pub vehicle_type: Option<String>,
}

impl DriverQuery {
    /// Parses the category filter.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidRequest`] for an unknown category.
    pub fn filter(&self) -> Result<Option<VehicleType>, AppError> {
        match self.vehicle_type.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(all) if all.eq_ignore_ascii_case("all") => Ok(None),
            Some(v) => v.parse().map(Some),
        }
    }
}

/// A directory entry with the services its vehicle takes.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DriverDto {
    /// The driver record.
    #[serde(flatten)]
    pub driver: Driver,
    /// Services that may be requested from this driver.
    pub services: Vec<ServiceType>,
}

impl From<Driver> for DriverDto {
    fn from(driver: Driver) -> Self {
        Self {
            services: driver.vehicle_type.services(),
            driver,
        }
    }
}

/// Response body for `GET /drivers`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DriverListResponse {
    /// Matching drivers.
    pub data: Vec<DriverDto>,
    /// Number of matching drivers.
    pub total: usize,
}

/// Request body for `POST /workflow/driver`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SelectDriverRequest {
    /// Directory id of the driver.
    pub driver_id: DriverId,
}
