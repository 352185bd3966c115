//! Login and registration payloads.

use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::{DriverRegistration, UserRegistration};

/// Request body for `POST /auth/{kind}/login`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Phone number the account was registered with.
    pub phone: String,
}

/// Request body for `POST /auth/{kind}/register`.
///
/// One form for both entry points. Clients use `address`; drivers use the
/// vehicle fields. Fields that do not apply to the entry point are ignored.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// Display name.
    pub name: String,
    /// Phone number, unique across all accounts.
    pub phone: String,
    /// Client address. Defaults to the town name.
    #[serde(default)]
    pub address: String,
    /// Driver's vehicle model.
    #[serde(default)]
    pub vehicle_model: String,
    /// Driver's license plate.
    #[serde(default)]
    pub license_plate: String,
    /// Driver's license number.
    #[serde(default)]
    pub cnh: String,
}

impl From<RegisterRequest> for UserRegistration {
    fn from(req: RegisterRequest) -> Self {
        Self {
            name: req.name,
            phone: req.phone,
            address: req.address,
        }
    }
}

impl From<RegisterRequest> for DriverRegistration {
    fn from(req: RegisterRequest) -> Self {
        Self {
            name: req.name,
            phone: req.phone,
            vehicle_model: req.vehicle_model,
            license_plate: req.license_plate,
            cnh: req.cnh,
        }
    }
}
