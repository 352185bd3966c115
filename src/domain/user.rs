//! Client accounts.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A registered client: someone who requests rides, deliveries or freight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Display name.
    pub name: String,
    /// Phone number; also the login key.
    pub phone: String,
    /// Free-text home address. Empty when unknown.
    #[serde(default)]
    pub address: String,
}

/// Fields a prospective client submits to register.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
pub struct UserRegistration {
    /// Display name.
    pub name: String,
    /// Phone number (login key).
    pub phone: String,
    /// Home address; blank falls back to the town name.
    #[serde(default)]
    pub address: String,
}

impl User {
    /// Builds the record for a newly registered client.
    #[must_use]
    pub fn register(form: UserRegistration, default_address: &str) -> Self {
        let address = if form.address.trim().is_empty() {
            default_address.to_string()
        } else {
            form.address.trim().to_string()
        };
        Self {
            name: form.name.trim().to_string(),
            phone: form.phone.trim().to_string(),
            address,
        }
    }
}
