//! The single authenticated identity of this process.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Driver, User};
use crate::error::AppError;

/// Which kind of account an identity or entry point refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    /// Someone requesting services.
    Client,
    /// Someone fulfilling them.
    Driver,
}

impl AccountKind {
    /// Returns the discriminant text (`"client"` or `"driver"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Driver => "driver",
        }
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client" => Ok(Self::Client),
            "driver" => Ok(Self::Driver),
            other => Err(AppError::InvalidRequest(format!(
                "unknown account kind: {other}"
            ))),
        }
    }
}

/// An authenticated identity.
///
/// Serialized as `{"kind": "client" | "driver", "data": {...}}`, the
/// layout kept in the session store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "lowercase")]
pub enum Session {
    /// A client account.
    Client(User),
    /// A driver account.
    Driver(Driver),
}

impl Session {
    /// Returns the account kind.
    #[must_use]
    pub const fn kind(&self) -> AccountKind {
        match self {
            Self::Client(_) => AccountKind::Client,
            Self::Driver(_) => AccountKind::Driver,
        }
    }

    /// Returns the login phone of the account.
    #[must_use]
    pub fn phone(&self) -> &str {
        match self {
            Self::Client(user) => &user.phone,
            Self::Driver(driver) => &driver.phone,
        }
    }

    /// Returns the display name of the account.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Client(user) => &user.name,
            Self::Driver(driver) => &driver.name,
        }
    }

    /// Returns the driver record for driver sessions.
    #[must_use]
    pub const fn as_driver(&self) -> Option<&Driver> {
        match self {
            Self::Driver(driver) => Some(driver),
            Self::Client(_) => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{DriverRegistration, UserRegistration};

    #[test]
    fn client_session_uses_kind_data_layout() {
        let user = User::register(
            UserRegistration {
                name: "Ana".to_string(),
                phone: "35999990000".to_string(),
                address: "Rua Direita 5".to_string(),
            },
            "Santo Antônio do Amparo",
        );
        let json = serde_json::to_value(Session::Client(user)).unwrap_or_default();
        assert_eq!(json["kind"], "client");
        assert_eq!(json["data"]["phone"], "35999990000");
    }

    #[test]
    fn driver_session_parses_back() {
        let driver = Driver::register(DriverRegistration {
            name: "João".to_string(),
            phone: "35999990001".to_string(),
            ..DriverRegistration::default()
        });
        let session = Session::Driver(driver);
        let Ok(text) = serde_json::to_string(&session) else {
            panic!("serialization failed");
        };
        let Ok(parsed) = serde_json::from_str::<Session>(&text) else {
            panic!("deserialization failed");
        };
        assert_eq!(parsed, session);
        assert_eq!(parsed.kind(), AccountKind::Driver);
        assert!(parsed.as_driver().is_some());
    }

    #[test]
    fn client_tag_always_yields_client_identity() {
        // Driver-only fields under a client tag are dropped.
        let json = serde_json::json!({
            "kind": "client",
            "data": { "name": "X", "phone": "1", "vehicleType": "Moto" }
        });
        let parsed: Result<Session, _> = serde_json::from_value(json);
        let Ok(session) = parsed else {
            panic!("client payload should parse");
        };
        assert_eq!(session.kind(), AccountKind::Client);
        assert!(session.as_driver().is_none());
    }

    #[test]
    fn account_kind_parses_path_segments() {
        assert_eq!("client".parse::<AccountKind>().ok(), Some(AccountKind::Client));
        assert_eq!("driver".parse::<AccountKind>().ok(), Some(AccountKind::Driver));
        assert!("admin".parse::<AccountKind>().is_err());
    }
}
