//! Non-throwing facade over a [`RideStore`].
//!
//! Every operation is attempted exactly once. Failures never cross this
//! boundary: reads degrade to an empty result, writes become a logged
//! no-op.

use std::sync::Arc;

use crate::domain::{Driver, Ride, Session, User};

use super::store::RideStore;

/// Entry point the workflow uses for all stored data.
#[derive(Debug, Clone)]
pub struct PersistenceGateway {
    store: Arc<dyn RideStore>,
}

impl PersistenceGateway {
    /// Wraps a storage backend.
    #[must_use]
    pub fn new(store: Arc<dyn RideStore>) -> Self {
        Self { store }
    }

    /// Returns all drivers, or an empty list if the store fails.
    pub async fn list_drivers(&self) -> Vec<Driver> {
        match self.store.list_drivers().await {
            Ok(drivers) => drivers,
            Err(e) => {
                tracing::error!(error = %e, "failed to list drivers");
                Vec::new()
            }
        }
    }

    /// Inserts a driver record. Best effort.
    pub async fn register_driver(&self, driver: &Driver) {
        match self.store.insert_driver(driver).await {
            Ok(()) => tracing::info!(driver_id = %driver.id, "driver registered"),
            Err(e) => tracing::error!(error = %e, driver_id = %driver.id, "failed to register driver"),
        }
    }

    /// Inserts a client record. Best effort.
    pub async fn register_user(&self, user: &User) {
        match self.store.insert_user(user).await {
            Ok(()) => tracing::info!(phone = %user.phone, "client registered"),
            Err(e) => tracing::error!(error = %e, phone = %user.phone, "failed to register client"),
        }
    }

    /// Looks up the account owning `phone`.
    ///
    /// Drivers are checked first, so if a phone were ever present in both
    /// collections the driver account wins. Returns `None` when nothing
    /// matches or the store fails.
    pub async fn find_account_by_phone(&self, phone: &str) -> Option<Session> {
        match self.store.find_driver_by_phone(phone).await {
            Ok(Some(driver)) => return Some(Session::Driver(driver)),
            Ok(None) => {}
            Err(e) => {
                tracing::error!(error = %e, "login lookup failed");
                return None;
            }
        }
        match self.store.find_user_by_phone(phone).await {
            Ok(user) => user.map(Session::Client),
            Err(e) => {
                tracing::error!(error = %e, "login lookup failed");
                None
            }
        }
    }

    /// Returns every ride, newest first, or an empty list if the store
    /// fails.
    pub async fn list_ride_history(&self) -> Vec<Ride> {
        match self.store.list_rides().await {
            Ok(rides) => rides,
            Err(e) => {
                tracing::error!(error = %e, "failed to load ride history");
                Vec::new()
            }
        }
    }

    /// Inserts a ride record. Best effort.
    pub async fn record_ride(&self, ride: &Ride) {
        match self.store.insert_ride(ride).await {
            Ok(()) => tracing::info!(ride_id = %ride.id, driver = %ride.driver_name, "ride recorded"),
            Err(e) => tracing::error!(error = %e, ride_id = %ride.id, "failed to record ride"),
        }
    }
}
