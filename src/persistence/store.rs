//! Storage backend seam.

use async_trait::async_trait;

use crate::domain::{Driver, Ride, User};
use crate::error::AppError;

/// Fallible access to the three entity collections.
///
/// Implementations report every failure as an [`AppError`]; the
/// [`super::PersistenceGateway`] above them decides how failures degrade.
/// No implementation enforces phone uniqueness.
#[async_trait]
pub trait RideStore: Send + Sync + std::fmt::Debug {
    /// Returns every driver.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] if the backend fails.
    async fn list_drivers(&self) -> Result<Vec<Driver>, AppError>;

    /// Inserts a driver.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] if the backend fails.
    async fn insert_driver(&self, driver: &Driver) -> Result<(), AppError>;

    /// Inserts a client.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] if the backend fails.
    async fn insert_user(&self, user: &User) -> Result<(), AppError>;

    /// Returns the first driver registered under `phone`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] if the backend fails.
    async fn find_driver_by_phone(&self, phone: &str) -> Result<Option<Driver>, AppError>;

    /// Returns the first client registered under `phone`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] if the backend fails.
    async fn find_user_by_phone(&self, phone: &str) -> Result<Option<User>, AppError>;

    /// Returns every ride, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] if the backend fails.
    async fn list_rides(&self) -> Result<Vec<Ride>, AppError>;

    /// Inserts a ride.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] if the backend fails.
    async fn insert_ride(&self, ride: &Ride) -> Result<(), AppError>;
}
