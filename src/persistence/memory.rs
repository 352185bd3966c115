//! In-process storage backend.
//!
//! Used when `PERSISTENCE_ENABLED=false` and by tests. Rows are kept in
//! their stored form so reads go through the same mapping as PostgreSQL.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::models::{DriverRow, RideRow, UserRow};
use super::store::RideStore;
use crate::domain::{Driver, Ride, User};
use crate::error::AppError;

#[derive(Debug, Default)]
struct Tables {
    drivers: Vec<DriverRow>,
    users: Vec<UserRow>,
    /// Insertion order; the history reads it back to front.
    rides: Vec<RideRow>,
}

/// Volatile store holding rows in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    failing: AtomicBool,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-loaded with `drivers`.
    #[must_use]
    pub fn with_drivers(drivers: &[Driver]) -> Self {
        let tables = Tables {
            drivers: drivers.iter().map(DriverRow::from).collect(),
            ..Tables::default()
        };
        Self {
            tables: RwLock::new(tables),
            failing: AtomicBool::new(false),
        }
    }

    /// Makes every subsequent call fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of stored client rows.
    pub async fn user_count(&self) -> usize {
        self.tables.read().await.users.len()
    }

    /// Number of stored driver rows.
    pub async fn driver_count(&self) -> usize {
        self.tables.read().await.drivers.len()
    }

    fn check(&self) -> Result<(), AppError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Persistence("memory store unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RideStore for MemoryStore {
    async fn list_drivers(&self) -> Result<Vec<Driver>, AppError> {
        self.check()?;
        let tables = self.tables.read().await;
        tables
            .drivers
            .iter()
            .cloned()
            .map(Driver::try_from)
            .collect()
    }

    async fn insert_driver(&self, driver: &Driver) -> Result<(), AppError> {
        self.check()?;
        self.tables.write().await.drivers.push(DriverRow::from(driver));
        Ok(())
    }

    async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        self.check()?;
        self.tables.write().await.users.push(UserRow::from(user));
        Ok(())
    }

    async fn find_driver_by_phone(&self, phone: &str) -> Result<Option<Driver>, AppError> {
        self.check()?;
        let tables = self.tables.read().await;
        tables
            .drivers
            .iter()
            .find(|row| row.phone == phone)
            .cloned()
            .map(Driver::try_from)
            .transpose()
    }

    async fn find_user_by_phone(&self, phone: &str) -> Result<Option<User>, AppError> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|row| row.phone == phone)
            .cloned()
            .map(User::from))
    }

    async fn list_rides(&self) -> Result<Vec<Ride>, AppError> {
        self.check()?;
        let tables = self.tables.read().await;
        let mut rows: Vec<(usize, &RideRow)> = tables.rides.iter().enumerate().collect();
        // Newest timestamp first; later insertion wins a tie.
        rows.sort_by(|(ia, a), (ib, b)| b.created_at.cmp(&a.created_at).then(ib.cmp(ia)));
        rows.into_iter()
            .map(|(_, row)| Ride::try_from(row.clone()))
            .collect()
    }

    async fn insert_ride(&self, ride: &Ride) -> Result<(), AppError> {
        self.check()?;
        self.tables
            .write()
            .await
            .rides
            .push(RideRow::new(ride, Utc::now()));
        Ok(())
    }
}
