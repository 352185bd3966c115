//! PostgreSQL implementation of the storage backend.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::models::{DriverRow, RideRow, UserRow};
use super::store::RideStore;
use crate::config::AppConfig;
use crate::domain::{Driver, Ride, User};
use crate::error::AppError;

const DRIVER_COLUMNS: &str = "id, name, vehicle_type, vehicle_model, license_plate, cnh, \
                              rating, available, trips, phone, coords";

const RIDE_COLUMNS: &str = "id, driver_name, vehicle_type, service_type, origin, destination, \
                            price, payment_method, date, status, created_at";

/// PostgreSQL-backed store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new store with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects with the pool settings from `config` and applies pending
    /// migrations.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] if the database is unreachable or
    /// a migration fails.
    pub async fn connect(config: &AppConfig) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(std::time::Duration::from_secs(
                config.database_connect_timeout_secs,
            ))
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::Persistence(e.to_string()))?;

        tracing::info!(
            max_connections = config.database_max_connections,
            "connected to postgres"
        );
        Ok(Self::new(pool))
    }
}

/// Converts rows, skipping (and logging) any that no longer map.
fn map_rows<R, T>(rows: Vec<R>, what: &'static str) -> Vec<T>
where
    T: TryFrom<R, Error = AppError>,
{
    rows.into_iter()
        .filter_map(|row| match T::try_from(row) {
            Ok(entity) => Some(entity),
            Err(e) => {
                tracing::warn!(error = %e, what, "skipping unreadable row");
                None
            }
        })
        .collect()
}

#[async_trait]
impl RideStore for PostgresStore {
    async fn list_drivers(&self) -> Result<Vec<Driver>, AppError> {
        let rows = sqlx::query_as::<_, DriverRow>(&format!(
            "SELECT {DRIVER_COLUMNS} FROM drivers ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(map_rows(rows, "driver"))
    }

    async fn insert_driver(&self, driver: &Driver) -> Result<(), AppError> {
        let row = DriverRow::from(driver);
        sqlx::query(&format!(
            "INSERT INTO drivers ({DRIVER_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"
        ))
        .bind(&row.id)
        .bind(&row.name)
        .bind(&row.vehicle_type)
        .bind(&row.vehicle_model)
        .bind(&row.license_plate)
        .bind(&row.cnh)
        .bind(row.rating)
        .bind(row.available)
        .bind(row.trips)
        .bind(&row.phone)
        .bind(&row.coords)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        let row = UserRow::from(user);
        sqlx::query("INSERT INTO users (name, phone, address) VALUES ($1, $2, $3)")
            .bind(&row.name)
            .bind(&row.phone)
            .bind(&row.address)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn find_driver_by_phone(&self, phone: &str) -> Result<Option<Driver>, AppError> {
        let row = sqlx::query_as::<_, DriverRow>(&format!(
            "SELECT {DRIVER_COLUMNS} FROM drivers WHERE phone = $1 LIMIT 1"
        ))
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Driver::try_from).transpose()
    }

    async fn find_user_by_phone(&self, phone: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT name, phone, address FROM users WHERE phone = $1 LIMIT 1",
        )
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn list_rides(&self) -> Result<Vec<Ride>, AppError> {
        let rows = sqlx::query_as::<_, RideRow>(&format!(
            "SELECT {RIDE_COLUMNS} FROM rides ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(map_rows(rows, "ride"))
    }

    async fn insert_ride(&self, ride: &Ride) -> Result<(), AppError> {
        let row = RideRow::new(ride, Utc::now());
        sqlx::query(&format!(
            "INSERT INTO rides ({RIDE_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"
        ))
        .bind(&row.id)
        .bind(&row.driver_name)
        .bind(&row.vehicle_type)
        .bind(&row.service_type)
        .bind(&row.origin)
        .bind(&row.destination)
        .bind(row.price)
        .bind(&row.payment_method)
        .bind(&row.date)
        .bind(&row.status)
        .bind(row.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
