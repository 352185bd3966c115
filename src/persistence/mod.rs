//! Persistence layer: driver, client and ride collections.
//!
//! [`RideStore`] is the fallible backend seam, with a PostgreSQL
//! implementation and an in-memory one. [`PersistenceGateway`] sits on top
//! and turns every backend failure into an empty result or a logged
//! no-op, so callers never handle storage errors.

pub mod gateway;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod seed;
pub mod store;

pub use gateway::PersistenceGateway;
pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use store::RideStore;
