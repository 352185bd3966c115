//! # amparo-rides
//!
//! Ride, delivery, package and freight requests for a single small town.
//!
//! A client picks a driver from the directory, describes the trip, gets a
//! price, chooses cash or PIX, and places the order. Drivers see their
//! earnings and pending rides. Urban motorcycle trips have a fixed fare;
//! everything else is priced by a generative model, with fixed fallbacks
//! whenever the model fails or answers badly.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── WorkflowController (service/)
//!     │     ├── WorkflowState machine (domain/)
//!     │     ├── PricingClient ── GenerativePricingModel
//!     │     └── SessionStore ── JSON file
//!     │
//!     └── PersistenceGateway (persistence/)
//!           ├── PostgreSQL
//!           └── in-memory store
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
