//! Domain layer: accounts, rides, quotes, and the request workflow.
//!
//! This module contains the entity model shared with the store, the
//! tagged session identity, and the pure state machine that drives the
//! request → quote → confirm flow.

pub mod driver;
pub mod ids;
pub mod quote;
pub mod ride;
pub mod session;
pub mod user;
pub mod workflow;

pub use driver::{Driver, DriverRegistration, Position, VehicleType};
pub use ids::{DriverId, RideId};
pub use quote::Quote;
pub use ride::{PIX_KEY, PaymentMethod, Ride, RideStatus, ServiceType};
pub use session::{AccountKind, Session};
pub use user::{User, UserRegistration};
pub use workflow::{Event, Phase, Transaction, WorkflowState};
