//! Service layer: pricing, session storage, and the workflow controller.
//!
//! [`WorkflowController`] drives the request flow and calls into
//! [`PricingClient`], [`SessionStore`], and the persistence gateway.

pub mod generative;
pub mod pricing;
pub mod session_store;
pub mod workflow;

pub use generative::GenerativePricingModel;
pub use pricing::{PricingClient, PricingModel, QuoteRequest};
pub use session_store::{JsonFileStore, KeyValueStore, SessionStore};
pub use workflow::{DriverDashboard, TripEdit, WorkflowController, WorkflowSettings};
