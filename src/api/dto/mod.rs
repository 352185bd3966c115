//! Data Transfer Objects for REST request/response serialization.

pub mod auth_dto;
pub mod driver_dto;
pub mod ride_dto;
pub mod state_dto;

pub use auth_dto::*;
pub use driver_dto::*;
pub use ride_dto::*;
pub use state_dto::*;
