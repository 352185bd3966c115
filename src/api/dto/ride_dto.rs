//! Ride history DTOs.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::Ride;

/// Response body for `GET /rides`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RideListResponse {
    /// Rides, newest first.
    pub data: Vec<Ride>,
    /// Number of rides.
    pub total: usize,
}
