//! REST endpoint handlers organized by resource.

pub mod auth;
pub mod drivers;
pub mod rides;
pub mod system;
pub mod workflow;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth::routes())
        .merge(drivers::routes())
        .merge(workflow::routes())
        .merge(rides::routes())
}
