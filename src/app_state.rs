//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::service::WorkflowController;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The one workflow controller this process serves.
    pub controller: Arc<WorkflowController>,
}

impl AppState {
    /// Wraps a controller.
    #[must_use]
    pub fn new(controller: Arc<WorkflowController>) -> Self {
        Self { controller }
    }
}
