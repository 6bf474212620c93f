//! Axum router for the notification webhook.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::pipeline::NotificationPipeline;

/// Shared state for the webhook handlers.
#[derive(Clone)]
pub struct NotifyState {
    pub pipeline: Arc<NotificationPipeline>,
}

impl NotifyState {
    /// Create the handler state.
    pub fn new(pipeline: Arc<NotificationPipeline>) -> Self {
        Self { pipeline }
    }
}

/// Creates the webhook router.
pub fn notifications_router(state: NotifyState) -> Router {
    Router::new()
        .route("/notifications", post(handlers::receive_notifications))
        .route("/health", get(handlers::health))
        .with_state(state)
}
