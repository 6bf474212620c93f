//! Webhook request handlers.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::models::NotificationBatch;
use crate::router::NotifyState;

/// Query parameters of the webhook endpoint.
#[derive(Debug, Deserialize)]
pub struct ChallengeParams {
    /// Present on the liveness/ownership-proof challenge the remote
    /// service sends when a subscription is created or renewed.
    #[serde(rename = "validationToken")]
    pub validation_token: Option<String>,
}

/// Webhook intake: challenge echo or notification batch.
///
/// Challenge requests are answered by echoing the token back verbatim as
/// plain text; they never reach the pipeline. Batches are processed and
/// acknowledged with `202 Accepted` no matter how many notifications were
/// actually dispatched — suppressed batches included, so the sender never
/// learns which check failed.
#[instrument(skip_all)]
pub async fn receive_notifications(
    State(state): State<NotifyState>,
    Query(params): Query<ChallengeParams>,
    body: String,
) -> Response {
    if let Some(token) = params.validation_token {
        debug!("Answering subscription validation challenge");
        return (StatusCode::OK, token).into_response();
    }

    let batch: NotificationBatch = match serde_json::from_str(&body) {
        Ok(batch) => batch,
        Err(err) => {
            // No batch was ever received; this is a transport error, not a
            // suppressed batch.
            warn!(error = %err, "Webhook body is not a notification batch");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let outcome = state.pipeline.process(&batch).await;
    debug!(?outcome, "Batch acknowledged");

    StatusCode::ACCEPTED.into_response()
}

/// Liveness probe.
pub async fn health() -> StatusCode {
    StatusCode::OK
}
