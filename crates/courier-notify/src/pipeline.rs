//! Batch orchestration: token gate, per-notification handling, dispatch.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, instrument, warn};

use courier_auth::TokenVerifier;

use crate::authenticator::NotificationAuthenticator;
use crate::crypto::ContentDecryptor;
use crate::dispatch::EventDispatcher;
use crate::error::FetchError;
use crate::models::{
    resource_kind, ChangeType, DispatchEvent, Notification, NotificationBatch, GENERIC_EVENT_TAG,
};

/// Fields requested from the enrichment fetch for created resources.
pub const DEFAULT_ENRICH_SELECT: &[&str] = &["id", "displayName"];

/// Read access to the remote resource graph, used to enrich plain
/// `created` notifications with a minimal projection of the new resource.
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    /// Fetch the resource at `resource_path`, projected to `select` fields.
    async fn get(
        &self,
        resource_path: &str,
        select: &[&str],
    ) -> Result<serde_json::Value, FetchError>;
}

/// Terminal state of a processed batch.
///
/// Both outcomes are acknowledged identically to the sender; suppression is
/// silent by design so validation failures never leak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    /// A validation token failed; nothing was dispatched.
    Suppressed,
    /// Every notification was handled (dispatched or skipped).
    Completed {
        /// Events published.
        dispatched: usize,
        /// Notifications dropped by an authentication, decryption, or
        /// enrichment gate.
        skipped: usize,
    },
}

/// Top-level orchestrator for inbound notification batches.
pub struct NotificationPipeline {
    verifier: Arc<TokenVerifier>,
    authenticator: NotificationAuthenticator,
    decryptor: Arc<ContentDecryptor>,
    fetcher: Arc<dyn ResourceFetcher>,
    dispatcher: EventDispatcher,
    enrich_select: Vec<String>,
}

impl NotificationPipeline {
    /// Assemble the pipeline from its collaborators.
    pub fn new(
        verifier: Arc<TokenVerifier>,
        authenticator: NotificationAuthenticator,
        decryptor: Arc<ContentDecryptor>,
        fetcher: Arc<dyn ResourceFetcher>,
        dispatcher: EventDispatcher,
    ) -> Self {
        Self {
            verifier,
            authenticator,
            decryptor,
            fetcher,
            dispatcher,
            enrich_select: DEFAULT_ENRICH_SELECT
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }

    /// Override the fields requested from the enrichment fetch.
    #[must_use]
    pub fn with_enrich_select(mut self, fields: Vec<String>) -> Self {
        self.enrich_select = fields;
        self
    }

    /// Process one inbound batch to completion.
    ///
    /// Batches carrying validation tokens are gated on all of them
    /// verifying; a single bad token suppresses the whole batch.
    /// Notifications are then handled independently, in input order,
    /// at-most-once — a failed notification is skipped, never retried, and
    /// never aborts its siblings.
    #[instrument(skip(self, batch), fields(notifications = batch.value.len()))]
    pub async fn process(&self, batch: &NotificationBatch) -> BatchOutcome {
        if let Some(tokens) = &batch.validation_tokens {
            if !tokens.is_empty() && !self.verifier.verify_all(tokens).await {
                warn!(
                    target: "notification_auth",
                    tokens = tokens.len(),
                    "Validation token check failed, suppressing batch"
                );
                return BatchOutcome::Suppressed;
            }
        }

        let mut dispatched = 0usize;
        let mut skipped = 0usize;
        for notification in &batch.value {
            if self.handle(notification).await {
                dispatched += 1;
            } else {
                skipped += 1;
            }
        }

        info!(dispatched, skipped, "Batch processed");
        BatchOutcome::Completed {
            dispatched,
            skipped,
        }
    }

    /// Handle a single notification. Returns whether an event was
    /// dispatched; every failure path is a silent skip.
    async fn handle(&self, notification: &Notification) -> bool {
        let subscription = match self.authenticator.authenticate(notification).await {
            Ok(Some(subscription)) => subscription,
            Ok(None) => return false,
            Err(err) => {
                warn!(
                    target: "notification_auth",
                    subscription_id = %notification.subscription_id,
                    error = %err,
                    "Subscription lookup failed, dropping notification"
                );
                return false;
            }
        };

        if let Some(content) = &notification.encrypted_content {
            // Confidential payload delivered inline: decrypt, no fetch.
            match self.decryptor.decrypt(content) {
                Ok(resource) => {
                    let event_type = event_tag(notification, Some(&resource));
                    self.dispatcher.publish(DispatchEvent {
                        subscription_id: subscription.id,
                        event_type,
                        resource,
                    });
                    true
                }
                Err(err) => {
                    warn!(
                        target: "notification_auth",
                        subscription_id = %notification.subscription_id,
                        error = %err,
                        "Encrypted content rejected, dropping notification"
                    );
                    false
                }
            }
        } else if notification.change_type == ChangeType::Created {
            // Plain creation: enrich with a projection of the new resource.
            let select: Vec<&str> = self.enrich_select.iter().map(String::as_str).collect();
            match self.fetcher.get(&notification.resource, &select).await {
                Ok(projection) => {
                    let event_type = event_tag(notification, Some(&projection));
                    self.dispatcher.publish(DispatchEvent {
                        subscription_id: subscription.id,
                        event_type,
                        resource: projection,
                    });
                    true
                }
                Err(err) => {
                    warn!(
                        target: "enrichment",
                        subscription_id = %notification.subscription_id,
                        resource = %notification.resource,
                        error = %err,
                        "Enrichment fetch failed, dropping notification"
                    );
                    false
                }
            }
        } else {
            // Notify-only policy for non-creation changes: no fetch, empty
            // resource body, generic tag.
            self.dispatcher.publish(DispatchEvent {
                subscription_id: subscription.id,
                event_type: GENERIC_EVENT_TAG.to_string(),
                resource: json!({}),
            });
            true
        }
    }
}

/// Resource-kind tag for a dispatched event: the notification's declared
/// OData type, falling back to the payload's own tag, then the generic tag.
fn event_tag(notification: &Notification, payload: Option<&serde_json::Value>) -> String {
    notification
        .resource_data
        .as_ref()
        .and_then(|data| data.odata_type.as_deref())
        .or_else(|| {
            payload
                .and_then(|p| p.get("@odata.type"))
                .and_then(serde_json::Value::as_str)
        })
        .map_or(GENERIC_EVENT_TAG, resource_kind)
        .to_string()
}
