//! Per-notification authenticity checks.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

use crate::error::NotifyError;
use crate::models::Notification;
use crate::subscriptions::{Subscription, SubscriptionResolver};

/// Authenticates a notification before the pipeline acts on it.
///
/// Two gates, each short-circuiting to a silent drop: the client-state
/// secret carried in the notification must match the process-wide secret,
/// and the subscription id must resolve in the store.
pub struct NotificationAuthenticator {
    resolver: Arc<dyn SubscriptionResolver>,
    client_state: SecretString,
}

impl NotificationAuthenticator {
    /// Create an authenticator over the given store and shared secret.
    pub fn new(resolver: Arc<dyn SubscriptionResolver>, client_state: SecretString) -> Self {
        Self {
            resolver,
            client_state,
        }
    }

    /// Authenticate a notification.
    ///
    /// `Ok(None)` means unauthenticated — the caller drops the notification
    /// without surfacing anything to the sender.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Store`] only when the subscription store
    /// itself fails; a miss is not an error.
    pub async fn authenticate(
        &self,
        notification: &Notification,
    ) -> Result<Option<Subscription>, NotifyError> {
        if !constant_time_eq(
            notification.client_state.as_bytes(),
            self.client_state.expose_secret().as_bytes(),
        ) {
            warn!(
                target: "notification_auth",
                subscription_id = %notification.subscription_id,
                "Client state mismatch, dropping notification"
            );
            return Ok(None);
        }

        match self.resolver.lookup(&notification.subscription_id).await? {
            Some(subscription) => {
                debug!(
                    subscription_id = %subscription.id,
                    user_id = %subscription.user_id,
                    "Notification authenticated"
                );
                Ok(Some(subscription))
            }
            None => {
                warn!(
                    target: "notification_auth",
                    subscription_id = %notification.subscription_id,
                    "No matching subscription, dropping notification"
                );
                Ok(None)
            }
        }
    }
}

/// Constant-time byte comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}
