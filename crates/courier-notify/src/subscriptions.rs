//! Subscription records and the lookup seam to the external store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::NotifyError;

/// A change-notification subscription, as owned by the external store.
///
/// The pipeline only ever reads these records; creation and renewal happen
/// elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    /// Subscription id assigned by the remote service.
    pub id: String,

    /// Local user that owns the subscription.
    pub user_id: Uuid,

    /// Client-state secret negotiated at subscription time.
    pub client_state: String,

    /// When the subscription lapses.
    pub expires_at: DateTime<Utc>,
}

/// Lookup-only interface to the subscription store.
#[async_trait]
pub trait SubscriptionResolver: Send + Sync {
    /// Find the subscription with the given id, if any.
    async fn lookup(&self, subscription_id: &str) -> Result<Option<Subscription>, NotifyError>;
}

/// In-memory subscription store.
///
/// Backs tests and single-process deployments; a persistent store plugs in
/// through the same [`SubscriptionResolver`] seam.
#[derive(Debug, Clone, Default)]
pub struct InMemorySubscriptionStore {
    inner: Arc<RwLock<HashMap<String, Subscription>>>,
}

impl InMemorySubscriptionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a subscription record.
    pub async fn insert(&self, subscription: Subscription) {
        let mut inner = self.inner.write().await;
        inner.insert(subscription.id.clone(), subscription);
    }

    /// Remove a subscription record.
    pub async fn remove(&self, subscription_id: &str) {
        let mut inner = self.inner.write().await;
        inner.remove(subscription_id);
    }
}

#[async_trait]
impl SubscriptionResolver for InMemorySubscriptionStore {
    async fn lookup(&self, subscription_id: &str) -> Result<Option<Subscription>, NotifyError> {
        let inner = self.inner.read().await;
        Ok(inner.get(subscription_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn subscription(id: &str) -> Subscription {
        Subscription {
            id: id.to_string(),
            user_id: Uuid::new_v4(),
            client_state: "secret".to_string(),
            expires_at: Utc::now() + Duration::hours(1),
        }
    }

    #[tokio::test]
    async fn lookup_hits_and_misses() {
        let store = InMemorySubscriptionStore::new();
        store.insert(subscription("sub-1")).await;

        let hit = store.lookup("sub-1").await.unwrap();
        assert_eq!(hit.unwrap().id, "sub-1");

        let miss = store.lookup("sub-2").await.unwrap();
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn remove_drops_record() {
        let store = InMemorySubscriptionStore::new();
        store.insert(subscription("sub-1")).await;
        store.remove("sub-1").await;

        assert!(store.lookup("sub-1").await.unwrap().is_none());
    }
}
