//! Change-notification validation, decryption, and dispatch pipeline.
//!
//! Receives notification batches pushed by the remote resource-graph
//! service, verifies their validation tokens, authenticates each
//! notification against the shared client-state secret and the subscription
//! store, decrypts inline encrypted content, and publishes normalized
//! events to the channel owned by the matching subscription.
//!
//! Per-notification failures are swallowed by design: the sender always
//! gets an acknowledgement and never learns which check failed.

pub mod authenticator;
pub mod crypto;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod models;
pub mod pipeline;
pub mod router;
pub mod subscriptions;

pub use authenticator::NotificationAuthenticator;
pub use crypto::ContentDecryptor;
pub use dispatch::EventDispatcher;
pub use error::{DecryptError, FetchError, NotifyError};
pub use models::{
    resource_kind, ChangeType, DispatchEvent, EncryptedContent, Notification, NotificationBatch,
    ResourceData, GENERIC_EVENT_TAG,
};
pub use pipeline::{BatchOutcome, NotificationPipeline, ResourceFetcher};
pub use router::{notifications_router, NotifyState};
pub use subscriptions::{InMemorySubscriptionStore, Subscription, SubscriptionResolver};
