//! Authenticated resource-graph client used to enrich plain `created`
//! notifications with a projection of the changed resource.
//!
//! Implements the pipeline's `ResourceFetcher` seam: OAuth2
//! client-credentials token acquisition with caching, and single-resource
//! GETs with field projection and bounded rate-limit retry.

mod auth;
mod client;
mod config;
mod error;

pub use auth::TokenCache;
pub use client::GraphClient;
pub use config::{GraphConfig, GraphCredentials};
pub use error::{GraphError, GraphResult};
