//! Courier — change-notification relay service.
//!
//! Receives change notifications from the remote resource graph on a
//! webhook, runs them through the validation/decryption/dispatch pipeline,
//! and publishes normalized events for the real-time transport.

mod config;
mod logging;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::signal;
use tokio::sync::broadcast;
use tracing::{info, warn};

use courier_auth::{TokenVerifier, VerifierConfig};
use courier_graph::{GraphClient, GraphConfig, GraphCredentials};
use courier_notify::{
    notifications_router, ContentDecryptor, DispatchEvent, EventDispatcher,
    InMemorySubscriptionStore, NotificationAuthenticator, NotificationPipeline, NotifyState,
};

use config::Config;

#[tokio::main]
async fn main() {
    // Load configuration (fail-fast on missing required values).
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    logging::init_logging(&config.rust_log);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.host,
        port = config.port,
        "Starting courier relay"
    );

    // Private key material is read once here and never reloaded.
    let private_key_pem = match config.load_private_key() {
        Ok(pem) => pem,
        Err(e) => {
            tracing::error!("Failed to load private key: {e}");
            std::process::exit(1);
        }
    };
    let decryptor = match ContentDecryptor::from_pkcs8_pem(&private_key_pem) {
        Ok(d) => Arc::new(d),
        Err(e) => {
            tracing::error!("Failed to parse private key: {e}");
            std::process::exit(1);
        }
    };

    let mut verifier_config = VerifierConfig::new(&config.app_id, &config.tenant_id);
    if let Some(ref jwks_uri) = config.jwks_uri {
        verifier_config = verifier_config.jwks_uri(jwks_uri.clone());
    }
    let verifier = match TokenVerifier::new(verifier_config) {
        Ok(v) => Arc::new(v),
        Err(e) => {
            tracing::error!("Failed to create token verifier: {e}");
            std::process::exit(1);
        }
    };

    let store = Arc::new(InMemorySubscriptionStore::new());
    if let Some(ref path) = config.subscriptions_path {
        let loaded = std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|content| config::parse_subscriptions(&content).map_err(|e| e.to_string()));
        match loaded {
            Ok(subscriptions) => {
                let count = subscriptions.len();
                for subscription in subscriptions {
                    store.insert(subscription).await;
                }
                info!(count, "Seeded subscription store");
            }
            Err(e) => {
                tracing::error!("Failed to load subscriptions from {path}: {e}");
                std::process::exit(1);
            }
        }
    }

    let graph_client = match GraphClient::new(
        GraphConfig::new(&config.tenant_id),
        GraphCredentials {
            client_id: config.app_id.clone(),
            client_secret: config.client_secret.clone(),
        },
    ) {
        Ok(c) => Arc::new(c),
        Err(e) => {
            tracing::error!("Failed to create graph client: {e}");
            std::process::exit(1);
        }
    };

    let (dispatcher, receiver) = EventDispatcher::new(1024);

    // Drain task standing in for the real-time transport: every published
    // event is logged with its channel key.
    tokio::spawn(drain_events(receiver));

    let authenticator = NotificationAuthenticator::new(store.clone(), config.client_state.clone());
    let pipeline = NotificationPipeline::new(
        verifier,
        authenticator,
        decryptor,
        graph_client,
        dispatcher,
    );

    let app = notifications_router(NotifyState::new(Arc::new(pipeline)));

    let addr: SocketAddr = match config.bind_addr().parse() {
        Ok(a) => a,
        Err(e) => {
            tracing::error!("Invalid bind address '{}': {e}", config.bind_addr());
            std::process::exit(1);
        }
    };

    info!(%addr, "Server listening");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind to address {addr}: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }

    info!("Server shutdown complete");
}

/// Log every dispatched event until the channel closes.
async fn drain_events(mut receiver: broadcast::Receiver<DispatchEvent>) {
    loop {
        match receiver.recv().await {
            Ok(event) => {
                info!(
                    target: "dispatch",
                    subscription_id = %event.subscription_id,
                    event_type = %event.event_type,
                    "Event dispatched"
                );
            }
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                warn!(target: "dispatch", missed, "Event drain lagging");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Graceful shutdown on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
