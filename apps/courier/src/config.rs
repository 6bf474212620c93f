//! Relay configuration loaded from environment variables.
//!
//! Fail-fast: required variables must be present, or the process exits
//! with a clear message before any socket binds. Secrets stay wrapped in
//! `SecretString` so they never land in logs.

use courier_notify::Subscription;
use secrecy::SecretString;
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is unset or empty.
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    /// A variable is set but does not parse.
    #[error("Invalid value for {name}: {reason}")]
    Invalid {
        name: &'static str,
        reason: String,
    },

    /// The private key file could not be read.
    #[error("Failed to read private key {path}: {reason}")]
    PrivateKeyRead { path: String, reason: String },
}

/// Process-wide relay configuration, read-only after startup.
pub struct Config {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Application (client) id of the registered app — validation-token
    /// audience and Graph client id.
    pub app_id: String,
    /// Directory tenant id — token issuer authority and Graph tenant.
    pub tenant_id: String,
    /// Shared client-state secret carried by every trusted notification.
    pub client_state: SecretString,
    /// Client secret for the enrichment fetch credential.
    pub client_secret: SecretString,
    /// Path of the PKCS#8 PEM private key used for content decryption.
    pub private_key_path: String,
    /// Optional JWKS endpoint override (sovereign clouds, tests).
    pub jwks_uri: Option<String>,
    /// Optional JSON file of subscription records to seed the store with.
    pub subscriptions_path: Option<String>,
    /// Log filter directive.
    pub rust_log: String,
}

impl Config {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable source.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| -> Result<String, ConfigError> {
            match lookup(name) {
                Some(value) if !value.is_empty() => Ok(value),
                _ => Err(ConfigError::Missing(name)),
            }
        };

        let port = match lookup("COURIER_PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: "COURIER_PORT",
                reason: e.to_string(),
            })?,
            None => 3000,
        };

        Ok(Self {
            host: lookup("COURIER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            app_id: required("COURIER_APP_ID")?,
            tenant_id: required("COURIER_TENANT_ID")?,
            client_state: required("COURIER_CLIENT_STATE")?.into(),
            client_secret: required("COURIER_CLIENT_SECRET")?.into(),
            private_key_path: required("COURIER_PRIVATE_KEY_PATH")?,
            jwks_uri: lookup("COURIER_JWKS_URI"),
            subscriptions_path: lookup("COURIER_SUBSCRIPTIONS_PATH"),
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// The socket address to bind.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Read the decryption private key, once, at startup.
    pub fn load_private_key(&self) -> Result<String, ConfigError> {
        std::fs::read_to_string(&self.private_key_path).map_err(|e| {
            ConfigError::PrivateKeyRead {
                path: self.private_key_path.clone(),
                reason: e.to_string(),
            }
        })
    }
}

/// Parse a JSON array of subscription records (the store seed file).
pub fn parse_subscriptions(json: &str) -> Result<Vec<Subscription>, serde_json::Error> {
    serde_json::from_str(json)
}
