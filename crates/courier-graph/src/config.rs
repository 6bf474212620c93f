//! Client configuration and credentials.

use secrecy::SecretString;

/// Default token authority endpoint.
const DEFAULT_AUTHORITY_BASE: &str = "https://login.microsoftonline.com";

/// Default resource-graph API root.
const DEFAULT_GRAPH_BASE: &str = "https://graph.microsoft.com/v1.0";

/// OAuth2 client credentials for the registered application.
#[derive(Debug, Clone)]
pub struct GraphCredentials {
    /// Application (client) id.
    pub client_id: String,

    /// Client secret. Never logged, never serialized.
    pub client_secret: SecretString,
}

/// Connection configuration for the resource graph.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    /// Directory tenant to authenticate against.
    pub tenant_id: String,

    /// Token authority base URL.
    pub authority_base: String,

    /// Resource-graph API root, including version segment.
    pub graph_base: String,
}

impl GraphConfig {
    /// Config for a tenant against the public cloud endpoints.
    pub fn new(tenant_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            authority_base: DEFAULT_AUTHORITY_BASE.to_string(),
            graph_base: DEFAULT_GRAPH_BASE.to_string(),
        }
    }

    /// Override the token authority (sovereign clouds, tests).
    #[must_use]
    pub fn authority_base(mut self, base: impl Into<String>) -> Self {
        self.authority_base = base.into();
        self
    }

    /// Override the API root (sovereign clouds, tests).
    #[must_use]
    pub fn graph_base(mut self, base: impl Into<String>) -> Self {
        self.graph_base = base.into();
        self
    }

    /// Token endpoint for the configured tenant.
    #[must_use]
    pub fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority_base.trim_end_matches('/'),
            self.tenant_id
        )
    }

    /// Default scope for client-credentials grants.
    #[must_use]
    pub fn default_scope(&self) -> String {
        // The scope host is the graph root without the version segment.
        let host = self
            .graph_base
            .trim_end_matches('/')
            .trim_end_matches("/v1.0")
            .trim_end_matches("/beta");
        format!("{host}/.default")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_url_for_tenant() {
        let config = GraphConfig::new("tenant-1");
        assert_eq!(
            config.token_url(),
            "https://login.microsoftonline.com/tenant-1/oauth2/v2.0/token"
        );
    }

    #[test]
    fn default_scope_drops_version_segment() {
        let config = GraphConfig::new("tenant-1");
        assert_eq!(config.default_scope(), "https://graph.microsoft.com/.default");
    }

    #[test]
    fn overrides_apply() {
        let config = GraphConfig::new("tenant-1")
            .authority_base("http://127.0.0.1:9999")
            .graph_base("http://127.0.0.1:9998/v1.0");
        assert_eq!(
            config.token_url(),
            "http://127.0.0.1:9999/tenant-1/oauth2/v2.0/token"
        );
        assert_eq!(config.default_scope(), "http://127.0.0.1:9998/.default");
    }
}
