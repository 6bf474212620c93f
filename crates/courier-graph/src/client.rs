//! Resource-graph HTTP client with field projection and rate-limit retry.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use courier_notify::{FetchError, ResourceFetcher};

use crate::auth::TokenCache;
use crate::config::{GraphConfig, GraphCredentials};
use crate::error::{GraphError, GraphResult};

/// OData error response envelope.
#[derive(Debug, Deserialize)]
struct ODataError {
    error: ODataErrorBody,
}

/// OData error body.
#[derive(Debug, Deserialize)]
struct ODataErrorBody {
    code: String,
    message: String,
}

/// Minimal read client for the resource graph.
///
/// The pipeline only ever needs single-resource GETs with a `$select`
/// projection, so that is all this client does: bearer injection from the
/// token cache, OData error mapping, and a bounded retry on 429 honoring
/// `Retry-After`.
#[derive(Debug)]
pub struct GraphClient {
    http_client: reqwest::Client,
    tokens: Arc<TokenCache>,
    base_url: String,
    max_retries: u32,
}

impl GraphClient {
    /// Create a client for the configured tenant.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Config`] if the HTTP client cannot be built.
    pub fn new(config: GraphConfig, credentials: GraphCredentials) -> GraphResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| GraphError::Config(format!("HTTP client build failed: {e}")))?;

        let tokens = Arc::new(TokenCache::new(&config, credentials));

        Ok(Self {
            http_client,
            tokens,
            base_url: config.graph_base.trim_end_matches('/').to_string(),
            max_retries: 3,
        })
    }

    /// Override the rate-limit retry budget.
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Fetch a resource by path, projected to the given fields.
    #[instrument(skip(self))]
    pub async fn get_resource(
        &self,
        resource_path: &str,
        select: &[&str],
    ) -> GraphResult<serde_json::Value> {
        let url = format!(
            "{}/{}",
            self.base_url,
            resource_path.trim_start_matches('/')
        );

        let mut attempts = 0u32;
        loop {
            let token = self.tokens.get_token().await?;

            let mut request = self.http_client.get(&url).bearer_auth(&token);
            if !select.is_empty() {
                request = request.query(&[("$select", select.join(","))]);
            }

            let response = request.send().await?;
            let status = response.status();

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                attempts += 1;
                if attempts > self.max_retries {
                    return Err(GraphError::RateLimited { attempts });
                }
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(1);
                warn!(attempts, retry_after, "Rate limited, backing off");
                tokio::time::sleep(Duration::from_secs(retry_after)).await;
                continue;
            }

            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(GraphError::NotFound(resource_path.to_string()));
            }

            if !status.is_success() {
                return Err(match response.json::<ODataError>().await {
                    Ok(odata) => GraphError::Api {
                        code: odata.error.code,
                        message: odata.error.message,
                    },
                    Err(_) => GraphError::Api {
                        code: status.to_string(),
                        message: "non-OData error response".to_string(),
                    },
                });
            }

            debug!(%url, "Resource fetched");
            return Ok(response.json().await?);
        }
    }
}

#[async_trait]
impl ResourceFetcher for GraphClient {
    async fn get(
        &self,
        resource_path: &str,
        select: &[&str],
    ) -> Result<serde_json::Value, FetchError> {
        self.get_resource(resource_path, select)
            .await
            .map_err(|err| match err {
                GraphError::NotFound(path) => FetchError::NotFound(path),
                other => FetchError::Upstream(other.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn credentials() -> GraphCredentials {
        GraphCredentials {
            client_id: "app-1".to_string(),
            client_secret: "s3cret".to_string().into(),
        }
    }

    async fn mock_token_endpoint(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/tenant-1/oauth2/v2.0/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token_type": "Bearer",
                "access_token": "token-abc",
                "expires_in": 3600
            })))
            .mount(server)
            .await;
    }

    fn client(server: &MockServer) -> GraphClient {
        let config = GraphConfig::new("tenant-1")
            .authority_base(server.uri())
            .graph_base(format!("{}/v1.0", server.uri()));
        GraphClient::new(config, credentials()).unwrap()
    }

    #[tokio::test]
    async fn fetches_with_projection_and_bearer() {
        let server = MockServer::start().await;
        mock_token_endpoint(&server).await;

        Mock::given(method("GET"))
            .and(path("/v1.0/Users/42"))
            .and(query_param("$select", "id,displayName"))
            .and(header("authorization", "Bearer token-abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "42",
                "displayName": "Ada Lovelace"
            })))
            .mount(&server)
            .await;

        let projection = client(&server)
            .get_resource("Users/42", &["id", "displayName"])
            .await
            .unwrap();

        assert_eq!(projection["displayName"], "Ada Lovelace");
    }

    #[tokio::test]
    async fn missing_resource_is_not_found() {
        let server = MockServer::start().await;
        mock_token_endpoint(&server).await;

        Mock::given(method("GET"))
            .and(path("/v1.0/Users/404"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = client(&server).get_resource("Users/404", &[]).await;
        assert!(matches!(result, Err(GraphError::NotFound(path)) if path == "Users/404"));
    }

    #[tokio::test]
    async fn odata_error_is_mapped() {
        let server = MockServer::start().await;
        mock_token_endpoint(&server).await;

        Mock::given(method("GET"))
            .and(path("/v1.0/Users/42"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": {
                    "code": "Authorization_RequestDenied",
                    "message": "Insufficient privileges"
                }
            })))
            .mount(&server)
            .await;

        let result = client(&server).get_resource("Users/42", &[]).await;
        match result {
            Err(GraphError::Api { code, .. }) => {
                assert_eq!(code, "Authorization_RequestDenied");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn retries_after_rate_limit() {
        let server = MockServer::start().await;
        mock_token_endpoint(&server).await;

        Mock::given(method("GET"))
            .and(path("/v1.0/Users/42"))
            .respond_with(
                ResponseTemplate::new(429).insert_header("Retry-After", "0"),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1.0/Users/42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "42"})))
            .mount(&server)
            .await;

        let projection = client(&server).get_resource("Users/42", &[]).await.unwrap();
        assert_eq!(projection["id"], "42");
    }

    #[tokio::test]
    async fn rate_limit_budget_is_bounded() {
        let server = MockServer::start().await;
        mock_token_endpoint(&server).await;

        Mock::given(method("GET"))
            .and(path("/v1.0/Users/42"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
            .mount(&server)
            .await;

        let client = client(&server).with_max_retries(1);
        let result = client.get_resource("Users/42", &[]).await;
        assert!(matches!(result, Err(GraphError::RateLimited { .. })));
    }

    #[tokio::test]
    async fn fetcher_seam_maps_not_found() {
        let server = MockServer::start().await;
        mock_token_endpoint(&server).await;

        Mock::given(method("GET"))
            .and(path("/v1.0/Users/404"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let graph = client(&server);
        let fetcher: &dyn ResourceFetcher = &graph;
        let result = fetcher.get("Users/404", &[]).await;
        assert!(matches!(result, Err(FetchError::NotFound(_))));
    }
}
