//! Microsoft Graph API HTTP client with token injection and retry handling.

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::api::ODataQuery;
use crate::retry::RetryPolicy;
use crate::{EntraConfig, EntraCredentials, EntraError, EntraResult, TokenCache};

/// `OData` error response from Microsoft Graph.
#[derive(Debug, Deserialize)]
pub struct ODataError {
    pub error: ODataErrorBody,
}

/// `OData` error body.
#[derive(Debug, Deserialize)]
pub struct ODataErrorBody {
    pub code: String,
    pub message: String,
    #[serde(rename = "innerError")]
    pub inner_error: Option<serde_json::Value>,
}

/// Microsoft Graph API client.
#[derive(Debug)]
pub struct GraphClient {
    http_client: reqwest::Client,
    token_cache: Arc<TokenCache>,
    base_url: Url,
    retry: RetryPolicy,
}

impl GraphClient {
    /// Creates a new Graph client for the configured cloud.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created or the Graph
    /// endpoint is not a valid base URL.
    pub fn new(config: &EntraConfig, credentials: EntraCredentials) -> EntraResult<Self> {
        let token_cache = Arc::new(TokenCache::new(config, credentials));
        Self::with_token_cache(config, token_cache)
    }

    /// Creates a new Graph client sharing an existing token cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created or the Graph
    /// endpoint is not a valid base URL.
    pub fn with_token_cache(config: &EntraConfig, token_cache: Arc<TokenCache>) -> EntraResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EntraError::Config(format!("Failed to create HTTP client: {e}")))?;

        let base_url = Url::parse(&config.graph_base_url())?;
        if base_url.cannot_be_a_base() {
            return Err(EntraError::Config(format!(
                "Graph endpoint {base_url} cannot be used as a base URL"
            )));
        }

        Ok(Self {
            http_client,
            token_cache,
            base_url,
            retry: RetryPolicy::from(&config.retry),
        })
    }

    /// Returns the base URL for Graph API requests.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds a request URL from escaped path segments and query options.
    pub fn url(&self, segments: &[&str], query: &ODataQuery) -> EntraResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| EntraError::Config("Graph endpoint cannot be a base URL".to_string()))?
            .pop_if_empty()
            .extend(segments);
        query.apply_to(&mut url);
        Ok(url)
    }

    /// Performs a GET request. An empty or `null` body yields `None`.
    #[instrument(skip(self, url), fields(url = %url))]
    pub async fn get<T: DeserializeOwned>(&self, url: Url) -> EntraResult<Option<T>> {
        let body = self.execute(Method::GET, url, None::<&()>).await?;
        parse_optional(&body)
    }

    /// Performs a POST request. An empty or `null` body yields `None`.
    #[instrument(skip(self, url, body), fields(url = %url))]
    pub async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> EntraResult<Option<T>> {
        let body = self.execute(Method::POST, url, Some(body)).await?;
        parse_optional(&body)
    }

    /// Performs a PATCH request. Graph answers 204 No Content.
    #[instrument(skip(self, url, body), fields(url = %url))]
    pub async fn patch<B: Serialize + Sync>(&self, url: Url, body: &B) -> EntraResult<()> {
        self.execute(Method::PATCH, url, Some(body)).await?;
        Ok(())
    }

    /// Performs a DELETE request.
    #[instrument(skip(self, url), fields(url = %url))]
    pub async fn delete(&self, url: Url) -> EntraResult<()> {
        self.execute(Method::DELETE, url, None::<&()>).await?;
        Ok(())
    }

    /// Sends a request, retrying throttled and transient failures, and
    /// returns the raw body of the successful response.
    async fn execute<B: Serialize + Sync>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> EntraResult<String> {
        let mut attempt = 0u32;
        let mut reauthenticated = false;

        loop {
            let token = self.token_cache.get_token().await?;

            let mut request = self
                .http_client
                .request(method.clone(), url.clone())
                .bearer_auth(&token);

            if let Some(b) = body {
                request = request.json(b);
            }

            let response = request.send().await?;
            let status = response.status();

            if RetryPolicy::is_retryable(status) {
                if attempt >= self.retry.max_retries() {
                    return Err(EntraError::MaxRetriesExceeded {
                        attempts: attempt,
                        status: status.as_u16(),
                    });
                }
                let retry_after = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(RetryPolicy::parse_retry_after);

                self.retry.wait(status, attempt, retry_after).await;
                attempt += 1;
                continue;
            }

            // An expired or revoked token gets one refresh.
            if status == StatusCode::UNAUTHORIZED && !reauthenticated {
                warn!(%method, "Graph rejected the access token, refreshing");
                self.token_cache.invalidate().await;
                reauthenticated = true;
                continue;
            }

            let text = response.text().await?;

            if status.is_success() {
                debug!(%method, %status, "Graph request succeeded");
                return Ok(text);
            }

            return Err(graph_error(status, &text));
        }
    }
}

fn graph_error(status: StatusCode, body: &str) -> EntraError {
    if let Ok(odata_error) = serde_json::from_str::<ODataError>(body) {
        return EntraError::GraphApi {
            status: status.as_u16(),
            code: odata_error.error.code,
            message: odata_error.error.message,
            inner_error: odata_error.error.inner_error.map(|v| v.to_string()),
        };
    }

    EntraError::GraphApi {
        status: status.as_u16(),
        code: status.to_string(),
        message: body.to_string(),
        inner_error: None,
    }
}

fn parse_optional<T: DeserializeOwned>(body: &str) -> EntraResult<Option<T>> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    Ok(serde_json::from_str::<Option<T>>(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Application;

    fn client(endpoint: &str) -> GraphClient {
        let config = EntraConfig::builder()
            .tenant_id("contoso")
            .endpoint_override(endpoint)
            .build()
            .unwrap();
        GraphClient::new(
            &config,
            EntraCredentials {
                client_id: "client".to_string(),
                client_secret: "secret".to_string().into(),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_odata_error_parsing() {
        let json = r#"{
            "error": {
                "code": "Request_ResourceNotFound",
                "message": "Resource not found",
                "innerError": {"date": "2024-01-15"}
            }
        }"#;

        match graph_error(StatusCode::NOT_FOUND, json) {
            EntraError::GraphApi {
                status,
                code,
                message,
                inner_error,
            } => {
                assert_eq!(status, 404);
                assert_eq!(code, "Request_ResourceNotFound");
                assert_eq!(message, "Resource not found");
                assert!(inner_error.is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_odata_error_keeps_body() {
        match graph_error(StatusCode::BAD_REQUEST, "plain text failure") {
            EntraError::GraphApi {
                status, message, ..
            } => {
                assert_eq!(status, 400);
                assert_eq!(message, "plain text failure");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_optional() {
        assert!(parse_optional::<Application>("").unwrap().is_none());
        assert!(parse_optional::<Application>("null").unwrap().is_none());
        let app = parse_optional::<Application>(r#"{"id":"abc"}"#).unwrap().unwrap();
        assert_eq!(app.id.as_deref(), Some("abc"));
        assert!(parse_optional::<Application>("{oops").is_err());
    }

    #[test]
    fn test_url_escapes_segments() {
        let client = client("http://localhost:9000");
        let url = client
            .url(
                &["applications", "abc/def", "federatedIdentityCredentials"],
                &ODataQuery::select(&["id"]),
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:9000/v1.0/applications/abc%2Fdef/federatedIdentityCredentials?%24select=id"
        );
    }
}
