//! HTTP storage backend for a remote casebook API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use tracing::{debug, warn};

use super::HttpError;
use crate::error::Result;
use crate::storage::{Collection, StorageAdapter};

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Storage adapter backed by REST endpoints.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpStorage {
    client: Client,
    base_url: String,
    token: Option<String>,
    initial_backoff: Duration,
}

impl HttpStorage {
    pub fn new(base_url: impl Into<String>) -> std::result::Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            initial_backoff: Duration::from_millis(INITIAL_BACKOFF_MS),
        })
    }

    /// Set the bearer token for authenticated requests
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, collection: Collection) -> String {
        format!("{}/{}", self.base_url, collection.endpoint())
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.token {
            Some(ref token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors. 404 is passed through for the caller to interpret.
    async fn check_response_for_retry(
        response: Response,
    ) -> std::result::Result<Option<Response>, HttpError> {
        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            Ok(Some(response))
        } else if status == StatusCode::TOO_MANY_REQUESTS {
            Ok(None)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(HttpError::from_status(status, &body))
        }
    }

    /// Send a request, retrying with exponential backoff while rate limited.
    async fn send(
        &self,
        url: &str,
        build: impl Fn() -> RequestBuilder,
    ) -> std::result::Result<Response, HttpError> {
        let mut retries = 0;
        let mut backoff = self.initial_backoff;

        loop {
            let response = self.authorize(build()).send().await?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => return Ok(response),
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(HttpError::RateLimited);
                    }
                    warn!(url = url, retry = retries, backoff_ms = backoff.as_millis() as u64, "Rate limited, backing off");
                    tokio::time::sleep(backoff).await;
                    backoff *= 2; // Exponential backoff
                }
            }
        }
    }

    async fn get_collection(&self, collection: Collection) -> std::result::Result<Option<String>, HttpError> {
        let url = self.url(collection);
        let response = self
            .send(&url, || {
                self.client
                    .get(&url)
                    .header(header::ACCEPT, "application/json")
            })
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(url = %url, "Collection not found on server");
            return Ok(None);
        }

        let body = response.text().await?;
        let trimmed = body.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Ok(None);
        }
        Ok(Some(body))
    }

    async fn post_collection(&self, collection: Collection, value: &str) -> std::result::Result<(), HttpError> {
        let url = self.url(collection);
        let response = self
            .send(&url, || {
                self.client
                    .post(&url)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(value.to_string())
            })
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            let body = response.text().await.unwrap_or_default();
            return Err(HttpError::from_status(StatusCode::NOT_FOUND, &body));
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for HttpStorage {
    async fn read(&self, collection: Collection) -> Result<Option<String>> {
        Ok(self.get_collection(collection).await?)
    }

    async fn write(&self, collection: Collection, value: &str) -> Result<()> {
        Ok(self.post_collection(collection, value).await?)
    }

    fn kind(&self) -> &'static str {
        "http"
    }
}
