//! HTTP client for the Klaviyo Catalogs API.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, info, warn};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client, Method, StatusCode};

use crate::config::ClientConfig;
use crate::error::CatalogError;
use crate::payload::RequestBody;

use super::{Catalog, CatalogResource};

const JSON_API: &str = "application/vnd.api+json";
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// Klaviyo catalog client. Retries rate limits, server errors and
/// connection failures with bounded exponential backoff.
pub struct KlaviyoCatalog {
    pub(crate) client: Client,
    pub(crate) config: ClientConfig,
    pub(crate) initial_backoff: Duration,
}

impl KlaviyoCatalog {
    pub fn new(config: ClientConfig) -> Result<Self, CatalogError> {
        info!("Creating Klaviyo catalog client for {}", config.base_url);
        debug!("API key length: {}", config.api_key.len());
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            config,
            initial_backoff: INITIAL_BACKOFF,
        })
    }

    pub(crate) fn collection_url(&self, resource: CatalogResource) -> String {
        format!(
            "{}/{}/",
            self.config.base_url.trim_end_matches('/'),
            resource.path()
        )
    }

    pub(crate) fn resource_url(&self, resource: CatalogResource, id: &str) -> String {
        format!(
            "{}{}/",
            self.collection_url(resource),
            urlencoding::encode(id)
        )
    }

    /// Wait before retry number `attempt` (0-based), never above `max_delay`.
    pub(crate) fn backoff(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let exponential = self
            .initial_backoff
            .saturating_mul(2u32.saturating_pow(attempt));
        let wait = match retry_after {
            Some(requested) if requested > exponential => requested,
            _ => exponential,
        };
        wait.min(self.config.max_delay)
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        body: &RequestBody,
    ) -> Result<(), CatalogError> {
        let payload = serde_json::to_vec(body)?;
        debug!("{method} {url}");
        debug!(
            "Payload: {}",
            serde_json::to_string_pretty(body)
                .unwrap_or_else(|_| "Failed to serialize".to_string())
        );

        let mut attempt = 0;
        loop {
            let result = self
                .client
                .request(method.clone(), url)
                .header(AUTHORIZATION, format!("Klaviyo-API-Key {}", self.config.api_key))
                .header("revision", &self.config.revision)
                .header(ACCEPT, JSON_API)
                .header(CONTENT_TYPE, JSON_API)
                .body(payload.clone())
                .send()
                .await;

            let response = match result {
                Ok(response) => response,
                Err(e) if is_transient(&e) && attempt < self.config.max_retries => {
                    let wait = self.backoff(attempt, None);
                    warn!("Request to {url} failed ({e}), retrying in {wait:?}");
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                    continue;
                }
                Err(e) => {
                    error!("Request to {url} failed: {e}");
                    return Err(e.into());
                }
            };

            let status = response.status();
            debug!("Response status: {status}");
            if status.is_success() {
                return Ok(());
            }

            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok())
                .map(Duration::from_secs);
            let error_text = response.text().await.unwrap_or_default();

            if status == StatusCode::CONFLICT {
                debug!("Conflict response body: {error_text}");
                return Err(CatalogError::Conflict { body: error_text });
            }

            if is_retryable(status) && attempt < self.config.max_retries {
                let wait = self.backoff(attempt, retry_after);
                warn!("{method} {url} returned {status}, retrying in {wait:?}");
                tokio::time::sleep(wait).await;
                attempt += 1;
                continue;
            }

            error!("{method} {url} failed with status {status}: {error_text}");
            return Err(CatalogError::Status {
                status,
                body: error_text,
            });
        }
    }
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn is_transient(err: &reqwest::Error) -> bool {
    err.is_connect() || err.is_timeout()
}

#[async_trait]
impl Catalog for KlaviyoCatalog {
    async fn create(
        &self,
        resource: CatalogResource,
        body: &RequestBody,
    ) -> Result<(), CatalogError> {
        let url = self.collection_url(resource);
        self.send(Method::POST, &url, body).await
    }

    async fn update(
        &self,
        resource: CatalogResource,
        id: &str,
        body: &RequestBody,
    ) -> Result<(), CatalogError> {
        let url = self.resource_url(resource, id);
        self.send(Method::PATCH, &url, body).await
    }
}
