//! Shared HTTP plumbing for the upstream sources.
//!
//! Each upstream gets its own [`HttpClient`] with:
//! - Connection pooling via reqwest
//! - Optional retry middleware with exponential backoff
//! - A `governor` rate limiter enforcing the upstream's minimum request interval
//! - An optional raw response cache

use std::sync::Arc;
use std::time::Duration;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use moka::future::Cache;
use reqwest::Client;
use reqwest::header::HeaderMap;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};

use crate::config::{Config, api};
use crate::error::{ClientError, ClientResult};

/// HTTP client bound to one upstream.
#[derive(Clone)]
pub struct HttpClient {
    /// Upstream name used in logs and errors.
    upstream: &'static str,

    /// HTTP client with middleware.
    client: ClientWithMiddleware,

    /// Raw response cache (GET only).
    cache: Option<Cache<String, String>>,

    /// Minimum-interval limiter.
    limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl HttpClient {
    /// Create a client for one upstream.
    ///
    /// A zero `min_interval` disables rate limiting.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(
        upstream: &'static str,
        config: &Config,
        min_interval: Duration,
        headers: HeaderMap,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .default_headers(headers)
            .user_agent(api::USER_AGENT)
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(api::MAX_KEEPALIVE)
            .pool_idle_timeout(api::KEEPALIVE_EXPIRY)
            .gzip(true)
            .build()?;

        let mut builder = ClientBuilder::new(client);
        if config.max_retries > 0 {
            let retry_policy = ExponentialBackoff::builder()
                .retry_bounds(Duration::from_secs(1), Duration::from_secs(30))
                .build_with_max_retries(config.max_retries);
            builder = builder.with(RetryTransientMiddleware::new_with_policy(retry_policy));
        }
        let client = builder.build();

        let cache = config.cache_enabled().then(|| {
            Cache::builder()
                .max_capacity(config.cache_max_size)
                .time_to_live(config.cache_ttl)
                .build()
        });

        let limiter =
            Quota::with_period(min_interval).map(|quota| Arc::new(RateLimiter::direct(quota)));

        Ok(Self { upstream, client, cache, limiter })
    }

    /// Upstream name.
    #[must_use]
    pub const fn upstream(&self) -> &'static str {
        self.upstream
    }

    /// Make a GET request and return the body as text.
    pub async fn get_text(&self, url: &str, params: &[(String, String)]) -> ClientResult<String> {
        let cache_key = self.cache.as_ref().map(|_| cache_key("GET", url, params));
        if let (Some(cache), Some(key)) = (&self.cache, &cache_key) {
            if let Some(cached) = cache.get(key).await {
                tracing::trace!(upstream = self.upstream, url, "cache hit");
                return Ok(cached);
            }
        }

        self.throttle().await;
        tracing::debug!(upstream = self.upstream, url, params = ?params, "GET");

        let response = self.client.get(url).query(params).send().await?;
        let response = self.handle_response(response).await?;
        let body = response.text().await?;

        if let (Some(cache), Some(key)) = (&self.cache, cache_key) {
            cache.insert(key, body.clone()).await;
        }

        Ok(body)
    }

    /// Make a GET request and decode a JSON body.
    pub async fn get_json<T>(&self, url: &str, params: &[(String, String)]) -> ClientResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let body = self.get_text(url, params).await?;
        serde_json::from_str(&body).map_err(ClientError::from)
    }

    /// Make a POST request with a JSON body and decode a JSON response.
    pub async fn post_json<T>(
        &self,
        url: &str,
        params: &[(String, String)],
        body: &serde_json::Value,
    ) -> ClientResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.throttle().await;
        tracing::debug!(upstream = self.upstream, url, "POST");

        let body_str = serde_json::to_string(body)?;

        let response = self
            .client
            .post(url)
            .query(params)
            .header("Content-Type", "application/json")
            .body(body_str)
            .send()
            .await?;

        let response = self.handle_response(response).await?;
        let value: serde_json::Value = response.json().await?;

        serde_json::from_value(value).map_err(ClientError::from)
    }

    async fn throttle(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }

    /// Map upstream status codes onto [`ClientError`].
    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> ClientResult<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        tracing::debug!(upstream = self.upstream, status = status.as_u16(), "non-success status");

        match status.as_u16() {
            429 => {
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(60);

                Err(ClientError::rate_limited(retry_after))
            }
            404 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::not_found(format!("{}: {text}", self.upstream)))
            }
            400 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::bad_request(text))
            }
            500..=599 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::server(status.as_u16(), text))
            }
            _ => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::UnexpectedStatus { status: status.as_u16(), message: text })
            }
        }
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("upstream", &self.upstream)
            .field("cached", &self.cache.is_some())
            .field("rate_limited", &self.limiter.is_some())
            .finish()
    }
}

/// Generate cache key.
fn cache_key(method: &str, url: &str, params: &[(String, String)]) -> String {
    use md5::{Digest, Md5};

    let mut hasher = Md5::new();
    hasher.update(method.as_bytes());
    hasher.update(b"|");
    hasher.update(url.as_bytes());
    hasher.update(b"|");

    for (k, v) in params {
        hasher.update(k.as_bytes());
        hasher.update(b"=");
        hasher.update(v.as_bytes());
        hasher.update(b"&");
    }

    format!("{:x}", hasher.finalize())
}
