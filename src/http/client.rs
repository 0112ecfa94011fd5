//! Throttled request dispatcher
//!
//! `HttpClient` performs one GET against the configured server per call:
//! - waits on the fixed-window rate limiter
//! - merges default and per-request headers
//! - encodes query parameters exactly once
//! - retries a single time on HTTP 429 after `Retry-After + 1s`
//! - decodes the body as UTF-8 JSON

use super::params::{ParamValue, QueryParams};
use super::rate_limit::{RateLimiter, RateLimiterConfig};
use super::transport::{PreparedRequest, ReqwestTransport, Transport};
use crate::config::{ClientConfig, MAX_RETRY_AFTER};
use crate::error::{Error, Result};
use crate::types::JsonValue;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Extra delay added on top of the server's `Retry-After`
pub const RETRY_PADDING: Duration = Duration::from_secs(1);

const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Configuration for a single request
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Query parameters
    pub params: QueryParams,
    /// Request headers, overriding client defaults
    pub headers: Vec<(String, String)>,
    /// Serialize sequence parameters as repeated keys instead of comma-joined
    pub doseq: bool,
}

impl RequestConfig {
    /// Create a new request config
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a query parameter
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(key, value);
        self
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        merge_header(&mut self.headers, key.into(), value.into());
        self
    }

    /// Set how sequence parameters are serialized
    #[must_use]
    pub fn doseq(mut self, doseq: bool) -> Self {
        self.doseq = doseq;
        self
    }
}

/// Rate-limited HTTP client for the REST server
///
/// Takes `&mut self` on every request because the throttle state is owned
/// here; give each caller its own client.
pub struct HttpClient<T = ReqwestTransport> {
    transport: T,
    config: ClientConfig,
    rate_limiter: RateLimiter,
}

impl HttpClient<ReqwestTransport> {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(&config)?;
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> HttpClient<T> {
    /// Create a client over an arbitrary transport
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self> {
        config.validate()?;
        let rate_limiter = RateLimiter::new(&RateLimiterConfig::new(config.reqs_per_sec));
        Ok(Self {
            transport,
            config,
            rate_limiter,
        })
    }

    /// Client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Current throttle state
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    /// Make a GET request and decode the JSON body
    ///
    /// `Ok(None)` means the server answered successfully with an empty body.
    pub async fn perform_rest_action(
        &mut self,
        endpoint: &str,
        request: RequestConfig,
    ) -> Result<Option<JsonValue>> {
        let prepared = self.prepare(endpoint, &request)?;
        self.execute(&prepared).await
    }

    /// Make a GET request with query parameters and default headers
    pub async fn get_json(
        &mut self,
        endpoint: &str,
        params: QueryParams,
    ) -> Result<Option<JsonValue>> {
        let request = RequestConfig {
            params,
            doseq: true,
            ..RequestConfig::default()
        };
        self.perform_rest_action(endpoint, request).await
    }

    /// Resolve endpoint, parameters and headers into a replayable request
    pub fn prepare(&self, endpoint: &str, request: &RequestConfig) -> Result<PreparedRequest> {
        let mut endpoint = endpoint.to_string();
        if !request.params.is_empty() {
            let separator = if endpoint.contains('?') { '&' } else { '?' };
            endpoint.push(separator);
            endpoint.push_str(&request.params.encode(request.doseq));
        }

        let url = self.build_url(&endpoint);
        url::Url::parse(&url)?;

        let mut headers = vec![("Content-Type".to_string(), DEFAULT_CONTENT_TYPE.to_string())];
        for (key, value) in &self.config.headers {
            merge_header(&mut headers, key.clone(), value.clone());
        }
        for (key, value) in &request.headers {
            merge_header(&mut headers, key.clone(), value.clone());
        }

        Ok(PreparedRequest {
            endpoint,
            url,
            headers,
        })
    }

    /// Send a prepared request, replaying it once on HTTP 429
    async fn execute(&mut self, request: &PreparedRequest) -> Result<Option<JsonValue>> {
        let mut retried = false;

        loop {
            self.rate_limiter.wait().await;

            debug!("GET {}", request.url);
            let response = self.transport.send(request).await?;

            if response.is_success() {
                let data = decode_body(&response.body)?;
                self.rate_limiter.record();
                return Ok(data);
            }

            if response.status == 429 {
                let retry_after = match response.retry_after() {
                    Some(secs) => secs,
                    None => {
                        let fallback = self.config.default_retry_after();
                        warn!(
                            "Rate limited on {} without a usable Retry-After, assuming {:?}",
                            request.endpoint, fallback
                        );
                        fallback.as_secs_f64()
                    }
                };

                if retried {
                    error!(
                        "Rate limited again on {} after retrying, giving up",
                        request.endpoint
                    );
                    return Err(rate_limited(request, retry_after));
                }

                let Some(delay) = retry_delay(retry_after) else {
                    error!(
                        "Rate limited on {} with a Retry-After of {}s, giving up",
                        request.endpoint, retry_after
                    );
                    return Err(rate_limited(request, retry_after));
                };
                warn!(
                    "Rate limited (429) on {}, retrying in {:?}",
                    request.endpoint, delay
                );
                tokio::time::sleep(delay).await;
                retried = true;
                continue;
            }

            let err = Error::http_status(&request.endpoint, response.status, &response.reason);
            error!("{err}");
            return Err(err);
        }
    }

    /// Build full URL from an endpoint path
    fn build_url(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return endpoint.to_string();
        }

        let base = self.config.server.trim_end_matches('/');
        let path = endpoint.trim_start_matches('/');
        format!("{base}/{path}")
    }
}

impl<T> std::fmt::Debug for HttpClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("rate_limiter", &self.rate_limiter)
            .finish_non_exhaustive()
    }
}

/// Back-off before replaying a 429, or `None` past `MAX_RETRY_AFTER`
fn retry_delay(retry_after: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(retry_after)
        .ok()
        .filter(|delay| *delay <= MAX_RETRY_AFTER)
        .map(|delay| delay + RETRY_PADDING)
}

fn rate_limited(request: &PreparedRequest, retry_after: f64) -> Error {
    Error::RateLimited {
        endpoint: request.endpoint.clone(),
        retry_after_seconds: retry_after,
    }
}

/// Insert or replace a header, matching names case-insensitively
fn merge_header(headers: &mut Vec<(String, String)>, key: String, value: String) {
    match headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&key)) {
        Some(existing) => *existing = (key, value),
        None => headers.push((key, value)),
    }
}

/// Decode a UTF-8 JSON body; an empty body is not an error
fn decode_body(body: &[u8]) -> Result<Option<JsonValue>> {
    let text = std::str::from_utf8(body)
        .map_err(|e| Error::decode(format!("response is not valid UTF-8: {e}")))?;

    if text.trim().is_empty() {
        return Ok(None);
    }

    Ok(Some(serde_json::from_str(text)?))
}
