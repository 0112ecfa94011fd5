//! Transport seam between the dispatcher and the network
//!
//! The dispatcher only needs "send this resolved GET, give me status,
//! headers and body". Keeping that behind a trait lets tests substitute a
//! scripted transport and drive the throttle and retry paths with a paused
//! clock.

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use std::time::Duration;

/// A fully resolved GET request
///
/// Built once per dispatch and replayed verbatim on retry, so the query
/// string is never encoded twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    /// Endpoint with its encoded query string, as used in diagnostics
    pub endpoint: String,
    /// Absolute URL
    pub url: String,
    /// Merged request headers
    pub headers: Vec<(String, String)>,
}

impl PreparedRequest {
    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// Raw response handed back by a transport
#[derive(Debug, Clone, Default)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Reason phrase
    pub reason: String,
    /// Response headers
    pub headers: Vec<(String, String)>,
    /// Response body
    pub body: Bytes,
}

impl TransportResponse {
    /// Create a response with the canonical reason phrase for `status`
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            reason: canonical_reason(status).to_string(),
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Add a header
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// `Retry-After` in seconds, when present and numeric
    pub fn retry_after(&self) -> Option<f64> {
        self.header("retry-after")
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|secs| secs.is_finite() && *secs >= 0.0)
    }
}

/// Something that can execute a prepared GET
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request and return the raw response
    ///
    /// Non-2xx statuses are not errors at this layer.
    async fn send(&self, request: &PreparedRequest) -> Result<TransportResponse>;
}

/// Transport backed by `reqwest`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    timeout: Duration,
}

impl ReqwestTransport {
    /// Build a reqwest client from the client configuration
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            client,
            timeout: config.timeout(),
        })
    }

    /// Map a reqwest failure, reporting timeouts with the configured limit
    fn map_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else {
            Error::Http(err)
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &PreparedRequest) -> Result<TransportResponse> {
        let mut req = self.client.get(&request.url);
        for (name, value) in &request.headers {
            req = req.header(name.as_str(), value.as_str());
        }

        let response = req.send().await.map_err(|e| self.map_error(e))?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await.map_err(|e| self.map_error(e))?;

        Ok(TransportResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            headers,
            body,
        })
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

fn canonical_reason(status: u16) -> &'static str {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test_case("2", Some(2.0))]
    #[test_case(" 0.5 ", Some(0.5))]
    #[test_case("-1", None)]
    #[test_case("Wed, 21 Oct 2015 07:28:00 GMT", None)]
    fn test_retry_after_parsing(value: &str, expected: Option<f64>) {
        let response = TransportResponse::new(429, "").with_header("Retry-After", value);
        assert_eq!(response.retry_after(), expected);
    }

    #[test]
    fn test_retry_after_missing() {
        assert_eq!(TransportResponse::new(429, "").retry_after(), None);
    }

    #[test]
    fn test_response_reason_and_success() {
        let ok = TransportResponse::new(200, "{}");
        assert!(ok.is_success());
        assert_eq!(ok.reason, "OK");

        let missing = TransportResponse::new(404, "");
        assert!(!missing.is_success());
        assert_eq!(missing.reason, "Not Found");
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let request = PreparedRequest {
            endpoint: "/info/ping".to_string(),
            url: "http://localhost/info/ping".to_string(),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
        };
        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(request.header("accept"), None);
    }

    #[test_case("1e20", Some(1e20))]
    #[test_case("99999999999999999999", Some(1e20))]
    fn test_retry_after_large_values_parse(value: &str, expected: Option<f64>) {
        let response = TransportResponse::new(429, "").with_header("Retry-After", value);
        assert_eq!(response.retry_after(), expected);
    }

    #[tokio::test]
    async fn test_send_timeout_reports_configured_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let config = ClientConfig::builder()
            .server(server.uri())
            .timeout(Duration::from_millis(50))
            .build();
        let transport = ReqwestTransport::new(&config).unwrap();
        let request = PreparedRequest {
            endpoint: "/info/ping".to_string(),
            url: format!("{}/info/ping", server.uri()),
            headers: Vec::new(),
        };

        let err = transport.send(&request).await.unwrap_err();
        assert!(matches!(err, Error::Timeout { timeout_ms: 50 }));
    }

    #[tokio::test]
    async fn test_map_error_reports_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let config = ClientConfig::builder()
            .timeout(Duration::from_millis(40))
            .build();
        let transport = ReqwestTransport::new(&config).unwrap();

        // the same mapping is used for the body read
        let timed_out = transport.client.get(server.uri()).send().await.unwrap_err();
        assert!(matches!(
            transport.map_error(timed_out),
            Error::Timeout { timeout_ms: 40 }
        ));
    }
}
