//! HTTP client module
//!
//! Provides the throttled request dispatcher used by every Ensembl query.
//!
//! # Features
//!
//! - **Rate Limiting**: Fixed-window limiter, bursts up to the per-second budget
//! - **429 Handling**: One replay of the resolved request after `Retry-After + 1s`
//! - **Query Encoding**: Repeated-key or comma-joined sequence parameters
//! - **Transport Seam**: `reqwest` in production, scripted responses in tests

mod client;
mod params;
mod rate_limit;
mod transport;

#[cfg(test)]
pub(crate) mod mock;

pub use client::{HttpClient, RequestConfig, RETRY_PADDING};
pub use params::{ParamValue, QueryParams};
pub use rate_limit::{RateLimiter, RateLimiterConfig, WINDOW};
pub use transport::{PreparedRequest, ReqwestTransport, Transport, TransportResponse};
