//! # Ensembl REST client
//!
//! A minimal, rate-limited client for the [Ensembl REST API](https://rest.ensembl.org/).
//!
//! ## Features
//!
//! - **Gene Symbols**: Resolve a symbol such as `BRAF` to its stable ID
//! - **Variants**: Fetch variations overlapping a gene
//! - **Lookup**: Fetch an identifier's record, optionally with transcripts and exons
//! - **Region Overlap**: Fetch features of chosen types overlapping a region
//! - **Throttling**: Fixed-window client-side rate limit plus one retry on HTTP 429
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ensembl_rest::{EnsemblClient, OverlapQuery, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let mut client = EnsemblClient::new()?;
//!
//!     let stable_id = client.get_ensembl_id("human", "BRAF").await?;
//!     println!("{stable_id:?}");
//!
//!     let genes = client.get_overlap(&OverlapQuery::default()).await?;
//!     println!("{genes:?}");
//!
//!     Ok(())
//! }
//! ```
//!
//! A client owns its throttle state and takes `&mut self` for every query,
//! so it serves one caller at a time. Create one client per caller.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Client configuration
pub mod config;

/// Throttled HTTP dispatcher
pub mod http;

/// Region specifiers and formatting
pub mod region;

/// Ensembl endpoint queries
pub mod ensembl;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::ClientConfig;
pub use ensembl::{format_variant, EnsemblClient, OverlapQuery, SymbolLookup};
pub use error::{Error, Result};
pub use region::{format_region, Region};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
