//! Ensembl REST API queries
//!
//! - `get_ensembl_id` / `get_ensembl_ids` - gene symbol cross-references
//! - `get_variants` - variations overlapping a gene
//! - `get_ensembl_info` - identifier lookup, optionally expanded
//! - `get_overlap` - features overlapping a region

mod client;

pub use client::{format_variant, EnsemblClient, OverlapQuery, SymbolLookup};
