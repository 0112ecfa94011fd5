//! CLI module
//!
//! `ensembl-rest [SPECIES SYMBOL]` prints, one blank-line separated block
//! each:
//!
//! - the variants overlapping the gene
//! - the gene's stable ID
//! - the genes overlapping a human region

mod commands;
mod runner;

pub use commands::{Cli, OutputFormat, DEFAULT_SPECIES, DEFAULT_SYMBOL};
pub use runner::Runner;
