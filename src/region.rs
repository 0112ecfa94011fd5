//! Genomic region specifiers
//!
//! Ensembl overlap endpoints take regions as `<chrom>:<start>-<end>`.
//! Callers can hand over either a structured triple or free text that
//! contains such a string (e.g. `chr7:140424943-140624564:1`), and
//! [`format_region`] normalizes both.

use crate::error::{Error, Result};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Matches the first `<chrom>:<start>-<end>` inside arbitrary text
static REGION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([XY]|[0-9]+):[0-9]+-[0-9]+").unwrap());

/// Default region used by overlap queries (BRAF on GRCh38 chromosome 7)
pub const DEFAULT_REGION: &str = "7:140424943-140624564";

/// A region as supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Region {
    /// Structured chromosome and coordinates
    Coords { chrom: String, start: u64, end: u64 },
    /// Text expected to contain a `<chrom>:<start>-<end>` substring
    Text(String),
}

impl Region {
    /// Create a structured region
    pub fn coords(chrom: impl Into<String>, start: u64, end: u64) -> Self {
        Region::Coords {
            chrom: chrom.into(),
            start,
            end,
        }
    }

    /// Create a textual region
    pub fn text(text: impl Into<String>) -> Self {
        Region::Text(text.into())
    }

    /// Normalized `<chrom>:<start>-<end>` form
    pub fn format(&self) -> Result<String> {
        match self {
            Region::Coords { chrom, start, end } => Ok(format!("{chrom}:{start}-{end}")),
            Region::Text(text) => REGION_REGEX
                .find(text)
                .map(|m| m.as_str().to_string())
                .ok_or_else(|| {
                    Error::invalid_region(text.as_str(), "expected <chrom>:<start>-<end>")
                }),
        }
    }
}

impl Default for Region {
    fn default() -> Self {
        Region::Text(DEFAULT_REGION.to_string())
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Region::Coords { chrom, start, end } => write!(f, "{chrom}:{start}-{end}"),
            Region::Text(text) => f.write_str(text),
        }
    }
}

impl FromStr for Region {
    type Err = Error;

    /// Parses eagerly so bad input fails at the boundary
    fn from_str(s: &str) -> Result<Self> {
        let region = Region::text(s);
        region.format()?;
        Ok(region)
    }
}

impl From<&str> for Region {
    fn from(text: &str) -> Self {
        Region::text(text)
    }
}

impl From<String> for Region {
    fn from(text: String) -> Self {
        Region::Text(text)
    }
}

impl<C: Into<String>> From<(C, u64, u64)> for Region {
    fn from((chrom, start, end): (C, u64, u64)) -> Self {
        Region::coords(chrom, start, end)
    }
}

impl<S: AsRef<str>> TryFrom<&[S]> for Region {
    type Error = Error;

    /// Accepts a `[chrom, start, end]` sequence of strings
    fn try_from(parts: &[S]) -> Result<Self> {
        let joined = || {
            parts
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<_>>()
                .join(",")
        };

        let [chrom, start, end] = parts else {
            return Err(Error::invalid_region(
                joined(),
                format!("expected 3 elements, got {}", parts.len()),
            ));
        };

        let coord = |value: &S, name: &str| {
            value.as_ref().trim().parse::<u64>().map_err(|_| {
                Error::invalid_region(
                    joined(),
                    format!("{name} '{}' is not a position", value.as_ref()),
                )
            })
        };

        Ok(Region::coords(
            chrom.as_ref(),
            coord(start, "start")?,
            coord(end, "end")?,
        ))
    }
}

/// Return the region in the form expected by Ensembl
pub fn format_region(region: impl Into<Region>) -> Result<String> {
    region.into().format()
}
