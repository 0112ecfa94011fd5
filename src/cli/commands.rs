//! CLI arguments

use crate::config::{ClientConfig, GRCH37_SERVER};
use crate::error::Result;
use crate::region::{Region, DEFAULT_REGION};
use crate::types::FeatureType;
use clap::Parser;
use std::path::PathBuf;

/// Species used when no positional arguments are given
pub const DEFAULT_SPECIES: &str = "mouse";

/// Gene symbol used when no positional arguments are given
pub const DEFAULT_SYMBOL: &str = "BRAF";

/// Query the Ensembl REST API for a gene's variants, stable ID and a
/// region's overlapping features
#[derive(Parser, Debug)]
#[command(name = "ensembl-rest")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Species name, e.g. human (defaults to mouse unless SYMBOL is also given)
    pub species: Option<String>,

    /// Gene symbol, e.g. BRAF
    pub symbol: Option<String>,

    /// REST server base URL
    #[arg(long)]
    pub server: Option<String>,

    /// Use the GRCh37 server
    #[arg(long, conflicts_with = "server")]
    pub grch37: bool,

    /// Maximum requests per second
    #[arg(long)]
    pub reqs_per_sec: Option<u32>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Client configuration file (YAML)
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// Region for the human overlap query
    #[arg(long, default_value = DEFAULT_REGION, value_parser = parse_region)]
    pub region: Region,

    /// Feature types for the overlap query (repeatable, default gene)
    #[arg(long = "feature", value_enum)]
    pub features: Vec<FeatureType>,

    /// Output format for JSON sections
    #[arg(short, long, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Species and symbol to query; both positionals or neither
    pub fn target(&self) -> (&str, &str) {
        match (&self.species, &self.symbol) {
            (Some(species), Some(symbol)) => (species.as_str(), symbol.as_str()),
            _ => (DEFAULT_SPECIES, DEFAULT_SYMBOL),
        }
    }

    /// Client configuration: file (if any), then command-line overrides
    pub fn client_config(&self) -> Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::from_file(path)?,
            None => ClientConfig::default(),
        };

        if self.grch37 {
            config.server = GRCH37_SERVER.to_string();
        }
        if let Some(server) = &self.server {
            config.server.clone_from(server);
        }
        if let Some(reqs_per_sec) = self.reqs_per_sec {
            config.reqs_per_sec = reqs_per_sec;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_ms = timeout.saturating_mul(1000);
        }

        config.validate()?;
        Ok(config)
    }
}

/// Reject regions without a `<chrom>:<start>-<end>` at parse time
fn parse_region(s: &str) -> Result<Region> {
    s.parse()
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON on one line
    Json,
    /// Indented JSON
    Pretty,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_SERVER;
    use crate::error::Error;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["ensembl-rest"]);
        assert_eq!(cli.target(), ("mouse", "BRAF"));
        assert_eq!(cli.region.format().unwrap(), "7:140424943-140624564");
        assert!(cli.features.is_empty());
        assert_eq!(cli.format, OutputFormat::Json);

        let config = cli.client_config().unwrap();
        assert_eq!(config.server, DEFAULT_SERVER);
        assert_eq!(config.reqs_per_sec, 15);
    }

    #[test]
    fn test_positional_target() {
        let cli = Cli::parse_from(["ensembl-rest", "human", "TP53"]);
        assert_eq!(cli.target(), ("human", "TP53"));
    }

    #[test]
    fn test_single_positional_falls_back_to_defaults() {
        let cli = Cli::parse_from(["ensembl-rest", "human"]);
        assert_eq!(cli.target(), ("mouse", "BRAF"));
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::parse_from([
            "ensembl-rest",
            "--grch37",
            "--reqs-per-sec",
            "4",
            "--timeout",
            "9",
            "--feature",
            "gene",
            "--feature",
            "somatic_variation",
            "--format",
            "pretty",
        ]);
        let config = cli.client_config().unwrap();

        assert_eq!(config.server, GRCH37_SERVER);
        assert_eq!(config.reqs_per_sec, 4);
        assert_eq!(config.timeout_ms, 9000);
        assert_eq!(
            cli.features,
            vec![FeatureType::Gene, FeatureType::SomaticVariation]
        );
        assert_eq!(cli.format, OutputFormat::Pretty);
    }

    #[test]
    fn test_server_conflicts_with_grch37() {
        let result = Cli::try_parse_from([
            "ensembl-rest",
            "--grch37",
            "--server",
            "http://localhost/",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_feature_rejected() {
        let result = Cli::try_parse_from(["ensembl-rest", "--feature", "protein"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_region_validated_at_parse() {
        let cli = Cli::parse_from(["ensembl-rest", "--region", "chr1:100-200:1"]);
        assert_eq!(cli.region.format().unwrap(), "1:100-200");

        let result = Cli::try_parse_from(["ensembl-rest", "--region", "chromosome one"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_rate_rejected() {
        let cli = Cli::parse_from(["ensembl-rest", "--reqs-per-sec", "0"]);
        assert!(matches!(
            cli.client_config(),
            Err(Error::InvalidConfigValue { .. })
        ));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let cli = Cli::parse_from(["ensembl-rest", "--timeout", "0"]);
        assert!(matches!(
            cli.client_config(),
            Err(Error::InvalidConfigValue { ref field, .. }) if field == "timeout_ms"
        ));
    }

    #[test]
    fn test_config_file_then_flags() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server: http://localhost:8080/\nreqs_per_sec: 2").unwrap();

        let path = file.path().to_str().unwrap();
        let cli = Cli::parse_from(["ensembl-rest", "-C", path, "--reqs-per-sec", "6"]);
        let config = cli.client_config().unwrap();

        assert_eq!(config.server, "http://localhost:8080/");
        assert_eq!(config.reqs_per_sec, 6);
    }
}
