//! CLI runner - executes the report

use crate::cli::commands::{Cli, OutputFormat};
use crate::ensembl::{format_variant, EnsemblClient, OverlapQuery};
use crate::error::Result;
use crate::http::Transport;
use crate::types::JsonValue;
use std::io::Write;
use tracing::{error, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run against the configured server, printing to stdout
    pub async fn run(&self) -> Result<()> {
        let config = self.cli.client_config()?;
        info!(
            "Using {} at {} requests/s",
            config.server, config.reqs_per_sec
        );

        let mut client = EnsemblClient::with_config(config)?;
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        self.report(&mut client, &mut out).await
    }

    /// Print the three report sections, separated by blank lines:
    /// variants of the target gene, its stable ID, and the genes
    /// overlapping the human region
    ///
    /// Query failures are logged and reported as no data so later sections
    /// still run.
    pub async fn report<T: Transport, W: Write>(
        &self,
        client: &mut EnsemblClient<T>,
        out: &mut W,
    ) -> Result<()> {
        let (species, symbol) = self.cli.target();

        let variants = or_none(client.get_variants(species, symbol).await);
        if let Some(variants) = variants.as_ref().and_then(JsonValue::as_array) {
            for variant in variants {
                writeln!(out, "{}", format_variant(variant))?;
            }
        }
        writeln!(out)?;

        let stable_id = or_none(client.get_ensembl_id(species, symbol).await);
        writeln!(out, "{}\n", stable_id.as_deref().unwrap_or("None"))?;

        let query = OverlapQuery::new()
            .species("human")
            .region(self.cli.region.clone())
            .features(self.cli.features.iter().copied());
        let overlapping = or_none(client.get_overlap(&query).await);
        writeln!(out, "{}\n", self.render(overlapping.as_ref())?)?;

        Ok(())
    }

    fn render(&self, value: Option<&JsonValue>) -> Result<String> {
        let Some(value) = value else {
            return Ok("None".to_string());
        };
        let rendered = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(value)?,
            OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
        };
        Ok(rendered)
    }
}

/// Log a failed query and carry on with no data
fn or_none<T>(result: Result<Option<T>>) -> Option<T> {
    result.unwrap_or_else(|e| {
        error!("{e}");
        None
    })
}
