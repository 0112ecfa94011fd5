//! Ensembl REST queries
//!
//! Thin methods over [`HttpClient`], one per endpoint.

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::http::{HttpClient, QueryParams, ReqwestTransport, Transport};
use crate::region::Region;
use crate::types::{FeatureType, JsonValue};
use tracing::debug;
use url::Url;

/// Scratch base used only to percent-encode path segments
const SEGMENT_BASE: &str = "http://localhost/";

/// Result of a gene symbol lookup
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolLookup {
    /// Stable ID of the first matching gene
    StableId(String),
    /// Every cross-reference the server returned
    Genes(JsonValue),
}

/// Parameters for a region overlap query
#[derive(Debug, Clone, PartialEq)]
pub struct OverlapQuery {
    /// Organism whose genome is searched
    pub species: String,
    /// Region to search
    pub region: Region,
    /// Feature types to return; empty means genes only
    pub features: Vec<FeatureType>,
}

impl Default for OverlapQuery {
    fn default() -> Self {
        Self {
            species: "human".to_string(),
            region: Region::default(),
            features: vec![FeatureType::Gene],
        }
    }
}

impl OverlapQuery {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn species(mut self, species: impl Into<String>) -> Self {
        self.species = species.into();
        self
    }

    #[must_use]
    pub fn region(mut self, region: impl Into<Region>) -> Self {
        self.region = region.into();
        self
    }

    #[must_use]
    pub fn features(mut self, features: impl IntoIterator<Item = FeatureType>) -> Self {
        self.features = features.into_iter().collect();
        self
    }

    fn feature_names(&self) -> Vec<&'static str> {
        if self.features.is_empty() {
            return vec![FeatureType::Gene.as_str()];
        }
        self.features.iter().map(FeatureType::as_str).collect()
    }
}

/// Client for the Ensembl REST API
///
/// Each method issues one or two throttled requests. `Ok(None)` means the
/// server had nothing for the query; failures come back as `Err`.
#[derive(Debug)]
pub struct EnsemblClient<T = ReqwestTransport> {
    http: HttpClient<T>,
}

impl EnsemblClient<ReqwestTransport> {
    /// Client for the public server at 15 requests per second
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Result<Self> {
        Ok(Self {
            http: HttpClient::with_config(config)?,
        })
    }
}

impl<T: Transport> EnsemblClient<T> {
    /// Client over an arbitrary transport
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self> {
        Ok(Self {
            http: HttpClient::with_transport(config, transport)?,
        })
    }

    /// Underlying dispatcher, for endpoints without a dedicated method
    pub fn http(&mut self) -> &mut HttpClient<T> {
        &mut self.http
    }

    /// Resolve a gene symbol (e.g. `BRAF`) to the stable ID of the first
    /// matching gene for `species`
    pub async fn get_ensembl_id(&mut self, species: &str, symbol: &str) -> Result<Option<String>> {
        match self.lookup_symbol(species, symbol, true).await? {
            Some(SymbolLookup::StableId(id)) => Ok(Some(id)),
            _ => Ok(None),
        }
    }

    /// All gene cross-references for a symbol
    pub async fn get_ensembl_ids(
        &mut self,
        species: &str,
        symbol: &str,
    ) -> Result<Option<JsonValue>> {
        match self.lookup_symbol(species, symbol, false).await? {
            Some(SymbolLookup::Genes(genes)) => Ok(Some(genes)),
            _ => Ok(None),
        }
    }

    /// Look up a gene symbol, returning either the first stable ID or the
    /// full list
    pub async fn lookup_symbol(
        &mut self,
        species: &str,
        symbol: &str,
        only_stable_id: bool,
    ) -> Result<Option<SymbolLookup>> {
        let endpoint = endpoint_path(["xrefs", "symbol", species, symbol])?;
        let genes = self
            .http
            .get_json(&endpoint, QueryParams::new().with("object_type", "gene"))
            .await?;

        let Some(genes) = genes.filter(is_present) else {
            debug!("No genes found for {species}/{symbol}");
            return Ok(None);
        };

        if !only_stable_id {
            return Ok(Some(SymbolLookup::Genes(genes)));
        }

        let stable_id = genes
            .as_array()
            .and_then(|list| list.first())
            .and_then(|gene| gene.get("id"))
            .and_then(JsonValue::as_str)
            .map(str::to_string);

        if stable_id.is_none() {
            debug!("First gene for {species}/{symbol} has no stable id");
        }
        Ok(stable_id.map(SymbolLookup::StableId))
    }

    /// Variants overlapping the gene a symbol resolves to
    pub async fn get_variants(&mut self, species: &str, symbol: &str) -> Result<Option<JsonValue>> {
        let Some(stable_id) = self.get_ensembl_id(species, symbol).await? else {
            return Ok(None);
        };

        let endpoint = endpoint_path(["overlap", "id", stable_id.as_str()])?;
        self.http
            .get_json(&endpoint, QueryParams::new().with("feature", "variation"))
            .await
    }

    /// Basic information on an Ensembl identifier (e.g. `ENSE00001939332`)
    ///
    /// With `expand`, connected features are included: for a gene, its
    /// transcripts, translations and exons.
    pub async fn get_ensembl_info(
        &mut self,
        identifier: &str,
        expand: bool,
    ) -> Result<Option<JsonValue>> {
        let endpoint = endpoint_path(["lookup", "id", identifier])?;
        let mut params = QueryParams::new();
        if expand {
            params.insert("expand", 1u32);
        }

        let info = self.http.get_json(&endpoint, params).await?;
        Ok(info.filter(is_present))
    }

    /// Features of the requested types overlapping a region
    pub async fn get_overlap(&mut self, query: &OverlapQuery) -> Result<Option<JsonValue>> {
        let region = query.region.format()?;
        let endpoint = endpoint_path([
            "overlap",
            "region",
            query.species.as_str(),
            region.as_str(),
        ])?;
        let params = QueryParams::new().with("feature", query.feature_names());

        let info = self.http.get_json(&endpoint, params).await?;
        Ok(info.filter(is_present))
    }
}

/// Join path segments into an endpoint, percent-encoding each one
fn endpoint_path<'a>(segments: impl IntoIterator<Item = &'a str>) -> Result<String> {
    let mut url = Url::parse(SEGMENT_BASE)?;
    url.path_segments_mut()
        .map_err(|()| Error::Other(format!("{SEGMENT_BASE} cannot be a base URL")))?
        .clear()
        .extend(segments);
    Ok(url.path().to_string())
}

/// Render a variant record as `chrom:start-end:strand ==> id (consequence)`
pub fn format_variant(variant: &JsonValue) -> String {
    format!(
        "{}:{}-{}:{} ==> {} ({})",
        field(variant, "seq_region_name"),
        field(variant, "start"),
        field(variant, "end"),
        field(variant, "strand"),
        field(variant, "id"),
        field(variant, "consequence_type"),
    )
}

fn field(record: &JsonValue, name: &str) -> String {
    match record.get(name) {
        Some(JsonValue::String(s)) => s.clone(),
        Some(JsonValue::Null) | None => "None".to_string(),
        Some(other) => other.to_string(),
    }
}

/// Empty lists and objects count as "nothing found"
fn is_present(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Array(items) => !items.is_empty(),
        JsonValue::Object(map) => !map.is_empty(),
        _ => true,
    }
}
