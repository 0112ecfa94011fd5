//! Common types used throughout the Ensembl client
//!
//! This module contains shared type definitions, type aliases,
//! and the feature-type vocabulary accepted by overlap endpoints.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

// ============================================================================
// Feature Types
// ============================================================================

/// Feature types understood by the Ensembl overlap endpoints
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum FeatureType {
    #[default]
    Gene,
    Transcript,
    Cds,
    Exon,
    Repeat,
    Simple,
    Misc,
    Variation,
    SomaticVariation,
    StructuralVariation,
    SomaticStructuralVariation,
    Constrained,
    Regulatory,
    Segmentation,
    Motif,
    Chipseq,
    ArrayProbe,
}

impl FeatureType {
    /// Every feature type, in wire-vocabulary order
    pub const ALL: [FeatureType; 17] = [
        FeatureType::Gene,
        FeatureType::Transcript,
        FeatureType::Cds,
        FeatureType::Exon,
        FeatureType::Repeat,
        FeatureType::Simple,
        FeatureType::Misc,
        FeatureType::Variation,
        FeatureType::SomaticVariation,
        FeatureType::StructuralVariation,
        FeatureType::SomaticStructuralVariation,
        FeatureType::Constrained,
        FeatureType::Regulatory,
        FeatureType::Segmentation,
        FeatureType::Motif,
        FeatureType::Chipseq,
        FeatureType::ArrayProbe,
    ];

    /// Name used in the `feature` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureType::Gene => "gene",
            FeatureType::Transcript => "transcript",
            FeatureType::Cds => "cds",
            FeatureType::Exon => "exon",
            FeatureType::Repeat => "repeat",
            FeatureType::Simple => "simple",
            FeatureType::Misc => "misc",
            FeatureType::Variation => "variation",
            FeatureType::SomaticVariation => "somatic_variation",
            FeatureType::StructuralVariation => "structural_variation",
            FeatureType::SomaticStructuralVariation => "somatic_structural_variation",
            FeatureType::Constrained => "constrained",
            FeatureType::Regulatory => "regulatory",
            FeatureType::Segmentation => "segmentation",
            FeatureType::Motif => "motif",
            FeatureType::Chipseq => "chipseq",
            FeatureType::ArrayProbe => "array_probe",
        }
    }
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeatureType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FeatureType::ALL
            .iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| Error::InvalidFeature(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("gene", FeatureType::Gene)]
    #[test_case("cds", FeatureType::Cds)]
    #[test_case("somatic_structural_variation", FeatureType::SomaticStructuralVariation)]
    #[test_case("array_probe", FeatureType::ArrayProbe)]
    #[test_case("EXON", FeatureType::Exon)]
    fn test_feature_type_from_str(input: &str, expected: FeatureType) {
        assert_eq!(input.parse::<FeatureType>().unwrap(), expected);
    }

    #[test]
    fn test_feature_type_unknown() {
        let err = "protein".parse::<FeatureType>().unwrap_err();
        assert!(matches!(err, Error::InvalidFeature(ref f) if f == "protein"));
    }

    #[test]
    fn test_feature_type_display_matches_serde() {
        for feature in FeatureType::ALL {
            let json = serde_json::to_value(feature).unwrap();
            assert_eq!(json, JsonValue::String(feature.to_string()));
        }
    }

    #[test]
    fn test_feature_type_default() {
        assert_eq!(FeatureType::default(), FeatureType::Gene);
    }
}
