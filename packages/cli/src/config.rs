//! TOML analysis configuration.
//!
//! Every analysis parameter the pipeline honors lives in one config file:
//! input paths, grid cell size, significance threshold, which tails to
//! report, the null assumption for the global statistic, and the
//! zero-neighbor row policy. Defaults reproduce the published analysis.

use std::path::{Path, PathBuf};

use school_map_geography::boundaries::ZoneFieldMapping;
use school_map_stats_models::{NullAssumption, Tails};
use school_map_weights::ZeroNeighborPolicy;
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur while loading the analysis configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A parameter value is out of range.
    #[error("invalid configuration: {message}")]
    Invalid {
        /// Which parameter was rejected and why.
        message: String,
    },
}

/// Analysis configuration, deserialized from TOML.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct AnalysisConfig {
    /// School listing CSV.
    pub schools: PathBuf,
    /// Mukim boundary `GeoJSON`.
    pub mukim_boundaries: PathBuf,
    /// Optional kampong boundary `GeoJSON` (fine granularity).
    pub kampong_boundaries: Option<PathBuf>,
    /// Study-area outline `GeoJSON`.
    pub study_area: PathBuf,
    /// Optional population CSV keyed by zone code.
    pub population: Option<PathBuf>,
    /// Property names to read zone attributes from.
    #[serde(default)]
    pub zone_fields: ZoneFieldMapping,
    /// Analysis grid cell size in kilometres.
    #[serde(default = "default_cell_km")]
    pub cell_km: f64,
    /// Significance threshold for hotspot classification.
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    /// Which tails of the local statistic the filtered output reports.
    #[serde(default)]
    pub tails: Tails,
    /// Null assumption for the global statistic's variance.
    #[serde(default)]
    pub null_assumption: NullAssumption,
    /// How binary-mode weights treat zero-neighbor regions.
    #[serde(default)]
    pub zero_neighbor_policy: ZeroNeighborPolicy,
    /// Directory the output tables are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

const fn default_cell_km() -> f64 {
    5.0
}

const fn default_alpha() -> f64 {
    0.05
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("out")
}

/// Parses and validates a configuration from a TOML string.
///
/// # Errors
///
/// Returns [`ConfigError`] on malformed TOML or out-of-range parameters.
pub fn parse_config(contents: &str) -> Result<AnalysisConfig, ConfigError> {
    let config: AnalysisConfig = toml::from_str(contents)?;

    if !(config.alpha > 0.0 && config.alpha < 1.0) {
        return Err(ConfigError::Invalid {
            message: format!("alpha must lie in (0, 1), got {}", config.alpha),
        });
    }
    if !(config.cell_km > 0.0 && config.cell_km.is_finite()) {
        return Err(ConfigError::Invalid {
            message: format!("cell_km must be positive, got {}", config.cell_km),
        });
    }

    Ok(config)
}

/// Loads the configuration from a file path.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file cannot be read or validated.
pub fn load_config(path: &Path) -> Result<AnalysisConfig, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
schools = "data/schools.csv"
mukim_boundaries = "data/mukim.geojson"
study_area = "data/study_area.geojson"
"#;

    #[test]
    fn minimal_config_uses_published_defaults() {
        let config = parse_config(MINIMAL).unwrap();
        assert!((config.cell_km - 5.0).abs() < f64::EPSILON);
        assert!((config.alpha - 0.05).abs() < f64::EPSILON);
        assert_eq!(config.tails, Tails::HotspotsOnly);
        assert_eq!(config.null_assumption, NullAssumption::Randomization);
        assert_eq!(config.zero_neighbor_policy, ZeroNeighborPolicy::ZeroRow);
        assert!(config.kampong_boundaries.is_none());
    }

    #[test]
    fn full_config_round_trips() {
        let contents = r#"
schools = "data/schools.csv"
mukim_boundaries = "data/mukim.geojson"
kampong_boundaries = "data/kampong.geojson"
study_area = "data/study_area.geojson"
population = "data/population.csv"
cell_km = 2.5
alpha = 0.01
tails = "both"
null_assumption = "normality"
zero_neighbor_policy = "self_weight"
output_dir = "results"

[zone_fields]
code = "MUKIM_ID"
name = "NAME_2"
district = "NAME_1"
"#;
        let config = parse_config(contents).unwrap();
        assert_eq!(config.tails, Tails::Both);
        assert_eq!(config.null_assumption, NullAssumption::Normality);
        assert_eq!(config.zero_neighbor_policy, ZeroNeighborPolicy::SelfWeight);
        assert_eq!(config.zone_fields.code, "MUKIM_ID");
        assert_eq!(config.zone_fields.district.as_deref(), Some("NAME_1"));
    }

    #[test]
    fn rejects_out_of_range_alpha() {
        let contents = format!("{MINIMAL}alpha = 1.5\n");
        assert!(matches!(
            parse_config(&contents),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn rejects_unknown_keys() {
        let contents = format!("{MINIMAL}grid_size = 5.0\n");
        assert!(matches!(parse_config(&contents), Err(ConfigError::Toml(_))));
    }
}
