#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Result value objects for the spatial statistics.
//!
//! Produced once per analysis run and never mutated afterwards. These
//! types are what the CLI serializes into the output tables.

use serde::{Deserialize, Serialize};

/// Null hypothesis assumption for the global statistic's variance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullAssumption {
    /// Normal-approximation variance.
    Normality,
    /// Kurtosis-corrected randomization variance.
    #[default]
    Randomization,
}

impl std::fmt::Display for NullAssumption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normality => write!(f, "normality"),
            Self::Randomization => write!(f, "randomization"),
        }
    }
}

/// A global autocorrelation statistic with its significance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutocorrelationResult {
    /// The statistic itself (Moran's I).
    pub statistic: f64,
    /// Expected value under the null.
    pub expected: f64,
    /// Variance under the chosen null assumption.
    pub variance: f64,
    /// Standard score of the statistic.
    pub z_score: f64,
    /// Two-sided p-value from the standard normal distribution.
    pub p_value: f64,
}

/// Classification of a spatial unit by its local statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HotspotClass {
    /// Significantly concentrated high values.
    Hotspot,
    /// Significantly concentrated low values.
    Coldspot,
    /// No significant local concentration.
    NotSignificant,
}

impl std::fmt::Display for HotspotClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hotspot => write!(f, "hotspot"),
            Self::Coldspot => write!(f, "coldspot"),
            Self::NotSignificant => write!(f, "not significant"),
        }
    }
}

/// Which tails of the local statistic the filtered output reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tails {
    /// Hotspots only, matching the source analysis's one-sided emphasis.
    #[default]
    HotspotsOnly,
    /// Hotspots and coldspots.
    Both,
}

/// Per-unit output of the local hotspot statistic.
///
/// The optional fields carry `None` when the statistic is undefined for
/// that unit (zero weight row, or no schools anywhere); undefined is a
/// reported condition, never a crash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotspotRecord {
    /// Grid-cell label or zone code.
    pub unit: String,
    /// The unit's study variable (school count).
    pub value: f64,
    /// The Gi* share statistic.
    pub gi_star: Option<f64>,
    /// Standard score of the local statistic.
    pub z_score: Option<f64>,
    /// Two-sided p-value from the standard normal distribution.
    pub p_value: Option<f64>,
    /// Classification at the configured significance threshold.
    pub class: HotspotClass,
}

/// Ordinary least squares fit of school count against population.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegressionSummary {
    /// Fitted slope.
    pub slope: f64,
    /// Fitted intercept.
    pub intercept: f64,
    /// Coefficient of determination.
    pub r_squared: f64,
    /// Residual standard error.
    pub residual_std_error: f64,
    /// Number of observations.
    pub n: usize,
}
