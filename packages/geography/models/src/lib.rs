#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Administrative zone, study-grid, and population types.
//!
//! A [`Zone`] is an administrative polygon at one of Brunei's two boundary
//! granularities (mukim or kampong). A [`GridCell`] is one square of the
//! regular analysis grid overlaid on the study area for the local hotspot
//! statistic. Geometry-carrying types stay plain structs; only the pure
//! tabular types derive serde.

use geo::{MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};

/// Boundary granularity of an administrative zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryLevel {
    /// Sub-district level (coarse).
    Mukim,
    /// Village level (fine).
    Kampong,
}

impl std::fmt::Display for BoundaryLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mukim => write!(f, "mukim"),
            Self::Kampong => write!(f, "kampong"),
        }
    }
}

/// An administrative zone polygon.
#[derive(Debug, Clone)]
pub struct Zone {
    /// Zone code from the boundary dataset (e.g. "BM-03").
    pub code: String,
    /// Zone name (e.g. "Mukim Gadong B").
    pub name: String,
    /// Parent district, when the dataset carries one (e.g. "Brunei-Muara").
    pub district: Option<String>,
    /// Boundary granularity.
    pub level: BoundaryLevel,
    /// Boundary geometry in WGS84.
    pub geometry: MultiPolygon<f64>,
}

/// The study-area outline used for final clipping of grid cells.
#[derive(Debug, Clone)]
pub struct StudyArea {
    /// Outline geometry in WGS84.
    pub geometry: MultiPolygon<f64>,
}

/// A square cell of the regular analysis grid.
#[derive(Debug, Clone)]
pub struct GridCell {
    /// Row index from the south edge of the grid.
    pub row: u32,
    /// Column index from the west edge of the grid.
    pub col: u32,
    /// Cell geometry in WGS84.
    pub geometry: Polygon<f64>,
}

impl GridCell {
    /// Stable cell label used in outputs (e.g. "r04c12").
    #[must_use]
    pub fn label(&self) -> String {
        format!("r{:02}c{:02}", self.row, self.col)
    }
}

/// A population table row keyed by zone code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulationRecord {
    /// Zone code matching the boundary dataset.
    pub zone_code: String,
    /// Resident population of the zone.
    pub population: u64,
}
