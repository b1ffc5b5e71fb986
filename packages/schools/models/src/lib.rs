#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Typed school listing records.
//!
//! A [`School`] is a validated geographic point entity from the national
//! school listing: a stable identifier, the administering sector, the
//! Ministry of Education cluster, and WGS84 coordinates. Rows are parsed
//! and validated by the `school_map_schools` loader; everything downstream
//! consumes these types unchanged.

use serde::{Deserialize, Serialize};

/// Administering sector of a school.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchoolSector {
    /// Ministry of Education government schools.
    Government,
    /// Ministry of Religious Affairs religious schools.
    Religious,
    /// Privately administered schools.
    Private,
}

impl SchoolSector {
    /// All sectors, in reporting order.
    pub const ALL: &[Self] = &[Self::Government, Self::Religious, Self::Private];
}

impl std::fmt::Display for SchoolSector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Government => write!(f, "government"),
            Self::Religious => write!(f, "religious"),
            Self::Private => write!(f, "private"),
        }
    }
}

impl std::str::FromStr for SchoolSector {
    type Err = String;

    /// Accepts the labels used across published listings: the sector name
    /// or the administering ministry's abbreviation.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "government" | "moe" => Ok(Self::Government),
            "religious" | "mora" => Ok(Self::Religious),
            "private" => Ok(Self::Private),
            other => Err(format!("unknown school sector '{other}'")),
        }
    }
}

/// A validated school listing entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct School {
    /// Stable identifier from the source listing.
    pub id: String,
    /// School name.
    pub name: String,
    /// Administering sector.
    pub sector: SchoolSector,
    /// Ministry of Education cluster (1-6).
    pub cluster: u8,
    /// WGS84 latitude.
    pub latitude: f64,
    /// WGS84 longitude.
    pub longitude: f64,
}
