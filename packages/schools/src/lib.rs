#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! School listing ingestion.
//!
//! Parses the tabular school listing (CSV with `id`, `name`, `sector`,
//! `cluster`, `latitude`, `longitude` columns) into validated [`School`]
//! records. Malformed rows are rejected at load time with their line
//! number rather than coerced at use time.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use school_map_school_models::{School, SchoolSector};
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur while loading the school listing.
#[derive(Debug, Error)]
pub enum SchoolsError {
    /// CSV reading or deserialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// File could not be opened.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A row failed validation.
    #[error("invalid school listing row at line {line}: {message}")]
    InvalidRow {
        /// 1-based line number in the source file (header is line 1).
        line: u64,
        /// What was wrong with the row.
        message: String,
    },
}

/// A raw listing row before validation.
#[derive(Debug, Deserialize)]
struct RawRow {
    id: String,
    name: String,
    sector: String,
    cluster: u8,
    latitude: f64,
    longitude: f64,
}

/// Loads and validates the school listing from a CSV reader.
///
/// # Errors
///
/// Returns [`SchoolsError`] if the CSV cannot be read or any row fails
/// validation.
pub fn load_schools<R: Read>(reader: R) -> Result<Vec<School>, SchoolsError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut schools = Vec::new();

    for (idx, result) in csv_reader.deserialize::<RawRow>().enumerate() {
        // Header occupies line 1, so data rows start at line 2.
        let line = idx as u64 + 2;
        let raw = result?;
        schools.push(validate_row(line, raw)?);
    }

    log::info!("Loaded {} schools from listing", schools.len());
    Ok(schools)
}

/// Loads the school listing from a file path.
///
/// # Errors
///
/// Returns [`SchoolsError`] if the file cannot be opened or parsed.
pub fn load_schools_path(path: &Path) -> Result<Vec<School>, SchoolsError> {
    let file = std::fs::File::open(path)?;
    load_schools(file)
}

fn validate_row(line: u64, raw: RawRow) -> Result<School, SchoolsError> {
    let invalid = |message: String| SchoolsError::InvalidRow { line, message };

    let id = raw.id.trim();
    if id.is_empty() {
        return Err(invalid("empty school identifier".to_string()));
    }

    let name = raw.name.trim();
    if name.is_empty() {
        return Err(invalid(format!("school '{id}' has an empty name")));
    }

    let sector: SchoolSector = raw.sector.parse().map_err(invalid)?;

    if !(1..=6).contains(&raw.cluster) {
        return Err(invalid(format!(
            "cluster must be 1-6, got {}",
            raw.cluster
        )));
    }

    if !(-90.0..=90.0).contains(&raw.latitude) || !(-180.0..=180.0).contains(&raw.longitude) {
        return Err(invalid(format!(
            "coordinates ({}, {}) outside WGS84 range",
            raw.latitude, raw.longitude
        )));
    }
    // A (0, 0) coordinate is a geocoding placeholder, not a real location.
    if raw.latitude == 0.0 && raw.longitude == 0.0 {
        return Err(invalid(format!("school '{id}' has null island coordinates")));
    }

    Ok(School {
        id: id.to_string(),
        name: name.to_string(),
        sector,
        cluster: raw.cluster,
        latitude: raw.latitude,
        longitude: raw.longitude,
    })
}

/// Counts schools per sector, in [`SchoolSector::ALL`] order.
#[must_use]
pub fn count_by_sector(schools: &[School]) -> BTreeMap<SchoolSector, usize> {
    let mut counts = BTreeMap::new();
    for school in schools {
        *counts.entry(school.sector).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "\
id,name,sector,cluster,latitude,longitude
S001,SR Pengiran Anak Puteri Besar,MOE,4,4.9403,114.9481
S002,SUA Kampong Kiulap,MORA,4,4.9081,114.9335
S003,International School Brunei,private,3,4.9542,114.9692
";

    #[test]
    fn loads_valid_listing() {
        let schools = load_schools(LISTING.as_bytes()).unwrap();
        assert_eq!(schools.len(), 3);
        assert_eq!(schools[0].id, "S001");
        assert_eq!(schools[0].sector, SchoolSector::Government);
        assert_eq!(schools[1].sector, SchoolSector::Religious);
        assert_eq!(schools[2].sector, SchoolSector::Private);
    }

    #[test]
    fn rejects_unknown_sector() {
        let listing = "id,name,sector,cluster,latitude,longitude\n\
                       S001,Some School,charter,2,4.9,114.9\n";
        let err = load_schools(listing.as_bytes()).unwrap_err();
        match err {
            SchoolsError::InvalidRow { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("charter"));
            }
            other => panic!("expected InvalidRow, got {other:?}"),
        }
    }

    #[test]
    fn rejects_out_of_range_cluster() {
        let listing = "id,name,sector,cluster,latitude,longitude\n\
                       S001,Some School,MOE,7,4.9,114.9\n";
        assert!(load_schools(listing.as_bytes()).is_err());
    }

    #[test]
    fn rejects_null_island_coordinates() {
        let listing = "id,name,sector,cluster,latitude,longitude\n\
                       S001,Some School,MOE,2,0.0,0.0\n";
        assert!(load_schools(listing.as_bytes()).is_err());
    }

    #[test]
    fn rejects_empty_identifier() {
        let listing = "id,name,sector,cluster,latitude,longitude\n\
                       ,Some School,MOE,2,4.9,114.9\n";
        assert!(load_schools(listing.as_bytes()).is_err());
    }

    #[test]
    fn counts_schools_by_sector() {
        let schools = load_schools(LISTING.as_bytes()).unwrap();
        let counts = count_by_sector(&schools);
        assert_eq!(counts[&SchoolSector::Government], 1);
        assert_eq!(counts[&SchoolSector::Religious], 1);
        assert_eq!(counts[&SchoolSector::Private], 1);
    }
}
