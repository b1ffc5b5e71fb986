//! Population table loading.
//!
//! The census population table is keyed by zone code and only feeds the
//! school-count regression; it never participates in the autocorrelation
//! statistics.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use school_map_geography_models::PopulationRecord;

use crate::GeoError;

/// Loads the population table from a CSV reader.
///
/// # Errors
///
/// Returns [`GeoError`] if the CSV cannot be read, a zone code is empty,
/// or a zone code appears twice.
pub fn load_population<R: Read>(reader: R) -> Result<Vec<PopulationRecord>, GeoError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut records: Vec<PopulationRecord> = Vec::new();

    for (idx, result) in csv_reader.deserialize::<PopulationRecord>().enumerate() {
        let line = idx + 2;
        let record = result?;

        if record.zone_code.trim().is_empty() {
            return Err(GeoError::Conversion {
                message: format!("population row at line {line} has an empty zone code"),
            });
        }
        if records.iter().any(|r| r.zone_code == record.zone_code) {
            return Err(GeoError::Conversion {
                message: format!(
                    "duplicate population entry for zone '{}' at line {line}",
                    record.zone_code
                ),
            });
        }

        records.push(record);
    }

    log::info!("Loaded population for {} zones", records.len());
    Ok(records)
}

/// Loads the population table from a file path.
///
/// # Errors
///
/// Returns [`GeoError`] if the file cannot be opened or parsed.
pub fn load_population_path(path: &Path) -> Result<Vec<PopulationRecord>, GeoError> {
    let file = std::fs::File::open(path)?;
    load_population(file)
}

/// Indexes population records by zone code.
#[must_use]
pub fn population_by_code(records: &[PopulationRecord]) -> BTreeMap<&str, u64> {
    records
        .iter()
        .map(|r| (r.zone_code.as_str(), r.population))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_population_table() {
        let table = "zoneCode,population\nBM-01,12400\nBM-02,31800\n";
        let records = load_population(table.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].population, 31800);

        let by_code = population_by_code(&records);
        assert_eq!(by_code["BM-01"], 12400);
    }

    #[test]
    fn rejects_duplicate_zone_code() {
        let table = "zoneCode,population\nBM-01,12400\nBM-01,999\n";
        assert!(load_population(table.as_bytes()).is_err());
    }

    #[test]
    fn rejects_empty_zone_code() {
        let table = "zoneCode,population\n,12400\n";
        assert!(load_population(table.as_bytes()).is_err());
    }
}
