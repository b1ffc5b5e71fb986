//! Output table writers.
//!
//! The pipeline's outputs are tabular: per-zone school counts, the
//! per-cell hotspot table, and a JSON summary document. Rendering maps
//! from these tables is downstream work and out of scope here.

use std::path::Path;

use school_map_geography_models::Zone;
use school_map_stats_models::HotspotRecord;

type BoxError = Box<dyn std::error::Error>;

/// Writes per-zone school counts as CSV.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_zone_counts(path: &Path, zones: &[Zone], counts: &[u64]) -> Result<(), BoxError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["code", "name", "district", "schools"])?;

    for (zone, count) in zones.iter().zip(counts) {
        writer.write_record([
            zone.code.as_str(),
            zone.name.as_str(),
            zone.district.as_deref().unwrap_or(""),
            count.to_string().as_str(),
        ])?;
    }

    writer.flush()?;
    log::info!("Wrote {} zone counts to {}", zones.len(), path.display());
    Ok(())
}

/// Writes hotspot records as CSV.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_hotspots(path: &Path, records: &[HotspotRecord]) -> Result<(), BoxError> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    log::info!("Wrote {} hotspot records to {}", records.len(), path.display());
    Ok(())
}

/// Writes the run summary as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn write_summary(path: &Path, summary: &serde_json::Value) -> Result<(), BoxError> {
    std::fs::write(path, serde_json::to_string_pretty(summary)?)?;
    log::info!("Wrote run summary to {}", path.display());
    Ok(())
}
