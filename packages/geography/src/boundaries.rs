//! Administrative boundary loading.
//!
//! Parses `GeoJSON` feature collections into typed [`Zone`] records using a
//! configurable property field mapping, since published boundary datasets
//! disagree on attribute naming (`code` vs `MUKIM_ID`, `name` vs
//! `NAME_2`, and so on).

use std::path::Path;

use geo::MultiPolygon;
use geojson::{GeoJson, JsonObject};
use school_map_geography_models::{BoundaryLevel, StudyArea, Zone};

use crate::GeoError;

/// Property field names to read zone attributes from.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneFieldMapping {
    /// Property holding the zone code.
    pub code: String,
    /// Property holding the zone name.
    pub name: String,
    /// Property holding the parent district, if the dataset has one.
    pub district: Option<String>,
}

impl Default for ZoneFieldMapping {
    fn default() -> Self {
        Self {
            code: "code".to_string(),
            name: "name".to_string(),
            district: None,
        }
    }
}

/// Parses zone boundaries from a `GeoJSON` feature collection string.
///
/// Every feature must carry the mapped code and name properties and a
/// polygonal geometry; a malformed feature fails the whole load rather
/// than being silently skipped.
///
/// # Errors
///
/// Returns [`GeoError`] if the document is not a feature collection, or a
/// feature is missing required properties or has non-polygonal geometry.
pub fn parse_zones(
    geojson_str: &str,
    level: BoundaryLevel,
    fields: &ZoneFieldMapping,
) -> Result<Vec<Zone>, GeoError> {
    let GeoJson::FeatureCollection(collection) = geojson_str.parse::<GeoJson>()? else {
        return Err(GeoError::Conversion {
            message: format!("expected a FeatureCollection of {level} boundaries"),
        });
    };

    let mut zones = Vec::with_capacity(collection.features.len());

    for (idx, feature) in collection.features.into_iter().enumerate() {
        let props = feature.properties.as_ref();

        let code = prop_string(props, &fields.code).ok_or_else(|| GeoError::Conversion {
            message: format!("feature {idx}: missing '{}' property", fields.code),
        })?;
        let name = prop_string(props, &fields.name).ok_or_else(|| GeoError::Conversion {
            message: format!("feature {idx} ({code}): missing '{}' property", fields.name),
        })?;
        let district = fields
            .district
            .as_ref()
            .and_then(|field| prop_string(props, field));

        let geometry = feature.geometry.ok_or_else(|| GeoError::Conversion {
            message: format!("feature {idx} ({code}): missing geometry"),
        })?;
        let geometry = to_multi_polygon(geometry).ok_or_else(|| GeoError::Conversion {
            message: format!("feature {idx} ({code}): geometry is not polygonal"),
        })?;

        zones.push(Zone {
            code,
            name,
            district,
            level,
            geometry,
        });
    }

    log::info!("Parsed {} {level} boundaries", zones.len());
    Ok(zones)
}

/// Loads zone boundaries from a `GeoJSON` file.
///
/// # Errors
///
/// Returns [`GeoError`] if the file cannot be read or parsed.
pub fn load_zones(
    path: &Path,
    level: BoundaryLevel,
    fields: &ZoneFieldMapping,
) -> Result<Vec<Zone>, GeoError> {
    let contents = std::fs::read_to_string(path)?;
    parse_zones(&contents, level, fields)
}

/// Parses the study-area outline from a `GeoJSON` string.
///
/// Accepts a bare geometry, a single feature, or a feature collection; all
/// polygonal parts are merged into one outline.
///
/// # Errors
///
/// Returns [`GeoError`] if no polygonal geometry is present.
pub fn parse_study_area(geojson_str: &str) -> Result<StudyArea, GeoError> {
    let mut polygons = Vec::new();

    match geojson_str.parse::<GeoJson>()? {
        GeoJson::Geometry(geometry) => collect_polygons(geometry, &mut polygons),
        GeoJson::Feature(feature) => {
            if let Some(geometry) = feature.geometry {
                collect_polygons(geometry, &mut polygons);
            }
        }
        GeoJson::FeatureCollection(collection) => {
            for feature in collection.features {
                if let Some(geometry) = feature.geometry {
                    collect_polygons(geometry, &mut polygons);
                }
            }
        }
    }

    if polygons.is_empty() {
        return Err(GeoError::Conversion {
            message: "study area contains no polygonal geometry".to_string(),
        });
    }

    Ok(StudyArea {
        geometry: MultiPolygon(polygons),
    })
}

/// Loads the study-area outline from a `GeoJSON` file.
///
/// # Errors
///
/// Returns [`GeoError`] if the file cannot be read or parsed.
pub fn load_study_area(path: &Path) -> Result<StudyArea, GeoError> {
    let contents = std::fs::read_to_string(path)?;
    parse_study_area(&contents)
}

/// Extracts a trimmed, non-empty string property.
fn prop_string(props: Option<&JsonObject>, key: &str) -> Option<String> {
    props?
        .get(key)
        .and_then(geojson::JsonValue::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Converts a `GeoJSON` geometry into a [`MultiPolygon`].
/// Handles both `Polygon` and `MultiPolygon` geometry types.
fn to_multi_polygon(geometry: geojson::Geometry) -> Option<MultiPolygon<f64>> {
    let geo_geom: geo::Geometry<f64> = geometry.try_into().ok()?;
    match geo_geom {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
        _ => None,
    }
}

fn collect_polygons(geometry: geojson::Geometry, out: &mut Vec<geo::Polygon<f64>>) {
    if let Some(mp) = to_multi_polygon(geometry) {
        out.extend(mp.0);
    }
}
