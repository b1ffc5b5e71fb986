#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory spatial index for zone attribution.
//!
//! Builds an R-tree over zone (or grid-cell) polygons and provides fast
//! point-in-polygon lookups for assigning schools to their enclosing
//! spatial unit. Schools that fall outside every polygon are tracked and
//! reported, never silently dropped, since they affect the validity of
//! the study variable.

use geo::{BoundingRect, Contains, Intersects, MultiPolygon};
use rstar::{AABB, RTree, RTreeObject};
use school_map_geography_models::{GridCell, StudyArea, Zone};
use school_map_school_models::School;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while building a spatial index.
#[derive(Debug, Error)]
pub enum SpatialError {
    /// A polygon had no spatial extent.
    #[error("geometry for '{label}' has no extent")]
    EmptyGeometry {
        /// Zone code or grid-cell label of the offending polygon.
        label: String,
    },
}

/// A polygon stored in the R-tree with its position in the source slice.
struct IndexedPolygon {
    idx: usize,
    envelope: AABB<[f64; 2]>,
    polygon: MultiPolygon<f64>,
}

impl RTreeObject for IndexedPolygon {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Pre-built R-tree index over a set of non-overlapping polygons.
///
/// Constructed once per analysis run and queried for every school point.
pub struct PolygonIndex {
    tree: RTree<IndexedPolygon>,
    len: usize,
}

impl PolygonIndex {
    /// Builds an index over administrative zone boundaries.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError`] if any zone geometry has no extent.
    pub fn from_zones(zones: &[Zone]) -> Result<Self, SpatialError> {
        Self::build(
            zones
                .iter()
                .map(|zone| (zone.code.as_str(), zone.geometry.clone())),
        )
    }

    /// Builds an index over analysis grid cells.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError`] if any cell geometry has no extent.
    pub fn from_cells(cells: &[GridCell]) -> Result<Self, SpatialError> {
        Self::build(
            cells
                .iter()
                .map(|cell| (cell.label(), MultiPolygon(vec![cell.geometry.clone()]))),
        )
    }

    fn build<L: Into<String>>(
        polygons: impl Iterator<Item = (L, MultiPolygon<f64>)>,
    ) -> Result<Self, SpatialError> {
        let mut entries = Vec::new();

        for (idx, (label, polygon)) in polygons.enumerate() {
            let rect = polygon
                .bounding_rect()
                .ok_or_else(|| SpatialError::EmptyGeometry {
                    label: label.into(),
                })?;
            entries.push(IndexedPolygon {
                idx,
                envelope: AABB::from_corners(
                    [rect.min().x, rect.min().y],
                    [rect.max().x, rect.max().y],
                ),
                polygon,
            });
        }

        let len = entries.len();
        Ok(Self {
            tree: RTree::bulk_load(entries),
            len,
        })
    }

    /// Number of indexed polygons.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the index is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Looks up the polygon containing a point.
    ///
    /// The indexed polygons tile the study area without overlap, so the
    /// first match wins.
    #[must_use]
    pub fn locate(&self, lng: f64, lat: f64) -> Option<usize> {
        let point = geo::Point::new(lng, lat);
        let query_env = AABB::from_point([lng, lat]);

        for entry in self.tree.locate_in_envelope_intersecting(&query_env) {
            if entry.polygon.contains(&point) {
                return Some(entry.idx);
            }
        }
        None
    }
}

/// Outcome of joining school points against a polygon index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinSummary {
    /// Schools assigned to an enclosing polygon.
    pub matched: usize,
    /// Schools outside every polygon.
    pub unmatched: usize,
    /// Identifiers of the unmatched schools.
    pub unmatched_ids: Vec<String>,
}

/// Counts schools per indexed polygon by point-in-polygon join.
///
/// Returns per-polygon counts (aligned with the slice the index was built
/// from) and a [`JoinSummary`] reporting unmatched schools.
#[must_use]
pub fn count_schools(index: &PolygonIndex, schools: &[School]) -> (Vec<u64>, JoinSummary) {
    let mut counts = vec![0_u64; index.len()];
    let mut unmatched_ids = Vec::new();

    for school in schools {
        match index.locate(school.longitude, school.latitude) {
            Some(idx) => counts[idx] += 1,
            None => {
                log::debug!(
                    "school '{}' at ({}, {}) falls outside every polygon",
                    school.id,
                    school.latitude,
                    school.longitude
                );
                unmatched_ids.push(school.id.clone());
            }
        }
    }

    let summary = JoinSummary {
        matched: schools.len() - unmatched_ids.len(),
        unmatched: unmatched_ids.len(),
        unmatched_ids,
    };
    if summary.unmatched > 0 {
        log::warn!(
            "{} of {} schools fall outside every polygon",
            summary.unmatched,
            schools.len()
        );
    }
    (counts, summary)
}

/// Marks which grid cells intersect the study-area outline.
///
/// Used to discard significant cells that extend beyond the area of
/// interest after the hotspot statistic has run.
#[must_use]
pub fn study_area_mask(cells: &[GridCell], study_area: &StudyArea) -> Vec<bool> {
    cells
        .iter()
        .map(|cell| cell.geometry.intersects(&study_area.geometry))
        .collect()
}
