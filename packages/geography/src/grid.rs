//! Regular square grid construction over the study area.
//!
//! The local hotspot statistic runs on a uniform tessellation rather than
//! administrative zones, so grid cells here are sized in kilometres and
//! laid out over the study-area bounding box. Adjacent cells are built
//! from the same lattice arithmetic, so shared edges have exactly equal
//! coordinates and rook contiguity holds downstream.

use geo::{BoundingRect, Coord, Rect};
use school_map_geography_models::{GridCell, StudyArea};

use crate::GeoError;

/// Kilometres per degree of latitude.
const KM_PER_DEG_LAT: f64 = 110.574;
/// Kilometres per degree of longitude at the equator.
const KM_PER_DEG_LNG_EQUATOR: f64 = 111.320;

/// Upper bound on grid size; a finer grid than this means a mis-entered
/// cell size, not a real analysis.
const MAX_CELLS: u64 = 1_000_000;

/// Builds a regular square grid of `cell_km`-sized cells covering the
/// study-area bounding box.
///
/// Cells are not clipped here; intersection with the study-area outline
/// happens after the hotspot statistic, per the analysis design.
///
/// # Errors
///
/// Returns [`GeoError`] if the cell size is not positive, the study area
/// has no extent, or the requested grid would exceed [`MAX_CELLS`].
pub fn build_grid(study_area: &StudyArea, cell_km: f64) -> Result<Vec<GridCell>, GeoError> {
    if !(cell_km > 0.0 && cell_km.is_finite()) {
        return Err(GeoError::Conversion {
            message: format!("grid cell size must be positive, got {cell_km} km"),
        });
    }

    let bbox = study_area
        .geometry
        .bounding_rect()
        .ok_or_else(|| GeoError::Conversion {
            message: "study area has no extent".to_string(),
        })?;

    let mid_lat = f64::midpoint(bbox.min().y, bbox.max().y);
    let dy = cell_km / KM_PER_DEG_LAT;
    let dx = cell_km / (KM_PER_DEG_LNG_EQUATOR * mid_lat.to_radians().cos());

    let rows = span_cells(bbox.min().y, bbox.max().y, dy);
    let cols = span_cells(bbox.min().x, bbox.max().x, dx);
    if u64::from(rows) * u64::from(cols) > MAX_CELLS {
        return Err(GeoError::Conversion {
            message: format!("{cell_km} km cells would produce {rows}x{cols} grid"),
        });
    }

    let mut cells = Vec::with_capacity(rows as usize * cols as usize);
    for row in 0..rows {
        for col in 0..cols {
            let min = Coord {
                x: bbox.min().x + f64::from(col) * dx,
                y: bbox.min().y + f64::from(row) * dy,
            };
            let max = Coord {
                x: bbox.min().x + f64::from(col + 1) * dx,
                y: bbox.min().y + f64::from(row + 1) * dy,
            };
            cells.push(GridCell {
                row,
                col,
                geometry: Rect::new(min, max).to_polygon(),
            });
        }
    }

    log::info!("Built {rows}x{cols} analysis grid ({cell_km} km cells)");
    Ok(cells)
}

/// Number of cells needed to cover `[min, max]` with step `step`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn span_cells(min: f64, max: f64, step: f64) -> u32 {
    (((max - min) / step).ceil() as u32).max(1)
}

#[cfg(test)]
mod tests {
    use geo::MultiPolygon;

    use super::*;

    fn square_study_area(width_deg: f64) -> StudyArea {
        let square = Rect::new(
            Coord { x: 114.0, y: 4.0 },
            Coord {
                x: 114.0 + width_deg,
                y: 4.0 + width_deg,
            },
        )
        .to_polygon();
        StudyArea {
            geometry: MultiPolygon(vec![square]),
        }
    }

    #[test]
    fn covers_bounding_box() {
        let area = square_study_area(0.5);
        let cells = build_grid(&area, 10.0).unwrap();
        assert!(!cells.is_empty());

        let max_y = cells
            .iter()
            .filter_map(|c| c.geometry.bounding_rect())
            .map(|r| r.max().y)
            .fold(f64::NEG_INFINITY, f64::max);
        assert!(max_y >= 4.5);
    }

    #[test]
    fn adjacent_cells_share_exact_edges() {
        let area = square_study_area(0.5);
        let cells = build_grid(&area, 10.0).unwrap();

        let first = cells.iter().find(|c| c.row == 0 && c.col == 0).unwrap();
        let second = cells.iter().find(|c| c.row == 0 && c.col == 1).unwrap();
        let first_max_x = first.geometry.bounding_rect().unwrap().max().x;
        let second_min_x = second.geometry.bounding_rect().unwrap().min().x;
        assert!((first_max_x - second_min_x).abs() < f64::EPSILON);
    }

    #[test]
    fn labels_are_stable() {
        let area = square_study_area(0.5);
        let cells = build_grid(&area, 10.0).unwrap();
        assert_eq!(cells[0].label(), "r00c00");
    }

    #[test]
    fn rejects_non_positive_cell_size() {
        let area = square_study_area(0.5);
        assert!(build_grid(&area, 0.0).is_err());
        assert!(build_grid(&area, -5.0).is_err());
    }

    #[test]
    fn rejects_absurdly_fine_grid() {
        let area = square_study_area(1.0);
        assert!(build_grid(&area, 0.001).is_err());
    }
}
