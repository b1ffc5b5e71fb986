//! Pipeline stages for the batch analysis.
//!
//! Each stage takes the previous stage's immutable outputs and returns a
//! new value object; there is no shared mutable workspace between
//! stages. The full flow is load -> join -> neighbors -> weights ->
//! statistics -> filter.

use std::collections::BTreeSet;

use geo::MultiPolygon;
use school_map_geography::{boundaries, grid, population};
use school_map_geography_models::{
    BoundaryLevel, GridCell, PopulationRecord, StudyArea, Zone,
};
use school_map_school_models::School;
use school_map_spatial::{JoinSummary, PolygonIndex, count_schools, study_area_mask};
use school_map_stats::{StatsError, filter_significant, gi_star, linear_fit, morans_i};
use school_map_stats_models::{AutocorrelationResult, HotspotRecord, RegressionSummary};
use school_map_weights::{WeightMatrix, build_rook};

use crate::config::AnalysisConfig;

type BoxError = Box<dyn std::error::Error>;

/// Everything the pipeline reads from disk, loaded once.
pub struct AnalysisInputs {
    /// Validated school listing.
    pub schools: Vec<School>,
    /// Mukim boundaries (coarse granularity).
    pub mukims: Vec<Zone>,
    /// Kampong boundaries, when configured.
    pub kampongs: Option<Vec<Zone>>,
    /// Study-area outline for final clipping.
    pub study_area: StudyArea,
    /// Population table, when configured.
    pub population: Option<Vec<PopulationRecord>>,
}

/// Loads all configured inputs.
///
/// # Errors
///
/// Returns an error if any input file cannot be read or validated.
pub fn load_inputs(config: &AnalysisConfig) -> Result<AnalysisInputs, BoxError> {
    let schools = school_map_schools::load_schools_path(&config.schools)?;
    let mukims = boundaries::load_zones(
        &config.mukim_boundaries,
        BoundaryLevel::Mukim,
        &config.zone_fields,
    )?;
    let kampongs = config
        .kampong_boundaries
        .as_deref()
        .map(|path| boundaries::load_zones(path, BoundaryLevel::Kampong, &config.zone_fields))
        .transpose()?;
    let study_area = boundaries::load_study_area(&config.study_area)?;
    let population = config
        .population
        .as_deref()
        .map(population::load_population_path)
        .transpose()?;

    Ok(AnalysisInputs {
        schools,
        mukims,
        kampongs,
        study_area,
        population,
    })
}

/// School counts per zone with the join audit.
pub struct ZoneJoin {
    /// Per-zone school counts, aligned with the zone slice.
    pub counts: Vec<u64>,
    /// Matched/unmatched audit.
    pub summary: JoinSummary,
}

/// Joins schools to zone boundaries by point-in-polygon lookup.
///
/// # Errors
///
/// Returns an error if any zone geometry has no extent.
pub fn join_zones(zones: &[Zone], schools: &[School]) -> Result<ZoneJoin, BoxError> {
    let index = PolygonIndex::from_zones(zones)?;
    let (counts, summary) = count_schools(&index, schools);
    Ok(ZoneJoin { counts, summary })
}

/// School counts per grid cell with the join audit.
pub struct GridJoin {
    /// The analysis grid.
    pub cells: Vec<GridCell>,
    /// Per-cell school counts, aligned with `cells`.
    pub counts: Vec<u64>,
    /// Matched/unmatched audit.
    pub summary: JoinSummary,
}

/// Builds the analysis grid and joins schools to its cells.
///
/// # Errors
///
/// Returns an error if the grid cannot be built.
pub fn join_grid(
    study_area: &StudyArea,
    schools: &[School],
    cell_km: f64,
) -> Result<GridJoin, BoxError> {
    let cells = grid::build_grid(study_area, cell_km)?;
    let index = PolygonIndex::from_cells(&cells)?;
    let (counts, summary) = count_schools(&index, schools);
    Ok(GridJoin {
        cells,
        counts,
        summary,
    })
}

/// Computes the global Moran's I over per-mukim school counts.
///
/// # Errors
///
/// Returns [`StatsError`] when the statistic is undefined for this input
/// or the neighbor relation carries no spatial structure.
pub fn run_global(
    mukims: &[Zone],
    counts: &[u64],
    config: &AnalysisConfig,
) -> Result<AutocorrelationResult, StatsError> {
    let geometries: Vec<MultiPolygon<f64>> =
        mukims.iter().map(|zone| zone.geometry.clone()).collect();
    let graph = build_rook(&geometries);
    let weights = WeightMatrix::binary(&graph, config.zero_neighbor_policy);

    let result = morans_i(&to_f64(counts), &weights, config.null_assumption)?;
    log::info!(
        "Moran's I = {:.4} under {} null (z = {:.2}, p = {:.4})",
        result.statistic,
        config.null_assumption,
        result.z_score,
        result.p_value
    );
    Ok(result)
}

/// Per-cell local statistics plus the filtered, clipped output.
pub struct HotspotAnalysis {
    /// Every grid cell's local statistic and classification.
    pub records: Vec<HotspotRecord>,
    /// Significant cells, after tail filtering and study-area clipping.
    pub significant: Vec<HotspotRecord>,
}

/// Computes the Gi* statistic over the grid join and filters the
/// significant cells against the study-area outline.
///
/// # Errors
///
/// Returns [`StatsError`] when the local statistic is undefined for this
/// input (for instance, no variation in cell counts).
pub fn run_hotspots(
    grid_join: &GridJoin,
    study_area: &StudyArea,
    config: &AnalysisConfig,
) -> Result<HotspotAnalysis, StatsError> {
    let geometries: Vec<MultiPolygon<f64>> = grid_join
        .cells
        .iter()
        .map(|cell| MultiPolygon(vec![cell.geometry.clone()]))
        .collect();
    let graph = build_rook(&geometries);
    let weights = WeightMatrix::star(&graph);

    let labels: Vec<String> = grid_join.cells.iter().map(GridCell::label).collect();
    let records = gi_star(&labels, &to_f64(&grid_join.counts), &weights, config.alpha)?;

    let mask = study_area_mask(&grid_join.cells, study_area);
    let in_area: BTreeSet<&str> = labels
        .iter()
        .zip(&mask)
        .filter(|&(_, &keep)| keep)
        .map(|(label, _)| label.as_str())
        .collect();

    let mut significant = filter_significant(&records, config.tails);
    let unclipped = significant.len();
    significant.retain(|record| in_area.contains(record.unit.as_str()));
    if unclipped > significant.len() {
        log::info!(
            "Discarded {} significant cells outside the study area",
            unclipped - significant.len()
        );
    }
    log::info!(
        "Local statistic: {} of {} cells significant at alpha = {}",
        significant.len(),
        records.len(),
        config.alpha
    );

    Ok(HotspotAnalysis {
        records,
        significant,
    })
}

/// Regresses per-mukim school counts against population.
///
/// Mukims without a population entry are logged and skipped; the fit
/// runs over the remainder.
///
/// # Errors
///
/// Returns [`StatsError`] when too few mukims have population data or
/// either variable has no variation.
pub fn run_regression(
    mukims: &[Zone],
    counts: &[u64],
    records: &[PopulationRecord],
) -> Result<RegressionSummary, StatsError> {
    let by_code = population::population_by_code(records);

    let mut x = Vec::new();
    let mut y = Vec::new();
    for (zone, &count) in mukims.iter().zip(counts) {
        match by_code.get(zone.code.as_str()) {
            #[allow(clippy::cast_precision_loss)]
            Some(&pop) => {
                x.push(pop as f64);
                y.push(count as f64);
            }
            None => log::warn!("no population entry for zone '{}'; skipped", zone.code),
        }
    }

    let fit = linear_fit(&x, &y)?;
    log::info!(
        "Regression over {} mukims: schools = {:.4} + {:.6} * population (r^2 = {:.3})",
        fit.n,
        fit.intercept,
        fit.slope,
        fit.r_squared
    );
    Ok(fit)
}

#[allow(clippy::cast_precision_loss)]
fn to_f64(counts: &[u64]) -> Vec<f64> {
    counts.iter().map(|&c| c as f64).collect()
}
