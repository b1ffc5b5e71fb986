//! Local Getis-Ord Gi* hotspot statistic.
//!
//! Computed per spatial unit over a star-mode weight matrix, so each
//! unit's own value feeds its own score. Units whose local statistic is
//! undefined (zero weight row, or no values anywhere) carry explicit
//! `None` fields rather than NaN.

use school_map_stats_models::{HotspotClass, HotspotRecord, Tails};
use school_map_weights::{WeightMatrix, WeightsMode};

use crate::StatsError;
use crate::normal::two_sided_p;

/// Computes the Gi* statistic, z-score, p-value, and classification for
/// every unit.
///
/// `units` are the output labels (grid-cell labels or zone codes),
/// aligned with `values` and the weight matrix. `alpha` is the
/// significance threshold for classification.
///
/// # Errors
///
/// Returns [`StatsError`] when the inputs disagree in length, the matrix
/// is not star-mode, `alpha` is not a probability, there are fewer than
/// two units, or the study variable has no variation at all.
pub fn gi_star(
    units: &[String],
    values: &[f64],
    weights: &WeightMatrix,
    alpha: f64,
) -> Result<Vec<HotspotRecord>, StatsError> {
    let n = values.len();
    if weights.n() != n || units.len() != n {
        return Err(StatsError::LengthMismatch {
            expected: weights.n(),
            actual: if units.len() == n { n } else { units.len() },
        });
    }
    if weights.mode() != WeightsMode::Star {
        return Err(StatsError::ModeMismatch {
            expected: WeightsMode::Star,
            actual: weights.mode(),
        });
    }
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(StatsError::InvalidThreshold { alpha });
    }
    if n < 2 {
        return Err(StatsError::InsufficientStructure {
            message: format!("local statistic needs at least 2 units, got {n}"),
        });
    }
    if values.iter().any(|x| !x.is_finite()) {
        return Err(StatsError::UndefinedStatistic {
            message: "study variable contains non-finite values".to_string(),
        });
    }

    #[allow(clippy::cast_precision_loss)]
    let nf = n as f64;

    let total: f64 = values.iter().sum();
    let mean = total / nf;
    let sum_sq: f64 = values.iter().map(|x| x * x).sum();
    let std_dev = (sum_sq / nf - mean * mean).max(0.0).sqrt();
    if std_dev == 0.0 {
        return Err(StatsError::UndefinedStatistic {
            message: "study variable has no variation".to_string(),
        });
    }

    let mut records = Vec::with_capacity(n);
    for i in 0..n {
        let lag: f64 = weights.row(i).iter().map(|&(j, w)| w * values[j]).sum();
        let w_sum = weights.row_sum(i);
        let w_sum_sq = weights.row_sum_sq(i);

        let gi = (total != 0.0).then(|| lag / total);

        let spread = (nf * w_sum_sq - w_sum * w_sum) / (nf - 1.0);
        let denominator = std_dev * spread.max(0.0).sqrt();
        let z = (spread > 0.0 && denominator > 0.0 && denominator.is_finite())
            .then(|| (lag - mean * w_sum) / denominator);
        let p = z.map(two_sided_p);

        let class = match (z, p) {
            (Some(z), Some(p)) if z > 0.0 && p < alpha => HotspotClass::Hotspot,
            (Some(z), Some(p)) if z < 0.0 && p < alpha => HotspotClass::Coldspot,
            _ => HotspotClass::NotSignificant,
        };

        records.push(HotspotRecord {
            unit: units[i].clone(),
            value: values[i],
            gi_star: gi,
            z_score: z,
            p_value: p,
            class,
        });
    }

    Ok(records)
}

/// Selects the significant records the analysis reports.
///
/// The default [`Tails::HotspotsOnly`] reproduces the source analysis's
/// one-sided emphasis; [`Tails::Both`] also reports coldspots.
#[must_use]
pub fn filter_significant(records: &[HotspotRecord], tails: Tails) -> Vec<HotspotRecord> {
    records
        .iter()
        .filter(|record| match record.class {
            HotspotClass::Hotspot => true,
            HotspotClass::Coldspot => tails == Tails::Both,
            HotspotClass::NotSignificant => false,
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use school_map_weights::ContiguityGraph;

    use super::*;

    fn labels(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("u{i}")).collect()
    }

    /// Rook adjacency over a `rows` x `cols` lattice, row-major indices.
    fn grid_graph(rows: usize, cols: usize) -> ContiguityGraph {
        let mut edges = Vec::new();
        for r in 0..rows {
            for c in 0..cols {
                let idx = r * cols + c;
                if c + 1 < cols {
                    edges.push((idx, idx + 1));
                }
                if r + 1 < rows {
                    edges.push((idx, idx + cols));
                }
            }
        }
        ContiguityGraph::from_edges(rows * cols, &edges).unwrap()
    }

    #[test]
    fn peak_on_path_concentrates_fully() {
        // Path 0-1-2-3-4 with the whole mass at node 2: the star row
        // there is {1: 0.5, 2: 1, 3: 0.5}, so Gi* = (1*10)/10 = 1.
        let graph = ContiguityGraph::from_edges(5, &[(0, 1), (1, 2), (2, 3), (3, 4)]).unwrap();
        let weights = WeightMatrix::star(&graph);
        let values = [0.0, 0.0, 10.0, 0.0, 0.0];

        let records = gi_star(&labels(5), &values, &weights, 0.05).unwrap();
        assert!((records[2].gi_star.unwrap() - 1.0).abs() < 1e-12);
        assert!(records[2].z_score.unwrap() > 0.0);
        assert!((records[0].gi_star.unwrap() - 0.0).abs() < 1e-12);
    }

    #[test]
    fn high_corner_block_is_a_hotspot() {
        // 6x6 grid, all mass in the 2x2 corner block.
        let (rows, cols) = (6, 6);
        let graph = grid_graph(rows, cols);
        let weights = WeightMatrix::star(&graph);
        let values: Vec<f64> = (0..rows * cols)
            .map(|idx| {
                let (r, c) = (idx / cols, idx % cols);
                if r < 2 && c < 2 { 100.0 } else { 0.0 }
            })
            .collect();

        let records = gi_star(&labels(rows * cols), &values, &weights, 0.05).unwrap();
        assert_eq!(records[0].class, HotspotClass::Hotspot);
        assert!(records[0].z_score.unwrap() > 1.96);
    }

    #[test]
    fn low_pocket_is_a_coldspot() {
        let (rows, cols) = (6, 6);
        let graph = grid_graph(rows, cols);
        let weights = WeightMatrix::star(&graph);
        let values: Vec<f64> = (0..rows * cols)
            .map(|idx| {
                let (r, c) = (idx / cols, idx % cols);
                if r < 2 && c < 2 { 0.0 } else { 100.0 }
            })
            .collect();

        let records = gi_star(&labels(rows * cols), &values, &weights, 0.05).unwrap();
        assert_eq!(records[0].class, HotspotClass::Coldspot);
    }

    #[test]
    fn every_reported_hotspot_is_positive_and_significant() {
        let (rows, cols) = (6, 6);
        let graph = grid_graph(rows, cols);
        let weights = WeightMatrix::star(&graph);
        let values: Vec<f64> = (0..rows * cols)
            .map(|idx| if idx % 7 == 0 { 40.0 } else { f64::from(u32::try_from(idx).unwrap() % 3) })
            .collect();

        let records = gi_star(&labels(rows * cols), &values, &weights, 0.05).unwrap();
        for record in filter_significant(&records, Tails::HotspotsOnly) {
            assert_eq!(record.class, HotspotClass::Hotspot);
            assert!(record.z_score.unwrap() > 0.0);
            assert!(record.p_value.unwrap() < 0.05);
            assert!(record.gi_star.unwrap() > 0.0);
        }
    }

    #[test]
    fn one_sided_filter_excludes_coldspots() {
        let (rows, cols) = (6, 6);
        let graph = grid_graph(rows, cols);
        let weights = WeightMatrix::star(&graph);
        let values: Vec<f64> = (0..rows * cols)
            .map(|idx| {
                let (r, c) = (idx / cols, idx % cols);
                if r < 2 && c < 2 { 0.0 } else { 100.0 }
            })
            .collect();

        let records = gi_star(&labels(rows * cols), &values, &weights, 0.05).unwrap();
        let one_sided = filter_significant(&records, Tails::HotspotsOnly);
        assert!(one_sided.iter().all(|r| r.class == HotspotClass::Hotspot));

        let both = filter_significant(&records, Tails::Both);
        assert!(both.iter().any(|r| r.class == HotspotClass::Coldspot));
        assert!(both.len() >= one_sided.len());
    }

    #[test]
    fn zero_total_leaves_share_undefined_but_scores_defined() {
        let graph = ContiguityGraph::from_edges(3, &[(0, 1), (1, 2)]).unwrap();
        let weights = WeightMatrix::star(&graph);
        let records = gi_star(&labels(3), &[-5.0, 0.0, 5.0], &weights, 0.05).unwrap();

        assert!(records.iter().all(|r| r.gi_star.is_none()));
        assert!(records[1].z_score.is_some());
    }

    #[test]
    fn constant_values_are_reported_undefined() {
        let graph = ContiguityGraph::from_edges(3, &[(0, 1), (1, 2)]).unwrap();
        let weights = WeightMatrix::star(&graph);
        assert!(matches!(
            gi_star(&labels(3), &[4.0, 4.0, 4.0], &weights, 0.05),
            Err(StatsError::UndefinedStatistic { .. })
        ));
    }

    #[test]
    fn rejects_binary_mode_matrix() {
        use school_map_weights::ZeroNeighborPolicy;

        let graph = ContiguityGraph::from_edges(3, &[(0, 1), (1, 2)]).unwrap();
        let binary = WeightMatrix::binary(&graph, ZeroNeighborPolicy::ZeroRow);
        assert!(matches!(
            gi_star(&labels(3), &[0.0, 1.0, 0.0], &binary, 0.05),
            Err(StatsError::ModeMismatch { .. })
        ));
    }

    #[test]
    fn rejects_out_of_range_alpha() {
        let graph = ContiguityGraph::from_edges(3, &[(0, 1), (1, 2)]).unwrap();
        let weights = WeightMatrix::star(&graph);
        assert!(matches!(
            gi_star(&labels(3), &[0.0, 1.0, 0.0], &weights, 1.5),
            Err(StatsError::InvalidThreshold { .. })
        ));
    }
}
