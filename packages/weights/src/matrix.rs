//! Spatial weight matrices derived from a contiguity graph.
//!
//! Binary mode row-standardizes neighbor weights for the global Moran
//! statistic. Star mode pins the diagonal at 1 and row-standardizes the
//! off-diagonal entries over the neighbor set, so each region's own value
//! feeds its local Getis-Ord statistic directly.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ContiguityGraph;

/// Normalization mode of a [`WeightMatrix`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightsMode {
    /// Row-standardized neighbor weights; zero diagonal.
    Binary,
    /// Diagonal pinned at 1; neighbor weights row-standardized.
    Star,
}

impl std::fmt::Display for WeightsMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Binary => write!(f, "binary"),
            Self::Star => write!(f, "star"),
        }
    }
}

/// How binary mode treats a region with no neighbors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroNeighborPolicy {
    /// Leave the row all-zero and flag the region as having an undefined
    /// local contribution.
    #[default]
    ZeroRow,
    /// Fall back to a unit self-weight.
    SelfWeight,
}

/// A sparse, non-negative spatial weight matrix over `n` regions.
///
/// Rows hold `(column, weight)` pairs in ascending column order. The
/// matrix is deterministic given the same graph, mode, and policy.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightMatrix {
    mode: WeightsMode,
    rows: Vec<Vec<(usize, f64)>>,
    undefined: Vec<bool>,
}

impl WeightMatrix {
    /// Builds the binary-mode matrix used by the global statistic.
    #[must_use]
    pub fn binary(graph: &ContiguityGraph, policy: ZeroNeighborPolicy) -> Self {
        let n = graph.n();
        let mut rows = Vec::with_capacity(n);
        let mut undefined = vec![false; n];

        for i in 0..n {
            let degree = graph.degree(i);
            if degree == 0 {
                match policy {
                    ZeroNeighborPolicy::ZeroRow => {
                        rows.push(Vec::new());
                        undefined[i] = true;
                    }
                    ZeroNeighborPolicy::SelfWeight => rows.push(vec![(i, 1.0)]),
                }
                continue;
            }

            #[allow(clippy::cast_precision_loss)]
            let weight = 1.0 / degree as f64;
            rows.push(graph.neighbors(i).iter().map(|&j| (j, weight)).collect());
        }

        Self {
            mode: WeightsMode::Binary,
            rows,
            undefined,
        }
    }

    /// Builds the star-mode matrix used by the local hotspot statistic.
    ///
    /// Every row carries a unit self-weight, so zero-neighbor regions
    /// never produce an undefined row here.
    #[must_use]
    pub fn star(graph: &ContiguityGraph) -> Self {
        let n = graph.n();
        let mut rows = Vec::with_capacity(n);

        for i in 0..n {
            let degree = graph.degree(i);
            let mut row = Vec::with_capacity(degree + 1);
            row.push((i, 1.0));
            if degree > 0 {
                #[allow(clippy::cast_precision_loss)]
                let weight = 1.0 / degree as f64;
                row.extend(graph.neighbors(i).iter().map(|&j| (j, weight)));
            }
            row.sort_unstable_by_key(|&(j, _)| j);
            rows.push(row);
        }

        Self {
            mode: WeightsMode::Star,
            rows,
            undefined: vec![false; n],
        }
    }

    /// Normalization mode.
    #[must_use]
    pub const fn mode(&self) -> WeightsMode {
        self.mode
    }

    /// Number of regions.
    #[must_use]
    pub fn n(&self) -> usize {
        self.rows.len()
    }

    /// Non-zero entries of row `i` as `(column, weight)` pairs.
    #[must_use]
    pub fn row(&self, i: usize) -> &[(usize, f64)] {
        &self.rows[i]
    }

    /// Whether region `i` was flagged as having an undefined local
    /// contribution (zero-neighbor row under the `ZeroRow` policy).
    #[must_use]
    pub fn has_undefined_contribution(&self, i: usize) -> bool {
        self.undefined[i]
    }

    /// Sum of weights in row `i`.
    #[must_use]
    pub fn row_sum(&self, i: usize) -> f64 {
        self.rows[i].iter().map(|&(_, w)| w).sum()
    }

    /// Sum of squared weights in row `i`.
    #[must_use]
    pub fn row_sum_sq(&self, i: usize) -> f64 {
        self.rows[i].iter().map(|&(_, w)| w * w).sum()
    }

    /// `S0`: the sum of all weights.
    #[must_use]
    pub fn s0(&self) -> f64 {
        (0..self.n()).map(|i| self.row_sum(i)).sum()
    }

    /// `S1 = ½ Σ_ij (w_ij + w_ji)²`.
    #[must_use]
    pub fn s1(&self) -> f64 {
        let entries = self.entry_map();
        let mut sum = 0.0;
        for (&(i, j), &w) in &entries {
            let back = entries.get(&(j, i)).copied().unwrap_or(0.0);
            let bracket = (w + back) * (w + back);
            sum += bracket;
            // The reverse ordered pair contributes the same bracket; add it
            // here when it has no entry of its own.
            if i != j && !entries.contains_key(&(j, i)) {
                sum += bracket;
            }
        }
        0.5 * sum
    }

    /// `S2 = Σ_i (Σ_j w_ij + Σ_j w_ji)²`.
    #[must_use]
    pub fn s2(&self) -> f64 {
        let n = self.n();
        let mut col_sums = vec![0.0; n];
        for row in &self.rows {
            for &(j, w) in row {
                col_sums[j] += w;
            }
        }
        (0..n)
            .map(|i| {
                let total = self.row_sum(i) + col_sums[i];
                total * total
            })
            .sum()
    }

    fn entry_map(&self) -> BTreeMap<(usize, usize), f64> {
        let mut entries = BTreeMap::new();
        for (i, row) in self.rows.iter().enumerate() {
            for &(j, w) in row {
                entries.insert((i, j), w);
            }
        }
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Path graph 0-1-2-3-4: each node adjacent to its immediate
    /// neighbors only.
    fn path_graph() -> ContiguityGraph {
        ContiguityGraph::from_edges(5, &[(0, 1), (1, 2), (2, 3), (3, 4)]).unwrap()
    }

    fn row_as_map(matrix: &WeightMatrix, i: usize) -> BTreeMap<usize, f64> {
        matrix.row(i).iter().copied().collect()
    }

    #[test]
    fn binary_rows_are_row_stochastic() {
        let matrix = WeightMatrix::binary(&path_graph(), ZeroNeighborPolicy::ZeroRow);
        for i in 0..matrix.n() {
            assert!((matrix.row_sum(i) - 1.0).abs() < 1e-12, "row {i} sum");
        }
    }

    #[test]
    fn binary_interior_row_splits_between_neighbors() {
        let matrix = WeightMatrix::binary(&path_graph(), ZeroNeighborPolicy::ZeroRow);
        let row = row_as_map(&matrix, 2);
        assert_eq!(row.len(), 2);
        assert!((row[&1] - 0.5).abs() < 1e-12);
        assert!((row[&3] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn binary_diagonal_is_zero() {
        let matrix = WeightMatrix::binary(&path_graph(), ZeroNeighborPolicy::ZeroRow);
        for i in 0..matrix.n() {
            assert!(matrix.row(i).iter().all(|&(j, _)| j != i));
        }
    }

    #[test]
    fn star_pins_diagonal_and_standardizes_neighbors() {
        let matrix = WeightMatrix::star(&path_graph());
        let row = row_as_map(&matrix, 2);
        assert!((row[&2] - 1.0).abs() < 1e-12);
        assert!((row[&1] - 0.5).abs() < 1e-12);
        assert!((row[&3] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn zero_row_policy_flags_isolated_region() {
        let graph = ContiguityGraph::from_edges(3, &[(0, 1)]).unwrap();
        let matrix = WeightMatrix::binary(&graph, ZeroNeighborPolicy::ZeroRow);
        assert!(matrix.row(2).is_empty());
        assert!(matrix.has_undefined_contribution(2));
        assert!(!matrix.has_undefined_contribution(0));
    }

    #[test]
    fn self_weight_policy_backfills_isolated_region() {
        let graph = ContiguityGraph::from_edges(3, &[(0, 1)]).unwrap();
        let matrix = WeightMatrix::binary(&graph, ZeroNeighborPolicy::SelfWeight);
        assert_eq!(matrix.row(2), &[(2, 1.0)]);
        assert!(!matrix.has_undefined_contribution(2));
    }

    #[test]
    fn star_isolated_region_keeps_self_weight() {
        let graph = ContiguityGraph::from_edges(3, &[(0, 1)]).unwrap();
        let matrix = WeightMatrix::star(&graph);
        assert_eq!(matrix.row(2), &[(2, 1.0)]);
    }

    #[test]
    fn s0_counts_standardized_rows() {
        let matrix = WeightMatrix::binary(&path_graph(), ZeroNeighborPolicy::ZeroRow);
        assert!((matrix.s0() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn s1_matches_hand_computation() {
        // Path 0-1-2: rows {1: 1.0}, {0: 0.5, 2: 0.5}, {1: 1.0}.
        // Ordered pairs: (0,1) & (1,0) bracket 1.5; (1,2) & (2,1) bracket 1.5.
        // S1 = ½ (2·1.5² + 2·1.5²) = 4.5.
        let graph = ContiguityGraph::from_edges(3, &[(0, 1), (1, 2)]).unwrap();
        let matrix = WeightMatrix::binary(&graph, ZeroNeighborPolicy::ZeroRow);
        assert!((matrix.s1() - 4.5).abs() < 1e-12);
    }

    #[test]
    fn s2_matches_hand_computation() {
        // Path 0-1-2: row sums all 1; col sums 0.5, 2.0, 0.5.
        // S2 = 1.5² + 3² + 1.5² = 13.5.
        let graph = ContiguityGraph::from_edges(3, &[(0, 1), (1, 2)]).unwrap();
        let matrix = WeightMatrix::binary(&graph, ZeroNeighborPolicy::ZeroRow);
        assert!((matrix.s2() - 13.5).abs() < 1e-12);
    }
}
