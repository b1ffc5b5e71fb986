//! Rook-contiguity neighbor graph construction.
//!
//! Two regions are neighbors iff their boundaries intersect in a set of
//! positive length, i.e. a shared edge. A shared vertex alone (queen
//! contiguity) does not count. Candidate pairs are pruned through an
//! R-tree on bounding boxes before the precise DE-9IM test runs.

use std::collections::BTreeSet;

use geo::coordinate_position::CoordPos;
use geo::dimensions::Dimensions;
use geo::{BoundingRect, MultiPolygon, Relate};
use rstar::{AABB, RTree, RTreeObject};

use crate::WeightsError;

/// Bounding box of one region, stored in the candidate-pruning R-tree.
struct CandidateEnvelope {
    idx: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for CandidateEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// A binary, symmetric, irreflexive neighbor relation over regions
/// indexed `0..n`.
///
/// Regions with no neighbors stay in the relation as isolated nodes;
/// downstream weight and statistic code must handle their zero-degree
/// rows explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContiguityGraph {
    neighbors: Vec<BTreeSet<usize>>,
}

impl ContiguityGraph {
    /// Builds a graph from an explicit edge list.
    ///
    /// # Errors
    ///
    /// Returns [`WeightsError`] on self-loops or endpoints outside
    /// `0..n`.
    pub fn from_edges(n: usize, edges: &[(usize, usize)]) -> Result<Self, WeightsError> {
        let mut graph = Self {
            neighbors: vec![BTreeSet::new(); n],
        };
        for &(i, j) in edges {
            if i == j {
                return Err(WeightsError::SelfLoop { index: i });
            }
            if i >= n || j >= n {
                return Err(WeightsError::EdgeOutOfRange { i, j, n });
            }
            graph.add_edge(i, j);
        }
        Ok(graph)
    }

    fn add_edge(&mut self, i: usize, j: usize) {
        self.neighbors[i].insert(j);
        self.neighbors[j].insert(i);
    }

    /// Number of regions (including isolated ones).
    #[must_use]
    pub fn n(&self) -> usize {
        self.neighbors.len()
    }

    /// Neighbors of region `i`, in ascending index order.
    #[must_use]
    pub fn neighbors(&self, i: usize) -> &BTreeSet<usize> {
        &self.neighbors[i]
    }

    /// Degree of region `i`.
    #[must_use]
    pub fn degree(&self, i: usize) -> usize {
        self.neighbors[i].len()
    }

    /// Whether region `i` has no neighbors.
    #[must_use]
    pub fn is_isolated(&self, i: usize) -> bool {
        self.neighbors[i].is_empty()
    }

    /// Number of undirected edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.neighbors.iter().map(BTreeSet::len).sum::<usize>() / 2
    }
}

/// Builds the rook-contiguity graph over a set of region geometries.
///
/// Regions whose geometry has no extent are kept as isolated nodes. The
/// pairwise boundary test only runs on bounding-box-intersecting
/// candidates from the R-tree.
#[must_use]
pub fn build_rook(geometries: &[MultiPolygon<f64>]) -> ContiguityGraph {
    let mut graph = ContiguityGraph {
        neighbors: vec![BTreeSet::new(); geometries.len()],
    };

    let mut entries = Vec::with_capacity(geometries.len());
    for (idx, geometry) in geometries.iter().enumerate() {
        let Some(rect) = geometry.bounding_rect() else {
            log::warn!("region {idx} has no extent; kept as an isolated node");
            continue;
        };
        entries.push(CandidateEnvelope {
            idx,
            envelope: AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
        });
    }
    let tree = RTree::bulk_load(entries);

    for (i, geometry) in geometries.iter().enumerate() {
        let Some(rect) = geometry.bounding_rect() else {
            continue;
        };
        let envelope =
            AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]);

        for candidate in tree.locate_in_envelope_intersecting(&envelope) {
            // Each unordered pair is tested once; the relation is symmetric.
            if candidate.idx <= i {
                continue;
            }
            if shares_edge(geometry, &geometries[candidate.idx]) {
                graph.add_edge(i, candidate.idx);
            }
        }
    }

    log::info!(
        "Rook contiguity: {} regions, {} edges, {} isolated",
        graph.n(),
        graph.edge_count(),
        (0..graph.n()).filter(|&i| graph.is_isolated(i)).count()
    );
    graph
}

/// Rook test: the boundaries must intersect in a one-dimensional set.
/// A vertex-only contact is zero-dimensional and does not qualify.
fn shares_edge(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> bool {
    let matrix = a.relate(b);
    matrix.get(CoordPos::OnBoundary, CoordPos::OnBoundary) == Dimensions::OneDimensional
}

#[cfg(test)]
mod tests {
    use geo::{Coord, Rect};

    use super::*;

    fn square(min_x: f64, min_y: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![
            Rect::new(
                Coord { x: min_x, y: min_y },
                Coord {
                    x: min_x + 1.0,
                    y: min_y + 1.0,
                },
            )
            .to_polygon(),
        ])
    }

    #[test]
    fn edge_sharing_squares_are_neighbors() {
        let graph = build_rook(&[square(0.0, 0.0), square(1.0, 0.0)]);
        assert!(graph.neighbors(0).contains(&1));
        assert!(graph.neighbors(1).contains(&0));
    }

    #[test]
    fn corner_touching_squares_are_not_neighbors() {
        // Diagonal contact is a single shared vertex: queen, not rook.
        let graph = build_rook(&[square(0.0, 0.0), square(1.0, 1.0)]);
        assert!(graph.is_isolated(0));
        assert!(graph.is_isolated(1));
    }

    #[test]
    fn disjoint_squares_are_not_neighbors() {
        let graph = build_rook(&[square(0.0, 0.0), square(5.0, 5.0)]);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn islands_are_retained_as_isolated_nodes() {
        let graph = build_rook(&[square(0.0, 0.0), square(1.0, 0.0), square(9.0, 9.0)]);
        assert_eq!(graph.n(), 3);
        assert!(graph.is_isolated(2));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn relation_is_symmetric() {
        let row = [
            square(0.0, 0.0),
            square(1.0, 0.0),
            square(2.0, 0.0),
            square(3.0, 0.0),
        ];
        let graph = build_rook(&row);
        for i in 0..graph.n() {
            for &j in graph.neighbors(i) {
                assert!(graph.neighbors(j).contains(&i), "asymmetric edge ({i}, {j})");
            }
        }
    }

    #[test]
    fn relation_is_irreflexive() {
        let graph = build_rook(&[square(0.0, 0.0), square(1.0, 0.0)]);
        for i in 0..graph.n() {
            assert!(!graph.neighbors(i).contains(&i));
        }
    }

    #[test]
    fn from_edges_rejects_self_loop() {
        assert!(matches!(
            ContiguityGraph::from_edges(3, &[(1, 1)]),
            Err(WeightsError::SelfLoop { index: 1 })
        ));
    }

    #[test]
    fn from_edges_rejects_out_of_range() {
        assert!(matches!(
            ContiguityGraph::from_edges(3, &[(0, 7)]),
            Err(WeightsError::EdgeOutOfRange { .. })
        ));
    }

    #[test]
    fn same_input_yields_same_graph() {
        let regions = [square(0.0, 0.0), square(1.0, 0.0), square(2.0, 0.0)];
        assert_eq!(build_rook(&regions), build_rook(&regions));
    }
}
