#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Rook-contiguity neighbor graphs and spatial weight matrices.
//!
//! The [`ContiguityGraph`] records which regions share a boundary edge;
//! the [`WeightMatrix`] turns that relation into the row-standardized
//! weights the global and local autocorrelation statistics consume. Both
//! are deterministic given the same inputs.

pub mod contiguity;
pub mod matrix;

pub use contiguity::{ContiguityGraph, build_rook};
pub use matrix::{WeightMatrix, WeightsMode, ZeroNeighborPolicy};

use thiserror::Error;

/// Errors that can occur while constructing a neighbor relation.
#[derive(Debug, Error)]
pub enum WeightsError {
    /// The neighbor relation is irreflexive; self-edges are rejected.
    #[error("region {index} cannot neighbor itself")]
    SelfLoop {
        /// Index of the offending region.
        index: usize,
    },

    /// An edge referenced a region outside the graph.
    #[error("edge ({i}, {j}) references a region outside 0..{n}")]
    EdgeOutOfRange {
        /// First endpoint.
        i: usize,
        /// Second endpoint.
        j: usize,
        /// Number of regions in the graph.
        n: usize,
    },
}
