#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Global and local spatial autocorrelation statistics.
//!
//! Implements Moran's I and the Getis-Ord Gi* statistic directly from
//! their formulas over the weight matrices built in `school_map_weights`,
//! plus the ordinary least squares fit used to compare school counts
//! against population. Every degenerate input is an explicit, inspectable
//! error; the statistics never return NaN silently.

pub mod hotspot;
pub mod moran;
pub mod normal;
pub mod regression;

pub use hotspot::{filter_significant, gi_star};
pub use moran::morans_i;
pub use regression::linear_fit;

use school_map_weights::WeightsMode;
use thiserror::Error;

/// Errors that can occur while computing a statistic.
#[derive(Debug, Error)]
pub enum StatsError {
    /// The value sequence and weight matrix disagree on region count.
    #[error("length mismatch: {expected} values expected, got {actual}")]
    LengthMismatch {
        /// Region count of the weight matrix.
        expected: usize,
        /// Length of the value sequence.
        actual: usize,
    },

    /// The weight matrix was built in the wrong mode for this statistic.
    #[error("weight matrix mode mismatch: expected {expected}, got {actual}")]
    ModeMismatch {
        /// Mode this statistic requires.
        expected: WeightsMode,
        /// Mode the matrix was built in.
        actual: WeightsMode,
    },

    /// The input has too little spatial structure for the statistic.
    #[error("insufficient spatial structure: {message}")]
    InsufficientStructure {
        /// What was missing.
        message: String,
    },

    /// The statistic is undefined for this input.
    #[error("statistic undefined for this input: {message}")]
    UndefinedStatistic {
        /// Why the statistic is undefined.
        message: String,
    },

    /// The significance threshold is not a probability.
    #[error("significance threshold must lie in (0, 1), got {alpha}")]
    InvalidThreshold {
        /// The rejected threshold.
        alpha: f64,
    },
}
