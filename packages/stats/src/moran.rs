//! Global Moran's I.
//!
//! Measures whether similar values cluster spatially. Interpreted on an
//! approximate [-1, 1] scale: positive means clustering, negative means
//! dispersion (checkerboard), near zero means spatial randomness.

use school_map_stats_models::{AutocorrelationResult, NullAssumption};
use school_map_weights::{WeightMatrix, WeightsMode};

use crate::StatsError;
use crate::normal::two_sided_p;

/// Computes Moran's I over the study variable and a binary-mode
/// (row-standardized) weight matrix, with significance under the chosen
/// null assumption.
///
/// # Errors
///
/// Returns [`StatsError`] when the matrix is not binary-mode or does not
/// match the value sequence, when there are fewer than two regions or no
/// neighbor pairs at all, or when the statistic or its null variance is
/// undefined (constant values, too few regions for the randomization
/// moments).
pub fn morans_i(
    values: &[f64],
    weights: &WeightMatrix,
    assumption: NullAssumption,
) -> Result<AutocorrelationResult, StatsError> {
    let n = values.len();
    if weights.n() != n {
        return Err(StatsError::LengthMismatch {
            expected: weights.n(),
            actual: n,
        });
    }
    if weights.mode() != WeightsMode::Binary {
        return Err(StatsError::ModeMismatch {
            expected: WeightsMode::Binary,
            actual: weights.mode(),
        });
    }
    if n < 2 {
        return Err(StatsError::InsufficientStructure {
            message: format!("global statistic needs at least 2 regions, got {n}"),
        });
    }

    // A self-weight fallback row is not spatial structure; require at
    // least one genuine neighbor pair.
    let has_pair = (0..n).any(|i| weights.row(i).iter().any(|&(j, _)| j != i));
    if !has_pair {
        return Err(StatsError::InsufficientStructure {
            message: "neighbor relation has no edges".to_string(),
        });
    }

    #[allow(clippy::cast_precision_loss)]
    let nf = n as f64;

    let mean = values.iter().sum::<f64>() / nf;
    let deviations: Vec<f64> = values.iter().map(|x| x - mean).collect();
    let m2: f64 = deviations.iter().map(|d| d * d).sum();
    if m2 == 0.0 {
        return Err(StatsError::UndefinedStatistic {
            message: "study variable has no variation".to_string(),
        });
    }

    let s0 = weights.s0();
    let cross: f64 = deviations
        .iter()
        .enumerate()
        .map(|(i, d_i)| {
            weights
                .row(i)
                .iter()
                .map(|&(j, w)| w * d_i * deviations[j])
                .sum::<f64>()
        })
        .sum();

    let statistic = (nf / s0) * cross / m2;
    let expected = -1.0 / (nf - 1.0);

    let s1 = weights.s1();
    let s2 = weights.s2();
    let variance = match assumption {
        NullAssumption::Normality => {
            (nf * nf * s1 - nf * s2 + 3.0 * s0 * s0) / (s0 * s0 * (nf * nf - 1.0))
                - expected * expected
        }
        NullAssumption::Randomization => {
            if n < 4 {
                return Err(StatsError::UndefinedStatistic {
                    message: format!(
                        "randomization variance needs at least 4 regions, got {n}"
                    ),
                });
            }
            let m4: f64 = deviations.iter().map(|d| d.powi(4)).sum();
            let b2 = nf * m4 / (m2 * m2);
            let numerator = nf * ((nf * nf - 3.0 * nf + 3.0) * s1 - nf * s2 + 3.0 * s0 * s0)
                - b2 * ((nf * nf - nf) * s1 - 2.0 * nf * s2 + 6.0 * s0 * s0);
            numerator / ((nf - 1.0) * (nf - 2.0) * (nf - 3.0) * s0 * s0) - expected * expected
        }
    };

    if !variance.is_finite() || variance <= 0.0 {
        return Err(StatsError::UndefinedStatistic {
            message: format!("null variance is not positive ({variance})"),
        });
    }

    let z_score = (statistic - expected) / variance.sqrt();
    if !statistic.is_finite() || !z_score.is_finite() {
        return Err(StatsError::UndefinedStatistic {
            message: "statistic is not finite".to_string(),
        });
    }

    Ok(AutocorrelationResult {
        statistic,
        expected,
        variance,
        z_score,
        p_value: two_sided_p(z_score),
    })
}
