//! Ordinary least squares fit of school count against population.
//!
//! A deliberately simple two-variable fit; it accompanies the
//! autocorrelation statistics rather than replacing them.

use school_map_stats_models::RegressionSummary;

use crate::StatsError;

/// Fits `y = intercept + slope * x` by least squares.
///
/// # Errors
///
/// Returns [`StatsError`] when the sequences disagree in length, there
/// are fewer than three observations, or either variable has no
/// variation.
pub fn linear_fit(x: &[f64], y: &[f64]) -> Result<RegressionSummary, StatsError> {
    let n = x.len();
    if y.len() != n {
        return Err(StatsError::LengthMismatch {
            expected: n,
            actual: y.len(),
        });
    }
    if n < 3 {
        return Err(StatsError::InsufficientStructure {
            message: format!("regression needs at least 3 observations, got {n}"),
        });
    }

    #[allow(clippy::cast_precision_loss)]
    let nf = n as f64;

    let mean_x = x.iter().sum::<f64>() / nf;
    let mean_y = y.iter().sum::<f64>() / nf;

    let sxx: f64 = x.iter().map(|v| (v - mean_x) * (v - mean_x)).sum();
    if sxx == 0.0 {
        return Err(StatsError::UndefinedStatistic {
            message: "predictor has no variation".to_string(),
        });
    }
    let ss_tot: f64 = y.iter().map(|v| (v - mean_y) * (v - mean_y)).sum();
    if ss_tot == 0.0 {
        return Err(StatsError::UndefinedStatistic {
            message: "response has no variation".to_string(),
        });
    }

    let sxy: f64 = x
        .iter()
        .zip(y)
        .map(|(xv, yv)| (xv - mean_x) * (yv - mean_y))
        .sum();

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;

    let ss_res: f64 = x
        .iter()
        .zip(y)
        .map(|(xv, yv)| {
            let residual = yv - (intercept + slope * xv);
            residual * residual
        })
        .sum();

    Ok(RegressionSummary {
        slope,
        intercept,
        r_squared: 1.0 - ss_res / ss_tot,
        residual_std_error: (ss_res / (nf - 2.0)).sqrt(),
        n,
    })
}
