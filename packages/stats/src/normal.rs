//! Standard normal distribution helpers.
//!
//! The significance tests only need the normal CDF, so the error function
//! is computed with the Abramowitz & Stegun 7.1.26 rational approximation
//! (absolute error below 1.5e-7) rather than pulling in a numerics crate.

/// Cumulative distribution function of the standard normal.
#[must_use]
pub fn standard_normal_cdf(z: f64) -> f64 {
    0.5 * (1.0 + erf(z / std::f64::consts::SQRT_2))
}

/// Two-sided p-value for a standard score.
#[must_use]
pub fn two_sided_p(z: f64) -> f64 {
    (2.0 * (1.0 - standard_normal_cdf(z.abs()))).clamp(0.0, 1.0)
}

/// Error function, Abramowitz & Stegun 7.1.26.
fn erf(x: f64) -> f64 {
    const A1: f64 = 0.254_829_592;
    const A2: f64 = -0.284_496_736;
    const A3: f64 = 1.421_413_741;
    const A4: f64 = -1.453_152_027;
    const A5: f64 = 1.061_405_429;
    const P: f64 = 0.327_591_1;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + P * x);
    let y = 1.0 - ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t * (-x * x).exp();
    sign * y
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cdf_at_zero_is_half() {
        assert!((standard_normal_cdf(0.0) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn cdf_matches_tabulated_values() {
        assert!((standard_normal_cdf(1.96) - 0.975_002).abs() < 1e-4);
        assert!((standard_normal_cdf(-1.96) - 0.024_998).abs() < 1e-4);
        assert!((standard_normal_cdf(2.575_8) - 0.995).abs() < 1e-4);
    }

    #[test]
    fn cdf_is_symmetric() {
        for z in [0.3, 1.0, 2.2, 3.7] {
            let total = standard_normal_cdf(z) + standard_normal_cdf(-z);
            assert!((total - 1.0).abs() < 1e-7, "asymmetric at z={z}");
        }
    }

    #[test]
    fn two_sided_p_at_critical_value() {
        assert!((two_sided_p(1.96) - 0.05).abs() < 1e-3);
        assert!((two_sided_p(-1.96) - 0.05).abs() < 1e-3);
    }

    #[test]
    fn two_sided_p_decreases_with_magnitude() {
        assert!(two_sided_p(3.0) < two_sided_p(2.0));
        assert!(two_sided_p(2.0) < two_sided_p(1.0));
        assert!((two_sided_p(0.0) - 1.0).abs() < 1e-9);
    }
}
