//! Statistical utility functions.

/// Approximate quantile function for standard normal distribution.
///
/// Uses the Abramowitz and Stegun approximation (formula 26.2.23).
///
/// # Example
/// ```
/// use store_sales_forecast::utils::quantile_normal;
///
/// // 95% two-sided band -> z ≈ 1.96
/// let z = quantile_normal(0.975);
/// assert!((z - 1.96).abs() < 0.01);
/// ```
pub fn quantile_normal(p: f64) -> f64 {
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }

    let t = if p < 0.5 {
        (-2.0 * p.ln()).sqrt()
    } else {
        (-2.0 * (1.0 - p).ln()).sqrt()
    };

    // Abramowitz and Stegun coefficients
    let c0 = 2.515517;
    let c1 = 0.802853;
    let c2 = 0.010328;
    let d1 = 1.432788;
    let d2 = 0.189269;
    let d3 = 0.001308;

    let result = t - (c0 + c1 * t + c2 * t * t) / (1.0 + d1 * t + d2 * t * t + d3 * t * t * t);

    if p < 0.5 {
        -result
    } else {
        result
    }
}

/// Half-width multiplier for a central interval covering `width` of the mass.
pub fn interval_z(width: f64) -> f64 {
    quantile_normal((1.0 + width) / 2.0)
}

/// Calculate the mean of a slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Root mean square of a slice (population scale of zero-mean residuals).
pub fn rms(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    (values.iter().map(|x| x * x).sum::<f64>() / values.len() as f64).sqrt()
}

/// Least-squares line `y = intercept + slope * x`.
///
/// Returns `(intercept, slope)`; the slope is zero when all `x` coincide.
pub fn linear_fit(x: &[f64], y: &[f64]) -> (f64, f64) {
    let mx = mean(x);
    let my = mean(y);
    let sxx: f64 = x.iter().map(|xi| (xi - mx).powi(2)).sum();
    if sxx == 0.0 {
        return (my, 0.0);
    }
    let sxy: f64 = x.iter().zip(y).map(|(xi, yi)| (xi - mx) * (yi - my)).sum();
    let slope = sxy / sxx;
    (my - slope * mx, slope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn quantile_normal_is_symmetric() {
        assert_relative_eq!(quantile_normal(0.5), 0.0, epsilon = 1e-3);
        assert_relative_eq!(quantile_normal(0.9), -quantile_normal(0.1), epsilon = 1e-9);
        assert_eq!(quantile_normal(0.0), f64::NEG_INFINITY);
    }

    #[test]
    fn eighty_percent_band_multiplier() {
        assert_relative_eq!(interval_z(0.8), 1.2816, epsilon = 1e-3);
    }

    #[test]
    fn linear_fit_recovers_line() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [1.0, 3.0, 5.0, 7.0];
        let (a, b) = linear_fit(&x, &y);
        assert_relative_eq!(a, 1.0, epsilon = 1e-12);
        assert_relative_eq!(b, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn linear_fit_degenerate_x() {
        let (a, b) = linear_fit(&[2.0, 2.0], &[1.0, 3.0]);
        assert_relative_eq!(a, 2.0);
        assert_eq!(b, 0.0);
    }

    #[test]
    fn rms_and_mean() {
        assert_relative_eq!(rms(&[3.0, -4.0]), (12.5_f64).sqrt());
        assert!(mean(&[]).is_nan());
    }
}
