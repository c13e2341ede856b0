//! Signal processing module - feature extraction over a sample series
//!
//! Every analyzer is a pure function of a [`SampleSeries`] and the analysis
//! thresholds. Too few samples yield `None`, never an error; degenerate
//! ratios are mapped to capped sentinels so no NaN or infinity leaves this
//! module.
//!
//! [`SampleSeries`]: crate::types::SampleSeries

mod statistics;
mod fft;
mod response;
mod noise;
mod stability;
mod patterns;

pub use fft::analyze_frequency;
pub use noise::analyze_noise;
pub use patterns::detect_patterns;
pub use response::analyze_response;
pub use stability::analyze_stability;
pub use statistics::{extract_statistics, percentile};

use statrs::statistics::Statistics;
use thiserror::Error;

/// Errors in signal analysis
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid sample series at index {index}: {reason}")]
    InvalidSeries { index: usize, reason: String },

    #[error("Insufficient data: need {needed}, have {available}")]
    InsufficientData { needed: usize, available: usize },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ============================================================================
// Shared numeric helpers
// ============================================================================

/// Power-of-two divisor that keeps squares and fourth powers of `values`
/// finite. 1 for ordinary magnitudes; dividing by it is exact.
pub(crate) fn overflow_scale(values: &[f64]) -> f64 {
    let max_abs = values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if max_abs > OVERFLOW_MAGNITUDE {
        2f64.powi(max_abs.log2().floor() as i32)
    } else {
        1.0
    }
}

const OVERFLOW_MAGNITUDE: f64 = 1e50;

fn rescaled(values: &[f64], scale: f64) -> Vec<f64> {
    values.iter().map(|v| v / scale).collect()
}

/// `values` divided by their [`overflow_scale`], plus that scale.
pub(crate) fn normalized(values: &[f64]) -> (Vec<f64>, f64) {
    let scale = overflow_scale(values);
    if scale == 1.0 {
        (values.to_vec(), scale)
    } else {
        (rescaled(values, scale), scale)
    }
}

/// Clamp infinities to the largest finite value of the same sign.
pub(crate) fn saturate(value: f64) -> f64 {
    value.clamp(-f64::MAX, f64::MAX)
}

/// Arithmetic mean; 0 for an empty slice.
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let scale = overflow_scale(values);
    if scale == 1.0 {
        values.iter().mean()
    } else {
        rescaled(values, scale).iter().mean() * scale
    }
}

/// Population standard deviation (ddof = 0); 0 for an empty slice.
pub(crate) fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let scale = overflow_scale(values);
    if scale == 1.0 {
        values.iter().population_std_dev()
    } else {
        saturate(rescaled(values, scale).iter().population_std_dev() * scale)
    }
}

/// True when the spread is indistinguishable from rounding error.
pub(crate) fn is_degenerate(std: f64, mean: f64) -> bool {
    std <= 1e-12 * mean.abs().max(1.0)
}

/// Biased skewness and excess kurtosis. Both 0 for a degenerate slice.
pub(crate) fn skewness_kurtosis(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    // Both moments are scale-invariant
    let scale = overflow_scale(values);
    let scaled;
    let values = if scale == 1.0 {
        values
    } else {
        scaled = rescaled(values, scale);
        &scaled
    };
    let n = values.len() as f64;
    let m = mean(values);
    let (m2, m3, m4) = values.iter().fold((0.0, 0.0, 0.0), |(s2, s3, s4), &v| {
        let d = v - m;
        let d2 = d * d;
        (s2 + d2, s3 + d2 * d, s4 + d2 * d2)
    });
    let (m2, m3, m4) = (m2 / n, m3 / n, m4 / n);
    if is_degenerate(m2.sqrt(), m) {
        return (0.0, 0.0);
    }
    (m3 / m2.powf(1.5), m4 / (m2 * m2) - 3.0)
}

/// Least-squares line `y = slope * x + intercept`.
///
/// A degenerate x (all equal) yields a flat line through the mean of y.
pub(crate) fn linear_fit(x: &[f64], y: &[f64]) -> (f64, f64) {
    let mx = mean(x);
    let my = mean(y);
    let (sxy, sxx) = x
        .iter()
        .zip(y)
        .fold((0.0, 0.0), |(sxy, sxx), (&xi, &yi)| {
            (sxy + (xi - mx) * (yi - my), sxx + (xi - mx) * (xi - mx))
        });
    if sxx == 0.0 {
        return (0.0, my);
    }
    let slope = sxy / sxx;
    (slope, my - slope * mx)
}

/// Consecutive differences `v[i+1] - v[i]`.
pub(crate) fn first_differences(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Normalized autocorrelation of the mean-centred signal for lags `0..=max_lag`.
///
/// Lag 0 is 1. Returns `None` for a zero-variance signal.
pub(crate) fn autocorrelation(values: &[f64], max_lag: usize) -> Option<Vec<f64>> {
    let (values, _) = normalized(values);
    let values = values.as_slice();
    let m = mean(values);
    let centred: Vec<f64> = values.iter().map(|v| v - m).collect();
    let energy: f64 = centred.iter().map(|v| v * v).sum();
    if energy <= f64::MIN_POSITIVE || is_degenerate((energy / values.len() as f64).sqrt(), m) {
        return None;
    }
    let lags = max_lag.min(values.len().saturating_sub(1));
    Some(
        (0..=lags)
            .map(|lag| {
                centred
                    .iter()
                    .zip(&centred[lag..])
                    .map(|(a, b)| a * b)
                    .sum::<f64>()
                    / energy
            })
            .collect(),
    )
}

/// Index of the first difference whose magnitude exceeds `sigma` standard
/// deviations of the difference series.
///
/// When every difference is the same (a constant or a noiseless ramp) no
/// difference stands out and there is no step.
pub(crate) fn first_step(values: &[f64], sigma: f64) -> Option<usize> {
    let diffs = first_differences(values);
    if diffs.len() < 2 {
        return None;
    }
    let sd = population_std(&diffs);
    if is_degenerate(sd, mean(&diffs)) {
        return None;
    }
    diffs.iter().position(|d| d.abs() > sigma * sd)
}

/// Clamp a ratio into `[0, ceiling]`, mapping NaN and +inf to the ceiling.
pub(crate) fn cap_ratio(ratio: f64, ceiling: f64) -> f64 {
    if ratio.is_nan() || ratio > ceiling {
        ceiling
    } else {
        ratio.max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_fit_exact_line() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [1.0, 3.0, 5.0, 7.0];
        let (slope, intercept) = linear_fit(&x, &y);
        assert!((slope - 2.0).abs() < 1e-12);
        assert!((intercept - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_linear_fit_degenerate_x() {
        let (slope, intercept) = linear_fit(&[2.0, 2.0], &[1.0, 3.0]);
        assert_eq!(slope, 0.0);
        assert!((intercept - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_skewness_kurtosis_constant_is_zero() {
        assert_eq!(skewness_kurtosis(&[5.0; 20]), (0.0, 0.0));
    }

    #[test]
    fn test_skewness_symmetric_is_zero() {
        let (skew, _) = skewness_kurtosis(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!(skew.abs() < 1e-12);
    }

    #[test]
    fn test_kurtosis_of_two_point_distribution() {
        // Symmetric two-point distribution has excess kurtosis of -2
        let (_, kurt) = skewness_kurtosis(&[-1.0, 1.0, -1.0, 1.0]);
        assert!((kurt + 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_autocorrelation_alternating() {
        let values: Vec<f64> = (0..20).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let acf = autocorrelation(&values, 3).unwrap();
        assert!((acf[0] - 1.0).abs() < 1e-12);
        assert!(acf[1] < -0.9);
        assert!(acf[2] > 0.85);
    }

    #[test]
    fn test_autocorrelation_constant_is_none() {
        assert!(autocorrelation(&[3.0; 12], 5).is_none());
    }

    #[test]
    fn test_first_step_ignores_constant_ramp() {
        let ramp: Vec<f64> = (0..30).map(|i| i as f64 * 0.5).collect();
        assert!(first_step(&ramp, 3.0).is_none());
    }

    #[test]
    fn test_first_step_on_jittered_ramp_is_first_difference() {
        // Every difference is ~1.0 while their spread is 0.02
        let ramp: Vec<f64> = (0..30)
            .map(|i| i as f64 + if i % 2 == 0 { 0.01 } else { -0.01 })
            .collect();
        assert_eq!(first_step(&ramp, 3.0), Some(0));
    }

    #[test]
    fn test_skewness_kurtosis_survive_huge_values() {
        let values: Vec<f64> = (0..10).map(|i| if i % 2 == 0 { 1e200 } else { -1e200 }).collect();
        let (skew, kurt) = skewness_kurtosis(&values);
        assert!(skew.abs() < 1e-12);
        assert!((kurt + 2.0).abs() < 1e-12);
        assert!((population_std(&values) / 1e200 - 1.0).abs() < 1e-12);
        assert!(mean(&values).abs() < 1e188);
    }

    #[test]
    fn test_first_step_finds_jump() {
        let mut values = vec![1.0; 15];
        values.extend(vec![10.0; 15]);
        assert_eq!(first_step(&values, 3.0), Some(14));
    }

    #[test]
    fn test_cap_ratio() {
        assert_eq!(cap_ratio(f64::INFINITY, 100.0), 100.0);
        assert_eq!(cap_ratio(f64::NAN, 100.0), 100.0);
        assert_eq!(cap_ratio(5.0, 100.0), 5.0);
        assert_eq!(cap_ratio(-1.0, 100.0), 0.0);
    }
}
