//! Signal statistics extractor

use statrs::statistics::Statistics;

use super::{mean, overflow_scale, population_std, saturate, skewness_kurtosis};
use crate::types::{SampleSeries, SignalStatistics};

/// Linear-interpolation percentile of an ascending slice (NumPy default).
///
/// `q` is a fraction in [0, 1]. Returns 0 for an empty slice.
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = (lo + 1).min(n - 1);
            let frac = pos - lo as f64;
            let span = sorted[hi] - sorted[lo];
            if span.is_finite() {
                sorted[lo] + frac * span
            } else {
                sorted[lo] * (1.0 - frac) + sorted[hi] * frac
            }
        }
    }
}

/// Compute the twelve summary statistics of the raw values.
///
/// Returns `None` for an empty series. Magnitudes whose squares overflow
/// saturate at `f64::MAX` instead of becoming infinite.
pub fn extract_statistics(series: &SampleSeries) -> Option<SignalStatistics> {
    if series.is_empty() {
        return None;
    }
    let values = series.values();

    let mut sorted = values.clone();
    sorted.sort_by(f64::total_cmp);

    let min = sorted[0];
    let max = sorted[sorted.len() - 1];
    let std = population_std(&values);
    let (skewness, kurtosis) = skewness_kurtosis(&values);
    let q25 = percentile(&sorted, 0.25);
    let q75 = percentile(&sorted, 0.75);
    let scale = overflow_scale(&values);
    let rms = values.iter().map(|v| v / scale).quadratic_mean() * scale;

    let stats = SignalStatistics {
        mean: mean(&values),
        std,
        variance: saturate(std * std),
        min,
        max,
        range: saturate(max - min),
        rms: saturate(rms),
        skewness,
        kurtosis,
        median: percentile(&sorted, 0.5),
        q25,
        q75,
        iqr: saturate(q75 - q25),
    };

    tracing::debug!(
        samples = values.len(),
        mean = stats.mean,
        std = stats.std,
        "Extracted signal statistics"
    );
    Some(stats)
}
