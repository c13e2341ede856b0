//! Long-term stability: drift, Allan variance, windowed range stability

use super::{first_differences, is_degenerate, linear_fit, mean, normalized, population_std, saturate};
use crate::config::{defaults, AnalysisConfig};
use crate::types::{AllanPoint, SampleSeries, StabilityMetrics};

/// Non-overlapping Allan variance for averaging intervals `1..=max_tau` samples.
///
/// Each point is half the mean squared difference of consecutive block
/// averages. Intervals leaving fewer than two blocks are skipped.
pub fn allan_variance(values: &[f64], max_tau: usize) -> Vec<AllanPoint> {
    let (values, scale) = normalized(values);
    (1..=max_tau)
        .filter_map(|tau| {
            let averages: Vec<f64> = values.chunks_exact(tau).map(mean).collect();
            if averages.len() < 2 {
                return None;
            }
            let diffs = first_differences(&averages);
            let variance = 0.5 * diffs.iter().map(|d| d * d).sum::<f64>() / diffs.len() as f64;
            Some(AllanPoint {
                tau,
                variance: saturate(variance * scale * scale),
            })
        })
        .collect()
}

/// Stability metrics of a series.
///
/// Returns `None` below `config.min_samples_stability` samples.
pub fn analyze_stability(series: &SampleSeries, config: &AnalysisConfig) -> Option<StabilityMetrics> {
    let n = series.len();
    if n < config.min_samples_stability.max(2) {
        return None;
    }
    let values = series.values();
    let timestamps = series.timestamps();

    let (scaled, scale) = normalized(&values);
    let (slope, _) = linear_fit(&timestamps, &scaled);
    let drift_rate_per_hour = saturate(slope * scale * defaults::SECONDS_PER_HOUR);

    let max_tau = (n / 4).clamp(1, config.max_allan_tau);
    let allan = allan_variance(&values, max_tau);
    let min_allan_deviation = allan
        .iter()
        .map(|p| p.variance.sqrt())
        .fold(None, |acc: Option<f64>, d| Some(acc.map_or(d, |a| a.min(d))))
        .unwrap_or(0.0);

    let window = (n / config.stability_windows).max(1);
    let ranges: Vec<f64> = values
        .chunks_exact(window)
        .take(config.stability_windows)
        .map(|w| {
            let (lo, hi) = w
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
            saturate(hi - lo)
        })
        .collect();
    let mean_range = mean(&ranges);
    let range_stability = if is_degenerate(mean_range, mean(&values)) {
        0.0
    } else {
        population_std(&ranges) / mean_range
    };

    let metrics = StabilityMetrics {
        drift_rate_per_hour,
        allan_variance: allan,
        min_allan_deviation,
        range_stability,
        stability_score: 1.0 / (1.0 + range_stability),
    };

    tracing::debug!(
        drift_per_hour = metrics.drift_rate_per_hour,
        range_stability = metrics.range_stability,
        "Stability analysis complete"
    );
    Some(metrics)
}
