//! Qualitative pattern tags

use std::collections::HashSet;

use super::{autocorrelation, first_differences, first_step, is_degenerate};
use crate::config::{defaults, AnalysisConfig};
use crate::types::{PatternTag, SampleSeries, SignalStatistics};

/// Derive the pattern tags of a series, in [`PatternTag`] declaration order.
///
/// `statistics` should be the output of [`super::extract_statistics`] for the
/// same series; the noisy/clean/stable tags need it.
pub fn detect_patterns(
    series: &SampleSeries,
    statistics: Option<&SignalStatistics>,
    config: &AnalysisConfig,
) -> Vec<PatternTag> {
    let mut tags = Vec::new();
    if series.is_empty() {
        return tags;
    }
    let values = series.values();
    let diffs = first_differences(&values);

    if !diffs.is_empty() {
        if diffs.iter().all(|&d| d >= 0.0) && diffs.iter().any(|&d| d > 0.0) {
            tags.push(PatternTag::MonotonicIncreasing);
        } else if diffs.iter().all(|&d| d <= 0.0) && diffs.iter().any(|&d| d < 0.0) {
            tags.push(PatternTag::MonotonicDecreasing);
        }
    }

    if is_periodic(&values, config) {
        tags.push(PatternTag::Periodic);
    }

    if first_step(&values, config.step_sigma).is_some() {
        tags.push(PatternTag::StepChanges);
    }

    if let Some(stats) = statistics {
        let noisy = stats
            .coefficient_of_variation()
            .map_or(stats.std > config.noisy_cv, |cv| cv > config.noisy_cv);
        tags.push(if noisy { PatternTag::Noisy } else { PatternTag::Clean });

        if stats.range <= config.stable_range_ratio * stats.mean.abs()
            || is_degenerate(stats.range, stats.mean)
        {
            tags.push(PatternTag::Stable);
        }
    }

    if values.len() > config.digital_min_samples && distinct_levels(&values) < config.digital_max_levels {
        tags.push(PatternTag::DigitalLike);
    }

    tags
}

/// The highest autocorrelation within lags `1..=max_lag` exceeds
/// `periodic_peak_ratio` of the autocorrelation maximum (lag 0).
///
/// Any strongly self-similar signal qualifies, including slow sines and
/// ramps; white noise does not.
fn is_periodic(values: &[f64], config: &AnalysisConfig) -> bool {
    if values.len() < config.max_lag + 2 {
        return false;
    }
    let Some(acf) = autocorrelation(values, config.max_lag) else {
        return false;
    };
    let threshold = config.periodic_peak_ratio * acf[0];
    acf[1..].iter().any(|&a| a > threshold)
}

/// Number of distinct values after rounding to a fixed number of decimals.
fn distinct_levels(values: &[f64]) -> usize {
    let scale = 10f64.powi(defaults::DIGITAL_ROUNDING_DECIMALS);
    values
        .iter()
        .map(|v| (v * scale).round() as i64)
        .collect::<HashSet<_>>()
        .len()
}
