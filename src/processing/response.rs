//! Step-response analysis
//!
//! Finds the first outlying jump in the series and measures how the signal
//! settles after it. Response time runs from the step sample to the first
//! later sample within `settling_band` of the settled value. A series without a step reports a response time of 0.0,
//! which is a policy and not a failure.

use super::{first_step, is_degenerate, mean};
use crate::config::{defaults, AnalysisConfig};
use crate::types::{ResponseCharacteristics, SampleSeries};

/// Step-response characteristics of a series.
///
/// Returns `None` below `config.min_samples_response` samples.
pub fn analyze_response(
    series: &SampleSeries,
    config: &AnalysisConfig,
) -> Option<ResponseCharacteristics> {
    if series.len() < config.min_samples_response.max(2) {
        return None;
    }
    let values = series.values();
    let timestamps = series.timestamps();

    let Some(step) = first_step(&values, config.step_sigma) else {
        tracing::debug!(samples = values.len(), "No step detected");
        return Some(ResponseCharacteristics::no_step());
    };

    let start_value = values[step];
    let start_time = timestamps[step];
    let window_end = (step + 1 + defaults::SETTLING_WINDOW).min(values.len());
    let post_step = &values[step + 1..window_end];
    let settled_value = mean(post_step);
    let magnitude = settled_value - start_value;

    // Fraction of the step completed at index i (0 at the step sample)
    let progress = |i: usize| {
        if magnitude == 0.0 {
            1.0
        } else {
            (values[i] - start_value) / magnitude
        }
    };
    let elapsed_until = |predicate: &dyn Fn(usize) -> bool| {
        (step..values.len())
            .find(|&i| predicate(i))
            .map_or(0.0, |i| timestamps[i] - start_time)
    };

    // A step that settles at zero has no relative band; use the step size
    let band = if is_degenerate(settled_value.abs(), 0.0) {
        config.settling_band * magnitude.abs()
    } else {
        config.settling_band * settled_value.abs()
    };
    let response_time = (step + 1..values.len())
        .find(|&i| (values[i] - settled_value).abs() <= band)
        .map_or_else(
            || timestamps[values.len() - 1] - start_time,
            |i| timestamps[i] - start_time,
        );

    let time_constant = elapsed_until(&|i| progress(i) >= defaults::TIME_CONSTANT_FRACTION);
    let rise_start = elapsed_until(&|i| progress(i) >= 0.1);
    let rise_end = elapsed_until(&|i| progress(i) >= 0.9);

    let overshoot_percent = if magnitude == 0.0 {
        0.0
    } else {
        post_step
            .iter()
            .map(|v| (v - settled_value) * magnitude.signum() / magnitude.abs() * 100.0)
            .fold(0.0_f64, f64::max)
    };

    let response = ResponseCharacteristics {
        step_detected: true,
        step_index: Some(step),
        step_magnitude: magnitude,
        settled_value,
        response_time,
        time_constant,
        rise_time: (rise_end - rise_start).max(0.0),
        overshoot_percent,
    };

    tracing::debug!(
        step_index = step,
        magnitude = magnitude,
        response_time = response.response_time,
        "Step response measured"
    );
    Some(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AnalysisConfig {
        AnalysisConfig::default()
    }

    #[test]
    fn test_below_minimum_samples() {
        let series = SampleSeries::from_values(&[1.0, 2.0, 3.0, 4.0], 1.0).unwrap();
        assert!(analyze_response(&series, &config()).is_none());
    }

    #[test]
    fn test_no_step_reports_zero() {
        let series = SampleSeries::from_values(&[5.0; 20], 1.0).unwrap();
        let response = analyze_response(&series, &config()).unwrap();
        assert!(!response.step_detected);
        assert_eq!(response.response_time, 0.0);
    }

    #[test]
    fn test_ideal_step() {
        let mut values = vec![1.0; 15];
        values.extend(vec![10.0; 15]);
        let series = SampleSeries::from_values(&values, 1.0).unwrap();
        let response = analyze_response(&series, &config()).unwrap();
        assert!(response.step_detected);
        assert_eq!(response.step_index, Some(14));
        assert!((response.settled_value - 10.0).abs() < 1e-12);
        assert!((response.step_magnitude - 9.0).abs() < 1e-12);
        assert!((response.response_time - 1.0).abs() < 1e-12);
        assert_eq!(response.overshoot_percent, 0.0);
    }

    #[test]
    fn test_first_order_response() {
        let tau = 3.0;
        let values: Vec<f64> = (0..50)
            .map(|i| {
                if i < 20 {
                    0.0
                } else {
                    10.0 * (1.0 - (-((i - 19) as f64) / tau).exp())
                }
            })
            .collect();
        let series = SampleSeries::from_values(&values, 1.0).unwrap();
        let response = analyze_response(&series, &config()).unwrap();
        assert_eq!(response.step_index, Some(19));
        assert!(response.time_constant > 0.0);
        assert!(response.time_constant < response.response_time);
    }

    #[test]
    fn test_settling_band_is_relative_to_settled_value() {
        // 100 → 110 with tau = 3 samples settles near 107.6, so the band is
        // about 10.8 wide and the first post-step sample is already inside.
        let tau = 3.0;
        let values: Vec<f64> = (0..50)
            .map(|i| {
                if i < 20 {
                    100.0
                } else {
                    100.0 + 10.0 * (1.0 - (-((i - 19) as f64) / tau).exp())
                }
            })
            .collect();
        let series = SampleSeries::from_values(&values, 1.0).unwrap();
        let response = analyze_response(&series, &config()).unwrap();
        assert_eq!(response.step_index, Some(19));
        assert!((response.settled_value - 107.563).abs() < 1e-3);
        assert!(response.step_magnitude < 0.1 * response.settled_value);
        assert!((response.response_time - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_step_settling_at_zero_uses_step_size() {
        let mut values = vec![10.0; 15];
        values.extend(vec![0.0; 15]);
        let series = SampleSeries::from_values(&values, 1.0).unwrap();
        let response = analyze_response(&series, &config()).unwrap();
        assert_eq!(response.settled_value, 0.0);
        assert!((response.response_time - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_negative_settled_value_uses_its_magnitude() {
        let mut values = vec![0.0; 15];
        values.extend([-60.0, -90.0, -100.0, -100.0, -100.0, -100.0, -100.0, -100.0, -100.0, -100.0, -100.0, -100.0]);
        let series = SampleSeries::from_values(&values, 1.0).unwrap();
        let response = analyze_response(&series, &config()).unwrap();
        assert_eq!(response.step_index, Some(14));
        // Settled at -95, band 9.5: -90 is the first sample inside
        assert!((response.settled_value + 95.0).abs() < 1e-9);
        assert!((response.response_time - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_overshoot_measured() {
        let mut values = vec![0.0; 12];
        values.extend([12.0, 11.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0]);
        let series = SampleSeries::from_values(&values, 1.0).unwrap();
        let response = analyze_response(&series, &config()).unwrap();
        assert!(response.step_detected);
        assert!(response.overshoot_percent > 0.0);
    }
}
