//! Noise analysis of the linearly detrended signal

use super::{
    autocorrelation, cap_ratio, is_degenerate, linear_fit, mean, normalized, population_std, saturate,
    skewness_kurtosis,
};
use crate::config::AnalysisConfig;
use crate::types::{NoiseCharacteristics, NoiseColor, SampleSeries};

/// Noise characteristics of a series.
///
/// The linear trend (fitted against sample index) is treated as signal and
/// the residual as noise. Returns `None` below `config.min_samples_noise`.
pub fn analyze_noise(series: &SampleSeries, config: &AnalysisConfig) -> Option<NoiseCharacteristics> {
    if series.len() < config.min_samples_noise.max(2) {
        return None;
    }
    // Only the noise level carries units; everything else is scale-free
    let (values, scale) = normalized(&series.values());
    let index: Vec<f64> = (0..values.len()).map(|i| i as f64).collect();

    let (slope, intercept) = linear_fit(&index, &values);
    let trend: Vec<f64> = index.iter().map(|x| slope * x + intercept).collect();
    let residual: Vec<f64> = values.iter().zip(&trend).map(|(v, t)| v - t).collect();

    let noise_level = population_std(&residual);
    let signal_std = population_std(&trend);

    let snr = if is_degenerate(noise_level, mean(&values)) {
        config.snr_ceiling
    } else {
        cap_ratio((signal_std * signal_std) / (noise_level * noise_level), config.snr_ceiling)
    };

    let (residual_skewness, residual_kurtosis) = skewness_kurtosis(&residual);

    let correlation_length = autocorrelation(&residual, config.max_lag).map_or(0, |acf| {
        (1..acf.len())
            .find(|&lag| acf[lag] < config.correlation_cutoff)
            .unwrap_or(config.max_lag)
    });
    let noise_color = if correlation_length <= 1 {
        NoiseColor::White
    } else {
        NoiseColor::Correlated
    };

    tracing::debug!(
        noise_level = noise_level,
        snr = snr,
        correlation_length = correlation_length,
        "Noise analysis complete"
    );

    Some(NoiseCharacteristics {
        noise_level: saturate(noise_level * scale),
        snr,
        residual_skewness,
        residual_kurtosis,
        correlation_length,
        noise_color,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_below_minimum_samples() {
        let series = SampleSeries::from_values(&[1.0, 2.0, 3.0], 1.0).unwrap();
        assert!(analyze_noise(&series, &AnalysisConfig::default()).is_none());
    }

    #[test]
    fn test_constant_series_hits_ceiling() {
        let config = AnalysisConfig::default();
        let series = SampleSeries::from_values(&[2.5; 15], 1.0).unwrap();
        let noise = analyze_noise(&series, &config).unwrap();
        assert_eq!(noise.snr, config.snr_ceiling);
        assert_eq!(noise.noise_level, 0.0);
        assert!(noise.residual_kurtosis.is_finite());
        assert_eq!(noise.noise_color, NoiseColor::White);
    }

    #[test]
    fn test_pure_ramp_has_no_noise() {
        let config = AnalysisConfig::default();
        let values: Vec<f64> = (0..40).map(|i| 4.0 + i as f64 * 0.25).collect();
        let series = SampleSeries::from_values(&values, 1.0).unwrap();
        let noise = analyze_noise(&series, &config).unwrap();
        assert!(noise.noise_level < 1e-9);
        assert_eq!(noise.snr, config.snr_ceiling);
    }

    #[test]
    fn test_alternating_noise_on_ramp_is_white() {
        let config = AnalysisConfig::default();
        let values: Vec<f64> = (0..60)
            .map(|i| i as f64 + if i % 2 == 0 { 0.5 } else { -0.5 })
            .collect();
        let series = SampleSeries::from_values(&values, 1.0).unwrap();
        let noise = analyze_noise(&series, &config).unwrap();
        assert!((noise.noise_level - 0.5).abs() < 0.05);
        assert_eq!(noise.correlation_length, 1);
        assert_eq!(noise.noise_color, NoiseColor::White);
        assert!(noise.snr > 100.0);
    }
}
