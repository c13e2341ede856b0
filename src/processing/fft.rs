//! Frequency analysis using rustfft
//!
//! The signal is mean-centred, transformed at its natural length (no
//! zero-padding, so bin spacing is exactly fs/n) and reduced to a power
//! spectral density |X|². Only the strictly positive bins `1..=(n-1)/2`
//! contribute to the spectral features.

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

use super::{cap_ratio, is_degenerate, mean, normalized, population_std, saturate};
use crate::config::AnalysisConfig;
use crate::types::{FrequencyCharacteristics, SampleSeries};

/// One-sided power spectrum of a real signal.
#[derive(Debug, Clone)]
pub struct PowerSpectrum {
    /// Bin frequencies (Hz), strictly positive and ascending
    pub frequencies: Vec<f64>,
    /// |X|² at each frequency
    pub power: Vec<f64>,
    /// max(PSD) / mean(PSD without the DC bin), uncapped
    pub peak_to_mean: f64,
}

/// Compute the PSD of mean-centred `values` sampled at `sample_rate` Hz.
pub fn power_spectrum(values: &[f64], sample_rate: f64) -> PowerSpectrum {
    let n = values.len();
    if n < 2 {
        return PowerSpectrum {
            frequencies: Vec::new(),
            power: Vec::new(),
            peak_to_mean: f64::INFINITY,
        };
    }

    let m = mean(values);
    let mut buffer: Vec<Complex<f64>> = values.iter().map(|&v| Complex::new(v - m, 0.0)).collect();
    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(n);
    fft.process(&mut buffer);

    let psd: Vec<f64> = buffer.iter().map(Complex::norm_sqr).collect();

    let non_dc = &psd[1..];
    let peak = non_dc.iter().copied().fold(0.0_f64, f64::max);
    let mean_power = non_dc.iter().sum::<f64>() / non_dc.len() as f64;
    let peak_to_mean = if mean_power > 0.0 {
        peak / mean_power
    } else {
        f64::INFINITY
    };

    let bin_width = sample_rate / n as f64;
    let positive = 1..=(n - 1) / 2;
    PowerSpectrum {
        frequencies: positive.clone().map(|k| k as f64 * bin_width).collect(),
        power: positive.map(|k| psd[k]).collect(),
        peak_to_mean,
    }
}

/// Spectral features of a series.
///
/// Returns `None` below `config.min_samples_frequency` samples. A flat
/// signal yields an all-zero spectrum with the SNR at its ceiling.
pub fn analyze_frequency(
    series: &SampleSeries,
    config: &AnalysisConfig,
) -> Option<FrequencyCharacteristics> {
    if series.len() < config.min_samples_frequency.max(2) {
        return None;
    }
    let dt = series.mean_interval()?;
    let sampling_rate = 1.0 / dt;
    let values = series.values();

    if is_degenerate(population_std(&values), mean(&values)) {
        tracing::debug!(samples = values.len(), "Flat signal, spectrum is empty");
        return Some(FrequencyCharacteristics {
            sampling_rate,
            dominant_frequency: 0.0,
            spectral_centroid: 0.0,
            spectral_bandwidth: 0.0,
            total_power: 0.0,
            low_frequency_power: 0.0,
            high_frequency_power: 0.0,
            snr_estimate: config.snr_ceiling,
        });
    }

    // Frequencies and ratios are scale-free; powers are scaled back at the end
    let (values, scale) = normalized(&values);
    let unscale = |p: f64| saturate(p * scale * scale);
    let spectrum = power_spectrum(&values, sampling_rate);
    let bins = || spectrum.frequencies.iter().copied().zip(spectrum.power.iter().copied());

    // Strict `>` keeps the lowest frequency on ties
    let (dominant_frequency, _) = bins().fold((0.0, f64::NEG_INFINITY), |best, (f, p)| {
        if p > best.1 {
            (f, p)
        } else {
            best
        }
    });

    let total_power: f64 = spectrum.power.iter().sum();
    let (spectral_centroid, spectral_bandwidth) = if total_power > 0.0 {
        let centroid = bins().map(|(f, p)| f * p).sum::<f64>() / total_power;
        let spread = bins().map(|(f, p)| (f - centroid).powi(2) * p).sum::<f64>() / total_power;
        (centroid, spread.sqrt())
    } else {
        (0.0, 0.0)
    };

    let low_frequency_power = bins()
        .filter(|&(f, _)| f < sampling_rate / 10.0)
        .map(|(_, p)| p)
        .sum();
    let high_frequency_power = bins()
        .filter(|&(f, _)| f > sampling_rate / 4.0)
        .map(|(_, p)| p)
        .sum();

    let characteristics = FrequencyCharacteristics {
        sampling_rate,
        dominant_frequency,
        spectral_centroid,
        spectral_bandwidth,
        total_power: unscale(total_power),
        low_frequency_power: unscale(low_frequency_power),
        high_frequency_power: unscale(high_frequency_power),
        snr_estimate: cap_ratio(spectrum.peak_to_mean, config.snr_ceiling),
    };

    tracing::debug!(
        dominant_hz = characteristics.dominant_frequency,
        centroid_hz = characteristics.spectral_centroid,
        snr = characteristics.snr_estimate,
        "Frequency analysis complete"
    );
    Some(characteristics)
}
