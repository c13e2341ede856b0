//! Feature groups extracted from a sample series and the aggregated signature.
//!
//! Each group is an explicit struct. A group that could not be computed
//! (too few samples) is represented as `None` on [`SensorSignature`], never
//! as a partially filled struct.

use serde::{Deserialize, Serialize};

// ============================================================================
// Statistics
// ============================================================================

/// Population statistics (ddof = 0) of the raw values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalStatistics {
    pub mean: f64,
    pub std: f64,
    pub variance: f64,
    pub min: f64,
    pub max: f64,
    pub range: f64,
    pub rms: f64,
    /// Biased (population) skewness; 0 for a zero-variance series
    pub skewness: f64,
    /// Excess (Fisher) kurtosis; 0 for a zero-variance series
    pub kurtosis: f64,
    pub median: f64,
    pub q25: f64,
    pub q75: f64,
    pub iqr: f64,
}

impl SignalStatistics {
    /// Coefficient of variation, or `None` when the mean is ~0.
    pub fn coefficient_of_variation(&self) -> Option<f64> {
        if self.mean.abs() < 1e-12 {
            None
        } else {
            Some(self.std / self.mean.abs())
        }
    }
}

// ============================================================================
// Frequency
// ============================================================================

/// Spectral features of the mean-centred signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyCharacteristics {
    /// Hz, derived from the mean sample interval
    pub sampling_rate: f64,
    pub dominant_frequency: f64,
    pub spectral_centroid: f64,
    pub spectral_bandwidth: f64,
    pub total_power: f64,
    /// Power below fs/10
    pub low_frequency_power: f64,
    /// Power above fs/4
    pub high_frequency_power: f64,
    /// max(PSD) / mean(PSD without DC), capped
    pub snr_estimate: f64,
}

// ============================================================================
// Response
// ============================================================================

/// Step-response characteristics.
///
/// `response_time` is 0.0 when no step was detected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResponseCharacteristics {
    pub step_detected: bool,
    pub step_index: Option<usize>,
    pub step_magnitude: f64,
    pub settled_value: f64,
    /// Seconds from the step to the first sample inside the settling band
    pub response_time: f64,
    /// Seconds to reach 63.2 % of the step
    pub time_constant: f64,
    /// Seconds from 10 % to 90 % of the step
    pub rise_time: f64,
    pub overshoot_percent: f64,
}

impl ResponseCharacteristics {
    pub const fn no_step() -> Self {
        Self {
            step_detected: false,
            step_index: None,
            step_magnitude: 0.0,
            settled_value: 0.0,
            response_time: 0.0,
            time_constant: 0.0,
            rise_time: 0.0,
            overshoot_percent: 0.0,
        }
    }
}

// ============================================================================
// Noise
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseColor {
    /// Residual decorrelates within one lag
    White,
    Correlated,
}

/// Noise features of the linearly detrended residual.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseCharacteristics {
    pub noise_level: f64,
    /// var(trend) / var(residual), capped
    pub snr: f64,
    pub residual_skewness: f64,
    pub residual_kurtosis: f64,
    /// First lag (1..=max) where the residual autocorrelation drops below the cutoff
    pub correlation_length: usize,
    pub noise_color: NoiseColor,
}

// ============================================================================
// Stability
// ============================================================================

/// Allan variance at one averaging interval (in samples).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AllanPoint {
    pub tau: usize,
    pub variance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilityMetrics {
    /// Least-squares slope, units per hour
    pub drift_rate_per_hour: f64,
    pub allan_variance: Vec<AllanPoint>,
    pub min_allan_deviation: f64,
    /// Coefficient of variation of windowed peak-to-peak ranges
    pub range_stability: f64,
    /// 1 / (1 + range_stability), in (0, 1]
    pub stability_score: f64,
}

// ============================================================================
// Patterns & Signature
// ============================================================================

/// Qualitative shape tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternTag {
    MonotonicIncreasing,
    MonotonicDecreasing,
    Periodic,
    StepChanges,
    Noisy,
    Clean,
    Stable,
    DigitalLike,
}

impl PatternTag {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MonotonicIncreasing => "monotonic_increasing",
            Self::MonotonicDecreasing => "monotonic_decreasing",
            Self::Periodic => "periodic",
            Self::StepChanges => "step_changes",
            Self::Noisy => "noisy",
            Self::Clean => "clean",
            Self::Stable => "stable",
            Self::DigitalLike => "digital_like",
        }
    }
}

impl std::fmt::Display for PatternTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the classifier knows about one series.
///
/// Built once per identification and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSignature {
    pub sample_count: usize,
    pub statistics: Option<SignalStatistics>,
    pub frequency: Option<FrequencyCharacteristics>,
    pub response: Option<ResponseCharacteristics>,
    pub noise: Option<NoiseCharacteristics>,
    pub stability: Option<StabilityMetrics>,
    pub patterns: Vec<PatternTag>,
    /// Data-quality confidence in [0, 1]
    pub confidence_score: f64,
}

impl SensorSignature {
    /// Signature of an empty series.
    pub const fn empty() -> Self {
        Self {
            sample_count: 0,
            statistics: None,
            frequency: None,
            response: None,
            noise: None,
            stability: None,
            patterns: Vec::new(),
            confidence_score: 0.0,
        }
    }

    pub fn has_pattern(&self, tag: PatternTag) -> bool {
        self.patterns.contains(&tag)
    }

    /// Best available SNR: noise analysis first, spectral estimate second.
    pub fn snr(&self) -> Option<f64> {
        self.noise
            .map(|n| n.snr)
            .or_else(|| self.frequency.map(|f| f.snr_estimate))
    }

    /// Number of optional feature groups that were computed (0..=4).
    pub fn feature_groups_present(&self) -> usize {
        [
            self.frequency.is_some(),
            self.response.is_some(),
            self.noise.is_some(),
            self.stability.is_some(),
        ]
        .iter()
        .filter(|&&present| present)
        .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_tags_serialize_as_snake_case() {
        let json = serde_json::to_string(&vec![PatternTag::DigitalLike, PatternTag::MonotonicIncreasing]).unwrap();
        assert_eq!(json, r#"["digital_like","monotonic_increasing"]"#);
    }

    #[test]
    fn test_empty_signature_has_no_groups() {
        let sig = SensorSignature::empty();
        assert_eq!(sig.feature_groups_present(), 0);
        assert!(sig.snr().is_none());
        assert_eq!(sig.confidence_score, 0.0);
    }
}
