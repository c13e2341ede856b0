//! Sensor identifier - runs the analysis stages, classifies and assembles the result
//!
//! ```text
//! SampleSeries ─┬─ statistics ─┐
//!               ├─ frequency   │
//!               ├─ response    ├─► SensorSignature ─► Classifier ─► IdentifiedSensor
//!               ├─ noise       │
//!               ├─ stability   │
//!               └─ patterns ───┘
//! ```
//!
//! Each stage is a pure function. Stages that lack samples leave their
//! feature group empty instead of failing, so any well-formed series,
//! including an empty one, produces a result.

use chrono::Utc;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::classifier::{ApplicationMatch, Classifier, RuleMatch};
use crate::config::{defaults, IdentifierConfig};
use crate::processing::{
    analyze_frequency, analyze_noise, analyze_response, analyze_stability, detect_patterns, extract_statistics,
    is_degenerate,
};
use crate::types::{
    AlarmLimits, CalibrationData, DeviceContext, IdentifiedSensor, NoiseLevel, SampleSeries, ScalingConfig,
    SensorCharacteristics, SensorConfiguration, SensorSignature, SensorType, SignalType,
};

/// One entry of a batch identification.
#[derive(Debug, Clone)]
pub struct IdentificationRequest {
    pub sensor_id: String,
    pub series: SampleSeries,
    pub context: DeviceContext,
}

/// Rule-by-rule scores behind an identification.
#[derive(Debug, Clone, Serialize)]
pub struct Explanation {
    pub measured_noise_level: Option<NoiseLevel>,
    pub sensor_rules: Vec<RuleMatch>,
    pub application_rules: Vec<ApplicationMatch>,
}

/// Identification engine. Holds its configuration and rule tables by value;
/// share it by reference across threads.
#[derive(Debug, Clone)]
pub struct SensorIdentifier {
    config: IdentifierConfig,
    classifier: Classifier,
}

impl Default for SensorIdentifier {
    fn default() -> Self {
        Self::new(IdentifierConfig::default())
    }
}

impl SensorIdentifier {
    pub fn new(config: IdentifierConfig) -> Self {
        let classifier = Classifier::from_config(&config);
        Self { config, classifier }
    }

    pub const fn config(&self) -> &IdentifierConfig {
        &self.config
    }

    pub const fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Run every analysis stage and score the data quality.
    pub fn analyze(&self, series: &SampleSeries) -> SensorSignature {
        if series.is_empty() {
            debug!("Empty series, returning empty signature");
            return SensorSignature::empty();
        }
        let analysis = &self.config.analysis;

        let statistics = extract_statistics(series);
        let mut signature = SensorSignature {
            sample_count: series.len(),
            statistics,
            frequency: analyze_frequency(series, analysis),
            response: analyze_response(series, analysis),
            noise: analyze_noise(series, analysis),
            stability: analyze_stability(series, analysis),
            patterns: detect_patterns(series, statistics.as_ref(), analysis),
            confidence_score: 0.0,
        };
        signature.confidence_score = signature_confidence(&signature);

        debug!(
            samples = signature.sample_count,
            groups = signature.feature_groups_present(),
            patterns = ?signature.patterns,
            confidence = signature.confidence_score,
            "Signature extracted"
        );
        signature
    }

    /// Identify one sensor from its samples and device context.
    pub fn identify(&self, sensor_id: &str, series: &SampleSeries, context: &DeviceContext) -> IdentifiedSensor {
        let signature = self.analyze(series);
        let (sensor_type, type_confidence) = self.classifier.classify_sensor(&signature, context);
        let (application, application_confidence) =
            self.classifier
                .classify_application(sensor_type, &signature, context);

        let characteristics = SensorCharacteristics::for_type(sensor_type);
        let noise_level = self.classifier.measured_noise_level(&signature);
        let configuration = generate_configuration(sensor_type, &characteristics, &signature, noise_level);
        let confidence = (signature.confidence_score + type_confidence + application_confidence) / 3.0;

        info!(
            sensor_id = sensor_id,
            sensor_type = %sensor_type,
            application = %application,
            confidence = confidence,
            "Sensor identified"
        );

        IdentifiedSensor {
            sensor_id: sensor_id.to_string(),
            sensor_type,
            type_confidence,
            application,
            application_confidence,
            characteristics,
            signature,
            configuration,
            calibration: CalibrationData::placeholder(sensor_type),
            confidence,
            identified_at: Utc::now(),
        }
    }

    /// Identify many sensors in parallel. Output order matches input order.
    pub fn identify_batch(&self, requests: &[IdentificationRequest]) -> Vec<IdentifiedSensor> {
        info!(count = requests.len(), "Starting batch identification");
        requests
            .par_iter()
            .map(|r| self.identify(&r.sensor_id, &r.series, &r.context))
            .collect()
    }

    /// Per-rule scores that led to `result`.
    pub fn explain(&self, result: &IdentifiedSensor, context: &DeviceContext) -> Explanation {
        let signature = &result.signature;
        Explanation {
            measured_noise_level: self.classifier.measured_noise_level(signature),
            sensor_rules: self.classifier.evaluate_rules(signature),
            application_rules: if result.sensor_type.is_known() {
                self.classifier
                    .evaluate_application_rules(result.sensor_type, signature, context)
            } else {
                Vec::new()
            },
        }
    }
}

// ============================================================================
// Signature Confidence
// ============================================================================

/// 0.4 for sample count, 0.3 for feature coverage, 0.3 for SNR; halved when
/// the input has no variance.
fn signature_confidence(signature: &SensorSignature) -> f64 {
    if signature.sample_count == 0 {
        return 0.0;
    }
    let length = 0.4 * (signature.sample_count as f64 / defaults::CONFIDENCE_FULL_SAMPLES as f64).min(1.0);
    let coverage = 0.3 * signature.feature_groups_present() as f64 / 4.0;
    let quality = signature
        .snr()
        .map_or(0.0, |snr| 0.3 * ((1.0 + snr.max(0.0)).log10() / 2.0).min(1.0));

    let mut confidence = length + coverage + quality;
    if signature
        .statistics
        .as_ref()
        .is_some_and(|s| is_degenerate(s.std, s.mean))
    {
        confidence *= 0.5;
    }
    confidence.clamp(0.0, 1.0)
}

// ============================================================================
// Generated Configuration
// ============================================================================

/// Operating configuration derived from the sensor family and the observed signal.
fn generate_configuration(
    sensor_type: SensorType,
    characteristics: &SensorCharacteristics,
    signature: &SensorSignature,
    noise_level: Option<NoiseLevel>,
) -> SensorConfiguration {
    // Poll at a quarter of the nominal response time, faster if the signal
    // has a dominant frequency that needs oversampling.
    let from_response = if characteristics.nominal_response_time > 0.0 {
        characteristics.nominal_response_time * 1000.0 / 4.0
    } else {
        1000.0
    };
    let period_ms = signature
        .frequency
        .filter(|f| f.dominant_frequency > 0.0)
        .map_or(from_response, |f| {
            from_response.min(1000.0 / (f.dominant_frequency * defaults::OVERSAMPLING_FACTOR))
        });
    let update_rate_ms = (period_ms.round() as u64).clamp(defaults::MIN_UPDATE_RATE_MS, defaults::MAX_UPDATE_RATE_MS);

    let (output_min, output_max) = if sensor_type.is_known() {
        characteristics.measurement_range
    } else {
        signature.statistics.map_or((0.0, 0.0), |s| (s.min, s.max))
    };
    let (input_min, input_max) = match characteristics.signal_type {
        Some(SignalType::Current) => (4.0, 20.0),
        Some(SignalType::Voltage) => (0.0, 10.0),
        _ => (output_min, output_max),
    };

    let span = output_max - output_min;
    let alarms = match signature.statistics {
        Some(s) => {
            let sigma = s.std.max(0.01 * span);
            let limit = |v: f64| if span > 0.0 { v.clamp(output_min, output_max) } else { v };
            AlarmLimits {
                low_low: limit(s.mean - 4.0 * sigma),
                low: limit(s.mean - 3.0 * sigma),
                high: limit(s.mean + 3.0 * sigma),
                high_high: limit(s.mean + 4.0 * sigma),
            }
        }
        None => AlarmLimits {
            low_low: output_min,
            low: output_min,
            high: output_max,
            high_high: output_max,
        },
    };

    let filter_window = match noise_level {
        Some(NoiseLevel::VeryLow) | None => 1,
        Some(NoiseLevel::Low) => 3,
        Some(NoiseLevel::Medium) => 5,
        Some(NoiseLevel::High) => 10,
    };

    let deadband = signature
        .noise
        .map_or(characteristics.resolution, |n| n.noise_level.max(characteristics.resolution));

    SensorConfiguration {
        update_rate_ms,
        scaling: ScalingConfig {
            input_min,
            input_max,
            output_min,
            output_max,
            units: characteristics.units.clone(),
        },
        alarms,
        filter_window,
        deadband,
    }
}
