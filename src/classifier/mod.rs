//! Rule-based classifier - signature + device context → sensor type and application
//!
//! Every rule in a table is scored independently. A rule's confidence is the
//! mean of its evaluable factors, and the combined confidence averages that
//! with the signature's own quality score. The best combined confidence that
//! strictly exceeds the rule's threshold wins; equal scores resolve to the
//! earlier rule in the table. No accepted rule means `Unknown` at 0.0.
//!
//! The rule tables are injected through [`Classifier::new`], so tests and
//! configuration files can replace them without touching the matcher.

mod rules;
pub mod scoring;

pub use rules::{default_application_rules, default_sensor_rules, ApplicationRule, ClassificationRule};

use serde::Serialize;
use tracing::debug;

use crate::config::{IdentifierConfig, NoiseTierConfig};
use crate::types::{DeviceContext, IndustrialApplication, NoiseLevel, SensorSignature, SensorType};
use scoring::{
    average, keyword_match, noise_match, noise_tier, pattern_match, range_match, response_match, value_match,
    TYPE_COMPATIBLE, TYPE_INCOMPATIBLE,
};

// ============================================================================
// Match Breakdown
// ============================================================================

/// Score breakdown of one sensor rule. `None` factors were not evaluable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleMatch {
    pub sensor_type: SensorType,
    pub range_score: Option<f64>,
    pub noise_score: Option<f64>,
    pub response_score: Option<f64>,
    pub pattern_score: Option<f64>,
    pub rule_confidence: f64,
    pub combined_confidence: f64,
    pub threshold: f64,
    pub accepted: bool,
}

/// Score breakdown of one application rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationMatch {
    pub application: IndustrialApplication,
    pub keyword_score: f64,
    pub type_score: f64,
    pub value_score: Option<f64>,
    pub rule_confidence: f64,
    pub combined_confidence: f64,
    pub threshold: f64,
    pub accepted: bool,
}

/// First entry with the highest combined confidence among accepted ones.
fn best_accepted<'a, T>(
    matches: &'a [T],
    accepted: impl Fn(&T) -> bool,
    combined: impl Fn(&T) -> f64,
) -> Option<&'a T> {
    matches
        .iter()
        .filter(|m| accepted(m))
        .fold(None, |best: Option<&T>, m| match best {
            Some(b) if combined(b) >= combined(m) => Some(b),
            _ => Some(m),
        })
}

// ============================================================================
// Classifier
// ============================================================================

/// Immutable rule matcher. Cheap to share across threads.
#[derive(Debug, Clone)]
pub struct Classifier {
    sensor_rules: Vec<ClassificationRule>,
    application_rules: Vec<ApplicationRule>,
    noise_tiers: NoiseTierConfig,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(default_sensor_rules(), default_application_rules(), NoiseTierConfig::default())
    }
}

impl Classifier {
    pub const fn new(
        sensor_rules: Vec<ClassificationRule>,
        application_rules: Vec<ApplicationRule>,
        noise_tiers: NoiseTierConfig,
    ) -> Self {
        Self {
            sensor_rules,
            application_rules,
            noise_tiers,
        }
    }

    /// Classifier over the effective rule tables of a configuration.
    pub fn from_config(config: &IdentifierConfig) -> Self {
        Self::new(
            config.sensor_rule_table(),
            config.application_rule_table(),
            config.classifier.noise_tiers,
        )
    }

    pub fn sensor_rules(&self) -> &[ClassificationRule] {
        &self.sensor_rules
    }

    pub fn application_rules(&self) -> &[ApplicationRule] {
        &self.application_rules
    }

    /// Noise tier of a signature, if it carries any SNR.
    pub fn measured_noise_level(&self, signature: &SensorSignature) -> Option<NoiseLevel> {
        signature.snr().map(|snr| noise_tier(snr, &self.noise_tiers))
    }

    /// Score every sensor rule, in table order.
    pub fn evaluate_rules(&self, signature: &SensorSignature) -> Vec<RuleMatch> {
        let measured = self.measured_noise_level(signature);
        self.sensor_rules
            .iter()
            .map(|rule| {
                let range_score = signature
                    .statistics
                    .as_ref()
                    .map(|stats| range_match(stats, rule.signal_range));
                let noise_score = measured.map(|tier| noise_match(tier, rule.noise_level));
                let response_score = signature
                    .response
                    .as_ref()
                    .map(|r| response_match(r.response_time, rule.response_time));
                let pattern_score = if signature.sample_count == 0 {
                    None
                } else {
                    pattern_match(&signature.patterns, &rule.patterns)
                };

                let factors: Vec<f64> = [range_score, noise_score, response_score, pattern_score]
                    .into_iter()
                    .flatten()
                    .collect();
                let rule_confidence = average(&factors);
                let combined_confidence = (signature.confidence_score + rule_confidence) / 2.0;

                RuleMatch {
                    sensor_type: rule.sensor_type,
                    range_score,
                    noise_score,
                    response_score,
                    pattern_score,
                    rule_confidence,
                    combined_confidence,
                    threshold: rule.confidence_threshold,
                    accepted: !factors.is_empty() && combined_confidence > rule.confidence_threshold,
                }
            })
            .collect()
    }

    /// Best-matching sensor type and its combined confidence.
    ///
    /// The context does not influence the sensor type; it is accepted for
    /// symmetry with [`Self::classify_application`].
    pub fn classify_sensor(&self, signature: &SensorSignature, _context: &DeviceContext) -> (SensorType, f64) {
        let matches = self.evaluate_rules(signature);
        match best_accepted(&matches, |m| m.accepted, |m| m.combined_confidence) {
            Some(best) => {
                debug!(
                    sensor_type = %best.sensor_type,
                    confidence = best.combined_confidence,
                    "Sensor rule accepted"
                );
                (best.sensor_type, best.combined_confidence)
            }
            None => {
                debug!(rules = matches.len(), "No sensor rule exceeded its threshold");
                (SensorType::Unknown, 0.0)
            }
        }
    }

    /// Score every application rule for an already-classified sensor type.
    pub fn evaluate_application_rules(
        &self,
        sensor_type: SensorType,
        signature: &SensorSignature,
        context: &DeviceContext,
    ) -> Vec<ApplicationMatch> {
        let text = context.search_text();
        let mean = signature.statistics.as_ref().map(|s| s.mean);
        self.application_rules
            .iter()
            .map(|rule| {
                let keyword_score = keyword_match(&text, &rule.keywords);
                let type_score = if rule.sensor_types.contains(&sensor_type) {
                    TYPE_COMPATIBLE
                } else {
                    TYPE_INCOMPATIBLE
                };
                let value_score = rule.value_range.zip(mean).map(|(range, m)| value_match(m, range));

                let mut factors = vec![keyword_score, type_score];
                factors.extend(value_score);
                let rule_confidence = average(&factors);
                let combined_confidence = (signature.confidence_score + rule_confidence) / 2.0;

                ApplicationMatch {
                    application: rule.application,
                    keyword_score,
                    type_score,
                    value_score,
                    rule_confidence,
                    combined_confidence,
                    threshold: rule.confidence_threshold,
                    accepted: sensor_type.is_known() && combined_confidence > rule.confidence_threshold,
                }
            })
            .collect()
    }

    /// Best-matching application and its combined confidence.
    ///
    /// An `Unknown` sensor type always yields an `Unknown` application.
    pub fn classify_application(
        &self,
        sensor_type: SensorType,
        signature: &SensorSignature,
        context: &DeviceContext,
    ) -> (IndustrialApplication, f64) {
        if !sensor_type.is_known() {
            return (IndustrialApplication::Unknown, 0.0);
        }
        let matches = self.evaluate_application_rules(sensor_type, signature, context);
        match best_accepted(&matches, |m| m.accepted, |m| m.combined_confidence) {
            Some(best) => {
                debug!(
                    application = %best.application,
                    confidence = best.combined_confidence,
                    "Application rule accepted"
                );
                (best.application, best.combined_confidence)
            }
            None => (IndustrialApplication::Unknown, 0.0),
        }
    }
}
