//! Config validation: unknown-key detection with Levenshtein suggestions
//! and range checks.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against known field names, and emit warnings
//! with "did you mean?" suggestions. Then proceed with normal serde
//! deserialization. Warnings never break existing configs.

use std::collections::HashSet;

use super::IdentifierConfig;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for IdentifierConfig.
///
/// Rule tables are arrays of tables and are checked by serde instead.
/// Any new field added to IdentifierConfig must be added here too.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [analysis]
        "analysis",
        "analysis.min_samples_response",
        "analysis.min_samples_frequency",
        "analysis.min_samples_noise",
        "analysis.min_samples_stability",
        "analysis.step_sigma",
        "analysis.settling_band",
        "analysis.correlation_cutoff",
        "analysis.max_lag",
        "analysis.snr_ceiling",
        "analysis.max_allan_tau",
        "analysis.stability_windows",
        "analysis.noisy_cv",
        "analysis.stable_range_ratio",
        "analysis.periodic_peak_ratio",
        "analysis.digital_max_levels",
        "analysis.digital_min_samples",
        // [classifier]
        "classifier",
        "classifier.noise_tiers",
        "classifier.noise_tiers.very_low_snr",
        "classifier.noise_tiers.low_snr",
        "classifier.noise_tiers.medium_snr",
        // [[sensor_rules]], [[application_rules]]
        "sensor_rules",
        "application_rules",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// For example, a table `{ a = { b = 1, c = 2 } }` yields:
/// `["a", "a.b", "a.c"]`
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

/// Compute the Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|&k| (k, levenshtein(unknown, k)))
        .filter(|&(_, dist)| dist <= 3)
        // Tie-break on the key so the suggestion does not depend on hash order
        .min_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)))
        .map(|(k, _)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// This does NOT fail on unknown keys; it only warns.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(), // parse errors are handled by serde later
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| {
            let suggestion = suggest_correction(&key, &known);
            ValidationWarning {
                message: format!("Unknown config key '{key}'"),
                field: key,
                suggestion,
            }
        })
        .collect()
}

// ============================================================================
// Range Validation
// ============================================================================

fn check_unit_interval(errors: &mut Vec<String>, name: &str, value: f64) {
    if !(0.0..=1.0).contains(&value) {
        errors.push(format!("{name} = {value:.3} must be within [0, 1]"));
    }
}

fn check_ordered(errors: &mut Vec<String>, name: &str, range: (f64, f64)) {
    if !(range.0.is_finite() && range.1.is_finite()) || range.0 > range.1 {
        errors.push(format!(
            "{name} = [{}, {}] must be finite with min <= max",
            range.0, range.1
        ));
    }
}

/// Validate value ranges on a parsed IdentifierConfig.
///
/// Returns (errors, warnings). Errors are impossible values that must be
/// rejected; warnings are suspicious but not fatal.
pub fn validate_ranges(config: &IdentifierConfig) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let a = &config.analysis;

    for (name, value) in [
        ("analysis.min_samples_response", a.min_samples_response),
        ("analysis.min_samples_frequency", a.min_samples_frequency),
        ("analysis.min_samples_noise", a.min_samples_noise),
        ("analysis.min_samples_stability", a.min_samples_stability),
    ] {
        // Stages need at least two points to form a difference
        if value < 2 {
            errors.push(format!("{name} = {value} must be >= 2"));
        }
    }

    if a.step_sigma <= 0.0 {
        errors.push(format!("analysis.step_sigma = {:.3} must be > 0", a.step_sigma));
    }
    check_unit_interval(&mut errors, "analysis.settling_band", a.settling_band);
    check_unit_interval(&mut errors, "analysis.correlation_cutoff", a.correlation_cutoff);
    check_unit_interval(&mut errors, "analysis.periodic_peak_ratio", a.periodic_peak_ratio);
    if a.max_lag == 0 {
        errors.push("analysis.max_lag must be >= 1".to_string());
    }
    if a.max_allan_tau == 0 {
        errors.push("analysis.max_allan_tau must be >= 1".to_string());
    }
    if a.stability_windows < 2 {
        errors.push(format!(
            "analysis.stability_windows = {} must be >= 2",
            a.stability_windows
        ));
    }
    if !(a.snr_ceiling.is_finite() && a.snr_ceiling > 1.0) {
        errors.push(format!(
            "analysis.snr_ceiling = {} must be finite and > 1",
            a.snr_ceiling
        ));
    }

    let t = &config.classifier.noise_tiers;
    if !(t.very_low_snr > t.low_snr && t.low_snr > t.medium_snr && t.medium_snr > 0.0) {
        errors.push(format!(
            "classifier.noise_tiers must be strictly descending and positive (got {}, {}, {})",
            t.very_low_snr, t.low_snr, t.medium_snr
        ));
    }
    if t.very_low_snr > a.snr_ceiling {
        warnings.push(ValidationWarning {
            field: "classifier.noise_tiers.very_low_snr".to_string(),
            message: format!(
                "very_low_snr = {} exceeds analysis.snr_ceiling = {}; the tier is unreachable",
                t.very_low_snr, a.snr_ceiling
            ),
            suggestion: None,
        });
    }

    for (i, rule) in config.sensor_rules.iter().enumerate() {
        let prefix = format!("sensor_rules[{i}] ({})", rule.sensor_type);
        check_unit_interval(
            &mut errors,
            &format!("{prefix}.confidence_threshold"),
            rule.confidence_threshold,
        );
        check_ordered(&mut errors, &format!("{prefix}.signal_range"), rule.signal_range);
        check_ordered(&mut errors, &format!("{prefix}.response_time"), rule.response_time);
        if !rule.sensor_type.is_known() {
            errors.push(format!("{prefix}: a rule cannot classify as 'unknown'"));
        }
    }

    for (i, rule) in config.application_rules.iter().enumerate() {
        let prefix = format!("application_rules[{i}] ({})", rule.application);
        check_unit_interval(
            &mut errors,
            &format!("{prefix}.confidence_threshold"),
            rule.confidence_threshold,
        );
        if let Some(range) = rule.value_range {
            check_ordered(&mut errors, &format!("{prefix}.value_range"), range);
        }
        if rule.keywords.is_empty() {
            warnings.push(ValidationWarning {
                field: format!("{prefix}.keywords"),
                message: format!("{prefix} has no keywords and can only match on type"),
                suggestion: None,
            });
        }
    }

    (errors, warnings)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_identical() {
        assert_eq!(levenshtein("tau", "tau"), 0);
    }

    #[test]
    fn test_levenshtein_one_edit() {
        assert_eq!(levenshtein("setling_band", "settling_band"), 1);
    }

    #[test]
    fn test_levenshtein_empty() {
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
    }

    #[test]
    fn test_walk_toml_keys_nested() {
        let toml: toml::Value = r#"
            [classifier]
            [classifier.noise_tiers]
            low_snr = 25.0
        "#
        .parse()
        .unwrap();
        let keys = walk_toml_keys(&toml, "");
        assert!(keys.contains(&"classifier".to_string()));
        assert!(keys.contains(&"classifier.noise_tiers".to_string()));
        assert!(keys.contains(&"classifier.noise_tiers.low_snr".to_string()));
    }

    #[test]
    fn test_typo_key_produces_warning_with_suggestion() {
        let toml_str = r#"
[analysis]
setling_band = 0.2
"#;
        let warnings = validate_unknown_keys(toml_str);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].field.contains("setling_band"));
        assert_eq!(
            warnings[0].suggestion.as_deref(),
            Some("analysis.settling_band")
        );
    }

    #[test]
    fn test_all_valid_keys_produce_zero_warnings() {
        let toml_str = r#"
[analysis]
step_sigma = 3.5
max_lag = 12

[classifier.noise_tiers]
very_low_snr = 200.0
"#;
        let warnings = validate_unknown_keys(toml_str);
        assert!(warnings.is_empty(), "Expected 0 warnings, got: {:?}", warnings);
    }

    #[test]
    fn test_suggest_correction_no_match_for_garbage() {
        let known = known_config_keys();
        assert!(suggest_correction("completely_unrelated_garbage_key_xyz", &known).is_none());
    }

    #[test]
    fn test_defaults_clean() {
        let config = IdentifierConfig::default().with_effective_rules();
        let (errors, warnings) = validate_ranges(&config);
        assert!(errors.is_empty(), "Defaults should produce no errors: {:?}", errors);
        assert!(warnings.is_empty(), "Defaults should produce no warnings: {:?}", warnings);
    }

    #[test]
    fn test_non_descending_tiers_rejected() {
        let mut config = IdentifierConfig::default();
        config.classifier.noise_tiers.low_snr = 500.0;
        let (errors, _) = validate_ranges(&config);
        assert!(errors.iter().any(|e| e.contains("noise_tiers")));
    }

    #[test]
    fn test_zero_minimum_rejected() {
        let mut config = IdentifierConfig::default();
        config.analysis.min_samples_noise = 0;
        let (errors, _) = validate_ranges(&config);
        assert!(errors.iter().any(|e| e.contains("min_samples_noise")));
    }

    #[test]
    fn test_unreachable_tier_warns() {
        let mut config = IdentifierConfig::default();
        config.analysis.snr_ceiling = 50.0;
        let (errors, warnings) = validate_ranges(&config);
        assert!(errors.is_empty());
        assert!(warnings.iter().any(|w| w.field.contains("very_low_snr")));
    }
}
