//! Config Loading and Validation Tests
//!
//! Exercises TOML loading from disk, the search order, typo detection and
//! range validation independently from the analysis pipeline.

use std::io::Write;

use sensor_identifier::config::validation::{known_config_keys, suggest_correction, validate_unknown_keys};
use sensor_identifier::config::{defaults, ConfigError};
use sensor_identifier::types::{NoiseLevel, SensorType};
use sensor_identifier::{IdentifierConfig, SampleSeries, SensorIdentifier, DeviceContext};

fn write_temp(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn load_from_file_reads_overrides() {
    let file = write_temp(
        r#"
[analysis]
min_samples_frequency = 32
step_sigma = 4.5

[classifier.noise_tiers]
very_low_snr = 200.0
"#,
    );
    let config = IdentifierConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config.analysis.min_samples_frequency, 32);
    assert_eq!(config.analysis.step_sigma, 4.5);
    assert_eq!(config.classifier.noise_tiers.very_low_snr, 200.0);
    // Untouched values keep their defaults
    assert_eq!(config.analysis.max_lag, defaults::MAX_LAG);
    assert_eq!(config.classifier.noise_tiers.low_snr, defaults::SNR_TIER_LOW);
}

#[test]
fn missing_file_is_io_error() {
    let err = IdentifierConfig::load_from_file(std::path::Path::new("/nonexistent/sensor_identifier.toml"))
        .unwrap_err();
    assert!(matches!(err, ConfigError::Io(..)));
}

#[test]
fn malformed_toml_is_parse_error_with_path() {
    let file = write_temp("[analysis\nstep_sigma = ");
    let err = IdentifierConfig::load_from_file(file.path()).unwrap_err();
    match err {
        ConfigError::Parse(path, _) => assert_eq!(path, file.path()),
        other => panic!("expected parse error, got {other}"),
    }
}

#[test]
fn env_var_points_to_config() {
    let file = write_temp("[analysis]\nmax_allan_tau = 6\n");
    std::env::set_var(defaults::CONFIG_ENV_VAR, file.path());
    let config = IdentifierConfig::load();
    std::env::remove_var(defaults::CONFIG_ENV_VAR);
    assert_eq!(config.analysis.max_allan_tau, 6);
}

#[test]
fn saved_config_loads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sensor_identifier.toml");

    let mut config = IdentifierConfig::default().with_effective_rules();
    config.analysis.noisy_cv = 0.2;
    config.save_to_file(&path).unwrap();

    let loaded = IdentifierConfig::load_from_file(&path).unwrap();
    assert_eq!(loaded.analysis.noisy_cv, 0.2);
    assert_eq!(loaded.sensor_rules, config.sensor_rules);
    assert_eq!(loaded.application_rules, config.application_rules);
}

#[test]
fn custom_rule_table_drives_identification() {
    // A single rule that accepts anything in 0..100 with no patterns
    let file = write_temp(
        r#"
[[sensor_rules]]
sensor_type = "humidity_capacitive"
signal_range = [0.0, 100.0]
signal_type = "voltage"
noise_level = "high"
response_time = [0.0, 100.0]
confidence_threshold = 0.3

[[application_rules]]
application = "environmental_humidity"
keywords = ["greenhouse"]
sensor_types = ["humidity_capacitive"]
value_range = [0.0, 100.0]
confidence_threshold = 0.3
"#,
    );
    let config = IdentifierConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config.sensor_rules[0].noise_level, NoiseLevel::High);

    let values: Vec<f64> = (0..60).map(|i| 55.0 + (i % 5) as f64 * 0.4).collect();
    let series = SampleSeries::from_values(&values, 1.0).unwrap();
    let identifier = SensorIdentifier::new(config);
    let result = identifier.identify("RH-1", &series, &DeviceContext::new("Greenhouse RH", "Bay 2"));

    assert_eq!(result.sensor_type, SensorType::HumidityCapacitive);
    assert_eq!(result.application.as_str(), "environmental_humidity");
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn typo_in_analysis_key_warns_with_suggestion() {
    let warnings = validate_unknown_keys("[analysis]\nstep_sigm = 3.0\n");
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].field.contains("step_sigm"));
    assert_eq!(warnings[0].suggestion.as_deref(), Some("analysis.step_sigma"));
}

#[test]
fn unknown_keys_do_not_fail_loading() {
    let config = IdentifierConfig::from_toml_str("[analysis]\nstep_sigm = 9.0\n").unwrap();
    assert_eq!(config.analysis.step_sigma, defaults::STEP_SIGMA);
}

#[test]
fn every_known_key_suggests_itself() {
    let known = known_config_keys();
    for key in &known {
        assert_eq!(suggest_correction(key, &known).as_deref(), Some(*key));
    }
}

#[test]
fn impossible_values_are_rejected() {
    let err = IdentifierConfig::from_toml_str(
        r#"
[analysis]
min_samples_stability = 0
step_sigma = -1.0

[classifier.noise_tiers]
very_low_snr = 10.0
low_snr = 20.0
"#,
    )
    .unwrap_err();
    let ConfigError::Validation(errors) = err else {
        panic!("expected validation error");
    };
    assert!(errors.iter().any(|e| e.contains("min_samples_stability")));
    assert!(errors.iter().any(|e| e.contains("step_sigma")));
    assert!(errors.iter().any(|e| e.contains("noise_tiers")));
}

#[test]
fn rule_for_unknown_type_is_rejected() {
    let err = IdentifierConfig::from_toml_str(
        r#"
[[sensor_rules]]
sensor_type = "unknown"
signal_range = [0.0, 1.0]
signal_type = "digital"
noise_level = "low"
response_time = [0.0, 1.0]
confidence_threshold = 0.5
"#,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::Validation(_)));
}
