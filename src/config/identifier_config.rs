//! Identifier Configuration - analysis thresholds and rule tables as TOML values
//!
//! Every tunable of the pipeline is a field in this module. Each struct
//! implements `Default` with the values in [`super::defaults`], so a missing
//! config file yields the built-in behaviour.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::defaults;
use crate::classifier::{default_application_rules, default_sensor_rules, ApplicationRule, ClassificationRule};

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration of a [`crate::SensorIdentifier`].
///
/// Load with `IdentifierConfig::load()` which searches:
/// 1. `$SENSOR_IDENTIFIER_CONFIG` env var
/// 2. `./sensor_identifier.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentifierConfig {
    /// Feature-extraction thresholds
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Classifier tuning
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Sensor-type rules; empty means the built-in table
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sensor_rules: Vec<ClassificationRule>,

    /// Application rules; empty means the built-in table
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub application_rules: Vec<ApplicationRule>,
}

impl IdentifierConfig {
    /// Load configuration using the standard search order:
    /// 1. `$SENSOR_IDENTIFIER_CONFIG` environment variable
    /// 2. `./sensor_identifier.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        // 1. Check env var
        if let Ok(path) = std::env::var(defaults::CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded identifier config from {}", defaults::CONFIG_ENV_VAR);
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from env var path, falling back");
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", defaults::CONFIG_ENV_VAR);
            }
        }

        // 2. Check ./sensor_identifier.toml
        let local = PathBuf::from(defaults::CONFIG_FILE_NAME);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded identifier config from ./{}", defaults::CONFIG_FILE_NAME);
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", defaults::CONFIG_FILE_NAME);
                }
            }
        }

        // 3. Defaults
        info!("No identifier config found — using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    ///
    /// Unknown keys only produce warnings; impossible values are errors.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(contents)
            .map_err(|e| ConfigError::Parse(PathBuf::from("<string>"), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Write to a TOML file.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;
        std::fs::write(path, contents).map_err(|e| ConfigError::Io(path.to_path_buf(), e))
    }

    /// Same config with the built-in rule tables materialized, for printing.
    pub fn with_effective_rules(&self) -> Self {
        Self {
            sensor_rules: self.sensor_rule_table(),
            application_rules: self.application_rule_table(),
            ..self.clone()
        }
    }

    /// Active sensor rules (configured or built-in).
    pub fn sensor_rule_table(&self) -> Vec<ClassificationRule> {
        if self.sensor_rules.is_empty() {
            default_sensor_rules()
        } else {
            self.sensor_rules.clone()
        }
    }

    /// Active application rules (configured or built-in).
    pub fn application_rule_table(&self) -> Vec<ApplicationRule> {
        if self.application_rules.is_empty() {
            default_application_rules()
        } else {
            self.application_rules.clone()
        }
    }

    /// Reject values that would make the pipeline meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (errors, warnings) = super::validation::validate_ranges(self);
        for w in &warnings {
            warn!("{}", w);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            ConfigError::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            ConfigError::Serialize(e) => write!(f, "Config serialization error: {}", e),
            ConfigError::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {}", e)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Analysis
// ============================================================================

/// Thresholds of the feature-extraction stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub min_samples_response: usize,
    pub min_samples_frequency: usize,
    pub min_samples_noise: usize,
    pub min_samples_stability: usize,
    /// Sigma multiplier for step detection
    pub step_sigma: f64,
    /// Settling band as a fraction of the step magnitude
    pub settling_band: f64,
    pub correlation_cutoff: f64,
    pub max_lag: usize,
    pub snr_ceiling: f64,
    pub max_allan_tau: usize,
    pub stability_windows: usize,
    pub noisy_cv: f64,
    pub stable_range_ratio: f64,
    pub periodic_peak_ratio: f64,
    pub digital_max_levels: usize,
    pub digital_min_samples: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_samples_response: defaults::MIN_SAMPLES_RESPONSE,
            min_samples_frequency: defaults::MIN_SAMPLES_FREQUENCY,
            min_samples_noise: defaults::MIN_SAMPLES_NOISE,
            min_samples_stability: defaults::MIN_SAMPLES_STABILITY,
            step_sigma: defaults::STEP_SIGMA,
            settling_band: defaults::SETTLING_BAND,
            correlation_cutoff: defaults::CORRELATION_CUTOFF,
            max_lag: defaults::MAX_LAG,
            snr_ceiling: defaults::SNR_CEILING,
            max_allan_tau: defaults::MAX_ALLAN_TAU,
            stability_windows: defaults::STABILITY_WINDOWS,
            noisy_cv: defaults::NOISY_CV,
            stable_range_ratio: defaults::STABLE_RANGE_RATIO,
            periodic_peak_ratio: defaults::PERIODIC_PEAK_RATIO,
            digital_max_levels: defaults::DIGITAL_MAX_LEVELS,
            digital_min_samples: defaults::DIGITAL_MIN_SAMPLES,
        }
    }
}

// ============================================================================
// Classifier
// ============================================================================

/// SNR thresholds separating the qualitative noise tiers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseTierConfig {
    pub very_low_snr: f64,
    pub low_snr: f64,
    pub medium_snr: f64,
}

impl Default for NoiseTierConfig {
    fn default() -> Self {
        Self {
            very_low_snr: defaults::SNR_TIER_VERY_LOW,
            low_snr: defaults::SNR_TIER_LOW,
            medium_snr: defaults::SNR_TIER_MEDIUM,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub noise_tiers: NoiseTierConfig,
}
