//! System-wide default constants.
//!
//! Centralises the magic numbers of the analysis pipeline and classifier.
//! Grouped by stage for easy discovery.

// ============================================================================
// Stage Minimums
// ============================================================================

/// Samples required before step-response analysis runs.
pub const MIN_SAMPLES_RESPONSE: usize = 5;

/// Samples required before FFT analysis runs.
pub const MIN_SAMPLES_FREQUENCY: usize = 10;

/// Samples required before noise analysis runs.
pub const MIN_SAMPLES_NOISE: usize = 10;

/// Samples required before stability analysis runs.
pub const MIN_SAMPLES_STABILITY: usize = 10;

// ============================================================================
// Response
// ============================================================================

/// A first difference deviating more than this many sigmas is a step.
pub const STEP_SIGMA: f64 = 3.0;

/// Settling band as a fraction of the step magnitude.
pub const SETTLING_BAND: f64 = 0.1;

/// Post-step samples averaged into the settled value.
pub const SETTLING_WINDOW: usize = 10;

/// Fraction of the step defining the first-order time constant (1 - 1/e).
pub const TIME_CONSTANT_FRACTION: f64 = 0.632;

// ============================================================================
// Noise
// ============================================================================

/// Normalized autocorrelation below which the residual is decorrelated.
pub const CORRELATION_CUTOFF: f64 = 0.1;

/// Largest lag examined for correlation length and periodicity.
pub const MAX_LAG: usize = 10;

/// Ceiling applied to every SNR estimate.
///
/// Zero-variance residuals would otherwise produce +inf.
pub const SNR_CEILING: f64 = 1.0e4;

// ============================================================================
// Stability
// ============================================================================

/// Largest Allan averaging interval (samples).
pub const MAX_ALLAN_TAU: usize = 10;

/// Number of equal windows used for range stability.
pub const STABILITY_WINDOWS: usize = 5;

/// Seconds per hour, for drift reporting.
pub const SECONDS_PER_HOUR: f64 = 3600.0;

// ============================================================================
// Pattern Tags
// ============================================================================

/// std/|mean| above which a signal is tagged noisy.
pub const NOISY_CV: f64 = 0.1;

/// range/|mean| at or below which a signal is tagged stable.
pub const STABLE_RANGE_RATIO: f64 = 0.05;

/// Autocorrelation peak (relative to lag 0) that marks a signal periodic.
pub const PERIODIC_PEAK_RATIO: f64 = 0.5;

/// Fewer distinct rounded levels than this marks a signal digital-like.
pub const DIGITAL_MAX_LEVELS: usize = 10;

/// Digital-like detection needs more samples than this.
pub const DIGITAL_MIN_SAMPLES: usize = 20;

/// Decimal places used when counting distinct levels.
pub const DIGITAL_ROUNDING_DECIMALS: i32 = 3;

// ============================================================================
// Classifier
// ============================================================================

/// SNR at or above which noise is "very_low".
pub const SNR_TIER_VERY_LOW: f64 = 100.0;

/// SNR at or above which noise is "low".
pub const SNR_TIER_LOW: f64 = 20.0;

/// SNR at or above which noise is "medium"; below is "high".
pub const SNR_TIER_MEDIUM: f64 = 5.0;

/// Sample count at which the length component of signature confidence saturates.
pub const CONFIDENCE_FULL_SAMPLES: usize = 100;

// ============================================================================
// Generated Configuration
// ============================================================================

/// Fastest update rate ever suggested (ms).
pub const MIN_UPDATE_RATE_MS: u64 = 10;

/// Slowest update rate ever suggested (ms).
pub const MAX_UPDATE_RATE_MS: u64 = 60_000;

/// Samples per dominant period the suggested update rate must allow.
pub const OVERSAMPLING_FACTOR: f64 = 10.0;

/// Environment variable pointing at a TOML config file.
pub const CONFIG_ENV_VAR: &str = "SENSOR_IDENTIFIER_CONFIG";

/// Config file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "sensor_identifier.toml";
