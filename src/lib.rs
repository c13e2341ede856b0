//! Sensor Identifier: industrial sensor identification from signal behaviour
//!
//! Turns a raw `(timestamp, value)` series plus a free-text device context
//! into a typed sensor description: sensor family, industrial application,
//! nominal characteristics, a generated operating configuration and
//! confidence scores.
//!
//! ## Architecture
//!
//! - **Processing**: statistics, FFT spectrum, step response, noise,
//!   Allan-variance stability and pattern tags
//! - **Classifier**: rule tables scored against the extracted signature
//! - **Identifier**: runs the stages and assembles an [`IdentifiedSensor`]
//! - **Sensors / Simulation**: CSV ingestion and synthetic test signals

pub mod config;
pub mod types;
pub mod processing;
pub mod classifier;
pub mod identifier;
pub mod sensors;
pub mod simulation;

// Re-export configuration
pub use config::{AnalysisConfig, ConfigError, IdentifierConfig};

// Re-export commonly used types
pub use types::{
    DeviceContext, IdentifiedSensor, IndustrialApplication, PatternTag, SamplePoint, SampleSeries,
    SensorSignature, SensorType,
};

// Re-export the pipeline
pub use classifier::{ApplicationRule, ClassificationRule, Classifier, RuleMatch};
pub use identifier::{Explanation, IdentificationRequest, SensorIdentifier};
pub use processing::AnalysisError;
