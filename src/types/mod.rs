//! Shared data structures for the sensor identification pipeline
//!
//! - `SampleSeries`: raw (timestamp, value) readings
//! - Feature groups: statistics, frequency, response, noise, stability
//! - `SensorSignature`: aggregated features + pattern tags
//! - `IdentifiedSensor`: classification labels, derived configuration

mod series;
mod features;
mod sensor;

pub use series::*;
pub use features::*;
pub use sensor::*;
