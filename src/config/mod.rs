//! Identifier Configuration Module
//!
//! Analysis thresholds and classification rule tables loaded from TOML,
//! with built-in defaults for everything.
//!
//! ## Loading Order
//!
//! 1. `SENSOR_IDENTIFIER_CONFIG` environment variable (path to TOML file)
//! 2. `sensor_identifier.toml` in the current working directory
//! 3. Built-in defaults
//!
//! ## Usage
//!
//! The config is loaded once at startup and handed to the identifier, which
//! keeps its own read-only copy:
//!
//! ```ignore
//! let identifier = SensorIdentifier::new(IdentifierConfig::load());
//! ```

mod identifier_config;
pub mod defaults;
pub mod validation;

pub use identifier_config::*;
