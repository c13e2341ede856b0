//! Rule tables for sensor-type and application classification
//!
//! Both tables are plain data. The built-in tables below are used whenever
//! the configuration does not supply its own `[[sensor_rules]]` or
//! `[[application_rules]]`.

use serde::{Deserialize, Serialize};

use crate::types::{IndustrialApplication, NoiseLevel, PatternTag, SensorType, SignalType};

/// Expected signature of one sensor type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRule {
    pub sensor_type: SensorType,
    /// Engineering-unit range the observed min/max should fall in
    pub signal_range: (f64, f64),
    /// Informational; the signature carries no electrical measurement
    pub signal_type: SignalType,
    /// Expected noise tier; neighbouring tiers match partially
    pub noise_level: NoiseLevel,
    /// Seconds
    pub response_time: (f64, f64),
    #[serde(default)]
    pub patterns: Vec<PatternTag>,
    pub confidence_threshold: f64,
}

/// Keyword, type and value-range expectations of one application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRule {
    pub application: IndustrialApplication,
    /// Lower-case substrings searched in the device name and location
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub sensor_types: Vec<SensorType>,
    /// Range the signal mean should fall in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_range: Option<(f64, f64)>,
    pub confidence_threshold: f64,
}

#[allow(clippy::too_many_arguments)]
fn sensor_rule(
    sensor_type: SensorType,
    signal_range: (f64, f64),
    signal_type: SignalType,
    noise_level: NoiseLevel,
    response_time: (f64, f64),
    patterns: &[PatternTag],
    confidence_threshold: f64,
) -> ClassificationRule {
    ClassificationRule {
        sensor_type,
        signal_range,
        signal_type,
        noise_level,
        response_time,
        patterns: patterns.to_vec(),
        confidence_threshold,
    }
}

fn application_rule(
    application: IndustrialApplication,
    keywords: &[&str],
    sensor_types: &[SensorType],
    value_range: Option<(f64, f64)>,
    confidence_threshold: f64,
) -> ApplicationRule {
    ApplicationRule {
        application,
        keywords: keywords.iter().map(|k| (*k).to_string()).collect(),
        sensor_types: sensor_types.to_vec(),
        value_range,
        confidence_threshold,
    }
}

/// Built-in sensor-type rules. Order matters: equal scores resolve to the
/// earlier rule.
///
/// The 4-20 mA range is the NAMUR NE43 measurement band (3.6 to 21 mA) so a
/// live loop reading slightly under 4 mA still counts as contained. Noise
/// tiers come from the trend/residual SNR: a process ramp is very clean, a
/// toggling contact or a machine vibration has no trend and reads as high.
pub fn default_sensor_rules() -> Vec<ClassificationRule> {
    use NoiseLevel::*;
    use PatternTag::*;
    use SensorType as T;
    use SignalType as S;

    vec![
        sensor_rule(T::TemperatureThermocouple, (-200.0, 1350.0), S::Millivolt, Medium, (0.0, 10.0), &[Stable, Clean], 0.5),
        sensor_rule(T::TemperatureRtd, (-200.0, 850.0), S::Resistance, Low, (0.0, 30.0), &[Stable, Clean], 0.5),
        sensor_rule(T::TemperatureThermistor, (-50.0, 150.0), S::Resistance, Low, (0.0, 30.0), &[Stable, Clean], 0.5),
        sensor_rule(T::Analog4To20mA, (3.6, 21.0), S::Current, VeryLow, (0.0, 2.0), &[MonotonicIncreasing, StepChanges, Noisy], 0.55),
        sensor_rule(T::Analog0To10V, (0.0, 10.0), S::Voltage, VeryLow, (0.0, 2.0), &[MonotonicIncreasing, StepChanges, Noisy], 0.55),
        sensor_rule(T::PressureGauge, (0.0, 400.0), S::Voltage, Medium, (0.0, 1.0), &[StepChanges, Noisy], 0.55),
        sensor_rule(T::PressureDifferential, (0.0, 2.5), S::Voltage, Medium, (0.0, 1.0), &[Noisy], 0.55),
        sensor_rule(T::FlowMagnetic, (0.0, 1000.0), S::Current, Medium, (0.5, 5.0), &[Periodic, StepChanges], 0.55),
        sensor_rule(T::FlowVortex, (0.0, 5000.0), S::Pulse, Medium, (0.0, 5.0), &[Periodic, DigitalLike], 0.55),
        sensor_rule(T::LevelUltrasonic, (0.0, 15.0), S::Current, Low, (0.0, 10.0), &[MonotonicIncreasing, MonotonicDecreasing, Stable], 0.55),
        sensor_rule(T::HumidityCapacitive, (0.0, 100.0), S::Voltage, Low, (0.0, 60.0), &[Stable, Clean], 0.55),
        sensor_rule(T::VibrationAccelerometer, (-16.0, 16.0), S::Charge, High, (0.0, 0.1), &[Periodic, Noisy], 0.55),
        sensor_rule(T::DigitalSwitch, (0.0, 1.0), S::Digital, High, (0.0, 0.5), &[DigitalLike, StepChanges], 0.55),
        sensor_rule(T::PhProbe, (0.0, 14.0), S::Millivolt, Medium, (0.0, 60.0), &[Stable, Clean], 0.55),
    ]
}

/// Built-in application rules.
pub fn default_application_rules() -> Vec<ApplicationRule> {
    use IndustrialApplication as A;
    use SensorType as T;

    const TEMPERATURE: &[SensorType] =
        &[T::TemperatureThermocouple, T::TemperatureRtd, T::TemperatureThermistor];

    vec![
        application_rule(A::FermentationTemperature, &["ferment", "brewhouse", "cellar", "wort"], TEMPERATURE, Some((0.0, 40.0)), 0.55),
        application_rule(A::ColdStorageTemperature, &["cold", "freezer", "chiller", "refrigerat", "cooler"], TEMPERATURE, Some((-40.0, 10.0)), 0.55),
        application_rule(A::BoilerTemperature, &["boiler", "furnace", "kiln", "oven"], TEMPERATURE, Some((80.0, 1200.0)), 0.55),
        application_rule(A::HvacAirTemperature, &["hvac", "ahu", "room", "zone", "supply air", "return air"], TEMPERATURE, Some((5.0, 40.0)), 0.55),
        application_rule(A::HydraulicPressure, &["hydraulic", "cylinder", "hpu"], &[T::PressureGauge], Some((10.0, 400.0)), 0.55),
        application_rule(A::CompressedAirPressure, &["compressed air", "compressor", "pneumatic", "air receiver"], &[T::PressureGauge], Some((0.0, 16.0)), 0.55),
        application_rule(A::FilterDifferentialPressure, &["filter", "strainer", "differential"], &[T::PressureDifferential], None, 0.55),
        application_rule(A::WaterFlow, &["water", "flow", "cip"], &[T::FlowMagnetic], None, 0.55),
        application_rule(A::SteamFlow, &["steam"], &[T::FlowVortex], None, 0.55),
        application_rule(A::TankLevel, &["tank", "level", "silo", "vessel"], &[T::LevelUltrasonic, T::PressureGauge, T::Analog4To20mA], None, 0.55),
        application_rule(A::MotorVibration, &["motor", "pump", "fan", "bearing", "gearbox", "vibration"], &[T::VibrationAccelerometer], None, 0.55),
        application_rule(A::ProcessControlLoop, &["loop", "transmitter", "analog input", "controller", "signal"], &[T::Analog4To20mA, T::Analog0To10V], None, 0.55),
        application_rule(A::EquipmentStatus, &["status", "switch", "running", "alarm", "door", "limit"], &[T::DigitalSwitch], None, 0.55),
        application_rule(A::EnvironmentalHumidity, &["humidity", "climate", "environment"], &[T::HumidityCapacitive], Some((0.0, 100.0)), 0.55),
        application_rule(A::WaterQualityPh, &["ph probe", "ph sensor", "water quality", "effluent", "wastewater", "neutraliz"], &[T::PhProbe], Some((0.0, 14.0)), 0.55),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_known_type_has_one_rule() {
        let rules = default_sensor_rules();
        let types: HashSet<_> = rules.iter().map(|r| r.sensor_type).collect();
        assert_eq!(types.len(), rules.len());
        assert!(!types.contains(&SensorType::Unknown));
        assert_eq!(types.len(), 14);
    }

    #[test]
    fn test_application_keywords_are_lowercase() {
        for rule in default_application_rules() {
            assert!(!rule.keywords.is_empty(), "{} has no keywords", rule.application);
            for k in &rule.keywords {
                assert_eq!(k, &k.to_lowercase());
            }
        }
    }

    #[test]
    fn test_rule_serde_field_names() {
        let json = serde_json::to_value(&default_sensor_rules()[0]).unwrap();
        assert_eq!(json["sensor_type"], "temperature_thermocouple");
        assert_eq!(json["noise_level"], "medium");
        assert_eq!(json["patterns"][0], "stable");
    }
}
