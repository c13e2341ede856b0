//! Classification labels and the identification result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::SensorSignature;

// ============================================================================
// Labels
// ============================================================================

/// Physical sensor family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorType {
    TemperatureThermocouple,
    TemperatureRtd,
    TemperatureThermistor,
    PressureGauge,
    PressureDifferential,
    FlowMagnetic,
    FlowVortex,
    LevelUltrasonic,
    HumidityCapacitive,
    VibrationAccelerometer,
    #[serde(rename = "analog_4_20ma")]
    Analog4To20mA,
    #[serde(rename = "analog_0_10v")]
    Analog0To10V,
    DigitalSwitch,
    PhProbe,
    #[default]
    Unknown,
}

impl SensorType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TemperatureThermocouple => "temperature_thermocouple",
            Self::TemperatureRtd => "temperature_rtd",
            Self::TemperatureThermistor => "temperature_thermistor",
            Self::PressureGauge => "pressure_gauge",
            Self::PressureDifferential => "pressure_differential",
            Self::FlowMagnetic => "flow_magnetic",
            Self::FlowVortex => "flow_vortex",
            Self::LevelUltrasonic => "level_ultrasonic",
            Self::HumidityCapacitive => "humidity_capacitive",
            Self::VibrationAccelerometer => "vibration_accelerometer",
            Self::Analog4To20mA => "analog_4_20ma",
            Self::Analog0To10V => "analog_0_10v",
            Self::DigitalSwitch => "digital_switch",
            Self::PhProbe => "ph_probe",
            Self::Unknown => "unknown",
        }
    }

    pub const fn is_temperature(self) -> bool {
        matches!(
            self,
            Self::TemperatureThermocouple | Self::TemperatureRtd | Self::TemperatureThermistor
        )
    }

    pub const fn is_known(self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl std::fmt::Display for SensorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the sensor is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndustrialApplication {
    FermentationTemperature,
    ColdStorageTemperature,
    BoilerTemperature,
    HvacAirTemperature,
    HydraulicPressure,
    CompressedAirPressure,
    FilterDifferentialPressure,
    WaterFlow,
    SteamFlow,
    TankLevel,
    MotorVibration,
    ProcessControlLoop,
    EquipmentStatus,
    EnvironmentalHumidity,
    WaterQualityPh,
    #[default]
    Unknown,
}

impl IndustrialApplication {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FermentationTemperature => "fermentation_temperature",
            Self::ColdStorageTemperature => "cold_storage_temperature",
            Self::BoilerTemperature => "boiler_temperature",
            Self::HvacAirTemperature => "hvac_air_temperature",
            Self::HydraulicPressure => "hydraulic_pressure",
            Self::CompressedAirPressure => "compressed_air_pressure",
            Self::FilterDifferentialPressure => "filter_differential_pressure",
            Self::WaterFlow => "water_flow",
            Self::SteamFlow => "steam_flow",
            Self::TankLevel => "tank_level",
            Self::MotorVibration => "motor_vibration",
            Self::ProcessControlLoop => "process_control_loop",
            Self::EquipmentStatus => "equipment_status",
            Self::EnvironmentalHumidity => "environmental_humidity",
            Self::WaterQualityPh => "water_quality_ph",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for IndustrialApplication {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Electrical output of a sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalType {
    Millivolt,
    Resistance,
    Current,
    Voltage,
    Digital,
    Pulse,
    Charge,
}

/// Qualitative noise tier, cleanest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseLevel {
    VeryLow,
    Low,
    Medium,
    High,
}

impl NoiseLevel {
    /// 0 = very_low .. 3 = high
    pub const fn rank(self) -> u8 {
        match self {
            Self::VeryLow => 0,
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
        }
    }
}

/// Free-text device context used only for keyword matching.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceContext {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location: String,
}

impl DeviceContext {
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
        }
    }

    /// Lower-cased `name location` for substring matching.
    pub fn search_text(&self) -> String {
        format!("{} {}", self.name, self.location).to_lowercase()
    }
}

// ============================================================================
// Derived Characteristics, Configuration, Calibration
// ============================================================================

/// Nominal characteristics of a sensor family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorCharacteristics {
    pub measurement_range: (f64, f64),
    pub units: String,
    /// Percent of span
    pub accuracy_percent: f64,
    pub resolution: f64,
    pub signal_type: Option<SignalType>,
    /// Seconds
    pub nominal_response_time: f64,
}

impl SensorCharacteristics {
    /// Datasheet-style defaults keyed by sensor type.
    pub fn for_type(sensor_type: SensorType) -> Self {
        use SensorType as T;
        let (range, units, accuracy, resolution, signal, response) = match sensor_type {
            T::TemperatureThermocouple => ((-200.0, 1350.0), "°C", 0.75, 0.1, Some(SignalType::Millivolt), 2.0),
            T::TemperatureRtd => ((-200.0, 850.0), "°C", 0.1, 0.01, Some(SignalType::Resistance), 5.0),
            T::TemperatureThermistor => ((-50.0, 150.0), "°C", 0.2, 0.01, Some(SignalType::Resistance), 10.0),
            T::PressureGauge => ((0.0, 250.0), "bar", 0.25, 0.01, Some(SignalType::Voltage), 0.05),
            T::PressureDifferential => ((0.0, 2.5), "bar", 0.1, 0.001, Some(SignalType::Voltage), 0.1),
            T::FlowMagnetic => ((0.0, 1000.0), "m³/h", 0.5, 0.1, Some(SignalType::Current), 1.0),
            T::FlowVortex => ((0.0, 5000.0), "kg/h", 1.0, 1.0, Some(SignalType::Pulse), 1.0),
            T::LevelUltrasonic => ((0.0, 15.0), "m", 0.25, 0.001, Some(SignalType::Current), 2.0),
            T::HumidityCapacitive => ((0.0, 100.0), "%RH", 2.0, 0.1, Some(SignalType::Voltage), 8.0),
            T::VibrationAccelerometer => ((-50.0, 50.0), "g", 1.0, 0.001, Some(SignalType::Charge), 0.001),
            T::Analog4To20mA => ((4.0, 20.0), "mA", 0.1, 0.001, Some(SignalType::Current), 0.1),
            T::Analog0To10V => ((0.0, 10.0), "V", 0.1, 0.001, Some(SignalType::Voltage), 0.1),
            T::DigitalSwitch => ((0.0, 1.0), "state", 0.0, 1.0, Some(SignalType::Digital), 0.01),
            T::PhProbe => ((0.0, 14.0), "pH", 0.5, 0.01, Some(SignalType::Millivolt), 15.0),
            T::Unknown => ((0.0, 0.0), "", 0.0, 0.0, None, 0.0),
        };
        Self {
            measurement_range: range,
            units: units.to_string(),
            accuracy_percent: accuracy,
            resolution,
            signal_type: signal,
            nominal_response_time: response,
        }
    }
}

/// Linear raw → engineering-unit scaling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingConfig {
    pub input_min: f64,
    pub input_max: f64,
    pub output_min: f64,
    pub output_max: f64,
    pub units: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlarmLimits {
    pub low_low: f64,
    pub low: f64,
    pub high: f64,
    pub high_high: f64,
}

/// Generated operating configuration for the identified sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorConfiguration {
    pub update_rate_ms: u64,
    pub scaling: ScalingConfig,
    pub alarms: AlarmLimits,
    /// Moving-average window in samples (1 = unfiltered)
    pub filter_window: usize,
    pub deadband: f64,
}

/// Placeholder calibration record; filled in by a later calibration run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationData {
    pub offset: f64,
    pub gain: f64,
    pub interval_days: u32,
    pub last_calibrated: Option<DateTime<Utc>>,
    /// (reference, measured) pairs
    pub reference_points: Vec<(f64, f64)>,
}

impl CalibrationData {
    pub fn placeholder(sensor_type: SensorType) -> Self {
        let interval_days = match sensor_type {
            SensorType::PhProbe => 30,
            SensorType::HumidityCapacitive | SensorType::PressureDifferential => 180,
            SensorType::DigitalSwitch | SensorType::Unknown => 0,
            _ => 365,
        };
        Self {
            offset: 0.0,
            gain: 1.0,
            interval_days,
            last_calibrated: None,
            reference_points: Vec::new(),
        }
    }
}

// ============================================================================
// Identification Result
// ============================================================================

/// Final output of one identification request. Immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentifiedSensor {
    pub sensor_id: String,
    pub sensor_type: SensorType,
    pub type_confidence: f64,
    pub application: IndustrialApplication,
    pub application_confidence: f64,
    pub characteristics: SensorCharacteristics,
    pub signature: SensorSignature,
    pub configuration: SensorConfiguration,
    pub calibration: CalibrationData,
    /// mean(signature, type, application confidence)
    pub confidence: f64,
    pub identified_at: DateTime<Utc>,
}

impl IdentifiedSensor {
    /// Equality that ignores `identified_at`.
    pub fn same_outcome(&self, other: &Self) -> bool {
        Self {
            identified_at: other.identified_at,
            ..self.clone()
        } == *other
    }

    pub fn to_json(&self, pretty: bool) -> Result<String, serde_json::Error> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensor_type_tags() {
        assert_eq!(
            serde_json::to_string(&SensorType::TemperatureThermocouple).unwrap(),
            r#""temperature_thermocouple""#
        );
        assert_eq!(serde_json::to_string(&SensorType::Analog4To20mA).unwrap(), r#""analog_4_20ma""#);
        assert_eq!(serde_json::to_string(&SensorType::Analog0To10V).unwrap(), r#""analog_0_10v""#);
        let parsed: SensorType = serde_json::from_str(r#""analog_4_20ma""#).unwrap();
        assert_eq!(parsed, SensorType::Analog4To20mA);
    }

    #[test]
    fn test_as_str_matches_serde_tag() {
        for t in [
            SensorType::TemperatureRtd,
            SensorType::Analog4To20mA,
            SensorType::PhProbe,
            SensorType::Unknown,
        ] {
            assert_eq!(serde_json::to_string(&t).unwrap(), format!("\"{}\"", t.as_str()));
        }
        let app = IndustrialApplication::FermentationTemperature;
        assert_eq!(serde_json::to_string(&app).unwrap(), format!("\"{}\"", app.as_str()));
    }

    #[test]
    fn test_noise_level_ordering() {
        assert!(NoiseLevel::VeryLow < NoiseLevel::High);
        assert_eq!(NoiseLevel::Medium.rank(), 2);
    }

    #[test]
    fn test_search_text_is_lowercase() {
        let ctx = DeviceContext::new("Fermentation Tank 1", "Plant/Cellar");
        assert_eq!(ctx.search_text(), "fermentation tank 1 plant/cellar");
    }

    #[test]
    fn test_unknown_characteristics_are_empty() {
        let c = SensorCharacteristics::for_type(SensorType::Unknown);
        assert!(c.signal_type.is_none());
        assert!(c.units.is_empty());
    }
}
