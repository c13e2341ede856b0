//! Synthetic sensor signals for testing and demos
//!
//! Every profile mimics one kind of field signal. Noise comes from a seeded
//! `StdRng`, so the same seed always yields the same series.

use rand::prelude::*;
use rand_distr::StandardNormal;
use std::f64::consts::PI;
use std::str::FromStr;

use crate::processing::AnalysisError;
use crate::types::SampleSeries;

/// Built-in signal shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Profile {
    /// Slow sine around 20 °C, ±0.005 uniform noise
    TemperatureSine,
    /// 4 → 20 mA commissioning ramp, Gaussian noise σ = 0.05 mA
    CurrentLoopRamp,
    /// 2 → 6 bar step with a first-order rise
    PressureStep,
    /// 0/1 contact toggling every 25 samples
    DigitalSwitch,
    /// Two-tone vibration with Gaussian noise
    Vibration,
}

impl Profile {
    pub const ALL: [Self; 5] = [
        Self::TemperatureSine,
        Self::CurrentLoopRamp,
        Self::PressureStep,
        Self::DigitalSwitch,
        Self::Vibration,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::TemperatureSine => "temperature-sine",
            Self::CurrentLoopRamp => "current-loop-ramp",
            Self::PressureStep => "pressure-step",
            Self::DigitalSwitch => "digital-switch",
            Self::Vibration => "vibration",
        }
    }

    /// Typical sample interval in seconds.
    pub const fn default_interval(self) -> f64 {
        match self {
            Self::TemperatureSine | Self::CurrentLoopRamp => 0.1,
            Self::PressureStep => 0.05,
            Self::DigitalSwitch => 0.5,
            Self::Vibration => 0.005,
        }
    }

    pub const fn default_samples(self) -> usize {
        match self {
            Self::TemperatureSine => 300,
            Self::CurrentLoopRamp => 200,
            Self::PressureStep => 200,
            Self::DigitalSwitch => 200,
            Self::Vibration => 512,
        }
    }

    /// Noise-free value of sample `i` of `n` at time `t`.
    fn ideal(self, i: usize, n: usize, t: f64) -> f64 {
        match self {
            Self::TemperatureSine => 20.0 + 0.1 * (0.1 * t).sin(),
            Self::CurrentLoopRamp => {
                let progress = if n > 1 { i as f64 / (n - 1) as f64 } else { 0.0 };
                4.0 + 16.0 * progress
            }
            Self::PressureStep => {
                let step_at = (n * 2 / 5).max(1);
                if i < step_at {
                    2.0
                } else {
                    let elapsed = (i - step_at + 1) as f64;
                    2.0 + 4.0 * (1.0 - (-elapsed / 3.0).exp())
                }
            }
            Self::DigitalSwitch => {
                if (i / 25) % 2 == 0 {
                    0.0
                } else {
                    1.0
                }
            }
            Self::Vibration => 0.8 * (2.0 * PI * 12.5 * t).sin() + 0.3 * (2.0 * PI * 31.0 * t).sin(),
        }
    }

    fn noise(self, rng: &mut StdRng) -> f64 {
        match self {
            Self::TemperatureSine => rng.gen_range(-0.005..0.005),
            Self::CurrentLoopRamp => 0.05 * rng.sample::<f64, _>(StandardNormal),
            Self::PressureStep => 0.005 * rng.sample::<f64, _>(StandardNormal),
            Self::DigitalSwitch => 0.0,
            Self::Vibration => 0.05 * rng.sample::<f64, _>(StandardNormal),
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|p| p.name()).collect();
                format!("unknown profile '{s}', expected one of: {}", names.join(", "))
            })
    }
}

/// Generate `samples` readings spaced `interval` seconds apart.
///
/// Without a seed the noise is drawn from OS entropy.
pub fn generate(
    profile: Profile,
    samples: usize,
    interval: f64,
    seed: Option<u64>,
) -> Result<SampleSeries, AnalysisError> {
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    let values: Vec<f64> = (0..samples)
        .map(|i| {
            let t = i as f64 * interval;
            profile.ideal(i, samples, t) + profile.noise(&mut rng)
        })
        .collect();
    SampleSeries::from_values(&values, interval)
}

/// [`generate`] with the profile's default length and interval.
pub fn generate_default(profile: Profile, seed: Option<u64>) -> Result<SampleSeries, AnalysisError> {
    generate(profile, profile.default_samples(), profile.default_interval(), seed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let a = generate_default(Profile::Vibration, Some(7)).unwrap();
        let b = generate_default(Profile::Vibration, Some(7)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_temperature_sine_bounds() {
        let series = generate_default(Profile::TemperatureSine, Some(42)).unwrap();
        assert_eq!(series.len(), 300);
        assert!(series.values().iter().all(|v| (19.99..=20.11).contains(v)));
    }

    #[test]
    fn test_ramp_stays_in_loop_range() {
        let series = generate_default(Profile::CurrentLoopRamp, Some(1)).unwrap();
        let values = series.values();
        // Within the NE43 measurement band despite the noise
        assert!(values.iter().all(|v| (3.6..=21.0).contains(v)));
        assert!(values[values.len() - 1] - values[0] > 15.0);
    }

    #[test]
    fn test_digital_switch_has_two_levels() {
        let series = generate_default(Profile::DigitalSwitch, None).unwrap();
        assert!(series.values().iter().all(|&v| v == 0.0 || v == 1.0));
    }

    #[test]
    fn test_profile_names_roundtrip() {
        for p in Profile::ALL {
            assert_eq!(p.name().parse::<Profile>(), Ok(p));
        }
        assert!("sawtooth".parse::<Profile>().is_err());
    }

    #[test]
    fn test_invalid_interval_rejected() {
        assert!(generate(Profile::PressureStep, 10, 0.0, Some(1)).is_err());
    }
}
