//! Sample series: ordered (timestamp, value) readings from one sensor.

use serde::{Deserialize, Serialize};

use crate::processing::AnalysisError;

/// One raw reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplePoint {
    /// Seconds since an arbitrary epoch (only differences matter)
    pub timestamp: f64,
    pub value: f64,
}

impl SamplePoint {
    pub const fn new(timestamp: f64, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// An observation window of one sensor's readings.
///
/// Timestamps are strictly increasing and every number is finite; both are
/// checked at construction so the analyzers never see malformed input. An
/// empty series is valid and degrades every stage to "insufficient data".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SampleSeries {
    points: Vec<SamplePoint>,
}

impl SampleSeries {
    /// Build a series, rejecting non-finite numbers and non-increasing timestamps.
    pub fn new(points: Vec<SamplePoint>) -> Result<Self, AnalysisError> {
        for (index, p) in points.iter().enumerate() {
            if !p.timestamp.is_finite() || !p.value.is_finite() {
                return Err(AnalysisError::InvalidSeries {
                    index,
                    reason: format!("non-finite sample ({}, {})", p.timestamp, p.value),
                });
            }
            if index > 0 && p.timestamp <= points[index - 1].timestamp {
                return Err(AnalysisError::InvalidSeries {
                    index,
                    reason: format!(
                        "timestamp {} does not increase (previous {})",
                        p.timestamp,
                        points[index - 1].timestamp
                    ),
                });
            }
        }
        Ok(Self { points })
    }

    /// Build from `(timestamp, value)` tuples.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, AnalysisError>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        Self::new(pairs.into_iter().map(|(t, v)| SamplePoint::new(t, v)).collect())
    }

    /// Build a uniformly sampled series starting at t = 0.
    pub fn from_values(values: &[f64], dt: f64) -> Result<Self, AnalysisError> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(AnalysisError::InvalidSeries {
                index: 0,
                reason: format!("sample interval must be positive, got {dt}"),
            });
        }
        Self::from_pairs(values.iter().enumerate().map(|(i, &v)| (i as f64 * dt, v)))
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[SamplePoint] {
        &self.points
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn timestamps(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.timestamp).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Elapsed time between the first and last sample (0 for < 2 points).
    pub fn duration(&self) -> f64 {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => last.timestamp - first.timestamp,
            _ => 0.0,
        }
    }

    /// Mean spacing between consecutive timestamps.
    ///
    /// Averaging tolerates jittery, non-uniform sampling.
    pub fn mean_interval(&self) -> Option<f64> {
        if self.points.len() < 2 {
            return None;
        }
        Some(self.duration() / (self.points.len() - 1) as f64)
    }
}

impl<'de> Deserialize<'de> for SampleSeries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            points: Vec<SamplePoint>,
        }
        let raw = Raw::deserialize(deserializer)?;
        Self::new(raw.points).map_err(serde::de::Error::custom)
    }
}
