//! Sample ingestion from CSV files
//!
//! Expected format, one reading per line:
//!
//! ```text
//! timestamp,value
//! 0.0,20.01
//! 0.1,20.02
//! ```
//!
//! The header is optional. Timestamps are seconds (any numeric epoch) or
//! RFC 3339 date-times. Malformed lines, non-finite numbers and timestamps
//! that do not increase are skipped with a warning.

use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::processing::AnalysisError;
use crate::types::{SamplePoint, SampleSeries};

/// Read a sample series from a CSV file.
pub fn read_series_csv(path: &Path) -> Result<SampleSeries, AnalysisError> {
    let file = File::open(path).map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "Failed to open CSV file");
        e
    })?;
    let series = parse_series_csv(BufReader::new(file))?;
    tracing::info!(count = series.len(), path = %path.display(), "Loaded samples from CSV");
    Ok(series)
}

/// Parse a sample series from any buffered CSV source.
pub fn parse_series_csv<R: BufRead>(reader: R) -> Result<SampleSeries, AnalysisError> {
    let mut points: Vec<SamplePoint> = Vec::new();

    for (idx, line_result) in reader.lines().enumerate() {
        let line_num = idx + 1;
        let line = match line_result {
            Ok(l) => l,
            Err(e) => {
                tracing::warn!(line = line_num, error = %e, "Error reading CSV line");
                continue;
            }
        };

        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        // Header
        if line_num == 1 && trimmed.to_ascii_lowercase().starts_with("timestamp") {
            continue;
        }

        let point = match parse_csv_line(trimmed) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(line = line_num, error = %e, "Error parsing CSV line");
                continue;
            }
        };

        if let Some(last) = points.last() {
            if point.timestamp <= last.timestamp {
                tracing::warn!(
                    line = line_num,
                    timestamp = point.timestamp,
                    previous = last.timestamp,
                    "Timestamp does not increase, skipping line"
                );
                continue;
            }
        }
        points.push(point);
    }

    SampleSeries::new(points)
}

/// Parse one `timestamp,value` line
fn parse_csv_line(line: &str) -> Result<SamplePoint, String> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() < 2 {
        return Err(format!("Expected 2 fields, got {}", fields.len()));
    }

    let timestamp = parse_timestamp(fields[0])?;
    let value = parse_f64(fields[1], "value")?;
    if !value.is_finite() {
        return Err(format!("Non-finite value '{}'", fields[1].trim()));
    }
    Ok(SamplePoint::new(timestamp, value))
}

/// Numeric seconds or an RFC 3339 date-time, as seconds since the Unix epoch
fn parse_timestamp(s: &str) -> Result<f64, String> {
    let s = s.trim();

    if let Ok(seconds) = s.parse::<f64>() {
        return if seconds.is_finite() {
            Ok(seconds)
        } else {
            Err(format!("Non-finite timestamp '{s}'"))
        };
    }

    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| format!("{}Z", s.trim_end_matches('Z')).parse::<DateTime<Utc>>())
        .map(|dt| dt.timestamp_millis() as f64 / 1000.0)
        .map_err(|e| format!("Cannot parse timestamp '{s}': {e}"))
}

fn parse_f64(s: &str, field: &str) -> Result<f64, String> {
    s.trim()
        .parse::<f64>()
        .map_err(|_| format!("Cannot parse {} as f64: '{}'", field, s.trim()))
}
