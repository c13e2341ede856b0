//! CSV Ingestion Tests
//!
//! Round-trips simulated signals through CSV files on disk and checks that
//! identification from the file matches identification from memory.

use std::io::Write;

use sensor_identifier::sensors::read_series_csv;
use sensor_identifier::simulation::{generate_default, Profile};
use sensor_identifier::{AnalysisError, DeviceContext, SampleSeries, SensorIdentifier, SensorType};

fn write_csv(series: &SampleSeries) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(file, "timestamp,value").unwrap();
    for p in series.points() {
        // Full precision so the file reproduces the series exactly
        writeln!(file, "{:?},{:?}", p.timestamp, p.value).unwrap();
    }
    file.flush().unwrap();
    file
}

#[test]
fn csv_file_reproduces_series() {
    let series = generate_default(Profile::CurrentLoopRamp, Some(3)).unwrap();
    let file = write_csv(&series);
    let loaded = read_series_csv(file.path()).unwrap();
    assert_eq!(loaded, series);
}

#[test]
fn identification_from_csv_matches_memory() {
    let series = generate_default(Profile::CurrentLoopRamp, Some(3)).unwrap();
    let file = write_csv(&series);
    let loaded = read_series_csv(file.path()).unwrap();

    let identifier = SensorIdentifier::default();
    let context = DeviceContext::new("Loop transmitter", "Panel B");
    let from_file = identifier.identify("AI-07", &loaded, &context);
    let from_memory = identifier.identify("AI-07", &series, &context);

    assert!(from_file.same_outcome(&from_memory));
    assert_eq!(from_file.sensor_type, SensorType::Analog4To20mA);
}

#[test]
fn corrupted_lines_are_skipped() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        "timestamp,value\n0.0,4.0\n0.1,4.1\ngarbage\n0.2,\n0.3,4.3\n0.3,9.9\n\n0.4,4.4\n"
    )
    .unwrap();
    let series = read_series_csv(file.path()).unwrap();
    assert_eq!(series.values(), vec![4.0, 4.1, 4.3, 4.4]);
}

#[test]
fn empty_file_is_an_empty_series() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let series = read_series_csv(file.path()).unwrap();
    assert!(series.is_empty());

    let result = SensorIdentifier::default().identify("NONE", &series, &DeviceContext::default());
    assert_eq!(result.sensor_type, SensorType::Unknown);
}

#[test]
fn missing_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_series_csv(&dir.path().join("absent.csv")).unwrap_err();
    assert!(matches!(err, AnalysisError::Io(_)));
}
