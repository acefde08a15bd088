//! CSV persistence for the session history.
//!
//! Rows use the columns `timestamp,exercise_type,reps,avg_form_score,duration`.
//! Rows that cannot be turned into a complete session are skipped on import,
//! the same way [`Analytics::add`] skips incomplete input.

use std::{
    fs::File,
    io::{Read, Write},
    path::Path,
};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Analytics, Result, SessionInput, SessionRecord};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    timestamp: String,
    exercise_type: &'a str,
    reps: u32,
    avg_form_score: f64,
    duration: f64,
}

impl<'a> From<&'a SessionRecord> for ExportRow<'a> {
    fn from(record: &'a SessionRecord) -> Self {
        Self {
            timestamp: record.timestamp.to_rfc3339(),
            exercise_type: record.exercise_type.name(),
            reps: record.rep_count,
            avg_form_score: record.avg_quality,
            duration: record.duration_seconds,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ImportRow {
    timestamp: Option<String>,
    exercise_type: Option<String>,
    reps: Option<String>,
    avg_form_score: Option<String>,
    duration: Option<String>,
}

impl ImportRow {
    fn into_input(self) -> SessionInput {
        SessionInput {
            timestamp: self.timestamp.as_deref().and_then(parse_timestamp),
            exercise_type: self.exercise_type.and_then(|value| value.parse().ok()),
            rep_count: self.reps.and_then(|value| parse_count(&value)),
            avg_quality: self.avg_form_score.and_then(|value| value.trim().parse().ok()),
            duration_seconds: self.duration.and_then(|value| value.trim().parse().ok()),
        }
    }
}

/// Parses RFC 3339 timestamps as well as naive `YYYY-MM-DD HH:MM:SS[.f]`
/// values, which are taken to be UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}

// Tabular exports sometimes write integer columns as floats ("12.0").
fn parse_count(value: &str) -> Option<u32> {
    let value = value.trim();
    value.parse().ok().or_else(|| {
        value
            .parse::<f64>()
            .ok()
            .filter(|count| count.fract() == 0.0 && *count >= 0.0 && *count <= f64::from(u32::MAX))
            .map(|count| count as u32)
    })
}

/// Writes every stored session. Returns `false` without touching the writer
/// when the history is empty.
pub fn write_csv<W: Write>(analytics: &Analytics, writer: W) -> Result<bool> {
    if analytics.is_empty() {
        return Ok(false);
    }

    let mut wtr = csv::Writer::from_writer(writer);
    for record in analytics.history() {
        wtr.serialize(ExportRow::from(record))?;
    }
    wtr.flush()?;
    Ok(true)
}

pub fn export_csv(analytics: &Analytics, path: impl AsRef<Path>) -> Result<bool> {
    if analytics.is_empty() {
        return Ok(false);
    }
    let file = File::create(path.as_ref())?;
    let written = write_csv(analytics, file)?;
    tracing::info!(path = %path.as_ref().display(), sessions = analytics.len(), "exported history");
    Ok(written)
}

/// Appends the sessions found in `reader` to the history and returns how many
/// were accepted.
pub fn read_csv<R: Read>(analytics: &mut Analytics, reader: R) -> Result<usize> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let mut accepted = 0;
    for row in rdr.deserialize::<ImportRow>() {
        if analytics.add(row?.into_input()) {
            accepted += 1;
        }
    }
    Ok(accepted)
}

pub fn import_csv(analytics: &mut Analytics, path: impl AsRef<Path>) -> Result<usize> {
    let file = File::open(path.as_ref())?;
    let accepted = read_csv(analytics, file)?;
    tracing::info!(path = %path.as_ref().display(), accepted, "imported history");
    Ok(accepted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExerciseType;
    use chrono::TimeZone;

    fn sample() -> SessionRecord {
        SessionRecord {
            timestamp: Utc.with_ymd_and_hms(2024, 5, 4, 18, 30, 0).unwrap(),
            exercise_type: ExerciseType::ArmRaise,
            rep_count: 14,
            avg_quality: 8.5,
            duration_seconds: 75.25,
        }
    }

    #[test]
    fn writes_header_and_rows() {
        let mut analytics = Analytics::new();
        analytics.add(sample());

        let mut buffer = Vec::new();
        assert!(write_csv(&analytics, &mut buffer).unwrap());

        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("timestamp,exercise_type,reps,avg_form_score,duration")
        );
        assert_eq!(
            lines.next(),
            Some("2024-05-04T18:30:00+00:00,Arm Raise,14,8.5,75.25")
        );
    }

    #[test]
    fn empty_history_writes_nothing() {
        let mut buffer = Vec::new();
        assert!(!write_csv(&Analytics::new(), &mut buffer).unwrap());
        assert!(buffer.is_empty());
    }

    #[test]
    fn reads_back_exported_rows() {
        let mut source = Analytics::new();
        source.add(sample());
        let mut buffer = Vec::new();
        write_csv(&source, &mut buffer).unwrap();

        let mut restored = Analytics::new();
        assert_eq!(read_csv(&mut restored, buffer.as_slice()).unwrap(), 1);
        assert_eq!(restored.history(), source.history());
    }

    #[test]
    fn accepts_naive_timestamps_and_float_counts() {
        let data = "timestamp,exercise_type,reps,avg_form_score,duration\n\
                    2024-05-04 18:30:00.250000,Arm Raise,12.0,7.5,40.0\n";
        let mut analytics = Analytics::new();

        assert_eq!(read_csv(&mut analytics, data.as_bytes()).unwrap(), 1);
        let record = &analytics.history()[0];
        assert_eq!(record.rep_count, 12);
        assert_eq!(
            record.timestamp,
            Utc.with_ymd_and_hms(2024, 5, 4, 18, 30, 0).unwrap()
                + chrono::Duration::milliseconds(250)
        );
    }

    #[test]
    fn skips_incomplete_rows() {
        let data = "timestamp,exercise_type,reps,avg_form_score,duration\n\
                    2024-05-04T18:30:00Z,Arm Raise,12,7.5,40\n\
                    not a date,Arm Raise,12,7.5,40\n\
                    2024-05-05T18:30:00Z,Arm Raise,,7.5,40\n\
                    2024-05-06T18:30:00Z,Jumping Jacks,3,7.5,40\n";
        let mut analytics = Analytics::new();

        assert_eq!(read_csv(&mut analytics, data.as_bytes()).unwrap(), 1);
        assert_eq!(analytics.len(), 1);
    }

    #[test]
    fn missing_column_drops_every_row() {
        let data = "timestamp,exercise_type,reps,avg_form_score\n\
                    2024-05-04T18:30:00Z,Arm Raise,12,7.5\n";
        let mut analytics = Analytics::new();
        assert_eq!(read_csv(&mut analytics, data.as_bytes()).unwrap(), 0);
    }
}
