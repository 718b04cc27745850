//! Trace file naming, discovery and reading.

use crate::error::{RecorderError, Result};
use crate::trace::line::TraceLine;
use chrono::{DateTime, NaiveDateTime, TimeZone};
use regex::Regex;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Timestamp layout embedded in trace file names.
pub const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Extension of trace files.
pub const TRACE_EXTENSION: &str = "txt";

/// File name for a session started at `created`, rendered in that time's zone.
pub fn trace_file_name<Tz>(session_id: &str, created: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!(
        "{session_id}_{}.{TRACE_EXTENSION}",
        created.format(FILE_TIMESTAMP_FORMAT)
    )
}

fn file_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(.+)_(\d{8}_\d{6})\.txt$").expect("static regex")
    })
}

/// Split a trace file name into its session id and start time.
///
/// Returns `None` for names not produced by [`trace_file_name`], or whose
/// timestamp is not a real calendar time.
pub fn parse_trace_file_name(name: &str) -> Option<(String, NaiveDateTime)> {
    let caps = file_name_pattern().captures(name)?;
    let started = NaiveDateTime::parse_from_str(&caps[2], FILE_TIMESTAMP_FORMAT).ok()?;
    Some((caps[1].to_string(), started))
}

/// A file found in a record directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceFileEntry {
    pub path: PathBuf,
    /// Session id and start time, when the name parses.
    pub session: Option<(String, NaiveDateTime)>,
}

impl TraceFileEntry {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// List the regular files in `dir`.
///
/// Files whose names do not parse come first (in name order), followed by
/// traces sorted newest first.
pub fn list_trace_files(dir: &Path) -> Result<Vec<TraceFileEntry>> {
    let mut unnamed = Vec::new();
    let mut named = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let session = parse_trace_file_name(&name);
        let item = TraceFileEntry {
            path: entry.path(),
            session,
        };
        if item.session.is_some() {
            named.push(item);
        } else {
            unnamed.push(item);
        }
    }

    unnamed.sort_by_key(|e| e.file_name());
    named.sort_by(|a, b| {
        let ta = a.session.as_ref().map(|(_, t)| *t);
        let tb = b.session.as_ref().map(|(_, t)| *t);
        tb.cmp(&ta)
    });

    unnamed.extend(named);
    Ok(unnamed)
}

/// A decoded trace record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceRecord {
    pub elapsed_ms: i64,
    pub service: String,
    pub characteristic: String,
    pub payload: Vec<u8>,
}

/// Read and decode every line of a trace file. Blank lines are skipped.
pub fn read_trace(path: &Path) -> Result<Vec<TraceRecord>> {
    let content = std::fs::read_to_string(path)?;
    let mut records = Vec::new();

    for (index, raw) in content.lines().enumerate() {
        if raw.trim().is_empty() {
            continue;
        }
        let line_no = index + 1;
        let line = TraceLine::parse(raw)
            .map_err(|e| RecorderError::Parse(format!("line {line_no}: {e}")))?;
        let payload = line
            .decode_payload()
            .map_err(|e| RecorderError::Parse(format!("line {line_no}: {e}")))?;
        records.push(TraceRecord {
            elapsed_ms: line.elapsed_ms,
            service: line.service,
            characteristic: line.characteristic,
            payload,
        });
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    #[test]
    fn test_file_name_format() {
        let created = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(
            trace_file_name("abc123", &created),
            "abc123_20240309_070501.txt"
        );
    }

    #[test]
    fn test_parse_file_name() {
        let (id, started) = parse_trace_file_name("abc123_20240309_070501.txt").unwrap();
        assert_eq!(id, "abc123");
        assert_eq!(
            started,
            NaiveDate::from_ymd_opt(2024, 3, 9)
                .unwrap()
                .and_hms_opt(7, 5, 1)
                .unwrap()
        );

        assert!(parse_trace_file_name("notes.txt").is_none());
        assert!(parse_trace_file_name("_20240309_070501.txt").is_none());
        assert!(parse_trace_file_name("abc_20240309_070501.log").is_none());
        assert!(parse_trace_file_name("abc_20241399_070501.txt").is_none());
    }

    #[test]
    fn test_file_name_round_trips_any_id() {
        let created = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        for id in ["user_1", "a-b", "x_20240101_000000", "id with space"] {
            let name = trace_file_name(id, &created);
            let (parsed, started) = parse_trace_file_name(&name).unwrap();
            assert_eq!(parsed, id);
            assert_eq!(started, created.naive_utc());
        }
    }

    #[test]
    fn test_list_orders_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "aa_20240101_000000.txt",
            "bb_20240301_120000.txt",
            "readme.txt",
            "cc_20240201_235959.txt",
        ] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        std::fs::create_dir(dir.path().join("subdir")).unwrap();

        let names: Vec<String> = list_trace_files(dir.path())
            .unwrap()
            .iter()
            .map(|e| e.file_name())
            .collect();
        assert_eq!(
            names,
            [
                "readme.txt",
                "bb_20240301_120000.txt",
                "cc_20240201_235959.txt",
                "aa_20240101_000000.txt",
            ]
        );
    }

    #[test]
    fn test_read_trace_reports_line_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x_20240101_000000.txt");
        let good = TraceLine::from_event(5, "s", "c", &[1, 2]).unwrap().render();
        std::fs::write(&path, format!("{good}\n12|broken\n")).unwrap();

        let err = read_trace(&path).unwrap_err().to_string();
        assert!(err.contains("line 3"), "{err}");
    }

    #[test]
    fn test_read_trace_decodes_payloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x_20240101_000000.txt");
        let mut content = String::new();
        content.push_str(&TraceLine::from_event(0, "s", "c", &[0xaa]).unwrap().render());
        content.push_str(&TraceLine::from_event(25, "s", "c", &[0xbb, 0xcc]).unwrap().render());
        std::fs::write(&path, content).unwrap();

        let records = read_trace(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].payload, vec![0xaa]);
        assert_eq!(records[1].elapsed_ms, 25);
        assert_eq!(records[1].payload, vec![0xbb, 0xcc]);
    }
}
