//! Per-session trace writer.
//!
//! Each accepted event is appended with its own open/write/close cycle, so
//! nothing is buffered between calls and a file rotated or deleted
//! externally is simply recreated by the next append.

use crate::error::{RecorderError, Result};
use crate::session::clock::Clock;
use crate::trace::codec::encode_payload;
use crate::trace::file::trace_file_name;
use crate::trace::line::TraceLine;
use crate::trace::uuid::normalize_uuid;
use chrono::{DateTime, Local};
use parking_lot::Mutex;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// What happened to an event handed to [`EventRecorder::record_event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// A line was appended.
    Written,
    /// The recorder was closed before the event got its turn.
    Closed,
}

#[derive(Debug)]
struct WriterState {
    last_event: DateTime<Local>,
    closed: bool,
}

/// Owns one session's trace file.
pub struct EventRecorder {
    session_id: String,
    path: PathBuf,
    created: DateTime<Local>,
    clock: Arc<dyn Clock>,
    state: Mutex<WriterState>,
}

impl std::fmt::Debug for EventRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRecorder")
            .field("session_id", &self.session_id)
            .field("path", &self.path)
            .field("created", &self.created)
            .finish_non_exhaustive()
    }
}

impl EventRecorder {
    /// Create the record directory and an empty trace file for `session_id`.
    ///
    /// An existing file with the same name is kept and appended to. Ids that
    /// would place the file anywhere but directly inside `record_dir` are
    /// rejected.
    pub fn create(record_dir: &Path, session_id: &str, clock: Arc<dyn Clock>) -> Result<Self> {
        let created = clock.now();
        let file_name = trace_file_name(session_id, &created);

        let mut components = Path::new(&file_name).components();
        let single_name = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if !single_name {
            return Err(RecorderError::SessionSetup {
                path: record_dir.join(&file_name),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("session id {session_id:?} is not a plain file name"),
                ),
            });
        }
        let path = record_dir.join(file_name);

        std::fs::create_dir_all(record_dir).map_err(|source| RecorderError::SessionSetup {
            path: record_dir.to_path_buf(),
            source,
        })?;

        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| RecorderError::SessionSetup {
                path: path.clone(),
                source,
            })?;

        Ok(Self {
            session_id: session_id.to_string(),
            path,
            created,
            clock,
            state: Mutex::new(WriterState {
                last_event: created,
                closed: false,
            }),
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn created(&self) -> DateTime<Local> {
        self.created
    }

    /// Append one event.
    ///
    /// Identifier shortening and payload encoding run before the writer lock
    /// is taken. The timestamp, elapsed time and append happen under it, so
    /// lines land in the order their elapsed times were computed.
    pub fn record_event(
        &self,
        service_id: &str,
        characteristic_id: &str,
        payload: &[u8],
    ) -> Result<RecordOutcome> {
        let service = normalize_uuid(service_id);
        let characteristic = normalize_uuid(characteristic_id);
        let encoded = encode_payload(payload)?;

        let mut state = self.state.lock();
        if state.closed {
            return Ok(RecordOutcome::Closed);
        }

        let now = self.clock.now();
        let elapsed_ms = (now - state.last_event).num_milliseconds();
        state.last_event = now;

        let line = TraceLine {
            elapsed_ms,
            service,
            characteristic,
            payload: encoded,
        };
        self.append(&line.render())?;

        debug!(
            session = %self.session_id,
            elapsed_ms,
            bytes = payload.len(),
            "event recorded"
        );
        Ok(RecordOutcome::Written)
    }

    /// Stop accepting events. Waits for an in-progress append to finish.
    pub fn close(&self) {
        self.state.lock().closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    fn append(&self, line: &str) -> Result<()> {
        let write = || -> std::io::Result<()> {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)?;
            file.write_all(line.as_bytes())
        };
        write().map_err(|source| RecorderError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::clock::ManualClock;
    use crate::trace::file::read_trace;
    use chrono::TimeZone;

    fn fixed_clock() -> Arc<ManualClock> {
        let start = Local.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        Arc::new(ManualClock::new(start))
    }

    #[test]
    fn test_create_makes_directory_and_empty_file() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("nested").join("dglab-record");
        let recorder = EventRecorder::create(&dir, "abc123", fixed_clock()).unwrap();

        assert_eq!(
            recorder.path().file_name().unwrap(),
            "abc123_20240506_070809.txt"
        );
        assert!(recorder.path().exists());
        assert_eq!(std::fs::read(recorder.path()).unwrap().len(), 0);
        assert_eq!(
            recorder.created(),
            Local.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap()
        );
        assert!(!recorder.is_closed());
    }

    #[test]
    fn test_create_rejects_ids_leaving_record_dir() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("dglab-record");
        let outside = tempfile::tempdir().unwrap();
        let absolute = outside.path().join("evil").to_string_lossy().into_owned();

        for id in [absolute.as_str(), "../escape", "nested/id"] {
            let err = EventRecorder::create(&dir, id, fixed_clock()).unwrap_err();
            assert!(
                matches!(err, RecorderError::SessionSetup { .. }),
                "id {id:?} gave {err}"
            );
        }

        assert_eq!(std::fs::read_dir(outside.path()).unwrap().count(), 0);
        assert!(!root.path().join("escape_20240506_070809.txt").exists());
        assert!(!dir.join("nested").exists());
    }

    #[test]
    fn test_create_fails_when_directory_is_a_file() {
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("dglab-record");
        std::fs::write(&blocker, "not a dir").unwrap();

        let err = EventRecorder::create(&blocker, "abc", fixed_clock()).unwrap_err();
        assert!(matches!(err, RecorderError::SessionSetup { .. }));
    }

    #[test]
    fn test_elapsed_is_gap_since_previous_event() {
        let root = tempfile::tempdir().unwrap();
        let clock = fixed_clock();
        let recorder = EventRecorder::create(root.path(), "s1", clock.clone()).unwrap();

        clock.advance_ms(50);
        recorder.record_event("a", "b", &[1]).unwrap();
        clock.advance_ms(0);
        recorder.record_event("a", "b", &[2]).unwrap();
        clock.advance_ms(1234);
        recorder.record_event("a", "b", &[3]).unwrap();

        let elapsed: Vec<i64> = read_trace(recorder.path())
            .unwrap()
            .iter()
            .map(|r| r.elapsed_ms)
            .collect();
        assert_eq!(elapsed, [50, 0, 1234]);
    }

    #[test]
    fn test_clock_stepping_back_gives_negative_elapsed() {
        let root = tempfile::tempdir().unwrap();
        let clock = fixed_clock();
        let recorder = EventRecorder::create(root.path(), "s1", clock.clone()).unwrap();

        clock.advance_ms(100);
        recorder.record_event("a", "b", &[]).unwrap();
        clock.advance_ms(-40);
        recorder.record_event("a", "b", &[]).unwrap();

        let records = read_trace(recorder.path()).unwrap();
        assert_eq!(records[1].elapsed_ms, -40);
    }

    #[test]
    fn test_closed_recorder_writes_nothing() {
        let root = tempfile::tempdir().unwrap();
        let recorder = EventRecorder::create(root.path(), "s1", fixed_clock()).unwrap();
        recorder.close();
        assert!(recorder.is_closed());

        let outcome = recorder.record_event("a", "b", &[1]).unwrap();
        assert_eq!(outcome, RecordOutcome::Closed);
        assert!(std::fs::read_to_string(recorder.path()).unwrap().is_empty());
    }

    #[test]
    fn test_write_fails_after_external_delete() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("rec");
        let recorder = EventRecorder::create(&dir, "s1", fixed_clock()).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        let err = recorder.record_event("a", "b", &[1]).unwrap_err();
        assert!(matches!(err, RecorderError::Write { .. }));
    }
}
