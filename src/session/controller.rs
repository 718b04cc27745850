//! Session lifecycle: at most one active recorder, last start wins.
//!
//! ```text
//! Idle      --start(id)--> Recording(id)
//! Recording --start(id')-> Recording(id')   previous recorder closed, no marker
//! Recording --stop-------> Idle
//! Idle      --stop-------> Idle
//! Idle      --event------> Idle             event dropped
//! Recording --event------> Recording        event appended
//! ```
//!
//! All entry points swallow their failures: they are reported to the
//! [`ErrorReporter`] and never returned to the caller.

use crate::session::clock::{Clock, SystemClock};
use crate::session::recorder::{EventRecorder, RecordOutcome};
use crate::session::reporter::{ErrorReporter, TracingReporter};
use crate::transparency::{create_shared_log, SharedTransparencyLog};
use crate::trigger::HostSignal;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Public view of the controller state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Recording { session_id: String, path: PathBuf },
}

/// Routes start/stop signals and characteristic writes to the active recorder.
///
/// Construct one per process and share it by reference or `Arc`.
pub struct SessionController {
    record_dir: PathBuf,
    clock: Arc<dyn Clock>,
    reporter: Arc<dyn ErrorReporter>,
    transparency: SharedTransparencyLog,
    active: Mutex<Option<Arc<EventRecorder>>>,
}

impl SessionController {
    /// Create an idle controller writing traces into `record_dir`.
    pub fn new(record_dir: impl Into<PathBuf>) -> Self {
        Self {
            record_dir: record_dir.into(),
            clock: Arc::new(SystemClock),
            reporter: Arc::new(TracingReporter),
            transparency: create_shared_log(),
            active: Mutex::new(None),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn with_transparency_log(mut self, log: SharedTransparencyLog) -> Self {
        self.transparency = log;
        self
    }

    pub fn record_dir(&self) -> &Path {
        &self.record_dir
    }

    pub fn transparency_log(&self) -> &SharedTransparencyLog {
        &self.transparency
    }

    /// Begin a session, replacing any active one.
    ///
    /// The trace file is created while the slot is locked, so two racing
    /// starts never leave an untracked recorder behind. If creation fails
    /// the current state is kept and the failure is reported.
    pub fn on_session_start(&self, session_id: &str) {
        if session_id.is_empty() {
            self.transparency.record_setup_failure();
            self.reporter
                .report_error("ignoring session start with an empty session id");
            return;
        }

        let mut active = self.active.lock();
        match EventRecorder::create(&self.record_dir, session_id, self.clock.clone()) {
            Ok(recorder) => {
                let path = recorder.path().to_path_buf();
                if let Some(previous) = active.replace(Arc::new(recorder)) {
                    previous.close();
                    self.transparency.record_session_ended();
                    info!(
                        previous = previous.session_id(),
                        "session replaced by a new start"
                    );
                }
                self.transparency.record_session_started();
                info!(session = session_id, path = %path.display(), "recording started");
            }
            Err(e) => {
                self.transparency.record_setup_failure();
                self.reporter
                    .report_error(&format!("could not start session {session_id}: {e}"));
            }
        }
    }

    /// End the active session, if any.
    pub fn on_session_stop(&self) {
        let previous = self.active.lock().take();
        match previous {
            Some(recorder) => {
                recorder.close();
                self.transparency.record_session_ended();
                info!(session = recorder.session_id(), "recording stopped");
            }
            None => debug!("stop with no active session"),
        }
    }

    /// Record a characteristic write, or drop it when idle.
    ///
    /// The slot lock is held only long enough to clone the recorder handle.
    /// A stop that lands while this call is encoding closes the recorder
    /// first, and the event is then dropped instead of written.
    pub fn on_characteristic_write(&self, service_id: &str, characteristic_id: &str, payload: &[u8]) {
        let recorder = self.active.lock().clone();
        let recorder = match recorder {
            Some(recorder) => recorder,
            None => {
                self.transparency.record_event_dropped();
                return;
            }
        };

        match recorder.record_event(service_id, characteristic_id, payload) {
            Ok(RecordOutcome::Written) => self.transparency.record_event_written(),
            Ok(RecordOutcome::Closed) => self.transparency.record_event_dropped(),
            Err(e) => {
                self.transparency.record_write_failure();
                self.reporter.report_error(&format!(
                    "dropping event for session {}: {e}",
                    recorder.session_id()
                ));
            }
        }
    }

    /// Feed a host log call through [`HostSignal::classify`].
    pub fn on_host_log(&self, tag: &str, message: &str) {
        match HostSignal::classify(tag, message) {
            Some(HostSignal::Start(id)) => self.on_session_start(&id),
            Some(HostSignal::Stop) => self.on_session_stop(),
            None => {}
        }
    }

    pub fn state(&self) -> SessionState {
        match self.active.lock().as_ref() {
            Some(recorder) => SessionState::Recording {
                session_id: recorder.session_id().to_string(),
                path: recorder.path().to_path_buf(),
            },
            None => SessionState::Idle,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.active.lock().is_some()
    }
}
