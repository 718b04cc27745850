//! Recording transparency log.
//!
//! Counts what the recorder did with the traffic it was shown, so an
//! operator can check after the fact how much was captured and how much
//! was dropped or lost.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::warn;

/// Recording counters for the current process.
#[derive(Debug)]
pub struct TransparencyLog {
    /// Sessions successfully started
    sessions_started: AtomicU64,
    /// Sessions ended by a stop signal or replaced by a new start
    sessions_ended: AtomicU64,
    /// Start signals whose trace file could not be created
    setup_failures: AtomicU64,
    /// Lines appended to trace files
    events_recorded: AtomicU64,
    /// Events seen while no session was active
    events_dropped: AtomicU64,
    /// Events lost to write or codec failures
    write_failures: AtomicU64,
    /// Process start time
    process_start: DateTime<Utc>,
    /// Path for persisting stats
    persist_path: Option<PathBuf>,
}

impl TransparencyLog {
    /// Create a new transparency log.
    pub fn new() -> Self {
        Self {
            sessions_started: AtomicU64::new(0),
            sessions_ended: AtomicU64::new(0),
            setup_failures: AtomicU64::new(0),
            events_recorded: AtomicU64::new(0),
            events_dropped: AtomicU64::new(0),
            write_failures: AtomicU64::new(0),
            process_start: Utc::now(),
            persist_path: None,
        }
    }

    /// Create a transparency log that resumes from, and saves to, `path`.
    pub fn with_persistence(path: PathBuf) -> Self {
        let mut log = Self::new();
        log.persist_path = Some(path);

        if let Err(e) = log.load() {
            warn!("could not load previous transparency stats: {e}");
        }

        log
    }

    pub fn record_session_started(&self) {
        self.sessions_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_session_ended(&self) {
        self.sessions_ended.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_setup_failure(&self) {
        self.setup_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_event_written(&self) {
        self.events_recorded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_event_dropped(&self) {
        self.events_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_write_failure(&self) {
        self.write_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current statistics.
    pub fn stats(&self) -> TransparencyStats {
        TransparencyStats {
            sessions_started: self.sessions_started.load(Ordering::Relaxed),
            sessions_ended: self.sessions_ended.load(Ordering::Relaxed),
            setup_failures: self.setup_failures.load(Ordering::Relaxed),
            events_recorded: self.events_recorded.load(Ordering::Relaxed),
            events_dropped: self.events_dropped.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
            process_start: self.process_start,
            uptime_secs: (Utc::now() - self.process_start).num_seconds().max(0) as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.stats();
        format!(
            "Recording Statistics:\n\
             - Sessions started: {}\n\
             - Sessions ended: {}\n\
             - Session setup failures: {}\n\
             - Events recorded: {}\n\
             - Events dropped (no session): {}\n\
             - Events lost to write failures: {}\n\
             - Uptime: {} seconds",
            stats.sessions_started,
            stats.sessions_ended,
            stats.setup_failures,
            stats.events_recorded,
            stats.events_dropped,
            stats.write_failures,
            stats.uptime_secs
        )
    }

    /// Save stats to disk.
    pub fn save(&self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let stats = self.stats();
            let persisted = PersistedStats {
                sessions_started: stats.sessions_started,
                sessions_ended: stats.sessions_ended,
                setup_failures: stats.setup_failures,
                events_recorded: stats.events_recorded,
                events_dropped: stats.events_dropped,
                write_failures: stats.write_failures,
                last_updated: Utc::now(),
            };

            let json = serde_json::to_string_pretty(&persisted).map_err(std::io::Error::other)?;

            std::fs::write(path, json)?;
        }
        Ok(())
    }

    /// Load stats from disk.
    fn load(&mut self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                let persisted: PersistedStats =
                    serde_json::from_str(&content).map_err(std::io::Error::other)?;

                self.sessions_started
                    .store(persisted.sessions_started, Ordering::Relaxed);
                self.sessions_ended
                    .store(persisted.sessions_ended, Ordering::Relaxed);
                self.setup_failures
                    .store(persisted.setup_failures, Ordering::Relaxed);
                self.events_recorded
                    .store(persisted.events_recorded, Ordering::Relaxed);
                self.events_dropped
                    .store(persisted.events_dropped, Ordering::Relaxed);
                self.write_failures
                    .store(persisted.write_failures, Ordering::Relaxed);
            }
        }
        Ok(())
    }

    /// Reset all counters.
    pub fn reset(&self) {
        for counter in [
            &self.sessions_started,
            &self.sessions_ended,
            &self.setup_failures,
            &self.events_recorded,
            &self.events_dropped,
            &self.write_failures,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

impl Default for TransparencyLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of transparency statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransparencyStats {
    pub sessions_started: u64,
    pub sessions_ended: u64,
    pub setup_failures: u64,
    pub events_recorded: u64,
    pub events_dropped: u64,
    pub write_failures: u64,
    pub process_start: DateTime<Utc>,
    pub uptime_secs: u64,
}

/// Stats format for persistence.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedStats {
    sessions_started: u64,
    sessions_ended: u64,
    setup_failures: u64,
    events_recorded: u64,
    events_dropped: u64,
    write_failures: u64,
    last_updated: DateTime<Utc>,
}

/// Thread-safe shared transparency log.
pub type SharedTransparencyLog = Arc<TransparencyLog>;

/// Create a new shared transparency log.
pub fn create_shared_log() -> SharedTransparencyLog {
    Arc::new(TransparencyLog::new())
}

/// Create a new shared transparency log with persistence.
pub fn create_shared_log_with_persistence(path: PathBuf) -> SharedTransparencyLog {
    Arc::new(TransparencyLog::with_persistence(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transparency_log_counting() {
        let log = TransparencyLog::new();

        log.record_session_started();
        log.record_event_written();
        log.record_event_written();
        log.record_event_dropped();

        let stats = log.stats();
        assert_eq!(stats.sessions_started, 1);
        assert_eq!(stats.events_recorded, 2);
        assert_eq!(stats.events_dropped, 1);
        assert_eq!(stats.write_failures, 0);
    }

    #[test]
    fn test_transparency_log_reset() {
        let log = TransparencyLog::new();

        log.record_event_written();
        log.record_write_failure();
        log.record_setup_failure();
        log.reset();

        let stats = log.stats();
        assert_eq!(stats.events_recorded, 0);
        assert_eq!(stats.write_failures, 0);
        assert_eq!(stats.setup_failures, 0);
    }

    #[test]
    fn test_persistence_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("transparency.json");

        let log = TransparencyLog::with_persistence(path.clone());
        log.record_session_started();
        log.record_event_written();
        log.save().unwrap();

        let reloaded = TransparencyLog::with_persistence(path);
        let stats = reloaded.stats();
        assert_eq!(stats.sessions_started, 1);
        assert_eq!(stats.events_recorded, 1);
    }

    #[test]
    fn test_summary_format() {
        let log = TransparencyLog::new();
        let summary = log.summary();

        assert!(summary.contains("Sessions started"));
        assert!(summary.contains("Events recorded"));
        assert!(summary.contains("Events dropped"));
    }
}
