//! BLE Trace Recorder - session-scoped capture of BLE characteristic writes.
//!
//! An instrumentation layer hooked into a device-control app reports three
//! things: a session starting (with an account id), the session stopping,
//! and every characteristic write the app sends to its device. This crate
//! turns that stream into one append-only trace file per session that can
//! later be read back and replayed.
//!
//! # Trace format
//!
//! One file per session, `<record dir>/<session id>_<YYYYMMDD_HHMMSS>.txt`,
//! one line per write:
//!
//! ```text
//! <ms since previous event>|<service>|<characteristic>|<base64(gzip(payload))>
//! ```
//!
//! Known 128-bit UUIDs are shortened to their first 8 hex digits. The first
//! line's elapsed time is measured from session start. Elapsed times are not
//! clamped, so a wall clock stepping backwards shows up as a negative value.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     BLE Trace Recorder                       │
//! ├──────────────────────────────────────────────────────────────┤
//! │  start/stop/host log        characteristic writes            │
//! │          │                          │                        │
//! │          ▼                          ▼                        │
//! │  ┌────────────────────────────────────────┐                  │
//! │  │           SessionController            │──▶ Transparency  │
//! │  │   (one active slot, last start wins)   │       Log        │
//! │  └────────────────────────────────────────┘                  │
//! │                     │                                        │
//! │                     ▼                                        │
//! │  ┌──────────────┐   ┌─────────┐   ┌──────────┐               │
//! │  │EventRecorder │──▶│ uuid +  │──▶│ append   │──▶ trace file │
//! │  │ (per session)│   │ codec   │   │ one line │               │
//! │  └──────────────┘   └─────────┘   └──────────┘               │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use ble_trace_recorder::SessionController;
//!
//! let controller = SessionController::new("/sdcard/app/dglab-record");
//! controller.on_session_start("abc123");
//! controller.on_characteristic_write(
//!     "955a180b-0fe2-f5aa-a094-84b8d4f3e8ad",
//!     "955a1504-0fe2-f5aa-a094-84b8d4f3e8ad",
//!     &[0x01, 0x02, 0x03],
//! );
//! controller.on_session_stop();
//! ```

pub mod config;
pub mod error;
pub mod ingest;
pub mod session;
pub mod trace;
pub mod transparency;
pub mod trigger;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigError};
pub use error::RecorderError;
pub use ingest::BoundaryCall;
pub use session::{
    Clock, ErrorReporter, EventRecorder, SessionController, SessionState, SystemClock,
    TracingReporter,
};
pub use trace::{normalize_uuid, read_trace, TraceLine, TraceRecord};
pub use transparency::{SharedTransparencyLog, TransparencyLog, TransparencyStats};
pub use trigger::HostSignal;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
