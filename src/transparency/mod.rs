//! Transparency module for the recorder.
//!
//! Tracks how many sessions and events were handled, so it is always
//! possible to tell what ended up on disk and what did not.

pub mod log;

// Re-export commonly used types
pub use log::{
    create_shared_log, create_shared_log_with_persistence, SharedTransparencyLog, TransparencyLog,
    TransparencyStats,
};
