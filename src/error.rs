//! Error types for the recorder.

use std::path::PathBuf;
use thiserror::Error;

/// Failures raised while setting up sessions, writing events or reading traces back.
#[derive(Debug, Error)]
pub enum RecorderError {
    /// The record directory or the session file could not be created.
    #[error("failed to set up session file {path}: {source}")]
    SessionSetup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Appending a line to an active session file failed.
    #[error("failed to append to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Compressing, encoding or decoding a payload failed.
    #[error("payload codec error: {0}")]
    Codec(#[source] std::io::Error),

    /// A trace line or file name did not match the expected grammar.
    #[error("parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RecorderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_error_names_path() {
        let err = RecorderError::SessionSetup {
            path: PathBuf::from("/nope/abc_20240101_000000.txt"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        let msg = err.to_string();
        assert!(msg.contains("abc_20240101_000000.txt"));
        assert!(msg.starts_with("failed to set up session file"));
    }
}
