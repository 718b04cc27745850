//! Sink for failures that must not reach the host process.

use parking_lot::Mutex;

/// Best-effort error sink. Implementations must not panic or block.
pub trait ErrorReporter: Send + Sync {
    fn report_error(&self, message: &str);
}

/// Forwards reports to `tracing` at error level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report_error(&self, message: &str) {
        tracing::error!(target: "ble_trace_recorder", "{message}");
    }
}

/// Keeps every report in memory.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    messages: Mutex<Vec<String>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }
}

impl ErrorReporter for MemoryReporter {
    fn report_error(&self, message: &str) {
        self.messages.lock().push(message.to_string());
    }
}
