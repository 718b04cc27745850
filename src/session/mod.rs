//! Session handling: the per-session recorder and the controller that owns it.

pub mod clock;
pub mod controller;
pub mod recorder;
pub mod reporter;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{SessionController, SessionState};
pub use recorder::{EventRecorder, RecordOutcome};
pub use reporter::{ErrorReporter, MemoryReporter, TracingReporter};
