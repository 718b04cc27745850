//! Trace format: identifier shortening, payload codec, line layout and files.
//!
//! Everything here is pure or touches only the file it is given; session
//! state lives in [`crate::session`].

pub mod codec;
pub mod file;
pub mod line;
pub mod uuid;

// Re-export commonly used items
pub use codec::{decode_payload, encode_payload};
pub use file::{
    list_trace_files, parse_trace_file_name, read_trace, trace_file_name, TraceFileEntry,
    TraceRecord,
};
pub use line::TraceLine;
pub use uuid::{expand_short_uuid, normalize_uuid};
