//! The pipe-delimited trace line.
//!
//! ```text
//! <elapsed_ms>|<service>|<characteristic>|<base64(gzip(payload))>\n
//! ```
//!
//! Identifier fields are not escaped. An identifier containing `|` makes the
//! line ambiguous, and [`TraceLine::parse`] rejects any line that does not
//! split into exactly four fields.

use crate::error::{RecorderError, Result};
use crate::trace::codec::{decode_payload, encode_payload};
use crate::trace::uuid::normalize_uuid;

/// Field separator.
pub const DELIMITER: char = '|';

/// One record of a trace file, with identifiers already normalized and the
/// payload still encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceLine {
    /// Milliseconds since the previous event of the session. Negative when
    /// the wall clock stepped backwards.
    pub elapsed_ms: i64,
    pub service: String,
    pub characteristic: String,
    pub payload: String,
}

impl TraceLine {
    /// Build a line from a raw event.
    pub fn from_event(
        elapsed_ms: i64,
        service_id: &str,
        characteristic_id: &str,
        payload: &[u8],
    ) -> Result<Self> {
        Ok(Self {
            elapsed_ms,
            service: normalize_uuid(service_id),
            characteristic: normalize_uuid(characteristic_id),
            payload: encode_payload(payload)?,
        })
    }

    /// Render the line, newline included.
    pub fn render(&self) -> String {
        format!(
            "{}{DELIMITER}{}{DELIMITER}{}{DELIMITER}{}\n",
            self.elapsed_ms, self.service, self.characteristic, self.payload
        )
    }

    /// Parse a line as written by [`TraceLine::render`]. A trailing `\n` or
    /// `\r\n` is accepted.
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim_end_matches(['\n', '\r']);
        let fields: Vec<&str> = line.split(DELIMITER).collect();
        if fields.len() != 4 {
            return Err(RecorderError::Parse(format!(
                "expected 4 fields, found {}",
                fields.len()
            )));
        }

        let elapsed_ms = fields[0]
            .parse::<i64>()
            .map_err(|e| RecorderError::Parse(format!("bad elapsed time {:?}: {e}", fields[0])))?;

        Ok(Self {
            elapsed_ms,
            service: fields[1].to_string(),
            characteristic: fields[2].to_string(),
            payload: fields[3].to_string(),
        })
    }

    /// Decode the payload field back into raw bytes.
    pub fn decode_payload(&self) -> Result<Vec<u8>> {
        decode_payload(&self.payload)
    }
}
