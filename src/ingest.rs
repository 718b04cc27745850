//! Text protocol for feeding boundary calls from another process.
//!
//! One call per line:
//!
//! ```text
//! start <session id>
//! stop
//! write <service uuid> <characteristic uuid> [<hex payload>]
//! log <tag> <message...>
//! ```
//!
//! Blank lines and lines starting with `#` are ignored.

use crate::error::{RecorderError, Result};
use crate::session::SessionController;

/// A single call across the instrumentation boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundaryCall {
    Start(String),
    Stop,
    Write {
        service: String,
        characteristic: String,
        payload: Vec<u8>,
    },
    HostLog {
        tag: String,
        message: String,
    },
}

impl BoundaryCall {
    /// Parse one protocol line. `Ok(None)` for blank and comment lines.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let call = match verb {
            "start" => {
                if rest.is_empty() || rest.contains(char::is_whitespace) {
                    return Err(RecorderError::Parse(format!(
                        "start expects one session id, got {rest:?}"
                    )));
                }
                BoundaryCall::Start(rest.to_string())
            }
            "stop" => BoundaryCall::Stop,
            "write" => {
                let fields: Vec<&str> = rest.split_whitespace().collect();
                let (service, characteristic, hex_payload) = match fields.as_slice() {
                    [s, c] => (*s, *c, ""),
                    [s, c, p] => (*s, *c, *p),
                    _ => {
                        return Err(RecorderError::Parse(format!(
                            "write expects service, characteristic and optional payload, got {rest:?}"
                        )))
                    }
                };
                let payload = hex::decode(hex_payload)
                    .map_err(|e| RecorderError::Parse(format!("bad hex payload: {e}")))?;
                BoundaryCall::Write {
                    service: service.to_string(),
                    characteristic: characteristic.to_string(),
                    payload,
                }
            }
            "log" => {
                let (tag, message) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                if tag.is_empty() {
                    return Err(RecorderError::Parse("log expects a tag".to_string()));
                }
                BoundaryCall::HostLog {
                    tag: tag.to_string(),
                    message: message.trim_start().to_string(),
                }
            }
            other => {
                return Err(RecorderError::Parse(format!("unknown call {other:?}")));
            }
        };

        Ok(Some(call))
    }

    /// Deliver the call to `controller`.
    pub fn apply(&self, controller: &SessionController) {
        match self {
            BoundaryCall::Start(id) => controller.on_session_start(id),
            BoundaryCall::Stop => controller.on_session_stop(),
            BoundaryCall::Write {
                service,
                characteristic,
                payload,
            } => controller.on_characteristic_write(service, characteristic, payload),
            BoundaryCall::HostLog { tag, message } => controller.on_host_log(tag, message),
        }
    }
}
