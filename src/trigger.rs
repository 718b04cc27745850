//! Classification of host-application log calls into session signals.
//!
//! The controlling app announces remote-control sessions through its own
//! logging helper: a `remoteMsg` call whose message starts with the join
//! notice and carries `accid = <hex>`, and a `remoteTest` call with the
//! leave notice when the peer goes away.

use regex::Regex;
use std::sync::OnceLock;

/// Tag of the log call that announces a peer joining.
pub const JOIN_TAG: &str = "remoteMsg";

/// Tag of the log call that announces the peer leaving.
pub const LEAVE_TAG: &str = "remoteTest";

/// Prefix of the join message ("someone joined the room").
pub const JOIN_NOTICE: &str = "有人进群了";

/// Full leave message ("the other party left the room").
pub const LEAVE_NOTICE: &str = "对方离开房间了";

/// A session transition derived from a host log call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostSignal {
    /// A remote peer joined; the account id names the session.
    Start(String),
    /// The remote peer left.
    Stop,
}

fn account_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"accid = ([a-fA-F0-9]+)").expect("static regex"))
}

impl HostSignal {
    /// Map a `(tag, message)` log call to a signal, or `None` if it is noise.
    ///
    /// A join notice without a recognizable account id is ignored.
    pub fn classify(tag: &str, message: &str) -> Option<Self> {
        match tag {
            JOIN_TAG if message.starts_with(JOIN_NOTICE) => account_id_pattern()
                .captures(message)
                .map(|caps| HostSignal::Start(caps[1].to_string())),
            LEAVE_TAG if message == LEAVE_NOTICE => Some(HostSignal::Stop),
            _ => None,
        }
    }
}
