//! Short-form handling for BLE attribute UUIDs.
//!
//! The device family uses two 128-bit bases: its own vendor base
//! (`955aXXXX-0fe2-f5aa-a094-84b8d4f3e8ad`) and the Bluetooth SIG base
//! (`0000XXXX-0000-1000-8000-00805f9b34fb`). Traces store only the first
//! 8 hex digits for either; anything else is written verbatim.

use regex::Regex;
use std::sync::OnceLock;

/// Suffix of the vendor UUID base.
pub const VENDOR_BASE_SUFFIX: &str = "-0fe2-f5aa-a094-84b8d4f3e8ad";

/// Suffix of the Bluetooth SIG UUID base.
pub const SIG_BASE_SUFFIX: &str = "-0000-1000-8000-00805f9b34fb";

fn known_bases() -> &'static [Regex; 2] {
    static BASES: OnceLock<[Regex; 2]> = OnceLock::new();
    BASES.get_or_init(|| {
        [
            Regex::new(r"^955a[0-9a-f]{4}-0fe2-f5aa-a094-84b8d4f3e8ad$").expect("static regex"),
            Regex::new(r"^0000[0-9a-f]{4}-0000-1000-8000-00805f9b34fb$").expect("static regex"),
        ]
    })
}

/// Shorten a recognized UUID to its lowercase 8-digit prefix.
///
/// Unrecognized input is returned unchanged, original casing included.
pub fn normalize_uuid(uuid: &str) -> String {
    let lower = uuid.to_lowercase();
    if known_bases().iter().any(|re| re.is_match(&lower)) {
        lower[..8].to_string()
    } else {
        uuid.to_string()
    }
}

/// Expand a short form produced by [`normalize_uuid`] back to the full UUID.
///
/// Strings that are not an 8-digit `955a`/`0000` prefix pass through.
pub fn expand_short_uuid(short: &str) -> String {
    let is_short = short.len() == 8 && short.bytes().all(|b| b.is_ascii_hexdigit());
    if !is_short {
        return short.to_string();
    }

    let lower = short.to_lowercase();
    if lower.starts_with("955a") {
        format!("{lower}{VENDOR_BASE_SUFFIX}")
    } else if lower.starts_with("0000") {
        format!("{lower}{SIG_BASE_SUFFIX}")
    } else {
        short.to_string()
    }
}
