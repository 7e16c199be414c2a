//! Event frame recognition and payload decoding.
//!
//! Only lines carrying the `data: ` payload marker are meaningful; every
//! other line (blank block terminators, comments, other field names) is
//! framing noise and is discarded silently. The remainder of a payload
//! line is expected to be a JSON-encoded value.

use serde::{Deserialize, Serialize};

/// The payload marker prefix for event-bearing lines.
pub const DATA_PREFIX: &str = "data: ";

/// One decoded application event, as dispatched to listeners.
///
/// Records are constructed inside the read loop immediately after a
/// payload line decodes successfully, handed to the registered listeners,
/// and then discarded; they are never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// The decoded JSON payload of one `data: ` line.
    pub payload: serde_json::Value,
}

/// Extract the payload of a line, if it is payload-bearing.
///
/// Returns `None` for framing noise: lines without the `data: ` prefix,
/// and payload lines whose remainder is empty after trimming.
pub fn payload_of(line: &str) -> Option<&str> {
    let rest = line.strip_prefix(DATA_PREFIX)?.trim();
    (!rest.is_empty()).then_some(rest)
}

/// Decode one payload into an [`EventRecord`].
///
/// A decode failure belongs to this line alone; callers skip the line and
/// keep the session alive.
pub fn decode_payload(data: &str) -> Result<EventRecord, serde_json::Error> {
    serde_json::from_str(data).map(|payload| EventRecord { payload })
}
