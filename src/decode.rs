//! Incremental UTF-8 chunk decoding.
//!
//! The streaming transport delivers the response body as arbitrary byte
//! chunks, so a multi-byte character can be split across two chunks. The
//! decoder carries the incomplete trailing sequence between calls and
//! reassembles it when the rest arrives. Malformed sequences degrade to
//! the replacement character rather than erroring; line noise on a
//! long-lived stream is not fatal.

/// Streaming UTF-8 decoder with multi-byte carry.
///
/// One decoder instance belongs to one stream session; construct a fresh
/// one on (re)connect so no carry bytes leak between sessions.
#[derive(Debug, Default)]
pub struct ChunkDecoder {
    /// Incomplete trailing UTF-8 sequence from the previous chunk
    carry: Vec<u8>,
}

impl ChunkDecoder {
    /// Create a new decoder with an empty carry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the next byte chunk into text.
    ///
    /// Any incomplete multi-byte sequence at the end of the chunk is held
    /// back and prepended to the next call. Invalid sequences are replaced
    /// with U+FFFD, matching lossy platform decoder behavior.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let bytes = if self.carry.is_empty() {
            chunk.to_vec()
        } else {
            let mut joined = std::mem::take(&mut self.carry);
            joined.extend_from_slice(chunk);
            joined
        };

        let mut out = String::with_capacity(bytes.len());
        let mut rest = &bytes[..];
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    break;
                }
                Err(err) => {
                    let (valid, after) = rest.split_at(err.valid_up_to());
                    out.push_str(&String::from_utf8_lossy(valid));
                    match err.error_len() {
                        // Definitely invalid: substitute and resync.
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                        // Incomplete sequence at the end of the chunk:
                        // hold it back for the next chunk.
                        None => {
                            self.carry = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// Bytes currently held back waiting for the rest of a sequence.
    pub fn pending(&self) -> &[u8] {
        &self.carry
    }
}
