//! Stream-safe UTF-8 decoding.

/// Decodes UTF-8 text from arbitrarily split byte fragments.
///
/// A multi-byte sequence cut by a fragment boundary is held back until the
/// next fragment completes it. Invalid sequences decode to U+FFFD instead of
/// failing the stream.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    /// Create a decoder with nothing pending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the next fragment, returning all text that is complete so far.
    pub fn decode(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let mut out = String::with_capacity(self.pending.len());

        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    out.push_str(text);
                    self.pending.clear();
                    return out;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match e.error_len() {
                        Some(bad) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + bad);
                        }
                        None => {
                            // Incomplete sequence at the end: wait for more bytes.
                            self.pending.drain(..valid);
                            return out;
                        }
                    }
                }
            }
        }
    }

    /// Flush whatever is still pending once the stream has ended.
    pub fn finish(&mut self) -> String {
        let rest = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        rest
    }

    /// Whether an incomplete sequence is being held back.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}
