//! Interpretation of split segments as completion chunks.
//!
//! Each object on the wire has the shape:
//! ```text
//! {"response":{"kwargs":{"content":"...","response_metadata":{"model":"...","created_at":...}}}}
//! ```
//! Every field is optional; a missing `content` is an empty delta.

use lightspeed_types::{ContentDelta, parse_timestamp};

use crate::splitter::{JsonObjectSplitter, Segment};
use crate::utf8::Utf8Decoder;

/// Something the decoder found in the stream.
#[derive(Debug, Clone, PartialEq)]
pub enum ChunkEvent {
    /// A well-formed chunk.
    Delta(ContentDelta),
    /// A fragment that is not valid JSON. The stream continues past it.
    Malformed {
        /// The offending text.
        raw: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Extract the delta carried by one parsed chunk object.
pub fn delta_from_value(json: &serde_json::Value) -> ContentDelta {
    let kwargs = &json["response"]["kwargs"];
    let metadata = &kwargs["response_metadata"];
    ContentDelta {
        content: kwargs["content"].as_str().unwrap_or_default().to_string(),
        model: metadata["model"]
            .as_str()
            .filter(|m| !m.is_empty())
            .map(str::to_string),
        created_at: parse_timestamp(&metadata["created_at"]),
    }
}

/// Turn one segment into an event.
pub fn interpret(segment: Segment) -> ChunkEvent {
    match segment {
        Segment::Object(raw) => match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(json) => ChunkEvent::Delta(delta_from_value(&json)),
            Err(e) => ChunkEvent::Malformed {
                raw,
                reason: format!("JSON parse error: {e}"),
            },
        },
        Segment::Stray(raw) => ChunkEvent::Malformed {
            raw,
            reason: "text outside of a JSON object".into(),
        },
    }
}

/// Byte-level decoder: UTF-8 continuation, object splitting and chunk parsing.
#[derive(Debug, Default)]
pub struct ChunkDecoder {
    utf8: Utf8Decoder,
    splitter: JsonObjectSplitter,
}

impl ChunkDecoder {
    /// Create a decoder for a fresh stream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one network read into the events it completes, in stream order.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<ChunkEvent> {
        let text = self.utf8.decode(bytes);
        if text.is_empty() {
            return Vec::new();
        }
        self.splitter.push(&text).into_iter().map(interpret).collect()
    }

    /// Flush buffered bytes and any unterminated object once the stream ends.
    pub fn finish(&mut self) -> Vec<ChunkEvent> {
        let tail = self.utf8.finish();
        let mut segments = self.splitter.push(&tail);
        segments.extend(self.splitter.finish());
        segments.into_iter().map(interpret).collect()
    }
}
