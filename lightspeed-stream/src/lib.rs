#![deny(missing_docs)]
//! Incremental decoding of lightspeed completion streams.
//!
//! The completion body is UTF-8 text made of JSON objects written back to
//! back with no delimiter. This crate layers three small state machines:
//! - [`Utf8Decoder`]: carries partial multi-byte sequences across reads
//! - [`JsonObjectSplitter`]: yields complete top-level object substrings
//! - [`ChunkDecoder`]: parses each object into a [`ContentDelta`](lightspeed_types::ContentDelta)
//!
//! [`decode_stream`] wraps them around a [`ByteStream`](lightspeed_types::ByteStream).

pub mod chunk;
pub mod decode;
pub mod splitter;
pub mod utf8;

pub use chunk::{ChunkDecoder, ChunkEvent, delta_from_value};
pub use decode::decode_stream;
pub use splitter::{JsonObjectSplitter, Segment, split_json_objects};
pub use utf8::Utf8Decoder;
