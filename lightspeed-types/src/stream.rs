//! Types for the streamed side of a completion.

use std::pin::Pin;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::Stream;

use crate::error::ApiError;

/// Raw response body of a streaming completion, one item per network read.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, ApiError>> + Send>>;

/// One incremental piece of assistant output decoded from the stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentDelta {
    /// Text to append to the assistant message. Empty when the chunk carried none.
    pub content: String,
    /// Model that produced the chunk, if reported.
    pub model: Option<String>,
    /// Creation time reported for the chunk, if any.
    pub created_at: Option<DateTime<Utc>>,
}

impl ContentDelta {
    /// A delta carrying only text.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }
}
