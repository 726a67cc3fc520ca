#![deny(missing_docs)]
//! Shared types for the lightspeed conversation core.
//!
//! This crate provides:
//! - [`Message`], [`Role`], [`ConversationId`] and [`MessageId`]: the display-ready message model
//! - [`HistoryRecord`]: one decoded message from persisted conversation history
//! - [`ContentDelta`] and [`ByteStream`]: the streamed side of a completion
//! - [`ConversationApi`]: the seam to the external lightspeed backend
//! - [`ApiError`]: transport and HTTP failures reported by that backend

pub mod error;
pub mod stream;
pub mod timestamp;
pub mod traits;
pub mod types;

pub use error::*;
pub use stream::*;
pub use timestamp::parse_timestamp;
pub use traits::*;
pub use types::*;
