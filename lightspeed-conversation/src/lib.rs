#![deny(missing_docs)]
//! Streaming conversation reducer for the lightspeed assistant.
//!
//! This crate provides:
//! - [`ConversationReducer`]: per-conversation message lists, history hydration and prompt submission
//! - [`TurnHandle`] / [`TurnOutcome`]: the awaitable result of one streamed answer
//! - [`TurnObserver`]: optional completion notifications
//! - [`ConversationConfig`]: model, user identity, avatars and read timeout
//! - [`ConversationStore`] / [`StreamingBuffer`]: the state the reducer owns

pub mod config;
pub mod error;
pub mod history;
pub mod reducer;
pub mod store;
pub mod turn;

pub use config::ConversationConfig;
pub use error::ConversationError;
pub use history::messages_from_history;
pub use reducer::{ConversationReducer, ConversationSnapshot};
pub use store::{ConversationStore, StreamingBuffer, StreamingTurn};
pub use turn::{INVALID_JSON_SENTINEL, TurnHandle, TurnObserver, TurnOutcome, TurnStatus};
