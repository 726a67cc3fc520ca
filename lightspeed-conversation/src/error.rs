//! Errors surfaced to callers of the reducer.

use lightspeed_types::{ApiError, ConversationId};
use thiserror::Error;

/// Failures of reducer operations.
///
/// Stream failures during a turn are not reported here: they finalize the
/// assistant message and show up in the [`TurnOutcome`](crate::TurnOutcome).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConversationError {
    /// Persisted history could not be fetched.
    #[error("failed to fetch conversation history: {0}")]
    HistoryFetch(#[from] ApiError),

    /// A turn is already streaming into this conversation.
    #[error("a turn is already in progress for conversation {0}")]
    TurnInProgress(ConversationId),

    /// The turn task ended without producing an outcome.
    #[error("turn task failed: {0}")]
    TurnTask(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(
            ConversationError::TurnInProgress("c1".into()).to_string(),
            "a turn is already in progress for conversation c1"
        );
        assert_eq!(
            ConversationError::from(ApiError::NotFound("c9".into())).to_string(),
            "failed to fetch conversation history: not found: c9"
        );
    }
}
