//! Errors reported by the lightspeed backend seam.

use std::time::Duration;

/// Transport and HTTP failures from [`ConversationApi`](crate::ConversationApi) calls.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    // Retryable errors
    /// Network-level error (connection reset, DNS failure, etc.).
    #[error("network error: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// No progress within the allotted time.
    #[error("timeout after {0:?}")]
    Timeout(Duration),
    /// Backend is temporarily unavailable.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// The response body broke off mid-stream.
    #[error("stream error: {0}")]
    Stream(String),

    // Terminal errors
    /// Authentication or authorization failure.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Conversation or endpoint does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// Malformed or rejected request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// The backend answered with something we could not decode.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Whether this error is likely transient and the request can be retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Timeout(_) | Self::ServiceUnavailable(_) | Self::Stream(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_detail() {
        assert_eq!(
            ApiError::ServiceUnavailable("backend down".into()).to_string(),
            "service unavailable: backend down"
        );
        assert_eq!(
            ApiError::Timeout(Duration::from_secs(5)).to_string(),
            "timeout after 5s"
        );
    }

    #[test]
    fn transient_errors_are_retryable() {
        assert!(ApiError::Stream("reset".into()).is_retryable());
        assert!(ApiError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(ApiError::Network("dns".into()).is_retryable());
    }

    #[test]
    fn terminal_errors_are_not_retryable() {
        assert!(!ApiError::NotFound("conv".into()).is_retryable());
        assert!(!ApiError::Unauthorized("token".into()).is_retryable());
        assert!(!ApiError::InvalidResponse("not an array".into()).is_retryable());
    }
}
