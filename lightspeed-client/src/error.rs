//! Internal error helpers for mapping HTTP/reqwest errors to [`ApiError`].

use std::time::Duration;

use lightspeed_types::ApiError;

/// Map an HTTP status code from the lightspeed backend to an [`ApiError`].
pub(crate) fn map_http_status(status: reqwest::StatusCode, body: &str) -> ApiError {
    match status.as_u16() {
        400 => ApiError::InvalidRequest(body.to_string()),
        401 | 403 => ApiError::Unauthorized(body.to_string()),
        404 => ApiError::NotFound(body.to_string()),
        500..=599 => ApiError::ServiceUnavailable(body.to_string()),
        _ => ApiError::InvalidRequest(format!("HTTP {status}: {body}")),
    }
}

/// Map a [`reqwest::Error`] to an [`ApiError`].
///
/// `limit` is the timeout this crate set on the request. A timeout raised by
/// a caller-supplied client stays a network error, since its bound is unknown.
pub(crate) fn map_reqwest_error(err: reqwest::Error, limit: Option<Duration>) -> ApiError {
    match limit {
        Some(limit) if err.is_timeout() => ApiError::Timeout(limit),
        _ => ApiError::Network(Box::new(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_400_maps_to_invalid_request() {
        let err = map_http_status(reqwest::StatusCode::BAD_REQUEST, "bad body");
        assert!(matches!(err, ApiError::InvalidRequest(msg) if msg == "bad body"));
    }

    #[test]
    fn status_401_and_403_map_to_unauthorized() {
        let err = map_http_status(reqwest::StatusCode::UNAUTHORIZED, "no token");
        assert!(matches!(err, ApiError::Unauthorized(msg) if msg == "no token"));
        let err = map_http_status(reqwest::StatusCode::FORBIDDEN, "denied");
        assert!(matches!(err, ApiError::Unauthorized(msg) if msg == "denied"));
    }

    #[test]
    fn status_404_maps_to_not_found() {
        let err = map_http_status(reqwest::StatusCode::NOT_FOUND, "no such conversation");
        assert!(matches!(err, ApiError::NotFound(msg) if msg == "no such conversation"));
    }

    #[test]
    fn status_5xx_maps_to_service_unavailable() {
        for code in [500, 502, 503, 599] {
            let status = reqwest::StatusCode::from_u16(code).expect("valid status");
            let err = map_http_status(status, "down");
            assert!(matches!(err, ApiError::ServiceUnavailable(ref msg) if msg == "down"), "{code}");
            assert!(err.is_retryable());
        }
    }

    #[test]
    fn unknown_status_keeps_status_in_message() {
        let err = map_http_status(reqwest::StatusCode::TOO_MANY_REQUESTS, "rate limited");
        match err {
            ApiError::InvalidRequest(msg) => {
                assert!(msg.contains("429"), "expected status in message: {msg}");
                assert!(msg.contains("rate limited"), "expected body in message: {msg}");
            }
            other => panic!("expected InvalidRequest, got: {other:?}"),
        }
    }

    #[test]
    fn client_errors_are_not_retryable() {
        assert!(!map_http_status(reqwest::StatusCode::BAD_REQUEST, "").is_retryable());
        assert!(!map_http_status(reqwest::StatusCode::NOT_FOUND, "").is_retryable());
        assert!(!map_http_status(reqwest::StatusCode::UNAUTHORIZED, "").is_retryable());
    }

    #[test]
    fn empty_body_preserved_in_error() {
        let err = map_http_status(reqwest::StatusCode::BAD_REQUEST, "");
        assert!(matches!(err, ApiError::InvalidRequest(msg) if msg.is_empty()));
    }
}
