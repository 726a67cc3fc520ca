//! Lightspeed backend client struct and builder.

use std::future::Future;
use std::time::Duration;

use futures::{StreamExt, TryStreamExt};
use lightspeed_types::{
    ApiError, ByteStream, ConversationApi, ConversationId, CreateMessageRequest, HistoryRecord,
};
use reqwest::Url;

use crate::error::{map_http_status, map_reqwest_error};
use crate::mapping::{from_history_response, to_query_body};

/// Default lightspeed backend base URL.
const DEFAULT_BASE_URL: &str = "http://localhost:7007/api/lightspeed";

/// Default bound on a history request.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the lightspeed backend.
///
/// Implements [`ConversationApi`] so it can back a conversation reducer.
///
/// # Example
///
/// ```no_run
/// use lightspeed_client::LightspeedClient;
///
/// let client = LightspeedClient::new()
///     .base_url("https://backstage.example.com/api/lightspeed")
///     .server_url("http://ollama:11434/v1");
/// ```
#[derive(Debug, Clone)]
pub struct LightspeedClient {
    /// Backend base URL; endpoint paths are appended to it.
    pub(crate) base_url: String,
    /// Model server URL forwarded with each query, if any.
    pub(crate) server_url: Option<String>,
    /// Bound on a whole history request. Queries stream for as long as the
    /// model writes, so they are bounded per read by the reducer instead.
    pub(crate) request_timeout: Option<Duration>,
    /// Shared HTTP client.
    pub(crate) client: reqwest::Client,
}

impl LightspeedClient {
    /// Create a client pointed at `http://localhost:7007/api/lightspeed`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            server_url: None,
            request_timeout: Some(DEFAULT_REQUEST_TIMEOUT),
            client: reqwest::Client::new(),
        }
    }

    /// Override the backend base URL.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Model server URL sent as `serverURL` with every query.
    #[must_use]
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = Some(url.into());
        self
    }

    /// Bound on a history request, 30 s by default. `None` defers to the
    /// HTTP client's own settings.
    #[must_use]
    pub fn request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Use a preconfigured HTTP client (auth headers, proxies, timeouts).
    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Append path segments to the base URL, percent-encoding each one.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::InvalidRequest(format!("invalid base url {}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidRequest(format!("base url cannot hold a path: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// `GET {base}/conversations/{id}`.
    pub(crate) fn conversation_url(&self, id: &ConversationId) -> Result<Url, ApiError> {
        self.endpoint(&["conversations", id.as_str()])
    }

    /// `POST {base}/v1/query`.
    pub(crate) fn query_url(&self) -> Result<Url, ApiError> {
        self.endpoint(&["v1", "query"])
    }
}

impl Default for LightspeedClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationApi for LightspeedClient {
    fn conversation_messages(
        &self,
        conversation_id: &ConversationId,
    ) -> impl Future<Output = Result<Vec<HistoryRecord>, ApiError>> + Send {
        let url = self.conversation_url(conversation_id);
        let limit = self.request_timeout;
        let http_client = self.client.clone();

        async move {
            let url = url?;
            tracing::debug!(url = %url, "lightspeed.client.history");

            let mut request = http_client.get(url);
            if let Some(limit) = limit {
                request = request.timeout(limit);
            }
            let response = request
                .send()
                .await
                .map_err(|e| map_reqwest_error(e, limit))?;

            let status = response.status();
            let text = response
                .text()
                .await
                .map_err(|e| map_reqwest_error(e, limit))?;
            if !status.is_success() {
                return Err(map_http_status(status, &text));
            }

            let json: serde_json::Value = serde_json::from_str(&text)
                .map_err(|e| ApiError::InvalidResponse(format!("invalid JSON response: {e}")))?;
            from_history_response(&json)
        }
    }

    /// Submit the prompt and hand back the response body unbuffered.
    fn create_message(
        &self,
        request: CreateMessageRequest,
    ) -> impl Future<Output = Result<ByteStream, ApiError>> + Send {
        let url = self.query_url();
        let body = to_query_body(&request, self.server_url.as_deref());
        let http_client = self.client.clone();

        async move {
            let url = url?;
            tracing::debug!(url = %url, model = %request.model, "lightspeed.client.query");

            let response = http_client
                .post(url)
                .header("content-type", "application/json")
                .json(&body)
                .send()
                .await
                .map_err(|e| map_reqwest_error(e, None))?;

            let status = response.status();
            if !status.is_success() {
                let text = response
                    .text()
                    .await
                    .map_err(|e| map_reqwest_error(e, None))?;
                return Err(map_http_status(status, &text));
            }

            Ok(response
                .bytes_stream()
                .map_err(|e| map_reqwest_error(e, None))
                .boxed())
        }
    }
}
