//! One prompt submission and the task that streams its answer.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::StreamExt;
use lightspeed_stream::{ChunkEvent, decode_stream};
use lightspeed_types::{ApiError, ContentDelta, ConversationApi, ConversationId, CreateMessageRequest, Message};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::ConversationError;
use crate::reducer::Shared;

/// Text passed to [`TurnObserver::on_complete`] for every malformed fragment.
pub const INVALID_JSON_SENTINEL: &str = "Invalid JSON received";

/// Receives completion notifications for turns.
///
/// Called once with [`INVALID_JSON_SENTINEL`] per malformed fragment, then
/// exactly once per turn with the turn's final text.
pub trait TurnObserver: Send + Sync {
    /// Handle one notification.
    fn on_complete(&self, text: &str);
}

impl<F> TurnObserver for F
where
    F: Fn(&str) + Send + Sync,
{
    fn on_complete(&self, text: &str) {
        self(text)
    }
}

/// How a turn ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnStatus {
    /// The stream ended normally.
    Completed,
    /// The stream could not be opened or broke off. Holds the error text.
    Failed(String),
    /// The turn was cancelled through its [`TurnHandle`].
    Cancelled,
}

/// The result of a finished turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    /// Conversation the turn belonged to.
    pub conversation_id: ConversationId,
    /// How the turn ended.
    pub status: TurnStatus,
    /// All content deltas joined in arrival order, followed by the error
    /// text when the turn failed.
    pub text: String,
    /// Number of fragments skipped because they were not valid JSON.
    pub malformed_chunks: usize,
}

impl TurnOutcome {
    /// Whether the stream ended normally.
    pub fn is_completed(&self) -> bool {
        self.status == TurnStatus::Completed
    }
}

/// Handle to a turn streaming in the background.
///
/// Dropping the handle detaches the turn; it still runs to completion.
#[derive(Debug)]
pub struct TurnHandle {
    pub(crate) conversation_id: ConversationId,
    pub(crate) cancel: CancellationToken,
    pub(crate) task: JoinHandle<TurnOutcome>,
}

impl TurnHandle {
    /// Conversation the turn belongs to.
    pub fn conversation_id(&self) -> &ConversationId {
        &self.conversation_id
    }

    /// Ask the turn to stop. The placeholder is finalized with the content
    /// received so far and the stream is dropped.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the turn task has finished.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the turn to finish.
    pub async fn outcome(self) -> Result<TurnOutcome, ConversationError> {
        self.task
            .await
            .map_err(|e| ConversationError::TurnTask(e.to_string()))
    }
}

/// Append a delta to the assistant placeholder.
pub(crate) fn apply_delta(message: &mut Message, delta: &ContentDelta) {
    message.content.push_str(&delta.content);
    message.is_loading = false;
    if let Some(model) = &delta.model {
        message.name = Some(model.clone());
    }
    if let Some(created_at) = delta.created_at {
        message.timestamp = Some(created_at);
    }
}

enum Interrupt {
    Cancelled,
    Failed(ApiError),
}

/// Drive one turn from request to terminal state.
pub(crate) async fn run_turn<A: ConversationApi>(
    shared: Arc<Shared<A>>,
    conversation_id: ConversationId,
    prompt: String,
    observer: Option<Arc<dyn TurnObserver>>,
    cancel: CancellationToken,
) -> TurnOutcome {
    let mut fragments: Vec<String> = Vec::new();
    let mut malformed_chunks = 0;

    let result = tokio::select! {
        biased;
        () = cancel.cancelled() => Err(Interrupt::Cancelled),
        streamed = consume(
            &shared,
            &conversation_id,
            prompt,
            observer.as_deref(),
            &mut fragments,
            &mut malformed_chunks,
        ) => streamed.map_err(Interrupt::Failed),
    };

    let status = match result {
        Ok(()) => {
            shared
                .end_turn(&conversation_id, |m| {
                    m.is_loading = false;
                    m.timestamp.get_or_insert_with(Utc::now);
                })
                .await;
            TurnStatus::Completed
        }
        Err(Interrupt::Failed(err)) => {
            let text = err.to_string();
            tracing::warn!(conversation_id = %conversation_id, error = %text, "lightspeed.turn.failed");
            shared
                .end_turn(&conversation_id, |m| {
                    m.is_loading = false;
                    m.content.push_str(&text);
                    m.timestamp = Some(Utc::now());
                })
                .await;
            fragments.push(text.clone());
            TurnStatus::Failed(text)
        }
        Err(Interrupt::Cancelled) => {
            tracing::info!(conversation_id = %conversation_id, "lightspeed.turn.cancelled");
            shared
                .end_turn(&conversation_id, |m| {
                    m.is_loading = false;
                    m.timestamp.get_or_insert_with(Utc::now);
                })
                .await;
            TurnStatus::Cancelled
        }
    };

    let text = fragments.concat();
    if let Some(observer) = &observer {
        observer.on_complete(&text);
    }

    tracing::info!(
        conversation_id = %conversation_id,
        chars = text.chars().count(),
        malformed_chunks,
        "lightspeed.turn.complete"
    );

    TurnOutcome {
        conversation_id,
        status,
        text,
        malformed_chunks,
    }
}

/// Open the stream and apply every chunk until it ends.
async fn consume<A: ConversationApi>(
    shared: &Shared<A>,
    conversation_id: &ConversationId,
    prompt: String,
    observer: Option<&dyn TurnObserver>,
    fragments: &mut Vec<String>,
    malformed_chunks: &mut usize,
) -> Result<(), ApiError> {
    let limit = shared.config.read_timeout;
    let request = CreateMessageRequest {
        conversation_id: conversation_id.clone(),
        model: shared.config.model.clone(),
        prompt,
    };

    tracing::debug!(conversation_id = %conversation_id, model = %request.model, "lightspeed.turn.request");
    let body = bounded(limit, shared.api.create_message(request)).await??;
    let mut events = std::pin::pin!(decode_stream(body));

    while let Some(event) = bounded(limit, events.next()).await? {
        match event? {
            ChunkEvent::Delta(delta) => {
                fragments.push(delta.content.clone());
                shared
                    .update_turn(conversation_id, |m| apply_delta(m, &delta))
                    .await;
            }
            ChunkEvent::Malformed { raw, reason } => {
                *malformed_chunks += 1;
                tracing::warn!(
                    conversation_id = %conversation_id,
                    reason = %reason,
                    bytes = raw.len(),
                    "lightspeed.turn.malformed_chunk"
                );
                if let Some(observer) = observer {
                    observer.on_complete(INVALID_JSON_SENTINEL);
                }
            }
        }
    }

    Ok(())
}

/// Await `fut`, failing with [`ApiError::Timeout`] once `limit` elapses.
async fn bounded<T>(limit: Option<Duration>, fut: impl Future<Output = T>) -> Result<T, ApiError> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| ApiError::Timeout(limit)),
        None => Ok(fut.await),
    }
}
