//! The streaming conversation reducer.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use lightspeed_types::{ConversationApi, ConversationId, Message};
use tokio::sync::{RwLock, watch};
use tokio_util::sync::CancellationToken;

use crate::config::ConversationConfig;
use crate::error::ConversationError;
use crate::history::messages_from_history;
use crate::store::{ConversationStore, StreamingBuffer, StreamingTurn};
use crate::turn::{TurnHandle, TurnObserver, run_turn};

/// The published projection of the active conversation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationSnapshot {
    /// The active conversation.
    pub conversation_id: ConversationId,
    /// Its messages, oldest first.
    pub messages: Vec<Message>,
}

/// Mutable reducer state. Guarded by a single lock so a turn's store and
/// buffer updates are observed together.
#[derive(Debug, Default)]
pub(crate) struct ReducerState {
    active: ConversationId,
    store: ConversationStore,
    streaming: StreamingBuffer,
}

impl ReducerState {
    fn snapshot(&self) -> ConversationSnapshot {
        ConversationSnapshot {
            conversation_id: self.active.clone(),
            messages: self.store.messages(&self.active).to_vec(),
        }
    }

    /// Mutate the in-flight assistant placeholder and mirror it into the store.
    fn update_assistant(&mut self, id: &ConversationId, f: impl FnOnce(&mut Message)) -> bool {
        let Some(turn) = self.streaming.get_mut(id) else {
            return false;
        };
        f(&mut turn.assistant);

        let entry = self.store.messages(id);
        if !entry.iter().any(|m| m.id == turn.user.id) {
            // Entry was replaced while streaming; put the turn back at the end.
            self.store.upsert(id, &turn.user);
        }
        self.store.upsert(id, &turn.assistant);
        true
    }
}

/// State shared between the reducer handle and its turn tasks.
pub(crate) struct Shared<A> {
    pub(crate) api: A,
    pub(crate) config: ConversationConfig,
    state: RwLock<ReducerState>,
    snapshots: watch::Sender<ConversationSnapshot>,
}

impl<A> Shared<A> {
    fn publish_if_active(&self, state: &ReducerState, id: &ConversationId) {
        if state.active == *id {
            self.snapshots.send_replace(state.snapshot());
        }
    }

    /// Apply an update to a conversation's streaming placeholder.
    pub(crate) async fn update_turn(&self, id: &ConversationId, f: impl FnOnce(&mut Message)) {
        let mut state = self.state.write().await;
        if state.update_assistant(id, f) {
            self.publish_if_active(&state, id);
        }
    }

    /// Apply a final update and release the conversation's streaming slot.
    pub(crate) async fn end_turn(&self, id: &ConversationId, f: impl FnOnce(&mut Message)) {
        let mut state = self.state.write().await;
        state.update_assistant(id, f);
        state.streaming.clear(id);
        self.publish_if_active(&state, id);
    }
}

/// Owns per-conversation message lists and feeds streamed answers into them.
///
/// At most one turn streams into a conversation at a time; turns in
/// different conversations run independently. Cloning the reducer yields
/// another handle onto the same state.
///
/// # Example
///
/// ```no_run
/// # async fn demo<A: lightspeed_types::ConversationApi>(api: A) -> Result<(), Box<dyn std::error::Error>> {
/// use lightspeed_conversation::{ConversationConfig, ConversationReducer};
///
/// let reducer = ConversationReducer::new(api, ConversationConfig::new("granite3-dense:8b"));
/// reducer.select("conv-1").await;
/// reducer.hydrate("conv-1").await?;
///
/// let turn = reducer.submit("What is Backstage?").await?;
/// let outcome = turn.outcome().await?;
/// println!("{}", outcome.text);
/// # Ok(())
/// # }
/// ```
pub struct ConversationReducer<A> {
    shared: Arc<Shared<A>>,
    observer: Option<Arc<dyn TurnObserver>>,
}

impl<A> Clone for ConversationReducer<A> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            observer: self.observer.clone(),
        }
    }
}

impl<A> fmt::Debug for ConversationReducer<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversationReducer")
            .field("config", &self.shared.config)
            .field("has_observer", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}

impl<A: ConversationApi> ConversationReducer<A> {
    /// Create a reducer with no conversation selected.
    pub fn new(api: A, config: ConversationConfig) -> Self {
        let (snapshots, _) = watch::channel(ConversationSnapshot::default());
        Self {
            shared: Arc::new(Shared {
                api,
                config,
                state: RwLock::new(ReducerState::default()),
                snapshots,
            }),
            observer: None,
        }
    }

    /// Register an observer notified by turns submitted through this handle.
    #[must_use]
    pub fn observer(mut self, observer: impl TurnObserver + 'static) -> Self {
        self.observer = Some(Arc::new(observer));
        self
    }

    /// The reducer configuration.
    pub fn config(&self) -> &ConversationConfig {
        &self.shared.config
    }

    /// Make `conversation_id` the active conversation.
    ///
    /// Its entry is replaced by the turn still streaming into it, if any, or
    /// emptied until [`hydrate`](Self::hydrate) fills it. Re-selecting the
    /// active conversation does nothing.
    pub async fn select(&self, conversation_id: impl Into<ConversationId>) {
        let id = conversation_id.into();
        let mut state = self.shared.state.write().await;
        if state.active == id {
            return;
        }

        let pending = state
            .streaming
            .get(&id)
            .map(|turn| Vec::from(turn.messages()))
            .unwrap_or_default();
        state.store.replace(&id, pending);
        state.active = id;

        tracing::debug!(conversation_id = %state.active, "lightspeed.conversation.select");
        self.shared.snapshots.send_replace(state.snapshot());
    }

    /// Load persisted history for a conversation.
    ///
    /// History replaces the conversation's entry, followed by the turn still
    /// streaming into it, if any. An empty id fetches nothing and an empty
    /// history leaves the entry as it is. Fetch failures are returned, never
    /// retried.
    pub async fn hydrate(
        &self,
        conversation_id: impl Into<ConversationId>,
    ) -> Result<Vec<Message>, ConversationError> {
        let id = conversation_id.into();
        if id.is_empty() {
            return Ok(self.conversation(&id).await);
        }

        let records = self
            .shared
            .api
            .conversation_messages(&id)
            .await
            .inspect_err(|e| {
                tracing::warn!(conversation_id = %id, error = %e, "lightspeed.conversation.history_failed");
            })?;

        let mut state = self.shared.state.write().await;
        if records.is_empty() {
            return Ok(state.store.messages(&id).to_vec());
        }

        let mut messages = messages_from_history(&records, &self.shared.config);
        if let Some(turn) = state.streaming.get(&id) {
            messages.extend(turn.messages());
        }
        state.store.replace(&id, messages.clone());

        tracing::debug!(conversation_id = %id, records = records.len(), "lightspeed.conversation.hydrated");
        self.shared.publish_if_active(&state, &id);
        Ok(messages)
    }

    /// Submit a prompt to the active conversation.
    ///
    /// When this returns, the user message and a loading assistant
    /// placeholder are already at the end of the conversation. The answer
    /// streams in on a background task; await the returned handle for the
    /// outcome. Fails with [`ConversationError::TurnInProgress`] while an
    /// earlier turn in the same conversation is still streaming.
    pub async fn submit(&self, prompt: impl Into<String>) -> Result<TurnHandle, ConversationError> {
        let prompt = prompt.into();
        let config = &self.shared.config;

        let conversation_id = {
            let mut state = self.shared.state.write().await;
            let id = state.active.clone();
            let turn = StreamingTurn {
                user: Message::user(
                    config.user_name.clone(),
                    config.user_avatar.clone(),
                    prompt.clone(),
                    Some(Utc::now()),
                ),
                assistant: Message::placeholder(config.model.clone(), config.assistant_avatar.clone()),
            };
            let messages = turn.messages();

            if state.streaming.begin(&id, turn).is_err() {
                tracing::warn!(conversation_id = %id, "lightspeed.turn.rejected");
                return Err(ConversationError::TurnInProgress(id));
            }
            state.store.append(&id, messages);
            self.shared.publish_if_active(&state, &id);
            id
        };

        tracing::info!(conversation_id = %conversation_id, model = %config.model, "lightspeed.turn.start");

        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_turn(
            Arc::clone(&self.shared),
            conversation_id.clone(),
            prompt,
            self.observer.clone(),
            cancel.clone(),
        ));

        Ok(TurnHandle {
            conversation_id,
            cancel,
            task,
        })
    }

    /// Messages of the active conversation.
    pub async fn messages(&self) -> Vec<Message> {
        self.shared.state.read().await.snapshot().messages
    }

    /// Messages of any conversation.
    pub async fn conversation(&self, conversation_id: &ConversationId) -> Vec<Message> {
        self.shared.state.read().await.store.messages(conversation_id).to_vec()
    }

    /// Every conversation entry.
    pub async fn conversations(&self) -> HashMap<ConversationId, Vec<Message>> {
        self.shared.state.read().await.store.entries().clone()
    }

    /// The active conversation id.
    pub async fn active_conversation(&self) -> ConversationId {
        self.shared.state.read().await.active.clone()
    }

    /// Whether a turn is streaming into the conversation.
    pub async fn is_streaming(&self, conversation_id: &ConversationId) -> bool {
        self.shared.state.read().await.streaming.contains(conversation_id)
    }

    /// Watch the active conversation. A new snapshot is published on every
    /// change, including each streamed delta.
    pub fn subscribe(&self) -> watch::Receiver<ConversationSnapshot> {
        self.shared.snapshots.subscribe()
    }
}
