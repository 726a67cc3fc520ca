//! Per-conversation message storage and the in-flight turn staging area.

use std::collections::HashMap;

use lightspeed_types::{ConversationId, Message};

/// Ordered message lists keyed by conversation.
///
/// Insertion order is chronological turn order.
#[derive(Debug, Default, Clone)]
pub struct ConversationStore {
    entries: HashMap<ConversationId, Vec<Message>>,
}

impl ConversationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages of a conversation; empty when it has no entry.
    pub fn messages(&self, id: &ConversationId) -> &[Message] {
        self.entries.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Whether the conversation has an entry.
    pub fn contains(&self, id: &ConversationId) -> bool {
        self.entries.contains_key(id)
    }

    /// Append messages to the end of a conversation, creating the entry if needed.
    pub fn append(&mut self, id: &ConversationId, messages: impl IntoIterator<Item = Message>) {
        self.entries.entry(id.clone()).or_default().extend(messages);
    }

    /// Replace a conversation's messages wholesale.
    pub fn replace(&mut self, id: &ConversationId, messages: Vec<Message>) {
        self.entries.insert(id.clone(), messages);
    }

    /// Replace the message with the same id, or append it when absent.
    pub fn upsert(&mut self, id: &ConversationId, message: &Message) {
        let entry = self.entries.entry(id.clone()).or_default();
        match entry.iter_mut().find(|m| m.id == message.id) {
            Some(existing) => existing.clone_from(message),
            None => entry.push(message.clone()),
        }
    }

    /// All entries.
    pub fn entries(&self) -> &HashMap<ConversationId, Vec<Message>> {
        &self.entries
    }
}

/// The user message and assistant placeholder of a turn that is still streaming.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamingTurn {
    /// The submitted prompt.
    pub user: Message,
    /// The assistant placeholder, updated as deltas arrive.
    pub assistant: Message,
}

impl StreamingTurn {
    /// Both messages in display order.
    pub fn messages(&self) -> [Message; 2] {
        [self.user.clone(), self.assistant.clone()]
    }
}

/// At most one in-flight turn per conversation.
///
/// Entries exist from submission until the turn completes, fails or is cancelled.
#[derive(Debug, Default)]
pub struct StreamingBuffer {
    turns: HashMap<ConversationId, StreamingTurn>,
}

impl StreamingBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a turn. Hands the turn back if the conversation already has one.
    pub fn begin(&mut self, id: &ConversationId, turn: StreamingTurn) -> Result<(), StreamingTurn> {
        if self.turns.contains_key(id) {
            return Err(turn);
        }
        self.turns.insert(id.clone(), turn);
        Ok(())
    }

    /// The in-flight turn of a conversation.
    pub fn get(&self, id: &ConversationId) -> Option<&StreamingTurn> {
        self.turns.get(id)
    }

    /// Mutable access to the in-flight turn of a conversation.
    pub fn get_mut(&mut self, id: &ConversationId) -> Option<&mut StreamingTurn> {
        self.turns.get_mut(id)
    }

    /// Whether a turn is in flight for the conversation.
    pub fn contains(&self, id: &ConversationId) -> bool {
        self.turns.contains_key(id)
    }

    /// End the conversation's turn, returning its final state.
    pub fn clear(&mut self, id: &ConversationId) -> Option<StreamingTurn> {
        self.turns.remove(id)
    }
}
