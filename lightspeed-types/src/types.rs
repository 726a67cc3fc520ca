//! Core message and conversation types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque key identifying a conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    /// Wrap a raw conversation identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier is empty (no conversation selected yet).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConversationId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ConversationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Unique identifier of a single message, assigned at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    /// Generate a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The human asking questions.
    User,
    /// The model answering them.
    Assistant,
}

/// A display-ready chat message.
///
/// An assistant message is either fully materialized (`is_loading == false`)
/// or a live placeholder that is still receiving content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Stable identifier for this message.
    pub id: MessageId,
    /// Author role.
    pub role: Role,
    /// Author display name (user name or model name).
    pub name: Option<String>,
    /// Avatar reference (URL or asset path).
    pub avatar: String,
    /// Text content.
    pub content: String,
    /// When the message was authored, if known.
    pub timestamp: Option<DateTime<Utc>>,
    /// Whether the message is a placeholder still waiting for content.
    pub is_loading: bool,
}

impl Message {
    /// Build a user-authored message.
    pub fn user(
        name: Option<String>,
        avatar: impl Into<String>,
        content: impl Into<String>,
        timestamp: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: MessageId::new(),
            role: Role::User,
            name,
            avatar: avatar.into(),
            content: content.into(),
            timestamp,
            is_loading: false,
        }
    }

    /// Build a fully materialized assistant message.
    pub fn assistant(
        model: impl Into<String>,
        avatar: impl Into<String>,
        content: impl Into<String>,
        timestamp: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: MessageId::new(),
            role: Role::Assistant,
            name: Some(model.into()),
            avatar: avatar.into(),
            content: content.into(),
            timestamp,
            is_loading: false,
        }
    }

    /// Build an empty, loading assistant placeholder for a new turn.
    pub fn placeholder(model: impl Into<String>, avatar: impl Into<String>) -> Self {
        Self {
            is_loading: true,
            ..Self::assistant(model, avatar, String::new(), None)
        }
    }
}

/// One message decoded from persisted conversation history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Message text.
    pub content: String,
    /// When the message was created, if the store recorded it.
    pub timestamp: Option<DateTime<Utc>>,
    /// Model that produced the message (assistant records only).
    pub model: Option<String>,
}

/// A prompt submission sent to the completion service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateMessageRequest {
    /// Conversation the turn belongs to.
    pub conversation_id: ConversationId,
    /// Model selected by the user.
    pub model: String,
    /// The prompt text.
    pub prompt: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_is_loading_and_empty() {
        let msg = Message::placeholder("granite", "logo.svg");
        assert_eq!(msg.role, Role::Assistant);
        assert!(msg.is_loading);
        assert!(msg.content.is_empty());
        assert!(msg.timestamp.is_none());
        assert_eq!(msg.name.as_deref(), Some("granite"));
    }

    #[test]
    fn each_message_gets_its_own_id() {
        let a = Message::user(None, "a.png", "hi", None);
        let b = Message::user(None, "a.png", "hi", None);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn conversation_id_round_trips_as_plain_string() {
        let id = ConversationId::new("user:default/guest+abc");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"user:default/guest+abc\"");
        assert_eq!(id.to_string(), "user:default/guest+abc");
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
    }
}
