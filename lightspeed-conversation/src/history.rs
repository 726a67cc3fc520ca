//! Conversion of persisted history records into display messages.

use lightspeed_types::{HistoryRecord, Message};

use crate::config::ConversationConfig;

/// Turn alternating human/assistant records into user/assistant message pairs.
///
/// The assistant name falls back to the configured model when the record
/// has none. A trailing human record without a reply is paired with an empty,
/// non-loading assistant message so the list stays pair-aligned.
pub fn messages_from_history(records: &[HistoryRecord], config: &ConversationConfig) -> Vec<Message> {
    let mut messages = Vec::with_capacity(records.len() + records.len() % 2);

    for pair in records.chunks(2) {
        let human = &pair[0];
        messages.push(Message::user(
            config.user_name.clone(),
            config.user_avatar.clone(),
            human.content.clone(),
            human.timestamp,
        ));

        let reply = pair.get(1).cloned().unwrap_or_default();
        messages.push(Message::assistant(
            reply.model.unwrap_or_else(|| config.model.clone()),
            config.assistant_avatar.clone(),
            reply.content,
            reply.timestamp,
        ));
    }

    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use lightspeed_types::Role;

    fn record(content: &str, model: Option<&str>, secs: i64) -> HistoryRecord {
        HistoryRecord {
            content: content.into(),
            timestamp: DateTime::from_timestamp(secs, 0),
            model: model.map(str::to_string),
        }
    }

    fn config() -> ConversationConfig {
        ConversationConfig::new("selected-model")
            .user_name("guest")
            .user_avatar("me.png")
            .assistant_avatar("bot.png")
    }

    #[test]
    fn pairs_become_user_and_assistant_messages() {
        let records = vec![
            record("hi", None, 10),
            record("hello!", Some("granite"), 11),
            record("how are you?", None, 20),
            record("fine", Some("granite"), 21),
        ];
        let messages = messages_from_history(&records, &config());

        assert_eq!(messages.len(), 4);
        let roles: Vec<_> = messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User, Role::Assistant]);
        assert_eq!(messages[0].name.as_deref(), Some("guest"));
        assert_eq!(messages[0].avatar, "me.png");
        assert_eq!(messages[1].name.as_deref(), Some("granite"));
        assert_eq!(messages[1].avatar, "bot.png");
        assert_eq!(messages[3].content, "fine");
        assert_eq!(messages[2].timestamp.map(|t| t.timestamp()), Some(20));
        assert!(messages.iter().all(|m| !m.is_loading));
    }

    #[test]
    fn missing_model_falls_back_to_selected_model() {
        let messages = messages_from_history(&[record("q", None, 1), record("a", None, 2)], &config());
        assert_eq!(messages[1].name.as_deref(), Some("selected-model"));
    }

    #[test]
    fn unpaired_trailing_record_gets_empty_reply() {
        let messages = messages_from_history(&[record("dangling", None, 1)], &config());
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "dangling");
        assert_eq!(messages[1].role, Role::Assistant);
        assert!(messages[1].content.is_empty());
        assert!(!messages[1].is_loading);
    }

    #[test]
    fn empty_history_is_empty() {
        assert!(messages_from_history(&[], &config()).is_empty());
    }
}
