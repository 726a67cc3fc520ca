//! Configuration for the conversation reducer.

use std::time::Duration;

/// Avatar shown for user messages when none is configured.
pub const DEFAULT_USER_AVATAR: &str =
    "https://img.freepik.com/premium-photo/graphic-designer-digital-avatar-generative-ai_934475-9292.jpg";

/// Avatar shown for assistant messages when none is configured.
pub const DEFAULT_ASSISTANT_AVATAR: &str = "images/logo.svg";

/// Default bound on the wait for each stream read.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(120);

/// Static configuration for a [`ConversationReducer`](crate::ConversationReducer).
#[derive(Debug, Clone)]
pub struct ConversationConfig {
    /// Selected model. Sent with every prompt and displayed on assistant
    /// messages until the stream or history names a model.
    pub model: String,

    /// Display name of the current user, if known.
    pub user_name: Option<String>,

    /// Avatar for user messages.
    pub user_avatar: String,

    /// Avatar for assistant messages.
    pub assistant_avatar: String,

    /// Upper bound on opening the stream and on each subsequent read.
    /// `None` waits forever.
    pub read_timeout: Option<Duration>,
}

impl ConversationConfig {
    /// Configuration for the given model with default avatars and timeout.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    /// Set the current user's display name.
    #[must_use]
    pub fn user_name(mut self, name: impl Into<String>) -> Self {
        self.user_name = Some(name.into());
        self
    }

    /// Override the user avatar.
    #[must_use]
    pub fn user_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.user_avatar = avatar.into();
        self
    }

    /// Override the assistant avatar.
    #[must_use]
    pub fn assistant_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.assistant_avatar = avatar.into();
        self
    }

    /// Override the read timeout. `None` disables it.
    #[must_use]
    pub fn read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            model: String::new(),
            user_name: None,
            user_avatar: DEFAULT_USER_AVATAR.into(),
            assistant_avatar: DEFAULT_ASSISTANT_AVATAR.into(),
            read_timeout: Some(DEFAULT_READ_TIMEOUT),
        }
    }
}
