#![deny(missing_docs)]
//! # lightspeed: umbrella crate
//!
//! Single import surface for the lightspeed conversation core. The HTTP
//! client is behind the default `client` feature; disable it to bring your
//! own [`ConversationApi`](lightspeed_types::ConversationApi).

#[cfg(feature = "client")]
pub use lightspeed_client;
pub use lightspeed_conversation;
pub use lightspeed_stream;
pub use lightspeed_types;

/// Happy-path imports for driving a conversation.
pub mod prelude {
    pub use lightspeed_conversation::{
        ConversationConfig, ConversationError, ConversationReducer, ConversationSnapshot,
        TurnHandle, TurnObserver, TurnOutcome, TurnStatus,
    };
    pub use lightspeed_types::{
        ApiError, ConversationApi, ConversationId, CreateMessageRequest, HistoryRecord, Message,
        Role,
    };

    #[cfg(feature = "client")]
    pub use lightspeed_client::LightspeedClient;
}
