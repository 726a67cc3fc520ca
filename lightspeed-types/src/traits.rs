//! The seam between the conversation core and the lightspeed backend.
//!
//! [`ConversationApi`] uses RPITIT (return-position `impl Trait` in traits)
//! and is NOT object-safe. Consumers are generic over it.

use std::future::Future;

use crate::error::ApiError;
use crate::stream::ByteStream;
use crate::types::{ConversationId, CreateMessageRequest, HistoryRecord};

/// Access to persisted history and the streaming completion endpoint.
pub trait ConversationApi: Send + Sync + 'static {
    /// Fetch the persisted messages of a conversation, oldest first.
    ///
    /// Records alternate human, assistant, human, assistant...
    fn conversation_messages(
        &self,
        conversation_id: &ConversationId,
    ) -> impl Future<Output = Result<Vec<HistoryRecord>, ApiError>> + Send;

    /// Submit a prompt and open the streamed response body.
    fn create_message(
        &self,
        request: CreateMessageRequest,
    ) -> impl Future<Output = Result<ByteStream, ApiError>> + Send;
}

impl<T: ConversationApi> ConversationApi for std::sync::Arc<T> {
    fn conversation_messages(
        &self,
        conversation_id: &ConversationId,
    ) -> impl Future<Output = Result<Vec<HistoryRecord>, ApiError>> + Send {
        (**self).conversation_messages(conversation_id)
    }

    fn create_message(
        &self,
        request: CreateMessageRequest,
    ) -> impl Future<Output = Result<ByteStream, ApiError>> + Send {
        (**self).create_message(request)
    }
}
