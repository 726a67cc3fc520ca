#![deny(missing_docs)]
//! HTTP client for the lightspeed backend.
//!
//! [`LightspeedClient`] implements [`lightspeed_types::ConversationApi`]:
//! history is read from `GET {base}/conversations/{id}` and prompts are sent
//! to `POST {base}/v1/query`, whose response body is streamed back as raw
//! bytes for the conversation reducer to decode.

mod client;
mod error;
pub mod mapping;

pub use client::LightspeedClient;
