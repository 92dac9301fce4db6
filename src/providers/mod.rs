//! Chat completion providers

pub mod openai;

// Re-export for convenience
pub use openai::OpenAiClient;

use async_trait::async_trait;

/// A remote model that answers a conversation.
///
/// Implementations should return promptly with the context's error once
/// `ctx` is done; the core never retries on their behalf.
#[async_trait]
pub trait PromptService: Send + Sync
{   async fn prompt(
      &self
    , ctx: &crate::context::Context
    , messages: &[crate::request::Message]
    , options: &crate::request::ServiceOptions
    ) -> Result<crate::request::Response, crate::error::Error>;
}
