//! Language-generation capability for dialogue.
//!
//! Agents run fully scripted when no responder is bound. A bound responder
//! replaces the canned lines with generated dialogue; every call site makes
//! exactly one attempt and falls back to its scripted line on failure.

use async_trait::async_trait;
use openai::{Message, OpenAi, Request};
use thiserror::Error;

/// Errors from a language responder.
#[derive(Debug, Error)]
pub enum ResponderError {
    #[error("language responder is not available")]
    Unavailable,

    #[error("generation failed: {0}")]
    Failed(String),
}

/// A text-generation capability.
///
/// `available` reports whether `generate` can be expected to succeed;
/// callers branch to scripted dialogue when it returns false.
#[async_trait]
pub trait Responder: Send + Sync {
    fn available(&self) -> bool;

    /// Produce text for the given prompts. One attempt, no retry.
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, ResponderError>;
}

/// Responder backed by the OpenAI Responses API.
pub struct OpenAiResponder {
    client: OpenAi,
}

impl OpenAiResponder {
    /// Build from the OPENAI_API_KEY environment variable.
    pub fn from_env(model: impl Into<String>) -> Result<Self, ResponderError> {
        let client = OpenAi::from_env().map_err(|_| ResponderError::Unavailable)?;
        Ok(Self {
            client: client.with_model(model),
        })
    }

    /// Wrap an already-configured client.
    pub fn new(client: OpenAi) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Responder for OpenAiResponder {
    fn available(&self) -> bool {
        true
    }

    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, ResponderError> {
        let request = Request::new(vec![
            Message::system(system_prompt),
            Message::user(user_prompt),
        ]);

        let response = self.client.complete(request).await.map_err(|e| match e {
            openai::Error::NoApiKey => ResponderError::Unavailable,
            other => ResponderError::Failed(other.to_string()),
        })?;

        Ok(response.text)
    }
}
