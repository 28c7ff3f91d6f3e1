//! External chat-completion provider.
//!
//! The concrete provider sits behind a capability trait so endpoint logic
//! never names it; tests substitute a canned implementation.

use std::time::Duration;

use async_trait::async_trait;
use genai::chat::{ChatMessage as ProviderMessage, ChatRequest};
use genai::Client as GenAiClient;
use tracing::info;

use crate::models::{ChatMessage, Role};

/// One prompt turn handed to the provider: role and content only.
#[derive(Debug, Clone)]
pub struct PromptMessage {
    pub role: Role,
    pub content: String,
}

impl From<&ChatMessage> for PromptMessage {
    fn from(msg: &ChatMessage) -> Self {
        Self {
            role: msg.role,
            content: msg.content.clone(),
        }
    }
}

/// Produces the assistant reply for an ordered message history.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, history: &[PromptMessage]) -> anyhow::Result<String>;
}

/// Provider backed by the genai client.
pub struct GenAiProvider {
    client: GenAiClient,
    model: String,
    timeout: Duration,
}

impl GenAiProvider {
    pub fn new(model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: GenAiClient::default(),
            model: model.into(),
            timeout,
        }
    }
}

#[async_trait]
impl CompletionProvider for GenAiProvider {
    async fn complete(&self, history: &[PromptMessage]) -> anyhow::Result<String> {
        let messages: Vec<ProviderMessage> = history
            .iter()
            .map(|m| match m.role {
                Role::User => ProviderMessage::user(m.content.clone()),
                Role::Assistant => ProviderMessage::assistant(m.content.clone()),
            })
            .collect();

        let chat_req = ChatRequest::new(messages);

        info!("[AI] Calling {} with {} turns", self.model, history.len());

        let response = tokio::time::timeout(
            self.timeout,
            self.client.exec_chat(&self.model, chat_req, None),
        )
        .await
        .map_err(|_| anyhow::anyhow!("completion timed out after {:?}", self.timeout))?
        .map_err(|e| anyhow::anyhow!("GenAI error: {}", e))?;

        let text = response
            .first_text()
            .ok_or_else(|| anyhow::anyhow!("provider returned no message"))?
            .to_string();

        Ok(text)
    }
}
