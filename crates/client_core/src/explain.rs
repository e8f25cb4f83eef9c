//! Explanation Streamer: asks a chat-completion service to describe a record
//! and hands back its answer fragment by fragment.

use async_trait::async_trait;
use futures::stream::BoxStream;
use reqwest::{header, Client};
use shared::{
    protocol::{ChatCompletionRequest, ChatMessage, ChatRole},
    record::TransactionRecord,
};
use tracing::{debug, warn};

use crate::{error::ExplainError, sse::decode_event_stream};

/// Lazy, single-pass sequence of explanation fragments in arrival order.
pub type FragmentStream = BoxStream<'static, Result<String, ExplainError>>;

#[async_trait]
pub trait ExplanationSource: Send + Sync {
    /// Opens the stream. Fails before yielding anything if the service refuses
    /// the request.
    async fn stream_explanation(
        &self,
        record: &TransactionRecord,
    ) -> Result<FragmentStream, ExplainError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatSettings {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

pub struct ChatExplainer {
    http: Client,
    settings: ChatSettings,
}

impl ChatExplainer {
    pub fn new(settings: ChatSettings) -> Self {
        Self::with_client(Client::new(), settings)
    }

    pub fn with_client(http: Client, settings: ChatSettings) -> Self {
        Self { http, settings }
    }
}

#[async_trait]
impl ExplanationSource for ChatExplainer {
    async fn stream_explanation(
        &self,
        record: &TransactionRecord,
    ) -> Result<FragmentStream, ExplainError> {
        let request = ChatCompletionRequest {
            model: &self.settings.model,
            messages: vec![ChatMessage {
                role: ChatRole::User,
                content: build_prompt(record),
            }],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
            stream: true,
        };

        debug!(model = %self.settings.model, digest = ?record.digest(), "requesting explanation");
        let res = self
            .http
            .post(&self.settings.api_url)
            .bearer_auth(&self.settings.api_key)
            .header(header::ACCEPT, "text/event-stream")
            .json(&request)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "explanation service rejected request");
            return Err(ExplainError::remote(
                Some(status.as_u16()),
                format!("explanation service error: {}", body.trim()),
            ));
        }

        Ok(decode_event_stream(res.bytes_stream()))
    }
}

/// The single user message sent to the model: answer layout, then the record.
pub fn build_prompt(record: &TransactionRecord) -> String {
    let json = serde_json::to_string_pretty(record.as_value())
        .unwrap_or_else(|_| record.as_value().to_string());
    format!(
        r#"You are a Sui blockchain expert. Explain this transaction in simple, plain English for a non-technical user.

Use this exact Markdown structure:

### Summary
One-sentence summary (e.g., "You swapped 12 SUI for 450 USDC on Cetus")

### Key Actions
- Bullet points of transfers, mints, burns, etc.

### Gas Fee
How much SUI was used for gas

### Under the Hood
Package + function called (e.g., Cetus::swap, DeepBook::place_limit_order)

Transaction JSON:
```json
{json}
```"#
    )
}

#[cfg(test)]
#[path = "tests/explain_tests.rs"]
mod tests;
