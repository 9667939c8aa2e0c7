//! Chat-completions HTTP client, shared by Mistral and OpenAI-compatible APIs.

use crate::api_types::{Message, MessagesResponse, Role, Usage};
use crate::llm::{CompletionParams, LlmClient};
use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ChatCompletionsClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    /// Provider name used in logs and error messages.
    name: &'static str,
}

impl ChatCompletionsClient {
    pub fn new(name: &'static str, base_url: &str, api_key: &str, model: &str) -> Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(60))
                .build()?,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            name,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_payload(&self, system: &str, messages: Vec<Message>, params: &CompletionParams) -> Value {
        let mut chat = Vec::with_capacity(messages.len() + 1);
        chat.push(Message {
            role: Role::System,
            content: system.to_string(),
        });
        chat.extend(messages);

        let mut payload = json!({
            "model": self.model,
            "messages": chat,
            "temperature": params.temperature,
            "max_tokens": params.max_tokens,
        });
        if params.json_response {
            payload["response_format"] = json!({ "type": "json_object" });
        }
        payload
    }
}

/// Pull the first choice out of a chat-completions body.
///
/// `message.content` is either a plain string or, on newer Mistral models, a
/// list of `{type: "text", text}` chunks.
pub(crate) fn parse_completion(body: &Value) -> MessagesResponse {
    let choice = &body["choices"][0];
    let message = &choice["message"];

    let content = match &message["content"] {
        Value::String(s) => Some(s.clone()),
        Value::Array(chunks) => {
            let joined = chunks
                .iter()
                .filter_map(|c| c["text"].as_str())
                .collect::<Vec<_>>()
                .join("");
            Some(joined)
        }
        _ => None,
    }
    .filter(|s| !s.is_empty());

    let usage = body
        .get("usage")
        .and_then(|u| serde_json::from_value::<Usage>(u.clone()).ok());

    MessagesResponse {
        content,
        stop_reason: choice["finish_reason"].as_str().map(|s| s.to_string()),
        usage,
    }
}

#[async_trait::async_trait]
impl LlmClient for ChatCompletionsClient {
    async fn complete(
        &self,
        system: &str,
        messages: Vec<Message>,
        params: CompletionParams,
    ) -> Result<MessagesResponse> {
        let payload = self.build_payload(system, messages, &params);
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", self.name))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("{} API Error ({}): {}", self.name, status, error_text);
        }

        let body: Value = response
            .json()
            .await
            .with_context(|| format!("{} returned a non-JSON body", self.name))?;
        let parsed = parse_completion(&body);

        if let Some(usage) = &parsed.usage {
            tracing::debug!(
                "{} usage: {} prompt + {} completion tokens",
                self.name,
                usage.prompt_tokens,
                usage.completion_tokens
            );
        }
        Ok(parsed)
    }
}
