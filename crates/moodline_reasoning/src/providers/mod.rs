pub mod chat_completions;
pub mod mock;

pub use chat_completions::ChatCompletionsClient;
pub use mock::{Scripted, ScriptedProvider};

use crate::llm::LlmClient;
use anyhow::{Context, Result};
use moodline_core::config::LlmConfig;
use std::sync::Arc;

/// Build the process-wide model client from config. Called once at startup;
/// the returned client is shared by every invocation.
pub fn from_config(config: &LlmConfig) -> Result<Arc<dyn LlmClient>> {
    let name = match config.provider.as_str() {
        "mistral" => "Mistral",
        "openai" => "OpenAI",
        other => anyhow::bail!("Unknown LLM provider '{}'", other),
    };
    let api_key = config
        .api_key
        .as_deref()
        .filter(|k| !k.is_empty())
        .with_context(|| format!("No API key configured for provider '{}'", config.provider))?;

    let client =
        ChatCompletionsClient::new(name, &config.resolved_base_url(), api_key, &config.model)?;
    tracing::info!("{} client ready (model {})", name, client.model());
    Ok(Arc::new(client))
}
