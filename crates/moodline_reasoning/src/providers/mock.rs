//! Scripted LLM provider: deterministic responses for tests and offline runs.

use crate::api_types::{Message, MessagesResponse};
use crate::llm::{CompletionParams, LlmClient};
use anyhow::Result;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum Scripted {
    Text(String),
    /// Completion with no text, as an API returns for an empty choice.
    Empty,
    /// Transport-level failure.
    Fail(String),
}

/// Pops one scripted reply per `complete()` call.
///
/// With `repeat` set, the script is replayed from the start once exhausted,
/// which makes the provider usable for idempotence checks.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    script: Vec<Scripted>,
    queue: Mutex<VecDeque<Scripted>>,
    repeat: bool,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Scripted>) -> Self {
        Self {
            queue: Mutex::new(script.iter().cloned().collect()),
            script,
            ..Default::default()
        }
    }

    pub fn repeating(script: Vec<Scripted>) -> Self {
        Self {
            repeat: true,
            ..Self::new(script)
        }
    }

    /// Shorthand for a sequence of successful text replies.
    pub fn with_texts(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Scripted::Text(t.to_string())).collect())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// User prompts received so far, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    fn next(&self) -> Option<Scripted> {
        let mut queue = self.queue.lock().ok()?;
        if queue.is_empty() && self.repeat {
            queue.extend(self.script.iter().cloned());
        }
        queue.pop_front()
    }
}

#[async_trait::async_trait]
impl LlmClient for ScriptedProvider {
    async fn complete(
        &self,
        _system: &str,
        messages: Vec<Message>,
        _params: CompletionParams,
    ) -> Result<MessagesResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.extend(messages.into_iter().map(|m| m.content));
        }
        match self.next() {
            Some(Scripted::Text(text)) => Ok(MessagesResponse::text(text)),
            Some(Scripted::Empty) => Ok(MessagesResponse::default()),
            Some(Scripted::Fail(reason)) => anyhow::bail!("{}", reason),
            None => anyhow::bail!("scripted provider exhausted"),
        }
    }
}
