//! Emotion classification: one model call, then validation of whatever came
//! back against the closed taxonomy.

use crate::api_types::Message;
use crate::error::AnalysisError;
use crate::llm::{CompletionParams, LlmClient};
use crate::prompts::{classifier_prompt, CLASSIFIER_SYSTEM_PROMPT};
use crate::response::parse_json_object;
use moodline_core::Emotion;
use serde::Serialize;
use serde_json::{Map, Value};

/// Confidence used when the model omits one or answers outside the taxonomy.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// A validated classification. `emotion` is always a taxonomy member and
/// `confidence_score` is always within [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub emotion: Emotion,
    pub confidence_score: f64,
}

impl Classification {
    /// Result for a label outside the taxonomy.
    pub fn catch_all() -> Self {
        Self {
            emotion: Emotion::CATCH_ALL,
            confidence_score: DEFAULT_CONFIDENCE,
        }
    }
}

fn classifier_params() -> CompletionParams {
    CompletionParams {
        max_tokens: 200,
        temperature: 0.3,
        json_response: true,
    }
}

/// Coerce whatever the model put in `confidence` into [0, 1].
///
/// Numbers are clamped. Numeric strings are accepted. Anything else,
/// including a missing field, becomes [`DEFAULT_CONFIDENCE`].
pub fn normalize_confidence(raw: Option<&Value>) -> f64 {
    let value = match raw {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match value {
        Some(v) if v.is_finite() => v.clamp(0.0, 1.0),
        _ => DEFAULT_CONFIDENCE,
    }
}

/// Validate a parsed classifier object.
pub fn normalize_classification(raw: &Map<String, Value>) -> Result<Classification, AnalysisError> {
    let label = raw
        .get("emotion")
        .and_then(Value::as_str)
        .ok_or(AnalysisError::MissingEmotion)?;

    let Some(emotion) = Emotion::from_label(label) else {
        tracing::warn!(
            "Classifier returned unexpected emotion '{}', defaulting to \"{}\"",
            label,
            Emotion::CATCH_ALL
        );
        return Ok(Classification::catch_all());
    };

    let confidence_score = normalize_confidence(raw.get("confidence"));
    tracing::info!("Classifier analysis: {} ({})", emotion, confidence_score);
    if let Some(reasoning) = raw.get("reasoning").and_then(Value::as_str) {
        tracing::debug!("Classifier reasoning: {}", reasoning);
    }

    Ok(Classification {
        emotion,
        confidence_score,
    })
}

/// Ask the model for the dominant emotion of `entry_text`.
///
/// Transport and parse failures propagate; there is no retry here.
pub async fn classify_entry(
    client: &dyn LlmClient,
    entry_text: &str,
) -> Result<Classification, AnalysisError> {
    if entry_text.trim().is_empty() {
        return Err(AnalysisError::EmptyText);
    }

    let response = client
        .complete(
            CLASSIFIER_SYSTEM_PROMPT,
            vec![Message::user(classifier_prompt(entry_text))],
            classifier_params(),
        )
        .await
        .map_err(AnalysisError::Transport)?;

    let content = response.content.ok_or(AnalysisError::EmptyResponse)?;
    let raw = parse_json_object(&content)
        .ok_or_else(|| AnalysisError::Unparsable(truncate(&content, 200)))?;

    normalize_classification(&raw)
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
