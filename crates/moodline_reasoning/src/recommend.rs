//! Self-care recommendations: AI-generated when possible, canned otherwise.

use crate::api_types::Message;
use crate::error::RecommendationError;
use crate::llm::{CompletionParams, LlmClient};
use crate::prompts::{recommendation_prompt, RECOMMENDER_SYSTEM_PROMPT};
use crate::response::parse_json_object;
use moodline_core::{fallback_recommendations, Emotion};
use serde::Serialize;
use serde_json::Value;

/// Upper bound on stored recommendations.
pub const MAX_RECOMMENDATIONS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationSource {
    Generated,
    Fallback,
}

/// Recommendations ready to persist. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendations {
    pub items: Vec<String>,
    pub source: RecommendationSource,
}

impl Recommendations {
    pub fn fallback(emotion: Emotion) -> Self {
        Self {
            items: fallback_recommendations(emotion.as_str()),
            source: RecommendationSource::Fallback,
        }
    }

    /// Keep a generated list, or degrade to the catalog for `emotion`.
    pub fn generated_or_fallback(
        generated: Result<Vec<String>, RecommendationError>,
        emotion: Emotion,
    ) -> Self {
        match generated {
            Ok(items) => Self {
                items,
                source: RecommendationSource::Generated,
            },
            Err(e) => {
                tracing::warn!("Failed to generate AI recommendations, using fallback: {}", e);
                Self::fallback(emotion)
            }
        }
    }

    pub fn into_items(self) -> Vec<String> {
        self.items
    }
}

fn recommender_params() -> CompletionParams {
    CompletionParams {
        max_tokens: 300,
        temperature: 0.7,
        json_response: true,
    }
}

/// Validate the `recommendations` field of a parsed response.
pub fn parse_recommendations(raw: Option<&Value>) -> Result<Vec<String>, RecommendationError> {
    let list = match raw {
        Some(Value::Array(list)) => list,
        Some(other) => {
            return Err(RecommendationError::Malformed(format!(
                "expected a list, got {}",
                other
            )))
        }
        None => return Err(RecommendationError::Malformed("missing recommendations".into())),
    };

    let mut items = Vec::with_capacity(list.len());
    for item in list {
        match item.as_str().map(str::trim) {
            Some(text) if !text.is_empty() => items.push(text.to_string()),
            Some(_) => {}
            None => {
                return Err(RecommendationError::Malformed(format!(
                    "non-string recommendation {}",
                    item
                )))
            }
        }
    }

    if items.is_empty() {
        return Err(RecommendationError::Malformed("empty recommendations".into()));
    }
    items.truncate(MAX_RECOMMENDATIONS);
    Ok(items)
}

/// Ask the model for three tips tailored to `emotion` and the entry.
///
/// Performs no fallback itself; see [`Recommendations::generated_or_fallback`].
pub async fn generate_recommendations(
    client: &dyn LlmClient,
    emotion: Emotion,
    entry_text: &str,
) -> Result<Vec<String>, RecommendationError> {
    let response = client
        .complete(
            RECOMMENDER_SYSTEM_PROMPT,
            vec![Message::user(recommendation_prompt(emotion, entry_text))],
            recommender_params(),
        )
        .await
        .map_err(RecommendationError::Transport)?;

    let content = response.content.ok_or(RecommendationError::EmptyResponse)?;
    let raw = parse_json_object(&content)
        .ok_or_else(|| RecommendationError::Malformed("response is not a JSON object".into()))?;

    let items = parse_recommendations(raw.get("recommendations"))?;
    tracing::info!("Generated {} recommendations for {}", items.len(), emotion);
    Ok(items)
}
