//! Mood analysis pipeline: classify → recommend → persist.
//!
//! Two entry points share the same stages:
//! - [`MoodPipeline::on_entry_created`], run once per new entry by the trigger
//!   source, which redelivers on error (at-least-once);
//! - [`MoodPipeline::retry`], called on demand by the entry's owner.
//!
//! Re-running either recomputes every analysis field and overwrites it, so a
//! duplicate delivery only costs a duplicate model call.

use crate::classify::{classify_entry, Classification};
use crate::error::{AnalysisError, PipelineError};
use crate::llm::LlmClient;
use crate::recommend::{generate_recommendations, Recommendations};
use moodline_core::{AnalysisUpdate, Emotion, EntryStore, MoodEntry, Principal};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    pub classification: Classification,
    pub recommendations: Recommendations,
}

impl AnalysisOutcome {
    fn to_update(&self) -> AnalysisUpdate {
        AnalysisUpdate::Completed {
            emotion: self.classification.emotion,
            confidence_score: self.classification.confidence_score,
            recommendations: self.recommendations.items.clone(),
        }
    }
}

/// Body returned to a successful retry caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryResponse {
    pub success: bool,
    pub emotion: Emotion,
    pub confidence_score: f64,
    pub recommendations: Vec<String>,
}

impl From<AnalysisOutcome> for RetryResponse {
    fn from(outcome: AnalysisOutcome) -> Self {
        Self {
            success: true,
            emotion: outcome.classification.emotion,
            confidence_score: outcome.classification.confidence_score,
            recommendations: outcome.recommendations.into_items(),
        }
    }
}

#[derive(Clone)]
pub struct MoodPipeline {
    llm: Arc<dyn LlmClient>,
    store: Arc<dyn EntryStore>,
}

impl MoodPipeline {
    pub fn new(llm: Arc<dyn LlmClient>, store: Arc<dyn EntryStore>) -> Self {
        Self { llm, store }
    }

    /// Classification is required; recommendations degrade to the catalog.
    async fn analyze(&self, text: &str) -> Result<AnalysisOutcome, AnalysisError> {
        let classification = classify_entry(self.llm.as_ref(), text).await?;
        let generated =
            generate_recommendations(self.llm.as_ref(), classification.emotion, text).await;
        Ok(AnalysisOutcome {
            classification,
            recommendations: Recommendations::generated_or_fallback(
                generated,
                classification.emotion,
            ),
        })
    }

    async fn analyze_and_persist(
        &self,
        entry_id: &str,
        text: &str,
    ) -> Result<AnalysisOutcome, PipelineError> {
        let outcome = self.analyze(text).await?;
        self.store
            .update_analysis(entry_id, outcome.to_update())
            .await
            .map_err(PipelineError::Persistence)?;
        Ok(outcome)
    }

    /// Best effort: a failure here is logged and goes no further.
    async fn mark_failed(&self, entry_id: &str) {
        if let Err(e) = self.store.update_analysis(entry_id, AnalysisUpdate::Failed).await {
            tracing::error!("Failed to update entry status for {}: {:#}", entry_id, e);
        }
    }

    /// Reactive path: analyze a newly created entry.
    ///
    /// On any failure past validation the entry is marked `failed` and the
    /// error is returned so the trigger source can redeliver.
    pub async fn on_entry_created(
        &self,
        entry_id: &str,
        entry: &MoodEntry,
    ) -> Result<AnalysisOutcome, PipelineError> {
        if entry_id.is_empty() {
            return Err(PipelineError::invalid_argument("Entry ID is required"));
        }
        let Some(text) = entry.analyzable_text() else {
            tracing::warn!("Mood entry {} has no text to analyze", entry_id);
            return Err(PipelineError::invalid_argument("Mood entry has no text to analyze"));
        };

        tracing::info!("Analyzing mood entry: {}", entry_id);
        match self.analyze_and_persist(entry_id, text).await {
            Ok(outcome) => {
                tracing::info!(
                    "Successfully analyzed mood entry {}: {} ({})",
                    entry_id,
                    outcome.classification.emotion,
                    outcome.classification.confidence_score
                );
                Ok(outcome)
            }
            Err(e) => {
                tracing::error!("Error analyzing mood entry {}: {}", entry_id, e);
                self.mark_failed(entry_id).await;
                Err(e)
            }
        }
    }

    /// Retry path: re-run analysis for an entry on behalf of its owner.
    ///
    /// Preconditions are checked in order and fail before any model call or
    /// write. A classifier failure here leaves the stored status untouched.
    pub async fn retry(
        &self,
        caller: Option<&Principal>,
        entry_id: Option<&str>,
    ) -> Result<RetryResponse, PipelineError> {
        let caller =
            caller.ok_or_else(|| PipelineError::unauthenticated("User must be authenticated"))?;
        let entry_id = entry_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| PipelineError::invalid_argument("Entry ID is required"))?;

        let entry = self
            .store
            .get_entry(entry_id)
            .await
            .map_err(PipelineError::Persistence)?
            .ok_or_else(|| PipelineError::not_found("Mood entry not found"))?;

        if entry.user_id != caller.uid {
            return Err(PipelineError::permission_denied(
                "You do not have permission to retry this analysis",
            ));
        }
        let text = entry
            .analyzable_text()
            .ok_or_else(|| PipelineError::invalid_argument("Mood entry has no text to analyze"))?;

        tracing::info!("Retrying analysis for mood entry {} (user {})", entry_id, caller.uid);
        self.analyze_and_persist(entry_id, text)
            .await
            .map(RetryResponse::from)
            .map_err(|e| {
                tracing::error!("Error retrying analysis for {}: {}", entry_id, e);
                e
            })
    }
}
