use crate::emotion::Emotion;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Progress marker clients observe on an entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    #[default]
    Unset,
    Completed,
    Failed,
}

impl AnalysisStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisStatus::Unset => "unset",
            AnalysisStatus::Completed => "completed",
            AnalysisStatus::Failed => "failed",
        }
    }

    pub fn from_db(value: Option<&str>) -> Self {
        match value {
            Some("completed") => AnalysisStatus::Completed,
            Some("failed") => AnalysisStatus::Failed,
            _ => AnalysisStatus::Unset,
        }
    }
}

/// A mood journal entry as stored by the app.
///
/// `text` and `user_id` are written by the app; the analysis fields are only
/// ever written by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodEntry {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub text: Option<String>,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion: Option<Emotion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<String>>,
    #[serde(default)]
    pub analysis_status: AnalysisStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzed_at: Option<DateTime<Utc>>,
}

impl MoodEntry {
    /// A freshly written entry with no analysis fields.
    pub fn new(id: impl Into<String>, user_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: Some(text.into()),
            user_id: user_id.into(),
            emotion: None,
            confidence_score: None,
            recommendations: None,
            analysis_status: AnalysisStatus::Unset,
            analyzed_at: None,
        }
    }

    /// Entry text if present and not blank.
    pub fn analyzable_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.trim().is_empty())
    }
}

/// Partial-field write applied to one entry in a single atomic update.
/// `analyzed_at` is stamped by the store.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisUpdate {
    Completed {
        emotion: Emotion,
        confidence_score: f64,
        recommendations: Vec<String>,
    },
    Failed,
}

impl AnalysisUpdate {
    pub fn status(&self) -> AnalysisStatus {
        match self {
            AnalysisUpdate::Completed { .. } => AnalysisStatus::Completed,
            AnalysisUpdate::Failed => AnalysisStatus::Failed,
        }
    }
}
