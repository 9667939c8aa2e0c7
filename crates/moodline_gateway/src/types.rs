//! Request bodies delivered by the trigger source and retry callers.

use moodline_core::{ChatMessage, MoodEntry, SupportRequest};
use serde::Deserialize;

/// `POST /triggers/mood-entries`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryCreated {
    #[serde(default)]
    pub entry_id: String,
    pub entry: MoodEntry,
}

/// `POST /rpc/retryMoodAnalysis`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryRequest {
    pub entry_id: Option<String>,
}

/// `POST /triggers/support-requests/created`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportRequestCreated {
    pub request_id: String,
    pub request: SupportRequest,
}

/// `POST /triggers/support-requests/updated`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportRequestUpdated {
    pub request_id: String,
    pub before: SupportRequest,
    pub after: SupportRequest,
}

/// `POST /triggers/messages/created`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageCreated {
    pub thread_id: String,
    #[serde(default)]
    pub message_id: Option<String>,
    pub message: ChatMessage,
}
