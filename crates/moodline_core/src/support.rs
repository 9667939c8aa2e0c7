//! Peer-support records that trigger push notifications.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportRequest {
    pub user_id: String,
    /// Unassigned requests go out to every available counsellor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counsellor_id: Option<String>,
    #[serde(default)]
    pub status: String,
}

impl SupportRequest {
    pub const ACCEPTED: &'static str = "accepted";

    pub fn is_accepted(&self) -> bool {
        self.status == Self::ACCEPTED
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub sender_id: String,
    pub receiver_id: String,
    #[serde(default)]
    pub content: String,
}

/// Directory record for anyone who can receive a push.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub fcm_token: Option<String>,
}

impl UserProfile {
    /// Display name, or `fallback` when the profile has none.
    pub fn display_name<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(fallback)
    }

    pub fn push_token(&self) -> Option<&str> {
        self.fcm_token.as_deref().filter(|t| !t.is_empty())
    }
}
