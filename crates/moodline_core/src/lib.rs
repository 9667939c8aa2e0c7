pub mod catalog;
pub mod config;
pub mod emotion;
pub mod entry;
pub mod support;

pub use catalog::{advice_for, advice_for_label, fallback_recommendations, GENERIC_ADVICE};
pub use config::MoodlineConfig;
pub use emotion::Emotion;
pub use entry::{AnalysisStatus, AnalysisUpdate, MoodEntry};
pub use support::{ChatMessage, SupportRequest, UserProfile};

use async_trait::async_trait;

/// Authenticated caller identity, as vouched for by the auth system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub uid: String,
}

impl Principal {
    pub fn new(uid: impl Into<String>) -> Self {
        Self { uid: uid.into() }
    }
}

/// Durable home of mood entries.
#[async_trait]
pub trait EntryStore: Send + Sync {
    async fn get_entry(&self, id: &str) -> anyhow::Result<Option<MoodEntry>>;

    /// Overwrite the analysis fields of one entry and stamp `analyzed_at`
    /// with the store's clock. Last writer wins.
    async fn update_analysis(&self, id: &str, update: AnalysisUpdate) -> anyhow::Result<()>;
}

/// Lookup of push recipients.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn get_user(&self, id: &str) -> anyhow::Result<Option<UserProfile>>;

    /// Ids of counsellors currently marked available.
    async fn available_counsellors(&self) -> anyhow::Result<Vec<String>>;
}

/// Maps a bearer credential to a caller. `None` means unauthenticated.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, token: &str) -> Option<Principal>;
}
