use async_trait::async_trait;
use moodline_core::config::AuthConfig;
use moodline_core::{Authenticator, Principal};
use std::collections::HashMap;

/// Fixed bearer-token table standing in for the external identity provider.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenAuth {
    tokens: HashMap<String, String>,
}

impl StaticTokenAuth {
    pub fn from_config(config: &AuthConfig) -> Self {
        if config.tokens.is_empty() {
            tracing::warn!("No auth tokens configured, every retry call will be unauthenticated");
        }
        Self {
            tokens: config.tokens.clone(),
        }
    }
}

#[async_trait]
impl Authenticator for StaticTokenAuth {
    async fn authenticate(&self, token: &str) -> Option<Principal> {
        self.tokens.get(token).map(Principal::new)
    }
}
