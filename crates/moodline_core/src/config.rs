use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

// ============================================================================
// Top-level config
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MoodlineConfig {
    pub llm: LlmConfig,
    pub store: StoreConfig,
    pub gateway: GatewayConfig,
    pub push: PushConfig,
    pub auth: AuthConfig,
}

impl MoodlineConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    /// After loading, env var overrides are applied.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let mut config: MoodlineConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML config")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Try to load from path; if file doesn't exist, return defaults with env overrides.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::info!("Config file not found or invalid ({}), using defaults", e);
                let mut cfg = Self::default();
                cfg.apply_env_overrides();
                cfg
            }
        }
    }

    /// Apply environment variable overrides on top of file-based config.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("LLM_PROVIDER") {
            self.llm.provider = v;
        }
        if let Ok(v) = std::env::var("LLM_MODEL") {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("LLM_BASE_URL") {
            self.llm.base_url = Some(v);
        }
        let key_var = match self.llm.provider.as_str() {
            "openai" => "OPENAI_API_KEY",
            _ => "MISTRAL_API_KEY",
        };
        if let Ok(v) = std::env::var(key_var) {
            self.llm.api_key = Some(v);
        }
        if let Ok(v) = std::env::var("MOODLINE_DB") {
            self.store.db_path = v;
        }
        if let Ok(v) = std::env::var("MOODLINE_HOST") {
            self.gateway.host = v;
        }
        if let Ok(v) = std::env::var("MOODLINE_PORT") {
            if let Ok(n) = v.parse() {
                self.gateway.port = n;
            }
        }
        if let Ok(v) = std::env::var("FCM_PROJECT_ID") {
            self.push.project_id = Some(v);
        }
        if let Ok(v) = std::env::var("FCM_ACCESS_TOKEN") {
            self.push.access_token = Some(v);
        }
    }
}

// ============================================================================
// Sub-configs
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// `mistral` or `openai`; both speak the chat-completions protocol.
    pub provider: String,
    pub model: String,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "mistral".to_string(),
            model: "mistral-small-latest".to_string(),
            base_url: None,
            api_key: None,
        }
    }
}

impl LlmConfig {
    pub fn resolved_base_url(&self) -> String {
        let url = match (&self.base_url, self.provider.as_str()) {
            (Some(url), _) => url.as_str(),
            (None, "openai") => "https://api.openai.com/v1",
            (None, _) => "https://api.mistral.ai/v1",
        };
        url.trim_end_matches('/').to_string()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub db_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: "moodline.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8787,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PushConfig {
    /// Firebase project; without it pushes are only logged.
    pub project_id: Option<String>,
    /// OAuth2 bearer token for the FCM HTTP v1 API.
    pub access_token: Option<String>,
    /// Override of `https://fcm.googleapis.com`, used by tests.
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Bearer token -> user id.
    pub tokens: HashMap<String, String>,
}

// ============================================================================
// Tests
// ============================================================================
