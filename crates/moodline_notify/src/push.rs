//! Push delivery. The push service is an external collaborator; this module
//! only shapes the request.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::time::Duration;

pub const FCM_ENDPOINT: &str = "https://fcm.googleapis.com";

#[derive(Debug, Clone, PartialEq)]
pub struct PushMessage {
    pub token: String,
    pub title: String,
    pub body: String,
    pub data: BTreeMap<String, String>,
}

impl PushMessage {
    pub fn new(token: &str, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            token: token.to_string(),
            title: title.into(),
            body: body.into(),
            data: BTreeMap::new(),
        }
    }

    pub fn with_data(mut self, key: &str, value: impl Into<String>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }

    /// FCM HTTP v1 message body. High Android priority and the default
    /// APNs sound with a badge of 1 on every push.
    pub fn to_fcm_json(&self) -> Value {
        json!({
            "message": {
                "token": self.token,
                "notification": {
                    "title": self.title,
                    "body": self.body,
                },
                "data": self.data,
                "android": { "priority": "high" },
                "apns": {
                    "payload": {
                        "aps": { "sound": "default", "badge": 1 }
                    }
                }
            }
        })
    }
}

#[async_trait]
pub trait PushSender: Send + Sync {
    async fn send_push(&self, message: &PushMessage) -> Result<()>;
}

/// Firebase Cloud Messaging HTTP v1 sender.
#[derive(Debug, Clone)]
pub struct FcmSender {
    client: Client,
    url: String,
    access_token: String,
}

impl FcmSender {
    pub fn new(endpoint: &str, project_id: &str, access_token: &str) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(30)).build()?,
            url: format!(
                "{}/v1/projects/{}/messages:send",
                endpoint.trim_end_matches('/'),
                project_id
            ),
            access_token: access_token.to_string(),
        })
    }
}

#[async_trait]
impl PushSender for FcmSender {
    async fn send_push(&self, message: &PushMessage) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.access_token)
            .json(&message.to_fcm_json())
            .send()
            .await
            .context("Failed to send request to FCM")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("FCM API Error ({}): {}", status, error_text);
        }
        Ok(())
    }
}

/// Logs pushes instead of delivering them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogOnlySender;

#[async_trait]
impl PushSender for LogOnlySender {
    async fn send_push(&self, message: &PushMessage) -> Result<()> {
        tracing::info!("[push disabled] {}: {}", message.title, message.body);
        Ok(())
    }
}
