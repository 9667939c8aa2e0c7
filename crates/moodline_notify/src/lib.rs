pub mod handlers;
pub mod push;

pub use handlers::Notifier;
pub use push::{FcmSender, LogOnlySender, PushMessage, PushSender};

use moodline_core::config::PushConfig;
use std::sync::Arc;

/// Pick a sender for the configured push setup. Without a project id
/// pushes are only logged.
pub fn sender_from_config(config: &PushConfig) -> anyhow::Result<Arc<dyn PushSender>> {
    match (&config.project_id, &config.access_token) {
        (Some(project), Some(token)) => {
            let endpoint = config
                .endpoint
                .as_deref()
                .unwrap_or(push::FCM_ENDPOINT);
            Ok(Arc::new(FcmSender::new(endpoint, project, token)?))
        }
        (Some(_), None) => anyhow::bail!("push.project_id is set but push.access_token is missing"),
        (None, _) => {
            tracing::warn!("No push project configured, notifications will only be logged");
            Ok(Arc::new(LogOnlySender))
        }
    }
}
