//! Push notifications for the peer-support flows.
//!
//! Every handler is fire-and-forget: failures are logged and swallowed, and
//! nothing is retried.

use crate::push::{PushMessage, PushSender};
use anyhow::Result;
use futures::future::join_all;
use moodline_core::{ChatMessage, SupportRequest, UserDirectory, UserProfile};
use std::sync::Arc;

/// Longest message excerpt shown in a push body, in characters.
pub const MESSAGE_PREVIEW_CHARS: usize = 100;

#[derive(Clone)]
pub struct Notifier {
    directory: Arc<dyn UserDirectory>,
    sender: Arc<dyn PushSender>,
}

impl Notifier {
    pub fn new(directory: Arc<dyn UserDirectory>, sender: Arc<dyn PushSender>) -> Self {
        Self { directory, sender }
    }

    async fn display_name(&self, user_id: &str, fallback: &str) -> String {
        match self.directory.get_user(user_id).await {
            Ok(Some(profile)) => profile.display_name(fallback).to_string(),
            Ok(None) => fallback.to_string(),
            Err(e) => {
                tracing::warn!("Failed to look up user {}: {:#}", user_id, e);
                fallback.to_string()
            }
        }
    }

    /// Profile with a usable push token, or `None` after logging why not.
    async fn recipient(&self, user_id: &str, role: &str) -> Result<Option<UserProfile>> {
        let Some(profile) = self.directory.get_user(user_id).await? else {
            tracing::warn!("{} {} not found", role, user_id);
            return Ok(None);
        };
        if profile.push_token().is_none() {
            tracing::warn!("No FCM token for {} {}", role.to_lowercase(), user_id);
            return Ok(None);
        }
        Ok(Some(profile))
    }

    /// New support request: notify the assigned counsellor, or every
    /// available counsellor when unassigned.
    pub async fn on_support_request_created(&self, request_id: &str, request: &SupportRequest) {
        tracing::info!("New support request created: {}", request_id);
        if let Err(e) = self.support_request_created_inner(request_id, request).await {
            tracing::error!("Error sending counsellor notification: {:#}", e);
        }
    }

    async fn support_request_created_inner(
        &self,
        request_id: &str,
        request: &SupportRequest,
    ) -> Result<()> {
        let push_for = |token: &str, body: String| {
            PushMessage::new(token, "New Support Request", body)
                .with_data("type", "support_request")
                .with_data("requestId", request_id)
                .with_data("userId", request.user_id.as_str())
        };

        if let Some(counsellor_id) = &request.counsellor_id {
            let Some(counsellor) = self.recipient(counsellor_id, "Counsellor").await? else {
                return Ok(());
            };
            let user_name = self.display_name(&request.user_id, "A user").await;
            let token = counsellor.push_token().unwrap_or_default();
            self.sender
                .send_push(&push_for(token, format!("{} has requested your support", user_name)))
                .await?;
            tracing::info!("Notification sent to counsellor {}", counsellor_id);
            return Ok(());
        }

        let counsellors = self.directory.available_counsellors().await?;
        if counsellors.is_empty() {
            tracing::warn!("No available counsellors found");
            return Ok(());
        }
        let user_name = self.display_name(&request.user_id, "A user").await;

        let sends = counsellors.iter().map(|counsellor_id| {
            let body = format!("{} needs support", user_name);
            async move {
                let Some(counsellor) = self.recipient(counsellor_id, "Counsellor").await? else {
                    return Ok(false);
                };
                let token = counsellor.push_token().unwrap_or_default();
                self.sender.send_push(&push_for(token, body)).await?;
                Ok::<bool, anyhow::Error>(true)
            }
        });

        let mut delivered = 0;
        for (counsellor_id, result) in counsellors.iter().zip(join_all(sends).await) {
            match result {
                Ok(true) => delivered += 1,
                Ok(false) => {}
                Err(e) => tracing::error!("Failed to notify counsellor {}: {:#}", counsellor_id, e),
            }
        }
        tracing::info!(
            "Notifications sent to {} of {} counsellors",
            delivered,
            counsellors.len()
        );
        Ok(())
    }

    /// Notify the requester once a counsellor accepts.
    pub async fn on_support_request_updated(
        &self,
        request_id: &str,
        before: &SupportRequest,
        after: &SupportRequest,
    ) {
        if before.is_accepted() || !after.is_accepted() {
            return;
        }
        if let Err(e) = self.request_accepted_inner(request_id, after).await {
            tracing::error!("Error sending user notification: {:#}", e);
        }
    }

    async fn request_accepted_inner(&self, request_id: &str, request: &SupportRequest) -> Result<()> {
        let counsellor_id = request.counsellor_id.as_deref().unwrap_or_default();
        tracing::info!(
            "Support request {} was accepted by counsellor {}",
            request_id,
            counsellor_id
        );

        let Some(user) = self.recipient(&request.user_id, "User").await? else {
            return Ok(());
        };
        let counsellor_name = self.display_name(counsellor_id, "A counsellor").await;

        let message = PushMessage::new(
            user.push_token().unwrap_or_default(),
            "Support Request Accepted",
            format!("{} has accepted your support request", counsellor_name),
        )
        .with_data("type", "request_accepted")
        .with_data("requestId", request_id)
        .with_data("counsellorId", counsellor_id);

        self.sender.send_push(&message).await?;
        tracing::info!("Notification sent to user {}", request.user_id);
        Ok(())
    }

    /// Notify the receiver of a new chat message.
    pub async fn on_message_created(&self, thread_id: &str, message: &ChatMessage) {
        tracing::info!("New message in thread {}", thread_id);
        if let Err(e) = self.message_created_inner(thread_id, message).await {
            tracing::error!("Error sending message notification: {:#}", e);
        }
    }

    async fn message_created_inner(&self, thread_id: &str, message: &ChatMessage) -> Result<()> {
        let Some(receiver) = self.recipient(&message.receiver_id, "Receiver").await? else {
            return Ok(());
        };
        let sender_name = self.display_name(&message.sender_id, "Someone").await;

        let push = PushMessage::new(
            receiver.push_token().unwrap_or_default(),
            format!("New message from {}", sender_name),
            preview(&message.content),
        )
        .with_data("type", "new_message")
        .with_data("threadId", thread_id)
        .with_data("senderId", message.sender_id.as_str());

        self.sender.send_push(&push).await?;
        tracing::info!("Message notification sent to {}", message.receiver_id);
        Ok(())
    }
}

fn preview(content: &str) -> String {
    content.chars().take(MESSAGE_PREVIEW_CHARS).collect()
}
