use crate::error::{ApiError, ApiResult};
use crate::types::{
    EntryCreated, MessageCreated, RetryRequest, SupportRequestCreated, SupportRequestUpdated,
};
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use moodline_core::{Authenticator, Principal};
use moodline_notify::Notifier;
use moodline_reasoning::{MoodPipeline, RetryResponse};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Shared state for the gateway routes.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: MoodPipeline,
    pub notifier: Notifier,
    pub auth: Arc<dyn Authenticator>,
}

/// HTTP surface of the service.
///
/// - `POST /triggers/mood-entries`: entry-created events
/// - `POST /rpc/retryMoodAnalysis`: owner-initiated re-analysis
/// - `POST /triggers/support-requests/{created,updated}`, `POST /triggers/messages/created`
/// - `GET /health`
pub struct GatewayServer {
    state: AppState,
    host: String,
    port: u16,
}

impl GatewayServer {
    pub fn new(state: AppState, host: &str, port: u16) -> Self {
        Self {
            state,
            host: host.to_string(),
            port,
        }
    }

    /// Bind and serve until the listener fails.
    pub async fn run(self) -> anyhow::Result<()> {
        let addr = format!("{}:{}", self.host, self.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| anyhow::anyhow!("Gateway failed to bind {}: {}", addr, e))?;
        tracing::info!("Gateway listening on {}", addr);
        axum::serve(listener, router(self.state)).await?;
        Ok(())
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/triggers/mood-entries", post(entry_created))
        .route("/rpc/retryMoodAnalysis", post(retry_analysis))
        .route("/triggers/support-requests/created", post(support_request_created))
        .route("/triggers/support-requests/updated", post(support_request_updated))
        .route("/triggers/messages/created", post(message_created))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ============================================================================
// Route handlers
// ============================================================================

async fn health() -> &'static str {
    "ok"
}

/// Error responses make the trigger source redeliver.
async fn entry_created(
    State(state): State<AppState>,
    Json(event): Json<EntryCreated>,
) -> ApiResult<Json<RetryResponse>> {
    let outcome = state
        .pipeline
        .on_entry_created(&event.entry_id, &event.entry)
        .await?;
    Ok(Json(outcome.into()))
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

async fn caller(state: &AppState, headers: &HeaderMap) -> Option<Principal> {
    let token = bearer_token(headers)?;
    state.auth.authenticate(token).await
}

/// The body is optional so an unauthenticated call is rejected as such
/// before its payload is looked at.
async fn retry_analysis(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<RetryRequest>>,
) -> ApiResult<Json<RetryResponse>> {
    let principal = caller(&state, &headers).await;
    let request = body.map(|Json(b)| b).unwrap_or_default();
    let response = state
        .pipeline
        .retry(principal.as_ref(), request.entry_id.as_deref())
        .await
        .map_err(ApiError::from)?;
    Ok(Json(response))
}

async fn support_request_created(
    State(state): State<AppState>,
    Json(event): Json<SupportRequestCreated>,
) -> StatusCode {
    state
        .notifier
        .on_support_request_created(&event.request_id, &event.request)
        .await;
    StatusCode::ACCEPTED
}

async fn support_request_updated(
    State(state): State<AppState>,
    Json(event): Json<SupportRequestUpdated>,
) -> StatusCode {
    state
        .notifier
        .on_support_request_updated(&event.request_id, &event.before, &event.after)
        .await;
    StatusCode::ACCEPTED
}

async fn message_created(
    State(state): State<AppState>,
    Json(event): Json<MessageCreated>,
) -> StatusCode {
    if let Some(id) = &event.message_id {
        tracing::debug!("Message {} created in thread {}", id, event.thread_id);
    }
    state
        .notifier
        .on_message_created(&event.thread_id, &event.message)
        .await;
    StatusCode::ACCEPTED
}
