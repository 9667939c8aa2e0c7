//! Integration tests for the MoodPipeline.
//!
//! A ScriptedProvider stands in for the language model and an in-memory
//! MockStore records every write, so both entry points can be driven end to
//! end without network or database.

use anyhow::Result;
use async_trait::async_trait;
use moodline_core::{
    advice_for, AnalysisStatus, AnalysisUpdate, Emotion, EntryStore, MoodEntry, Principal,
};
use moodline_reasoning::providers::{Scripted, ScriptedProvider};
use moodline_reasoning::{ErrorCode, MoodPipeline, PipelineError, RecommendationSource};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

// ============================================================================
// Mock Store
// ============================================================================

#[derive(Default)]
struct MockStore {
    entries: Mutex<HashMap<String, MoodEntry>>,
    writes: Mutex<Vec<AnalysisUpdate>>,
    /// Reject `Completed` writes (status writes still succeed).
    fail_completed: AtomicBool,
    /// Reject every write.
    fail_all: AtomicBool,
}

impl MockStore {
    async fn with_entry(entry: MoodEntry) -> Arc<Self> {
        let store = Arc::new(Self::default());
        store.entries.lock().await.insert(entry.id.clone(), entry);
        store
    }

    async fn entry(&self, id: &str) -> MoodEntry {
        self.entries.lock().await.get(id).cloned().unwrap()
    }

    async fn write_count(&self) -> usize {
        self.writes.lock().await.len()
    }
}

#[async_trait]
impl EntryStore for MockStore {
    async fn get_entry(&self, id: &str) -> Result<Option<MoodEntry>> {
        Ok(self.entries.lock().await.get(id).cloned())
    }

    async fn update_analysis(&self, id: &str, update: AnalysisUpdate) -> Result<()> {
        if self.fail_all.load(Ordering::SeqCst) {
            anyhow::bail!("store unavailable");
        }
        if self.fail_completed.load(Ordering::SeqCst)
            && matches!(update, AnalysisUpdate::Completed { .. })
        {
            anyhow::bail!("write conflict");
        }
        self.writes.lock().await.push(update.clone());

        let mut entries = self.entries.lock().await;
        let entry = entries
            .get_mut(id)
            .ok_or_else(|| anyhow::anyhow!("no entry {}", id))?;
        entry.analysis_status = update.status();
        entry.analyzed_at = Some(chrono::Utc::now());
        if let AnalysisUpdate::Completed {
            emotion,
            confidence_score,
            recommendations,
        } = update
        {
            entry.emotion = Some(emotion);
            entry.confidence_score = Some(confidence_score);
            entry.recommendations = Some(recommendations);
        }
        Ok(())
    }
}

// ============================================================================
// Helpers
// ============================================================================

const JOB_LOSS: &str = "I lost my job today and don't know what to do";
const SADNESS_REPLY: &str = r#"{"emotion": "SADNESS", "confidence": 0.92, "reasoning": "loss"}"#;
const TIPS_REPLY: &str =
    r#"{"recommendations": ["Give yourself time", "Reach out to a friend", "List next steps"]}"#;

fn pipeline(provider: Arc<ScriptedProvider>, store: Arc<MockStore>) -> MoodPipeline {
    MoodPipeline::new(provider, store)
}

fn catalog(emotion: Emotion) -> Vec<String> {
    advice_for(emotion).iter().map(|s| s.to_string()).collect()
}

// ============================================================================
// Reactive path
// ============================================================================

#[tokio::test]
async fn test_job_loss_entry_is_analyzed_as_sadness() {
    let entry = MoodEntry::new("e1", "alice", JOB_LOSS);
    let store = MockStore::with_entry(entry.clone()).await;
    let provider = Arc::new(ScriptedProvider::with_texts(&[SADNESS_REPLY, TIPS_REPLY]));

    let outcome = pipeline(provider.clone(), store.clone())
        .on_entry_created("e1", &entry)
        .await
        .unwrap();
    assert_eq!(outcome.recommendations.source, RecommendationSource::Generated);

    let stored = store.entry("e1").await;
    assert_eq!(stored.emotion, Some(Emotion::Sadness));
    assert_eq!(stored.confidence_score, Some(0.92));
    assert_eq!(stored.analysis_status, AnalysisStatus::Completed);
    assert_eq!(stored.recommendations.unwrap().len(), 3);
    assert!(stored.analyzed_at.is_some());
    assert_eq!(stored.text.as_deref(), Some(JOB_LOSS));
    assert_eq!(stored.user_id, "alice");
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn test_classifier_transport_error_marks_failed() {
    let entry = MoodEntry::new("e1", "alice", JOB_LOSS);
    let store = MockStore::with_entry(entry.clone()).await;
    let provider = Arc::new(ScriptedProvider::new(vec![Scripted::Fail(
        "connection reset by peer".into(),
    )]));

    let err = pipeline(provider.clone(), store.clone())
        .on_entry_created("e1", &entry)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Analysis(_)));
    assert_eq!(err.code(), ErrorCode::Internal);

    let stored = store.entry("e1").await;
    assert_eq!(stored.analysis_status, AnalysisStatus::Failed);
    assert!(stored.analyzed_at.is_some());
    assert!(stored.recommendations.is_none());
    assert!(stored.emotion.is_none());
    // No recommendation call after a failed classification
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn test_unparsable_classification_marks_failed() {
    let entry = MoodEntry::new("e1", "alice", "whatever");
    let store = MockStore::with_entry(entry.clone()).await;
    let provider = Arc::new(ScriptedProvider::with_texts(&["I think they are sad."]));

    let err = pipeline(provider, store.clone())
        .on_entry_created("e1", &entry)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Analysis(_)));
    assert_eq!(store.entry("e1").await.analysis_status, AnalysisStatus::Failed);
}

#[tokio::test]
async fn test_recommendation_failure_falls_back_for_every_emotion() {
    for emotion in Emotion::ALL {
        let entry = MoodEntry::new("e1", "alice", "some text");
        let store = MockStore::with_entry(entry.clone()).await;
        let reply = format!(r#"{{"emotion": "{}", "confidence": 0.7}}"#, emotion);
        let provider = Arc::new(ScriptedProvider::new(vec![
            Scripted::Text(reply),
            Scripted::Fail("rate limited".into()),
        ]));

        let outcome = pipeline(provider, store.clone())
            .on_entry_created("e1", &entry)
            .await
            .unwrap();
        assert_eq!(outcome.recommendations.source, RecommendationSource::Fallback);

        let stored = store.entry("e1").await;
        assert_eq!(stored.analysis_status, AnalysisStatus::Completed);
        assert_eq!(stored.emotion, Some(emotion));
        assert_eq!(stored.recommendations, Some(catalog(emotion)));
    }
}

#[tokio::test]
async fn test_malformed_recommendations_fall_back() {
    let entry = MoodEntry::new("e1", "alice", "so much to do");
    let store = MockStore::with_entry(entry.clone()).await;
    let provider = Arc::new(ScriptedProvider::with_texts(&[
        r#"{"emotion": "overwhelmed", "confidence": 0.6}"#,
        r#"{"recommendations": []}"#,
    ]));

    pipeline(provider, store.clone())
        .on_entry_created("e1", &entry)
        .await
        .unwrap();
    let stored = store.entry("e1").await;
    assert_eq!(stored.recommendations, Some(catalog(Emotion::Overwhelmed)));
}

#[tokio::test]
async fn test_unknown_label_is_stored_as_confused() {
    let entry = MoodEntry::new("e1", "alice", "hmm");
    let store = MockStore::with_entry(entry.clone()).await;
    let provider = Arc::new(ScriptedProvider::new(vec![
        Scripted::Text(r#"{"emotion": "nostalgic", "confidence": 0.97}"#.into()),
        Scripted::Fail("down".into()),
    ]));

    pipeline(provider, store.clone())
        .on_entry_created("e1", &entry)
        .await
        .unwrap();
    let stored = store.entry("e1").await;
    assert_eq!(stored.emotion, Some(Emotion::Confused));
    assert_eq!(stored.confidence_score, Some(0.5));
    assert_eq!(stored.recommendations, Some(catalog(Emotion::Confused)));
}

#[tokio::test]
async fn test_out_of_range_confidence_is_clamped() {
    for (raw, expected) in [("1.5", 1.0), ("-0.2", 0.0), ("null", 0.5)] {
        let entry = MoodEntry::new("e1", "alice", "text");
        let store = MockStore::with_entry(entry.clone()).await;
        let reply = format!(r#"{{"emotion": "hope", "confidence": {}}}"#, raw);
        let provider = Arc::new(ScriptedProvider::new(vec![
            Scripted::Text(reply),
            Scripted::Text(TIPS_REPLY.into()),
        ]));
        pipeline(provider, store.clone())
            .on_entry_created("e1", &entry)
            .await
            .unwrap();
        assert_eq!(store.entry("e1").await.confidence_score, Some(expected));
    }
}

#[tokio::test]
async fn test_empty_text_rejected_without_side_effects() {
    let mut entry = MoodEntry::new("e1", "alice", "");
    let store = MockStore::with_entry(entry.clone()).await;
    let provider = Arc::new(ScriptedProvider::with_texts(&[SADNESS_REPLY]));
    let p = pipeline(provider.clone(), store.clone());

    let err = p.on_entry_created("e1", &entry).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidArgument);

    entry.text = None;
    assert!(p.on_entry_created("e1", &entry).await.is_err());

    assert_eq!(provider.calls(), 0);
    assert_eq!(store.write_count().await, 0);
    assert_eq!(store.entry("e1").await.analysis_status, AnalysisStatus::Unset);
}

#[tokio::test]
async fn test_persistence_failure_propagates_and_marks_failed() {
    let entry = MoodEntry::new("e1", "alice", JOB_LOSS);
    let store = MockStore::with_entry(entry.clone()).await;
    store.fail_completed.store(true, Ordering::SeqCst);
    let provider = Arc::new(ScriptedProvider::with_texts(&[SADNESS_REPLY, TIPS_REPLY]));

    let err = pipeline(provider, store.clone())
        .on_entry_created("e1", &entry)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Persistence(_)));
    assert_eq!(store.entry("e1").await.analysis_status, AnalysisStatus::Failed);
}

#[tokio::test]
async fn test_failed_status_write_error_is_swallowed() {
    let entry = MoodEntry::new("e1", "alice", JOB_LOSS);
    let store = MockStore::with_entry(entry.clone()).await;
    store.fail_all.store(true, Ordering::SeqCst);
    let provider = Arc::new(ScriptedProvider::new(vec![Scripted::Fail("boom".into())]));

    // The classifier error is what comes back, not the status write error
    let err = pipeline(provider, store.clone())
        .on_entry_created("e1", &entry)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Analysis(_)));
    assert_eq!(store.entry("e1").await.analysis_status, AnalysisStatus::Unset);
}

#[tokio::test]
async fn test_rerun_overwrites_instead_of_appending() {
    let entry = MoodEntry::new("e1", "alice", JOB_LOSS);
    let store = MockStore::with_entry(entry.clone()).await;
    let provider = Arc::new(ScriptedProvider::repeating(vec![
        Scripted::Text(SADNESS_REPLY.into()),
        Scripted::Text(TIPS_REPLY.into()),
    ]));
    let p = pipeline(provider, store.clone());

    p.on_entry_created("e1", &entry).await.unwrap();
    let first = store.entry("e1").await;
    p.on_entry_created("e1", &entry).await.unwrap();
    let second = store.entry("e1").await;

    assert_eq!(first.emotion, second.emotion);
    assert_eq!(first.confidence_score, second.confidence_score);
    assert_eq!(second.recommendations.as_ref().map(Vec::len), Some(3));
    assert_eq!(first.recommendations, second.recommendations);
    assert_eq!(store.write_count().await, 2);
}

// ============================================================================
// Retry path
// ============================================================================

#[tokio::test]
async fn test_retry_requires_authentication() {
    let store = MockStore::with_entry(MoodEntry::new("e1", "alice", JOB_LOSS)).await;
    let provider = Arc::new(ScriptedProvider::with_texts(&[SADNESS_REPLY]));

    let err = pipeline(provider.clone(), store.clone())
        .retry(None, Some("e1"))
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Authorization { .. }));
    assert_eq!(err.code(), ErrorCode::Unauthenticated);
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_retry_rejects_non_owner() {
    let store = MockStore::with_entry(MoodEntry::new("e1", "alice", JOB_LOSS)).await;
    let provider = Arc::new(ScriptedProvider::with_texts(&[SADNESS_REPLY]));
    let mallory = Principal::new("mallory");

    let err = pipeline(provider.clone(), store.clone())
        .retry(Some(&mallory), Some("e1"))
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Authorization { .. }));
    assert_eq!(err.code(), ErrorCode::PermissionDenied);
    assert_eq!(provider.calls(), 0);
    assert_eq!(store.write_count().await, 0);
}

#[tokio::test]
async fn test_retry_missing_entry() {
    let store = Arc::new(MockStore::default());
    let provider = Arc::new(ScriptedProvider::with_texts(&[SADNESS_REPLY]));
    let alice = Principal::new("alice");
    let p = pipeline(provider, store);

    let err = p.retry(Some(&alice), Some("ghost")).await.unwrap_err();
    assert!(matches!(err, PipelineError::Validation { .. }));
    assert_eq!(err.code(), ErrorCode::NotFound);

    let err = p.retry(Some(&alice), None).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidArgument);
    let err = p.retry(Some(&alice), Some("")).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidArgument);
}

#[tokio::test]
async fn test_retry_empty_text() {
    let store = MockStore::with_entry(MoodEntry::new("e1", "alice", "")).await;
    let provider = Arc::new(ScriptedProvider::with_texts(&[SADNESS_REPLY]));
    let alice = Principal::new("alice");

    let err = pipeline(provider.clone(), store)
        .retry(Some(&alice), Some("e1"))
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Validation { .. }));
    assert_eq!(err.code(), ErrorCode::InvalidArgument);
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_retry_recovers_failed_entry() {
    let mut entry = MoodEntry::new("e1", "alice", JOB_LOSS);
    entry.analysis_status = AnalysisStatus::Failed;
    let store = MockStore::with_entry(entry).await;
    let provider = Arc::new(ScriptedProvider::new(vec![
        Scripted::Text(SADNESS_REPLY.into()),
        Scripted::Fail("timeout".into()),
    ]));
    let alice = Principal::new("alice");

    let resp = pipeline(provider, store.clone())
        .retry(Some(&alice), Some("e1"))
        .await
        .unwrap();
    assert!(resp.success);
    assert_eq!(resp.emotion, Emotion::Sadness);
    assert_eq!(resp.confidence_score, 0.92);
    assert_eq!(resp.recommendations, catalog(Emotion::Sadness));

    let stored = store.entry("e1").await;
    assert_eq!(stored.analysis_status, AnalysisStatus::Completed);
    assert_eq!(stored.recommendations, Some(resp.recommendations.clone()));

    let json = serde_json::to_value(&resp).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["emotion"], "sadness");
    assert_eq!(json["confidenceScore"], 0.92);
}

#[tokio::test]
async fn test_retry_classifier_failure_keeps_status() {
    let mut entry = MoodEntry::new("e1", "alice", JOB_LOSS);
    entry.analysis_status = AnalysisStatus::Failed;
    let store = MockStore::with_entry(entry).await;
    let provider = Arc::new(ScriptedProvider::new(vec![Scripted::Fail("503".into())]));
    let alice = Principal::new("alice");

    let err = pipeline(provider, store.clone())
        .retry(Some(&alice), Some("e1"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::Internal);
    assert_eq!(store.write_count().await, 0);
    assert_eq!(store.entry("e1").await.analysis_status, AnalysisStatus::Failed);
}

#[tokio::test]
async fn test_retry_persistence_failure_keeps_status() {
    let mut entry = MoodEntry::new("e1", "alice", JOB_LOSS);
    entry.analysis_status = AnalysisStatus::Completed;
    let store = MockStore::with_entry(entry).await;
    store.fail_completed.store(true, Ordering::SeqCst);
    let provider = Arc::new(ScriptedProvider::with_texts(&[SADNESS_REPLY, TIPS_REPLY]));
    let alice = Principal::new("alice");

    let err = pipeline(provider, store.clone())
        .retry(Some(&alice), Some("e1"))
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Persistence(_)));
    assert_eq!(err.code(), ErrorCode::Internal);
    // No fallback `failed` write on this path
    assert_eq!(store.write_count().await, 0);
    assert_eq!(store.entry("e1").await.analysis_status, AnalysisStatus::Completed);
}
