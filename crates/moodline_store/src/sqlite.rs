use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use moodline_core::{
    AnalysisStatus, AnalysisUpdate, Emotion, EntryStore, MoodEntry, UserDirectory, UserProfile,
};
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use std::path::Path;

/// SQLite-backed document store for entries, users and counsellors.
#[derive(Clone)]
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    pub async fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_url = format!("sqlite://{}?mode=rwc", db_path.as_ref().display());
        let pool = SqlitePoolOptions::new()
            .connect(&db_url)
            .await
            .context("Failed to connect to SQLite database")?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS mood_entries (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                text TEXT,
                emotion TEXT,
                confidence_score REAL,
                recommendations TEXT,
                analysis_status TEXT,
                analyzed_at INTEGER,
                created_at INTEGER NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create mood_entries table")?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_mood_entries_user ON mood_entries(user_id)")
            .execute(&self.pool)
            .await
            .context("Failed to create mood_entries user index")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT,
                fcm_token TEXT
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create users table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS counsellors (
                id TEXT PRIMARY KEY,
                status TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create counsellors table")?;

        Ok(())
    }

    /// Write a new entry as the app would: text and owner only.
    pub async fn insert_entry(&self, entry: &MoodEntry) -> Result<()> {
        sqlx::query(
            "INSERT INTO mood_entries (id, user_id, text, analysis_status, created_at) VALUES (?, ?, ?, NULL, ?)",
        )
        .bind(&entry.id)
        .bind(&entry.user_id)
        .bind(entry.text.as_deref())
        .bind(Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to insert mood entry {}", entry.id))?;
        Ok(())
    }

    pub async fn upsert_user(&self, user: &UserProfile) -> Result<()> {
        sqlx::query(
            "INSERT INTO users (id, name, fcm_token) VALUES (?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name, fcm_token = excluded.fcm_token",
        )
        .bind(&user.id)
        .bind(user.name.as_deref())
        .bind(user.fcm_token.as_deref())
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to upsert user {}", user.id))?;
        Ok(())
    }

    pub async fn set_counsellor_status(&self, id: &str, status: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO counsellors (id, status) VALUES (?, ?)
             ON CONFLICT(id) DO UPDATE SET status = excluded.status",
        )
        .bind(id)
        .bind(status)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to set status of counsellor {}", id))?;
        Ok(())
    }
}

fn entry_from_row(row: &SqliteRow) -> Result<MoodEntry> {
    let id: String = row.get("id");

    let emotion = match row.get::<Option<String>, _>("emotion") {
        Some(label) => match Emotion::from_label(&label) {
            Some(e) => Some(e),
            None => {
                tracing::warn!("Entry {} has out-of-taxonomy emotion '{}', ignoring", id, label);
                None
            }
        },
        None => None,
    };
    let recommendations = row
        .get::<Option<String>, _>("recommendations")
        .map(|json| serde_json::from_str::<Vec<String>>(&json))
        .transpose()
        .with_context(|| format!("Corrupt recommendations on entry {}", id))?;
    let analyzed_at = row
        .get::<Option<i64>, _>("analyzed_at")
        .and_then(DateTime::<Utc>::from_timestamp_millis);

    Ok(MoodEntry {
        text: row.get("text"),
        user_id: row.get("user_id"),
        emotion,
        confidence_score: row.get("confidence_score"),
        recommendations,
        analysis_status: AnalysisStatus::from_db(row.get::<Option<String>, _>("analysis_status").as_deref()),
        analyzed_at,
        id,
    })
}

#[async_trait]
impl EntryStore for SqliteStore {
    async fn get_entry(&self, id: &str) -> Result<Option<MoodEntry>> {
        let row = sqlx::query(
            "SELECT id, user_id, text, emotion, confidence_score, recommendations, analysis_status, analyzed_at
             FROM mood_entries WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Failed to load mood entry {}", id))?;

        row.as_ref().map(entry_from_row).transpose()
    }

    async fn update_analysis(&self, id: &str, update: AnalysisUpdate) -> Result<()> {
        let now = Utc::now().timestamp_millis();
        let status = update.status().as_str();

        // One statement per update keeps the write atomic per entry.
        let result = match &update {
            AnalysisUpdate::Completed {
                emotion,
                confidence_score,
                recommendations,
            } => {
                let recommendations_json = serde_json::to_string(recommendations)?;
                sqlx::query(
                    "UPDATE mood_entries
                     SET emotion = ?, confidence_score = ?, recommendations = ?, analysis_status = ?, analyzed_at = ?
                     WHERE id = ?",
                )
                .bind(emotion.as_str())
                .bind(*confidence_score)
                .bind(&recommendations_json)
                .bind(status)
                .bind(now)
                .bind(id)
                .execute(&self.pool)
                .await
            }
            AnalysisUpdate::Failed => {
                sqlx::query(
                    "UPDATE mood_entries SET analysis_status = ?, analyzed_at = ? WHERE id = ?",
                )
                .bind(status)
                .bind(now)
                .bind(id)
                .execute(&self.pool)
                .await
            }
        }
        .with_context(|| format!("Failed to update analysis of mood entry {}", id))?;

        if result.rows_affected() == 0 {
            anyhow::bail!("Mood entry {} not found", id);
        }
        tracing::debug!("Mood entry {} analysis set to {}", id, status);
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for SqliteStore {
    async fn get_user(&self, id: &str) -> Result<Option<UserProfile>> {
        let row = sqlx::query("SELECT id, name, fcm_token FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to load user {}", id))?;

        Ok(row.map(|row| UserProfile {
            id: row.get("id"),
            name: row.get("name"),
            fcm_token: row.get("fcm_token"),
        }))
    }

    async fn available_counsellors(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT id FROM counsellors WHERE status = 'available' ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .context("Failed to query available counsellors")?;
        Ok(rows.into_iter().map(|row| row.get("id")).collect())
    }
}
