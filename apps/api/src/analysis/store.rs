//! Analysis persistence — one document per user, last write wins.
//!
//! `AppState` holds an `Arc<dyn AnalysisStore>`; production uses
//! `PgAnalysisStore`, tests use an in-memory map.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;

use crate::analysis::models::AnalysisRecord;
use crate::analysis::normalize::analysis_from_value;
use crate::errors::AppError;
use crate::models::user_analysis::UserAnalysisRow;

#[async_trait]
pub trait AnalysisStore: Send + Sync {
    /// Stores `analysis` for `user_id`, replacing any previous record.
    /// The timestamp is assigned by the store.
    async fn save(
        &self,
        user_id: &str,
        resume_file_path: Option<&str>,
        analysis: &AnalysisRecord,
    ) -> Result<(), AppError>;

    /// Returns the latest analysis for `user_id`, if one was ever stored.
    async fn load(&self, user_id: &str) -> Result<Option<AnalysisRecord>, AppError>;
}

#[derive(Clone)]
pub struct PgAnalysisStore {
    pool: PgPool,
}

impl PgAnalysisStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnalysisStore for PgAnalysisStore {
    async fn save(
        &self,
        user_id: &str,
        resume_file_path: Option<&str>,
        analysis: &AnalysisRecord,
    ) -> Result<(), AppError> {
        // Unconditional overwrite: no version check, concurrent writers race.
        sqlx::query(
            r#"
            INSERT INTO user_analyses (user_id, resume_file_path, analysis, analyzed_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (user_id) DO UPDATE
            SET resume_file_path = EXCLUDED.resume_file_path,
                analysis = EXCLUDED.analysis,
                analyzed_at = EXCLUDED.analyzed_at
            "#,
        )
        .bind(user_id)
        .bind(resume_file_path)
        .bind(Json(analysis))
        .execute(&self.pool)
        .await?;

        info!("Stored analysis for user {user_id}");
        Ok(())
    }

    async fn load(&self, user_id: &str) -> Result<Option<AnalysisRecord>, AppError> {
        let row = sqlx::query_as::<_, UserAnalysisRow>(
            "SELECT * FROM user_analyses WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| analysis_from_value(&r.analysis)))
    }
}
