use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// Row of `user_analyses`: the latest analysis for one user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserAnalysisRow {
    pub user_id: String,
    pub resume_file_path: Option<String>,
    pub analysis: Value,
    pub analyzed_at: DateTime<Utc>,
}
