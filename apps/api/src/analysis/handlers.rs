//! Axum route handlers for resume analysis, resume building and career chat.
//!
//! Analyze flow: validate → acquire text (inline or blob + extraction) →
//! build prompt → model → normalize → persist (analyze mode only) → respond.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analysis::extract::extract_downloaded;
use crate::analysis::models::{AnalysisRecord, BuildRecord, PromptMode};
use crate::analysis::normalize::{normalize_analysis, normalize_build};
use crate::analysis::prompts::{build_chat_prompt, build_prompt};
use crate::errors::{require_non_empty, AppError, AppJson};
use crate::state::AppState;
use crate::storage::BlobStore;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub user_id: Option<String>,
    /// `"text"` for pasted resume text; anything else means an uploaded file.
    #[serde(rename = "type")]
    pub source_type: Option<String>,
    pub file_path: Option<String>,
    pub content_type: Option<String>,
    pub resume_text: Option<String>,
    pub mode: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum AnalyzeResponse {
    Analysis { analysis: AnalysisRecord },
    Build(BuildRecord),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub user_id: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// Where the resume text comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum ResumeSource {
    Text(String),
    Blob {
        file_path: String,
        content_type: Option<String>,
    },
}

/// An `AnalyzeRequest` that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedAnalyzeRequest {
    pub user_id: String,
    pub source: ResumeSource,
    /// Stored alongside the analysis; `None` when no file was referenced.
    pub resume_file_path: Option<String>,
    pub mode: PromptMode,
}

impl AnalyzeRequest {
    /// Checks required fields in order: `userId`, then `resumeText` for text
    /// submissions or `filePath` for file submissions.
    pub fn validate(self) -> Result<ValidatedAnalyzeRequest, AppError> {
        let user_id = require_non_empty(self.user_id, "userId is required")?;
        let mode = PromptMode::from_request(self.mode.as_deref());
        let resume_file_path = self.file_path.filter(|p| !p.is_empty());

        let source = if self.source_type.as_deref() == Some("text") {
            let text = self
                .resume_text
                .filter(|t| !t.trim().is_empty())
                .ok_or_else(|| {
                    AppError::Validation("resumeText is required for text type".to_string())
                })?;
            ResumeSource::Text(text)
        } else {
            let file_path = resume_file_path
                .clone()
                .ok_or_else(|| AppError::Validation("filePath is required".to_string()))?;
            ResumeSource::Blob {
                file_path,
                content_type: self.content_type.filter(|c| !c.is_empty()),
            }
        };

        Ok(ValidatedAnalyzeRequest {
            user_id,
            source,
            resume_file_path,
            mode,
        })
    }
}

/// Returns the resume text: inline text as-is, or the blob downloaded and extracted.
pub async fn acquire_text(blobs: &dyn BlobStore, source: ResumeSource) -> Result<String, AppError> {
    match source {
        ResumeSource::Text(text) => Ok(text),
        ResumeSource::Blob {
            file_path,
            content_type,
        } => {
            let bytes = blobs.download(&file_path).await?;
            let text = extract_downloaded(bytes, &file_path, content_type.as_deref()).await?;
            info!("Extracted {} chars from {}", text.len(), file_path);
            Ok(text)
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resumes/analyze
///
/// `mode = "build"` returns a bare BuildRecord and stores nothing. Any other
/// mode returns `{ "analysis": AnalysisRecord }` and overwrites the user's
/// stored analysis.
pub async fn handle_analyze(
    State(state): State<AppState>,
    AppJson(request): AppJson<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let ValidatedAnalyzeRequest {
        user_id,
        source,
        resume_file_path,
        mode,
    } = request.validate()?;

    info!("Running {:?} for user {}", mode, user_id);
    let resume_text = acquire_text(state.blobs.as_ref(), source).await?;

    let prompt = build_prompt(mode, &resume_text);
    let reply = state.model.complete(&prompt).await?;

    match mode {
        PromptMode::Build => Ok(Json(AnalyzeResponse::Build(normalize_build(&reply)))),
        PromptMode::Analyze => {
            let analysis = normalize_analysis(&reply);
            state
                .analyses
                .save(&user_id, resume_file_path.as_deref(), &analysis)
                .await?;
            info!(
                "Analysis for user {}: score={} ats={}",
                user_id, analysis.overall_score, analysis.ats_compatibility
            );
            Ok(Json(AnalyzeResponse::Analysis { analysis }))
        }
    }
}

/// POST /api/v1/chat
///
/// Career-coach chat. The user's stored analysis, if any, is given to the
/// model as context; the reply is returned verbatim.
pub async fn handle_chat(
    State(state): State<AppState>,
    AppJson(request): AppJson<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    const MISSING: &str = "userId and message are required";
    let user_id = require_non_empty(request.user_id, MISSING)?;
    let message = require_non_empty(request.message, MISSING)?;

    let analysis = state.analyses.load(&user_id).await?;
    let prompt = build_chat_prompt(analysis.as_ref(), &message);
    let reply = state.model.complete(&prompt).await?;

    Ok(Json(ChatResponse { reply }))
}
