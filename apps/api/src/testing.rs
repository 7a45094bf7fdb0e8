//! In-memory fakes for the external collaborators in `AppState`, plus a
//! small driver for exercising the real router in handler tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use bytes::Bytes;
use serde_json::Value;
use tower::ServiceExt;

use crate::analysis::models::AnalysisRecord;
use crate::analysis::store::AnalysisStore;
use crate::errors::AppError;
use crate::llm_client::{CompletionModel, LlmError};
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::BlobStore;

/// Replies with a canned text and records every prompt it receives.
#[derive(Default)]
pub struct FakeModel {
    pub reply: String,
    pub fail: bool,
    pub delay: Option<Duration>,
    pub prompts: Mutex<Vec<String>>,
}

impl FakeModel {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            ..Default::default()
        }
    }

    /// Replies only after `delay` has passed on the tokio clock.
    pub fn slow(reply: &str, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::replying(reply)
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionModel for FakeModel {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(LlmError::Api {
                status: 503,
                message: "model unavailable".to_string(),
            });
        }
        Ok(self.reply.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PresignCall {
    pub key: String,
    pub content_type: String,
    pub expires_in: Duration,
}

#[derive(Default)]
pub struct FakeBlobStore {
    pub objects: Mutex<HashMap<String, Bytes>>,
    pub presigned: Mutex<Vec<PresignCall>>,
}

impl FakeBlobStore {
    pub fn with_object(key: &str, contents: &'static [u8]) -> Self {
        let store = Self::default();
        store
            .objects
            .lock()
            .unwrap()
            .insert(key.to_string(), Bytes::from_static(contents));
        store
    }
}

#[async_trait]
impl BlobStore for FakeBlobStore {
    async fn presign_upload(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<String, AppError> {
        self.presigned.lock().unwrap().push(PresignCall {
            key: key.to_string(),
            content_type: content_type.to_string(),
            expires_in,
        });
        Ok(format!("https://blobs.test/{key}?signature=fake"))
    }

    async fn download(&self, key: &str) -> Result<Bytes, AppError> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| AppError::S3(format!("NoSuchKey: {key}")))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredAnalysis {
    pub resume_file_path: Option<String>,
    pub analysis: AnalysisRecord,
}

#[derive(Default)]
pub struct InMemoryAnalysisStore {
    pub records: Mutex<HashMap<String, StoredAnalysis>>,
    pub fail_save: bool,
}

impl InMemoryAnalysisStore {
    pub fn get(&self, user_id: &str) -> Option<StoredAnalysis> {
        self.records.lock().unwrap().get(user_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

#[async_trait]
impl AnalysisStore for InMemoryAnalysisStore {
    async fn save(
        &self,
        user_id: &str,
        resume_file_path: Option<&str>,
        analysis: &AnalysisRecord,
    ) -> Result<(), AppError> {
        if self.fail_save {
            return Err(AppError::Internal(anyhow::anyhow!("store offline")));
        }
        self.records.lock().unwrap().insert(
            user_id.to_string(),
            StoredAnalysis {
                resume_file_path: resume_file_path.map(str::to_string),
                analysis: analysis.clone(),
            },
        );
        Ok(())
    }

    async fn load(&self, user_id: &str) -> Result<Option<AnalysisRecord>, AppError> {
        Ok(self.get(user_id).map(|s| s.analysis))
    }
}

/// Fakes plus the router built over them. The `Arc`s stay shared so tests
/// can inspect side effects after a request.
pub struct TestApp {
    pub model: Arc<FakeModel>,
    pub blobs: Arc<FakeBlobStore>,
    pub analyses: Arc<InMemoryAnalysisStore>,
    pub router: Router,
}

impl TestApp {
    pub fn new(model: FakeModel, blobs: FakeBlobStore, analyses: InMemoryAnalysisStore) -> Self {
        let model = Arc::new(model);
        let blobs = Arc::new(blobs);
        let analyses = Arc::new(analyses);
        let router = build_router(AppState {
            model: model.clone(),
            blobs: blobs.clone(),
            analyses: analyses.clone(),
        });
        Self {
            model,
            blobs,
            analyses,
            router,
        }
    }

    pub fn with_reply(reply: &str) -> Self {
        Self::new(
            FakeModel::replying(reply),
            FakeBlobStore::default(),
            InMemoryAnalysisStore::default(),
        )
    }

    /// Sends a request through the router and returns status plus JSON body
    /// (`Value::Null` when the body is empty or not JSON).
    pub async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();
        self.dispatch(request).await
    }

    /// Like `send`, but the caller controls the content type and raw body.
    pub async fn send_raw(
        &self,
        uri: &str,
        content_type: Option<&str>,
        body: &str,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method("POST").uri(uri);
        if let Some(content_type) = content_type {
            builder = builder.header("content-type", content_type);
        }
        let request = builder.body(Body::from(body.to_string())).unwrap();
        self.dispatch(request).await
    }

    async fn dispatch(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }
}
