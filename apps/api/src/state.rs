use std::sync::Arc;

use crate::analysis::store::AnalysisStore;
use crate::llm_client::CompletionModel;
use crate::storage::BlobStore;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Every external collaborator is a trait object, constructed once in `main`
/// and swapped for in-memory fakes in tests.
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<dyn CompletionModel>,
    pub blobs: Arc<dyn BlobStore>,
    pub analyses: Arc<dyn AnalysisStore>,
}
