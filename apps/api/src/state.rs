use std::sync::Arc;

use crate::auth::TokenIssuer;
use crate::courses::CatalogClient;
use crate::llm_client::CompletionBackend;

/// Shared application state injected into all route handlers via Axum extractors.
/// Holds only clients and configuration; no per-request data.
#[derive(Clone)]
pub struct AppState {
    /// AI backend used by the CV pipeline. `LlmClient` in production.
    pub completion: Arc<dyn CompletionBackend>,
    pub tokens: Arc<TokenIssuer>,
    pub catalog: CatalogClient,
}
