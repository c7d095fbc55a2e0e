use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::Config;
use crate::llm_client::CompletionService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    /// Model behind every screening call. `LlmClient` in production.
    pub llm: Arc<dyn CompletionService>,
    /// Outbound client for hh.ru and the mail providers.
    pub http: reqwest::Client,
    pub config: Config,
}
