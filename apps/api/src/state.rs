use std::sync::Arc;

use crate::flows::FlowExecutor;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Holds the LLM backend and the profile scraper. Swap either when constructing it.
    pub flows: Arc<FlowExecutor>,
}
