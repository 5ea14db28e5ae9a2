use std::sync::Arc;

use crate::analysis::gap::GapAnalyzer;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Owns the process-wide skill catalog, embedder and role predictor.
    pub analyzer: Arc<GapAnalyzer>,
}
