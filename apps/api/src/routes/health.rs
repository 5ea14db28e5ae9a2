use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Reports service version and which components run in degraded mode.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let analyzer = &state.analyzer;
    let embedder = analyzer.embedder();
    let catalog = analyzer.catalog();

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "skillgap-api",
        "catalog_source": catalog.source(),
        "catalog_size": catalog.len(),
        "embedder": embedder.name(),
        "embedder_degraded": embedder.is_degraded(),
        "embedder_degraded_reason": embedder.degraded_reason(),
        "role_predictor_degraded": analyzer.role_predictor().is_degraded(),
        "default_mode": analyzer.default_mode(),
    }))
}
