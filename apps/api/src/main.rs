mod analysis;
mod chat;
mod config;
mod embedding;
mod errors;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::analysis::catalog::SkillCatalog;
use crate::analysis::gap::GapAnalyzer;
use crate::analysis::role::RolePredictor;
use crate::config::Config;
use crate::embedding::hashing::HashingEmbedder;
use crate::embedding::remote::RemoteEmbedder;
use crate::embedding::{DegradedEmbedder, EmbeddingProvider};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Skillgap API v{}", env!("CARGO_PKG_VERSION"));

    // Skill catalog: a bad external catalog is fatal unless fallback is enabled
    let fallback = config.skill_catalog_fallback.then(SkillCatalog::builtin);
    let catalog = SkillCatalog::load(config.skill_catalog_path.as_deref(), fallback)?;
    info!(
        "Skill catalog loaded ({} phrases, source: {:?})",
        catalog.len(),
        catalog.source()
    );

    let embedder = build_embedder(&config).await;
    info!(
        "Embedding provider initialized ({}, dimension {})",
        embedder.name(),
        embedder.dimension()
    );

    let role_predictor =
        RolePredictor::initialize(embedder.clone(), config.role_model_path.as_deref()).await;
    if role_predictor.is_degraded() {
        warn!("Role predictor running in degraded mode");
    }

    let analyzer = GapAnalyzer::new(
        Arc::new(catalog),
        Arc::new(role_predictor),
        embedder,
        config.similarity_threshold,
        config.match_mode,
    );

    let state = AppState {
        config: config.clone(),
        analyzer: Arc::new(analyzer),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS origins once the web client has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Uses the remote endpoint when configured and reachable, the local hashing
/// embedder when none is configured, and a degraded provider otherwise.
async fn build_embedder(config: &Config) -> Arc<dyn EmbeddingProvider> {
    let Some(remote) = &config.remote_embedding else {
        return Arc::new(HashingEmbedder::new(config.embedding_dimension));
    };

    let client = match RemoteEmbedder::new(
        remote.url.clone(),
        remote.api_key.clone(),
        remote.model.clone(),
        config.embedding_dimension,
    ) {
        Ok(client) => client,
        Err(err) => {
            warn!(error = %err, "could not build remote embedding client");
            return Arc::new(DegradedEmbedder::new(
                config.embedding_dimension,
                err.to_string(),
            ));
        }
    };

    match client.probe().await {
        Ok(()) => Arc::new(client),
        Err(err) => {
            warn!(url = %remote.url, error = %err, "remote embedding provider unreachable");
            Arc::new(DegradedEmbedder::new(
                config.embedding_dimension,
                err.to_string(),
            ))
        }
    }
}
