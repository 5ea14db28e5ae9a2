use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::analysis::gap::MatchMode;
use crate::analysis::semantic::DEFAULT_SIMILARITY_THRESHOLD;
use crate::embedding::DEFAULT_DIMENSION;

/// Remote embedding endpoint settings; absent means the local hashing embedder.
#[derive(Debug, Clone)]
pub struct RemoteEmbeddingConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub model: String,
}

/// Application configuration loaded from environment variables.
/// Fails at startup on malformed values; every variable has a default.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub skill_catalog_path: Option<PathBuf>,
    /// Substitute the built-in catalog when `skill_catalog_path` cannot be loaded.
    pub skill_catalog_fallback: bool,
    pub role_model_path: Option<PathBuf>,
    pub remote_embedding: Option<RemoteEmbeddingConfig>,
    pub embedding_dimension: usize,
    pub similarity_threshold: f32,
    pub match_mode: MatchMode,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let similarity_threshold: f32 =
            parse_or(&var, "SIMILARITY_THRESHOLD", DEFAULT_SIMILARITY_THRESHOLD)?;
        if !(-1.0..=1.0).contains(&similarity_threshold) {
            bail!("SIMILARITY_THRESHOLD must be within [-1, 1], got {similarity_threshold}");
        }

        let embedding_dimension: usize = parse_or(&var, "EMBEDDING_DIMENSION", DEFAULT_DIMENSION)?;
        if embedding_dimension == 0 {
            bail!("EMBEDDING_DIMENSION must be positive");
        }

        let match_mode = match var("MATCH_MODE") {
            Some(raw) => raw
                .parse::<MatchMode>()
                .map_err(anyhow::Error::msg)
                .context("MATCH_MODE is invalid")?,
            None => MatchMode::default(),
        };

        let remote_embedding = var("EMBEDDING_URL").map(|url| RemoteEmbeddingConfig {
            url,
            api_key: var("EMBEDDING_API_KEY"),
            model: var("EMBEDDING_MODEL").unwrap_or_else(|| "all-mpnet-base-v2".to_string()),
        });

        Ok(Config {
            port: parse_or(&var, "PORT", 8080)?,
            rust_log: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            skill_catalog_path: var("SKILL_CATALOG_PATH").map(PathBuf::from),
            skill_catalog_fallback: parse_or(&var, "SKILL_CATALOG_FALLBACK", true)?,
            role_model_path: var("ROLE_MODEL_PATH").map(PathBuf::from),
            remote_embedding,
            embedding_dimension,
            similarity_threshold,
            match_mode,
            max_upload_bytes: parse_or(&var, "MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
        })
    }
}

fn parse_or<T>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.rust_log, "info");
        assert!(config.skill_catalog_path.is_none());
        assert!(config.skill_catalog_fallback);
        assert!(config.remote_embedding.is_none());
        assert_eq!(config.embedding_dimension, 768);
        assert!((config.similarity_threshold - 0.75).abs() < f32::EPSILON);
        assert_eq!(config.match_mode, MatchMode::LexicalOnly);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "9000"),
            ("SKILL_CATALOG_PATH", "data/skills.csv"),
            ("SKILL_CATALOG_FALLBACK", "false"),
            ("EMBEDDING_URL", "http://localhost:8001/v1/embeddings"),
            ("SIMILARITY_THRESHOLD", "0.6"),
            ("MATCH_MODE", "lexical_plus_semantic"),
        ])
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(
            config.skill_catalog_path,
            Some(PathBuf::from("data/skills.csv"))
        );
        assert!(!config.skill_catalog_fallback);
        let remote = config.remote_embedding.unwrap();
        assert_eq!(remote.model, "all-mpnet-base-v2");
        assert!(remote.api_key.is_none());
        assert_eq!(config.match_mode, MatchMode::LexicalPlusSemantic);
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = config_from(&[("PORT", "  "), ("EMBEDDING_URL", "")]).unwrap();
        assert_eq!(config.port, 8080);
        assert!(config.remote_embedding.is_none());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(config_from(&[("PORT", "eighty")]).is_err());
        assert!(config_from(&[("SIMILARITY_THRESHOLD", "1.5")]).is_err());
        assert!(config_from(&[("EMBEDDING_DIMENSION", "0")]).is_err());
        assert!(config_from(&[("MATCH_MODE", "fuzzy")]).is_err());
    }
}
