use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable has a default so a bare `cargo run` talks to a local Ollama.
#[derive(Debug, Clone)]
pub struct Config {
    pub ollama_host: String,
    pub ollama_model: String,
    pub embedding_model: String,
    pub generation_timeout: Duration,
    pub temperature: f32,
    pub top_p: f32,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub retrieval_top_k: usize,
    /// Optional JSON rule set replacing the built-in French one.
    pub bias_rules_path: Option<PathBuf>,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let config = Config {
            ollama_host: text("OLLAMA_HOST", "http://localhost:11434")
                .trim_end_matches('/')
                .to_string(),
            ollama_model: text("OLLAMA_MODEL", "mistral"),
            embedding_model: text("EMBEDDING_MODEL", "all-minilm"),
            generation_timeout: Duration::from_secs(parse_or(
                &lookup,
                "GENERATION_TIMEOUT_SECS",
                120u64,
            )?),
            temperature: parse_or(&lookup, "GENERATION_TEMPERATURE", 0.1f32)?,
            top_p: parse_or(&lookup, "GENERATION_TOP_P", 0.9f32)?,
            chunk_size: parse_or(&lookup, "CHUNK_SIZE", 512usize)?,
            chunk_overlap: parse_or(&lookup, "CHUNK_OVERLAP", 50usize)?,
            retrieval_top_k: parse_or(&lookup, "RETRIEVAL_TOP_K", 3usize)?,
            bias_rules_path: lookup("BIAS_RULES_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", 20 * 1024 * 1024usize)?,
            port: parse_or(&lookup, "PORT", 8080u16)
                .context("PORT must be a valid port number")?,
            rust_log: text("RUST_LOG", "info"),
        };

        anyhow::ensure!(
            config.chunk_size > config.chunk_overlap,
            "CHUNK_SIZE ({}) must be greater than CHUNK_OVERLAP ({})",
            config.chunk_size,
            config.chunk_overlap
        );
        anyhow::ensure!(config.retrieval_top_k > 0, "RETRIEVAL_TOP_K must be at least 1");

        Ok(config)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw:?}")),
        None => Ok(default),
    }
}
