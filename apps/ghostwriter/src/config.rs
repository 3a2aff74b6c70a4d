use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
///
/// Engine tunables (poll interval, attempt budget, length ceiling, pacing)
/// are compile-time constants and deliberately absent here.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// When set, the watermark lives in Redis instead of a local file.
    pub redis_url: Option<String>,
    pub watermark_path: PathBuf,
    pub anthropic_api_key: String,
    pub openai_api_key: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let require = |key: &str| {
            lookup(key)
                .with_context(|| format!("Required environment variable '{key}' is not set"))
        };

        Ok(Config {
            database_url: require("DATABASE_URL")?,
            redis_url: lookup("REDIS_URL").filter(|url| !url.trim().is_empty()),
            watermark_path: lookup("WATERMARK_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("last_processed_time.txt")),
            anthropic_api_key: require("ANTHROPIC_API_KEY")?,
            openai_api_key: require("OPENAI_API_KEY")?,
            port: lookup("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}
