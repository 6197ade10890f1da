use anyhow::{Context, Result};

const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Startup aborts if the API key is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub google_api_key: String,
    pub gemini_api_base: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so it can be exercised without
    /// touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Config {
            google_api_key: require(&lookup, "GOOGLE_API_KEY")?,
            gemini_api_base: lookup("GEMINI_API_BASE")
                .map(|base| base.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string()),
            port: lookup("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            max_upload_bytes: match lookup("MAX_UPLOAD_BYTES") {
                Some(raw) => raw
                    .parse::<usize>()
                    .context("MAX_UPLOAD_BYTES must be a byte count")?,
                None => DEFAULT_MAX_UPLOAD_BYTES,
            },
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn require<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|value| !value.trim().is_empty())
        .with_context(|| format!("Required environment variable '{key}' is not set"))
}
