use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Default message source (one JSON document per locale under this prefix)
pub const DEFAULT_MESSAGES_API_URL: &str = "https://portfolio-api-two-theta.vercel.app/messages";

/// Snippets shipped with the crate, relative to the working directory
pub const DEFAULT_SNIPPETS_DIR: &str = "src/snippets";

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub port: u16,

    // Message source
    pub messages_base_url: String,
    /// When set, messages are read from `{dir}/{locale}.json` instead of the API
    pub messages_dir: Option<PathBuf>,
    /// `None` disables the message cache
    pub message_cache_ttl: Option<Duration>,

    // Snippets
    pub snippets_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let port = match std::env::var("PORT") {
            Ok(v) => v.parse().context("PORT must be a valid port number")?,
            Err(_) => 8080,
        };

        let ttl_secs: u64 = match std::env::var("MESSAGES_CACHE_TTL_SECS") {
            Ok(v) => v
                .parse()
                .context("MESSAGES_CACHE_TTL_SECS must be a number of seconds")?,
            Err(_) => 3600,
        };

        Ok(Self {
            port,

            messages_base_url: std::env::var("MESSAGES_API_URL")
                .unwrap_or_else(|_| DEFAULT_MESSAGES_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            messages_dir: std::env::var("MESSAGES_DIR")
                .ok()
                .filter(|dir| !dir.is_empty())
                .map(PathBuf::from),
            message_cache_ttl: (ttl_secs > 0).then(|| Duration::from_secs(ttl_secs)),

            snippets_dir: std::env::var("SNIPPETS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_SNIPPETS_DIR)),
        })
    }
}
