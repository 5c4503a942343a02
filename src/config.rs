//! Runtime settings from environment variables, with an optional `.env`.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Everything the CLI and server need to know about their environment.
#[derive(Debug, Clone)]
pub struct Settings {
    /// HTTP bind address, e.g. `127.0.0.1:8787`.
    pub bind_http: String,
    /// Path of the persisted events document.
    pub store_path: PathBuf,
    /// Synchronous-parse size ceiling in bytes. PDFs may be 10x this.
    pub max_document_bytes: usize,
    /// Timeout for a single URL fetch.
    pub fetch_timeout: Duration,
    /// Production deployments disable the URL-fetch endpoint outright.
    pub production: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            bind_http: "127.0.0.1:8787".to_string(),
            store_path: PathBuf::from("events.json"),
            max_document_bytes: 50 * 1024,
            fetch_timeout: Duration::from_millis(10_000),
            production: false,
        }
    }
}

impl Settings {
    /// Load settings, letting the environment override each default.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = Settings::default();

        let max_kb = env::var("MAX_DOCUMENT_KB")
            .ok()
            .and_then(|v| v.parse::<usize>().ok());

        Settings {
            bind_http: env::var("BIND_HTTP").unwrap_or(defaults.bind_http),
            store_path: env::var("STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.store_path),
            max_document_bytes: max_kb
                .map(|kb| kb * 1024)
                .unwrap_or(defaults.max_document_bytes),
            fetch_timeout: env::var("FETCH_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.fetch_timeout),
            production: env::var("APP_ENV").map(|v| v == "production").unwrap_or(false),
        }
    }

    /// The ceiling in whole kilobytes, for user-facing messages.
    pub fn max_document_kb(&self) -> usize {
        self.max_document_bytes / 1024
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_ceilings() {
        let settings = Settings::default();
        assert_eq!(settings.max_document_bytes, 51_200);
        assert_eq!(settings.max_document_kb(), 50);
        assert_eq!(settings.fetch_timeout, Duration::from_secs(10));
        assert!(!settings.production);
    }
}
