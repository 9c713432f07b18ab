//! Widget configuration parsed from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use crate::throttle::DEFAULT_MIN_INTERVAL_MS;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_STORE_DIR: &str = ".krishi-chat";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetConfig {
    /// Backend origin; the chat endpoint is `{api_base_url}/api/chat`.
    pub api_base_url: String,
    /// Minimum spacing between two accepted submits.
    pub min_submit_interval: Duration,
    /// Directory backing the file store.
    pub store_dir: PathBuf,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            min_submit_interval: Duration::from_millis(DEFAULT_MIN_INTERVAL_MS),
            store_dir: PathBuf::from(DEFAULT_STORE_DIR),
        }
    }
}

impl WidgetConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `KRISHI_API_BASE_URL`: default `http://127.0.0.1:5000`
    /// - `KRISHI_THROTTLE_MS`: default 1000
    /// - `KRISHI_STORE_DIR`: default `.krishi-chat`
    #[must_use]
    pub fn from_env() -> Self {
        let api_base_url = std::env::var("KRISHI_API_BASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_owned())
            .trim_end_matches('/')
            .to_owned();
        let min_submit_interval = Duration::from_millis(env_parse("KRISHI_THROTTLE_MS", DEFAULT_MIN_INTERVAL_MS));
        let store_dir = std::env::var_os("KRISHI_STORE_DIR")
            .map_or_else(|| PathBuf::from(DEFAULT_STORE_DIR), PathBuf::from);
        Self { api_base_url, min_submit_interval, store_dir }
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
