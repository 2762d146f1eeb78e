use anyhow::{Context, Result};
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "http://localhost:8080";

const API_BASE_VAR: &str = "LIVE_API_URL";
const REFRESH_VAR: &str = "LIVE_REFRESH_MS";
const WAKE_UP_VAR: &str = "LIVE_WAKE_UP_MS";
const TIMEOUT_VAR: &str = "LIVE_TIMEOUT_MS";

/// Read once at session start and handed to every component.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub api_base: String,
    pub refresh_interval: Duration,
    pub wake_up_threshold: Duration,
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base: DEFAULT_API_BASE.to_string(),
            refresh_interval: Duration::from_secs(3),
            wake_up_threshold: Duration::from_secs(3),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl Config {
    pub fn with_api_base(api_base: &str) -> Self {
        Config {
            api_base: api_base.trim_end_matches('/').to_string(),
            ..Config::default()
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = match lookup(API_BASE_VAR).filter(|v| !v.trim().is_empty()) {
            Some(base) => Config::with_api_base(base.trim()),
            None => Config::default(),
        };

        if let Some(d) = millis(&lookup, REFRESH_VAR)? {
            config.refresh_interval = d;
        }
        if let Some(d) = millis(&lookup, WAKE_UP_VAR)? {
            config.wake_up_threshold = d;
        }
        if let Some(d) = millis(&lookup, TIMEOUT_VAR)? {
            config.request_timeout = d;
        }

        Ok(config)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }
}

fn millis(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<Duration>> {
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    let ms: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("{key} must be a number of milliseconds, got {raw:?}"))?;
    anyhow::ensure!(ms > 0, "{key} must be positive");
    Ok(Some(Duration::from_millis(ms)))
}
