//! Client configuration.
//!
//! Sources are layered, later wins: built-in defaults, an optional YAML file,
//! then environment variables:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `SST_BASE_URL` (fallback `BASE_URL`) | `base_url` |
//! | `SST_HTTP_TIMEOUT_MS` (or `SST_HTTP_TIMEOUT_SECS`) | `timeout_ms` |
//! | `SST_PROXY_URL` | `proxy_url` |
//! | `SST_HTTP_POOL_MAX_IDLE_PER_HOST` | `pool_max_idle_per_host` |

use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_CONTENT_TYPE: &str = "application/json;charset=utf-8";
pub const DEFAULT_NOTIFICATION_SECS: u64 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub content_type: String,
    pub proxy_url: Option<String>,
    pub pool_max_idle_per_host: usize,
    pub notification_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost".to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            proxy_url: None,
            pool_max_idle_per_host: 32,
            notification_secs: DEFAULT_NOTIFICATION_SECS,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Defaults overridden by the environment.
    pub fn from_env() -> Result<Self> {
        let cfg = Self::default().merge_env();
        cfg.validate()?;
        Ok(cfg)
    }

    /// YAML file overridden by the environment.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let cfg = Self::from_yaml_str(&raw)?.merge_env();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse YAML only; no environment overrides.
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        let cfg: Self = serde_yaml::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn merge_env(mut self) -> Self {
        if let Some(url) = env::var("SST_BASE_URL")
            .ok()
            .or_else(|| env::var("BASE_URL").ok())
            .filter(|s| !s.trim().is_empty())
        {
            self.base_url = url;
        }
        if let Some(ms) = env::var("SST_HTTP_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .or_else(|| {
                env::var("SST_HTTP_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse::<u64>().ok())
                    .map(|secs| secs.saturating_mul(1000))
            })
        {
            self.timeout_ms = ms;
        }
        if let Ok(proxy) = env::var("SST_PROXY_URL") {
            self.proxy_url = Some(proxy);
        }
        if let Some(n) = env::var("SST_HTTP_POOL_MAX_IDLE_PER_HOST")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
        {
            self.pool_max_idle_per_host = n;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        let parsed = url::Url::parse(&self.base_url).map_err(|e| {
            Error::configuration_with_context(
                "invalid base url",
                ErrorContext::new()
                    .with_field_path("base_url")
                    .with_details(format!("{}: {}", self.base_url, e))
                    .with_source("config"),
            )
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::configuration_with_context(
                "base url must be http or https",
                ErrorContext::new()
                    .with_field_path("base_url")
                    .with_details(parsed.scheme().to_string())
                    .with_source("config"),
            ));
        }
        if self.timeout_ms == 0 {
            return Err(Error::configuration_with_context(
                "timeout must be positive",
                ErrorContext::new()
                    .with_field_path("timeout_ms")
                    .with_source("config"),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn notification_duration(&self) -> Duration {
        Duration::from_secs(self.notification_secs)
    }

    /// Join `path` onto the base URL without doubling or dropping slashes.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        let base = self.base_url.trim_end_matches('/');
        if path.is_empty() {
            base.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }
}
