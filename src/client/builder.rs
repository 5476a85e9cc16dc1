use crate::auth::{EnvToken, TokenProvider};
use crate::client::core::RequestClient;
use crate::config::ClientConfig;
use crate::notify::Notifier;
use crate::tracker::RequestTracker;
use crate::transport::{HttpTransport, Transport};
use crate::Result;
use std::sync::Arc;
use std::time::Duration;

/// Builder for creating clients with custom configuration.
///
/// Every collaborator has a default: configuration from the environment, the
/// reqwest transport, the process-wide tracker, `SST_AUTH_TOKEN` for tokens,
/// and a `tracing` notifier.
pub struct RequestClientBuilder {
    config: Option<ClientConfig>,
    base_url_override: Option<String>,
    timeout_override: Option<Duration>,
    transport: Option<Arc<dyn Transport>>,
    tracker: Option<Arc<RequestTracker>>,
    tokens: Arc<dyn TokenProvider>,
    notifier: Arc<dyn Notifier>,
}

impl RequestClientBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            base_url_override: None,
            timeout_override: None,
            transport: None,
            tracker: None,
            tokens: Arc::new(EnvToken::default()),
            notifier: crate::notify::tracing_notifier(),
        }
    }

    /// Use an explicit configuration instead of reading the environment.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Override the base URL (primarily for testing with mock servers).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url_override = Some(base_url.into());
        self
    }

    /// Override the transport timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout_override = Some(timeout);
        self
    }

    /// Replace the reqwest transport, e.g. with a scripted one in tests.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Share an in-flight tracker. Without one the process-wide tracker is used.
    pub fn tracker(mut self, tracker: Arc<RequestTracker>) -> Self {
        self.tracker = Some(tracker);
        self
    }

    pub fn token_provider(mut self, tokens: Arc<dyn TokenProvider>) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn build(self) -> Result<RequestClient> {
        let mut config = match self.config {
            Some(cfg) => cfg,
            None => ClientConfig::from_env()?,
        };
        if let Some(url) = self.base_url_override {
            config.base_url = url;
        }
        if let Some(timeout) = self.timeout_override {
            config.timeout_ms = (timeout.as_millis() as u64).max(1);
        }
        config.validate()?;

        let transport = match self.transport {
            Some(t) => t,
            None => Arc::new(HttpTransport::new(&config)?),
        };

        Ok(RequestClient {
            config,
            transport,
            tracker: self.tracker.unwrap_or_else(RequestTracker::global),
            tokens: self.tokens,
            notifier: self.notifier,
        })
    }
}

impl Default for RequestClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
