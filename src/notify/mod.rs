//! 用户提示通道：请求失败时向界面推送短暂的错误消息。
//!
//! User-facing notification channel.
//!
//! Failed requests are reported to a [`Notifier`] with their classified
//! message. Rendering is up to the application; the crate ships:
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`NoopNotifier`] | Drops every notification |
//! | [`TracingNotifier`] | Logs notifications through `tracing` |
//! | [`InMemoryNotifier`] | Keeps notifications for inspection in tests |

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

/// A transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
    pub duration: Duration,
    /// Request id of the failed dispatch, for correlation with logs.
    pub request_id: Option<String>,
}

impl Notification {
    pub fn error(message: impl Into<String>, duration: Duration) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Error,
            duration,
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: Notification);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, _notification: Notification) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, notification: Notification) {
        let request_id = notification.request_id.as_deref().unwrap_or("-");
        let display_ms = notification.duration.as_millis() as u64;
        match notification.level {
            NotificationLevel::Error => tracing::error!(
                request_id,
                display_ms,
                "{}",
                notification.message
            ),
            NotificationLevel::Warning => tracing::warn!(
                request_id,
                display_ms,
                "{}",
                notification.message
            ),
            NotificationLevel::Info => tracing::info!(
                request_id,
                display_ms,
                "{}",
                notification.message
            ),
        }
    }
}

/// In-memory notifier for testing.
#[derive(Debug, Default)]
pub struct InMemoryNotifier {
    events: RwLock<Vec<Notification>>,
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.events.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.notifications().into_iter().map(|n| n.message).collect()
    }

    pub fn len(&self) -> usize {
        self.events.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.events.write().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

#[async_trait]
impl Notifier for InMemoryNotifier {
    async fn notify(&self, notification: Notification) {
        self.events
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(notification);
    }
}

pub fn tracing_notifier() -> Arc<dyn Notifier> {
    Arc::new(TracingNotifier)
}

pub fn noop_notifier() -> Arc<dyn Notifier> {
    Arc::new(NoopNotifier)
}
