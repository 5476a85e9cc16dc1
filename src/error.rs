use crate::client::error_classification::{self, ErrorClass};
use crate::transport::TransportError;
use thiserror::Error;

/// Sentinel status carried by a duplicate-request rejection.
pub const DUPLICATE_STATUS: u16 = 515;

/// Structured error context for configuration and host errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Configuration key or field that caused the error (e.g., "base_url", "timeout_secs")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., the rejected value)
    pub details: Option<String>,
    /// Source of the error (e.g., "config", "host_bridge")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Unified error type for the request layer.
#[derive(Debug, Error)]
pub enum Error {
    /// An identical request is already in flight. Never dispatched.
    #[error("duplicate request rejected (status {status}): {fingerprint}")]
    DuplicateRequest { fingerprint: String, status: u16 },

    /// The server answered with a non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// The server answered 2xx but not 200; the raw body is handed back.
    #[error("response rejected with status {status}")]
    Rejected { status: u16, body: serde_json::Value },

    #[error("Network transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    /// The host runtime refused the call; its callback will never run.
    #[error("host runtime did not accept {service_id}/{command}")]
    HostUnavailable { service_id: String, command: String },

    #[error("host runtime dropped the callback for {service_id}/{command}")]
    HostCallbackDropped { service_id: String, command: String },

    /// The host runtime ran the command and reported a non-zero result code.
    #[error("host command failed ({code}): {message}")]
    HostCommand { code: i64, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    pub fn duplicate(fingerprint: impl Into<String>) -> Self {
        Error::DuplicateRequest {
            fingerprint: fingerprint.into(),
            status: DUPLICATE_STATUS,
        }
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration {
            message: msg.into(),
            context: ErrorContext::new(),
        }
    }

    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Error::DuplicateRequest { .. })
    }

    /// HTTP-like status for this error, if it carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::DuplicateRequest { status, .. }
            | Error::HttpStatus { status, .. }
            | Error::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn class(&self) -> ErrorClass {
        error_classification::classify(self)
    }

    /// Message suitable for the user-visible notification channel.
    pub fn user_message(&self) -> String {
        error_classification::user_message(self)
    }

    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } => Some(context),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_carries_sentinel_status() {
        let err = Error::duplicate("post//login/{}/undefined");
        assert!(err.is_duplicate());
        assert_eq!(err.status(), Some(DUPLICATE_STATUS));
    }

    #[test]
    fn configuration_display_includes_context() {
        let err = Error::configuration_with_context(
            "invalid base url",
            ErrorContext::new()
                .with_field_path("base_url")
                .with_source("config"),
        );
        let text = err.to_string();
        assert!(text.contains("invalid base url"));
        assert!(text.contains("field: base_url"));
        assert!(text.contains("source: config"));
        assert!(err.context().is_some());
    }
}
