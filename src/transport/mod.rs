//! Transport seam between the request client and the network.

pub mod http;

pub use http::HttpTransport;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Method;
use std::collections::BTreeMap;

/// Fully resolved request handed to a [`Transport`].
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub query: Option<BTreeMap<String, String>>,
    pub body: Option<serde_json::Value>,
    pub request_id: String,
}

impl OutboundRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Status and raw body of a completed round trip.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Bytes,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Body as JSON. Empty bodies become `null`, non-JSON text becomes a string.
    pub fn json(&self) -> serde_json::Value {
        if self.body.is_empty() {
            return serde_json::Value::Null;
        }
        serde_json::from_slice(&self.body).unwrap_or_else(|_| {
            serde_json::Value::String(String::from_utf8_lossy(&self.body).into_owned())
        })
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one round trip. Any HTTP status is a successful round trip.
    async fn send(&self, request: OutboundRequest) -> Result<RawResponse, TransportError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// No response: connection refused, DNS failure, reset.
    #[error("Network error: {0}")]
    Network(String),

    #[error("timeout of {0}ms exceeded")]
    Timeout(u64),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_response_json_handles_empty_and_text() {
        assert_eq!(RawResponse::new(200, "").json(), serde_json::Value::Null);
        assert_eq!(
            RawResponse::new(200, "plain").json(),
            serde_json::Value::String("plain".into())
        );
        assert_eq!(
            RawResponse::new(200, r#"{"ok":true}"#).json(),
            serde_json::json!({"ok": true})
        );
    }
}
