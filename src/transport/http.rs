use super::{OutboundRequest, RawResponse, Transport, TransportError};
use crate::config::ClientConfig;
use crate::Result;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Proxy;
use std::time::Duration;

pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        let content_type = HeaderValue::from_str(&config.content_type).map_err(|e| {
            crate::Error::configuration_with_context(
                "invalid content type",
                crate::ErrorContext::new()
                    .with_field_path("content_type")
                    .with_details(e.to_string())
                    .with_source("transport"),
            )
        })?;
        default_headers.insert(CONTENT_TYPE, content_type);

        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout())
            .default_headers(default_headers)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(Some(Duration::from_secs(90)));

        if let Some(proxy_url) = &config.proxy_url {
            if let Ok(proxy) = Proxy::all(proxy_url) {
                builder = builder.proxy(proxy);
            } else {
                tracing::warn!(proxy_url = %proxy_url, "ignoring unparsable proxy url");
            }
        }

        let client = builder
            .build()
            .map_err(|e| crate::Error::Transport(TransportError::Other(e.to_string())))?;

        Ok(Self {
            client,
            timeout: config.timeout(),
        })
    }

    fn classify(&self, e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout(self.timeout.as_millis() as u64)
        } else if e.is_connect() || e.is_request() {
            TransportError::Network(e.to_string())
        } else {
            TransportError::Http(e)
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: OutboundRequest) -> std::result::Result<RawResponse, TransportError> {
        let mut req = self
            .client
            .request(request.method.clone(), &request.url)
            .header("x-request-id", &request.request_id);

        for (k, v) in &request.headers {
            req = req.header(k.as_str(), v.as_str());
        }

        if let Some(params) = &request.query {
            req = req.query(params);
        }

        if let Some(body) = &request.body {
            // `.json()` would replace the configured content type; send raw bytes instead.
            let bytes = serde_json::to_vec(body).map_err(|e| TransportError::Other(e.to_string()))?;
            req = req.body(bytes);
        }

        let response = req.send().await.map_err(|e| self.classify(e))?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| self.classify(e))?;

        Ok(RawResponse { status, body })
    }
}
