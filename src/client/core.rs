use crate::auth::TokenProvider;
use crate::client::signals::SignalsSnapshot;
use crate::client::types::ApiRequest;
use crate::config::ClientConfig;
use crate::notify::{Notification, Notifier};
use crate::tracker::RequestTracker;
use crate::transport::{OutboundRequest, RawResponse, Transport, TransportError};
use crate::{Error, Result};
use futures::StreamExt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// HTTP client that refuses to send the same logical request twice at once.
///
/// Every call goes through the same steps: fingerprint, track, authorize,
/// send, release, classify. Failures other than duplicates are reported to
/// the configured [`Notifier`] before they are returned.
pub struct RequestClient {
    pub(crate) config: ClientConfig,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) tracker: Arc<RequestTracker>,
    pub(crate) tokens: Arc<dyn TokenProvider>,
    pub(crate) notifier: Arc<dyn Notifier>,
}

impl RequestClient {
    /// Client configured from the environment with default collaborators.
    pub fn from_env() -> Result<Self> {
        crate::client::builder::RequestClientBuilder::new().build()
    }

    pub fn builder() -> crate::client::builder::RequestClientBuilder {
        crate::client::builder::RequestClientBuilder::new()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn tracker(&self) -> &Arc<RequestTracker> {
        &self.tracker
    }

    /// Snapshot current in-flight state for diagnostics.
    pub fn signals(&self) -> SignalsSnapshot {
        SignalsSnapshot {
            base_url: self.config.base_url.clone(),
            timeout_ms: self.config.timeout().as_millis() as u64,
            inflight: self.tracker.snapshot(),
        }
    }

    /// Send `request` and return the JSON body of a 200 response.
    ///
    /// When an identical request is still in flight this resolves to
    /// `Ok(Value::Null)` without any network I/O or notification. Use
    /// [`try_execute`](Self::try_execute) to observe the rejection instead.
    pub async fn execute(&self, request: ApiRequest) -> Result<serde_json::Value> {
        match self.try_execute(request).await {
            Err(Error::DuplicateRequest { fingerprint, .. }) => {
                debug!(%fingerprint, "duplicate request absorbed");
                Ok(serde_json::Value::Null)
            }
            other => other,
        }
    }

    /// Like [`execute`](Self::execute), but a request that is already in
    /// flight fails with [`Error::DuplicateRequest`] (status 515).
    pub async fn try_execute(&self, request: ApiRequest) -> Result<serde_json::Value> {
        let fingerprint = request.fingerprint();
        let digest = fingerprint.digest();
        let guard = self.tracker.begin(fingerprint)?;

        let request_id = Uuid::new_v4().to_string();
        let outbound = self.prepare(request, &request_id);
        let method = outbound.method.clone();
        let url = outbound.url.clone();
        debug!(%request_id, %method, %url, fingerprint = %digest, "dispatching request");

        let started = Instant::now();
        let result = self.transport.send(outbound).await;
        // Single release point for both outcomes. Dropping this future
        // before it gets here releases through the guard as well.
        drop(guard);
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(resp) => self.on_response(resp, &request_id, elapsed_ms).await,
            Err(e) => self.on_failure(Error::Transport(e), &request_id).await,
        }
    }

    /// Deserialize the body of a 200 response into `T`.
    ///
    /// `Ok(None)` means the request was absorbed as a duplicate.
    pub async fn execute_json<T: serde::de::DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<Option<T>> {
        match self.try_execute(request).await {
            Ok(value) => Ok(Some(serde_json::from_value(value)?)),
            Err(e) if e.is_duplicate() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn get(&self, path: &str) -> Result<serde_json::Value> {
        self.execute(ApiRequest::get(path)).await
    }

    pub async fn post(&self, path: &str, body: serde_json::Value) -> Result<serde_json::Value> {
        self.execute(ApiRequest::post(path).body(body)).await
    }

    pub async fn put(&self, path: &str, body: serde_json::Value) -> Result<serde_json::Value> {
        self.execute(ApiRequest::put(path).body(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<serde_json::Value> {
        self.execute(ApiRequest::delete(path)).await
    }

    /// Execute several requests concurrently with a concurrency limit.
    ///
    /// Results preserve input order. Identical requests inside one batch are
    /// de-duplicated like any concurrent callers: the extra copies resolve to
    /// `Ok(Value::Null)` without reaching the network.
    pub async fn execute_batch(
        &self,
        requests: Vec<ApiRequest>,
        concurrency_limit: Option<usize>,
    ) -> Vec<Result<serde_json::Value>> {
        let n = requests.len();
        if n == 0 {
            return Vec::new();
        }

        let limit = concurrency_limit.unwrap_or(8).max(1);
        let mut out: Vec<Option<Result<serde_json::Value>>> = (0..n).map(|_| None).collect();

        let results: Vec<(usize, Result<serde_json::Value>)> =
            futures::stream::iter(requests.into_iter().enumerate())
                .map(|(idx, req)| async move { (idx, self.execute(req).await) })
                .buffer_unordered(limit)
                .collect()
                .await;

        for (idx, r) in results {
            out[idx] = Some(r);
        }

        out.into_iter()
            .map(|o| {
                o.unwrap_or_else(|| {
                    Err(Error::Transport(TransportError::Other(
                        "batch result missing".into(),
                    )))
                })
            })
            .collect()
    }

    fn prepare(&self, request: ApiRequest, request_id: &str) -> OutboundRequest {
        let mut headers = request.headers;
        if !request.skip_auth {
            if let Some(token) = self.tokens.token() {
                headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
            }
        }

        OutboundRequest {
            url: self.config.url_for(&request.path),
            method: request.method,
            headers,
            query: request.query,
            body: request.body,
            request_id: request_id.to_string(),
        }
    }

    async fn on_response(
        &self,
        resp: RawResponse,
        request_id: &str,
        elapsed_ms: u64,
    ) -> Result<serde_json::Value> {
        match resp.status {
            200 => {
                info!(%request_id, status = resp.status, elapsed_ms, "request completed");
                Ok(resp.json())
            }
            status @ 201..=299 => {
                debug!(%request_id, status, "non-200 success status rejected");
                Err(Error::Rejected {
                    status,
                    body: resp.json(),
                })
            }
            status => {
                self.on_failure(
                    Error::HttpStatus {
                        status,
                        body: resp.text(),
                    },
                    request_id,
                )
                .await
            }
        }
    }

    async fn on_failure(&self, err: Error, request_id: &str) -> Result<serde_json::Value> {
        let class = err.class();
        warn!(%request_id, class = %class, error = %err, "request failed");
        if class.is_notified() {
            let notification =
                Notification::error(err.user_message(), self.config.notification_duration())
                    .with_request_id(request_id);
            self.notifier.notify(notification).await;
        }
        Err(err)
    }
}
