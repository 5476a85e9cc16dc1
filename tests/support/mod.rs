#![allow(dead_code)]

use async_trait::async_trait;
use sst_request::auth::NoToken;
use sst_request::notify::InMemoryNotifier;
use sst_request::transport::{OutboundRequest, RawResponse, Transport, TransportError};
use sst_request::{ClientConfig, RequestClient, RequestTracker};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

type Responder = Box<dyn Fn(&OutboundRequest) -> Result<RawResponse, TransportError> + Send + Sync>;

/// Transport that records every request and answers from a script.
///
/// Gated transports hold each request until the test calls [`open`](Self::open),
/// which keeps requests in flight for as long as a scenario needs.
pub struct ScriptedTransport {
    sent: Mutex<Vec<OutboundRequest>>,
    gate: Option<Semaphore>,
    responder: Responder,
}

impl ScriptedTransport {
    pub fn new(
        responder: impl Fn(&OutboundRequest) -> Result<RawResponse, TransportError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            gate: None,
            responder: Box::new(responder),
        })
    }

    pub fn gated(
        responder: impl Fn(&OutboundRequest) -> Result<RawResponse, TransportError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            gate: Some(Semaphore::new(0)),
            responder: Box::new(responder),
        })
    }

    pub fn ok_json(body: &'static str) -> Arc<Self> {
        Self::new(move |_| Ok(RawResponse::new(200, body)))
    }

    /// Let `n` held requests complete.
    pub fn open(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    pub fn sent(&self) -> Vec<OutboundRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    /// Yield until at least `n` requests reached the transport.
    pub async fn wait_for_sent(&self, n: usize) {
        for _ in 0..1000 {
            if self.sent_count() >= n {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("transport saw {} requests, expected {}", self.sent_count(), n);
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: OutboundRequest) -> Result<RawResponse, TransportError> {
        self.sent.lock().unwrap().push(request.clone());
        match &self.gate {
            Some(gate) => gate.acquire().await.expect("gate closed").forget(),
            None => tokio::task::yield_now().await,
        }
        (self.responder)(&request)
    }
}

pub struct Harness {
    pub client: Arc<RequestClient>,
    pub tracker: Arc<RequestTracker>,
    pub notifier: Arc<InMemoryNotifier>,
}

/// Client over `transport` with a fresh tracker and a recording notifier.
pub fn harness(transport: Arc<ScriptedTransport>) -> Harness {
    let tracker = RequestTracker::shared();
    let notifier = Arc::new(InMemoryNotifier::new());
    let client = RequestClient::builder()
        .config(ClientConfig::new("http://terminal.local/api"))
        .transport(transport)
        .tracker(tracker.clone())
        .token_provider(Arc::new(NoToken))
        .notifier(notifier.clone())
        .build()
        .expect("client");
    Harness {
        client: Arc::new(client),
        tracker,
        notifier,
    }
}
