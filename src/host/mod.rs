//! 终端宿主运行环境桥接：把回调式的服务调用转换为 future。
//!
//! Host runtime bridge.
//!
//! The terminal host exposes two primitives that run a named command on a
//! named service: a synchronous one and an asynchronous one with a timeout.
//! Both take the argument as a JSON string and report back exactly once
//! through a callback with a JSON envelope:
//!
//! ```json
//! { "resultCode": 0, "resultMessage": "", "data": {} }
//! ```
//!
//! A primitive returning `false` means the call was not accepted and the
//! callback will never run. [`HostClient`] turns this convention into
//! `async fn`s returning [`Result`].

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// Receives the JSON envelope of one host call.
pub type HostCallback = Box<dyn FnOnce(String) + Send + 'static>;

pub trait HostRuntime: Send + Sync {
    fn exec_service_sync(
        &self,
        service_id: &str,
        command: &str,
        argument: &str,
        callback: HostCallback,
    ) -> bool;

    fn exec_service_async(
        &self,
        service_id: &str,
        command: &str,
        argument: &str,
        timeout_ms: u64,
        callback: HostCallback,
    ) -> bool;
}

/// Stand-in used when no host middleware is present. Refuses every call.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableRuntime;

impl HostRuntime for UnavailableRuntime {
    fn exec_service_sync(&self, service_id: &str, command: &str, _: &str, _: HostCallback) -> bool {
        warn!(service_id, command, "host runtime unavailable");
        false
    }

    fn exec_service_async(
        &self,
        service_id: &str,
        command: &str,
        _: &str,
        _: u64,
        _: HostCallback,
    ) -> bool {
        warn!(service_id, command, "host runtime unavailable");
        false
    }
}

/// Result envelope reported by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostResult {
    pub result_code: i64,
    #[serde(default)]
    pub result_message: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl HostResult {
    pub fn is_success(&self) -> bool {
        self.result_code == 0
    }

    /// `data` on success, [`Error::HostCommand`] otherwise.
    pub fn into_data(self) -> Result<serde_json::Value> {
        if self.is_success() {
            Ok(self.data)
        } else {
            Err(Error::HostCommand {
                code: self.result_code,
                message: self.result_message,
            })
        }
    }
}

#[derive(Clone)]
pub struct HostClient {
    runtime: Arc<dyn HostRuntime>,
}

impl HostClient {
    pub fn new(runtime: Arc<dyn HostRuntime>) -> Self {
        Self { runtime }
    }

    /// Client bound to [`UnavailableRuntime`].
    pub fn unavailable() -> Self {
        Self::new(Arc::new(UnavailableRuntime))
    }

    /// Run `command` through the synchronous primitive and return `data`.
    pub async fn exec<A: Serialize + ?Sized>(
        &self,
        service_id: &str,
        command: &str,
        argument: &A,
    ) -> Result<serde_json::Value> {
        self.exec_raw(service_id, command, argument, None)
            .await?
            .into_data()
    }

    /// Run `command` through the asynchronous primitive and return `data`.
    pub async fn exec_async<A: Serialize + ?Sized>(
        &self,
        service_id: &str,
        command: &str,
        argument: &A,
        timeout: Duration,
    ) -> Result<serde_json::Value> {
        self.exec_raw(service_id, command, argument, Some(timeout))
            .await?
            .into_data()
    }

    /// Run `command` and return the envelope without interpreting `resultCode`.
    pub async fn exec_raw<A: Serialize + ?Sized>(
        &self,
        service_id: &str,
        command: &str,
        argument: &A,
        timeout: Option<Duration>,
    ) -> Result<HostResult> {
        let argument = serde_json::to_string(argument)?;
        let (tx, rx) = oneshot::channel::<String>();
        let callback: HostCallback = Box::new(move |json| {
            let _ = tx.send(json);
        });

        let accepted = match timeout {
            Some(t) => self.runtime.exec_service_async(
                service_id,
                command,
                &argument,
                t.as_millis() as u64,
                callback,
            ),
            None => self
                .runtime
                .exec_service_sync(service_id, command, &argument, callback),
        };
        if !accepted {
            return Err(Error::HostUnavailable {
                service_id: service_id.to_string(),
                command: command.to_string(),
            });
        }

        let json = rx.await.map_err(|_| Error::HostCallbackDropped {
            service_id: service_id.to_string(),
            command: command.to_string(),
        })?;
        let result: HostResult = serde_json::from_str(&json)?;
        debug!(service_id, command, result_code = result.result_code, "host call completed");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    /// Replies with a fixed envelope from a spawned task, recording each call.
    struct ScriptedRuntime {
        reply: Option<String>,
        calls: Mutex<Vec<(String, String, String, Option<u64>)>>,
    }

    impl ScriptedRuntime {
        fn replying(reply: serde_json::Value) -> Arc<Self> {
            Arc::new(Self {
                reply: Some(reply.to_string()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn silent() -> Arc<Self> {
            Arc::new(Self {
                reply: None,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn run(&self, s: &str, c: &str, a: &str, t: Option<u64>, cb: HostCallback) -> bool {
            self.calls
                .lock()
                .unwrap()
                .push((s.to_string(), c.to_string(), a.to_string(), t));
            match self.reply.clone() {
                Some(reply) => {
                    tokio::spawn(async move { cb(reply) });
                }
                // Accept the call but never invoke the callback.
                None => drop(cb),
            }
            true
        }
    }

    impl HostRuntime for ScriptedRuntime {
        fn exec_service_sync(&self, s: &str, c: &str, a: &str, cb: HostCallback) -> bool {
            self.run(s, c, a, None, cb)
        }

        fn exec_service_async(&self, s: &str, c: &str, a: &str, t: u64, cb: HostCallback) -> bool {
            self.run(s, c, a, Some(t), cb)
        }
    }

    #[tokio::test]
    async fn exec_returns_data_on_zero_result_code() {
        let runtime = ScriptedRuntime::replying(json!({
            "resultCode": 0,
            "resultMessage": "",
            "data": {"status": "ready"}
        }));
        let client = HostClient::new(runtime.clone());

        let data = client
            .exec("printerService", "GetStatus", &json!({"deviceId": "p1"}))
            .await
            .unwrap();
        assert_eq!(data, json!({"status": "ready"}));

        let calls = runtime.calls.lock().unwrap();
        assert_eq!(calls[0].0, "printerService");
        assert_eq!(calls[0].2, r#"{"deviceId":"p1"}"#);
        assert_eq!(calls[0].3, None);
    }

    #[tokio::test]
    async fn exec_async_forwards_timeout() {
        let runtime = ScriptedRuntime::replying(json!({"resultCode": 0}));
        let client = HostClient::new(runtime.clone());

        let data = client
            .exec_async("cameraService", "Capture", &json!({}), Duration::from_secs(30))
            .await
            .unwrap();
        assert_eq!(data, serde_json::Value::Null);
        assert_eq!(runtime.calls.lock().unwrap()[0].3, Some(30_000));
    }

    #[tokio::test]
    async fn non_zero_result_code_is_command_error() {
        let runtime = ScriptedRuntime::replying(json!({
            "resultCode": -1,
            "resultMessage": "device offline"
        }));
        let err = HostClient::new(runtime)
            .exec("scannerService", "Open", &json!({}))
            .await
            .unwrap_err();
        match err {
            Error::HostCommand { code, message } => {
                assert_eq!(code, -1);
                assert_eq!(message, "device offline");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn refused_call_is_unavailable() {
        let err = HostClient::unavailable()
            .exec("cardReaderService", "Read", &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::HostUnavailable { .. }));
    }

    #[tokio::test]
    async fn dropped_callback_is_reported() {
        let err = HostClient::new(ScriptedRuntime::silent())
            .exec("svc", "cmd", &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::HostCallbackDropped { .. }));
    }

    #[tokio::test]
    async fn exec_raw_keeps_failed_envelope() {
        let runtime = ScriptedRuntime::replying(json!({"resultCode": 7, "resultMessage": "busy"}));
        let result = HostClient::new(runtime)
            .exec_raw("svc", "cmd", &json!({}), None)
            .await
            .unwrap();
        assert!(!result.is_success());
        assert_eq!(result.result_message, "busy");
    }
}
