//! # sst-request
//!
//! 自助终端前端的请求层：在途请求去重、统一错误提示、宿主运行环境桥接。
//!
//! Request layer for self-service terminal front ends.
//!
//! ## Overview
//!
//! The centrepiece is the in-flight request tracker: every outgoing request is
//! fingerprinted from its method, path, body, and query. While a request is
//! outstanding, an identical one is rejected before any network I/O, and the
//! fingerprint is released again however the first request ends.
//!
//! Around the tracker sits a small HTTP client that applies the terminal's
//! conventions: a base URL from configuration, a 10 second timeout, a JSON
//! content type, a bearer token from a pluggable credential store, and
//! classification of failures into short user-facing messages pushed to a
//! notification channel.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sst_request::{ApiRequest, RequestClient};
//!
//! #[tokio::main]
//! async fn main() -> sst_request::Result<()> {
//!     let client = RequestClient::builder()
//!         .base_url("http://127.0.0.1:8080/api")
//!         .build()?;
//!
//!     let user = client
//!         .execute(ApiRequest::post("/login").body(serde_json::json!({"user": "a"})))
//!         .await;
//!     match user {
//!         // A second click while the first login is still running.
//!         Ok(serde_json::Value::Null) => {}
//!         Ok(body) => println!("{body}"),
//!         Err(e) => eprintln!("{}", e.user_message()),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`tracker`] | Fingerprints and the in-flight set |
//! | [`client`] | Request client, builder, error classification |
//! | [`transport`] | Transport trait and the reqwest implementation |
//! | [`config`] | Layered client configuration |
//! | [`auth`] | Bearer token providers |
//! | [`notify`] | User-facing notification channel |
//! | [`host`] | Callback bridge to the terminal host runtime |

pub mod auth;
pub mod client;
pub mod config;
pub mod host;
pub mod notify;
pub mod tracker;
pub mod transport;

pub use client::{ApiRequest, ErrorClass, RequestClient, RequestClientBuilder, SignalsSnapshot};
pub use config::ClientConfig;
pub use host::{HostClient, HostResult, HostRuntime};
pub use notify::{Notification, Notifier};
pub use tracker::{Fingerprint, InflightGuard, RequestTracker, TrackerSnapshot};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
