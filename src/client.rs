//! Request client: tracking, authorization, classification, and notification
//! around a single [`Transport`](crate::transport::Transport).
//!
//! Implementation details are split into submodules under `src/client/`.

pub mod builder;
pub mod core;
pub mod error_classification;
pub mod signals;
pub mod types;

pub use builder::RequestClientBuilder;
pub use core::RequestClient;
pub use error_classification::ErrorClass;
pub use signals::SignalsSnapshot;
pub use types::ApiRequest;
