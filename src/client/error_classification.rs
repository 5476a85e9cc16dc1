//! Error classification logic

use crate::transport::TransportError;
use crate::Error;

pub const DUPLICATE_MESSAGE: &str = "请求重复";
pub const NETWORK_UNREACHABLE_MESSAGE: &str = "后端接口连接异常";
pub const TIMEOUT_MESSAGE: &str = "系统接口请求超时";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Same fingerprint already in flight.
    Duplicate,
    /// No response from the server.
    NetworkUnreachable,
    Timeout,
    /// Non-2xx response.
    HttpStatus,
    /// 2xx other than 200.
    Rejected,
    Other,
}

impl ErrorClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorClass::Duplicate => "duplicate",
            ErrorClass::NetworkUnreachable => "network_unreachable",
            ErrorClass::Timeout => "timeout",
            ErrorClass::HttpStatus => "http_status",
            ErrorClass::Rejected => "rejected",
            ErrorClass::Other => "other",
        }
    }

    /// Duplicates are swallowed silently; rejected 2xx bodies go straight back
    /// to the caller. Everything else reaches the user.
    pub fn is_notified(&self) -> bool {
        !matches!(self, ErrorClass::Duplicate | ErrorClass::Rejected)
    }
}

impl std::fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn http_status_message(status: u16) -> String {
    format!("系统接口{}异常", status)
}

pub(crate) fn classify(err: &Error) -> ErrorClass {
    match err {
        Error::DuplicateRequest { .. } => ErrorClass::Duplicate,
        Error::HttpStatus { .. } => ErrorClass::HttpStatus,
        Error::Rejected { .. } => ErrorClass::Rejected,
        Error::Transport(t) => match t {
            TransportError::Network(_) => ErrorClass::NetworkUnreachable,
            TransportError::Timeout(_) => ErrorClass::Timeout,
            TransportError::Http(e) if e.is_timeout() => ErrorClass::Timeout,
            TransportError::Http(e) if e.is_connect() => ErrorClass::NetworkUnreachable,
            _ => ErrorClass::Other,
        },
        _ => ErrorClass::Other,
    }
}

pub(crate) fn user_message(err: &Error) -> String {
    match classify(err) {
        ErrorClass::Duplicate => DUPLICATE_MESSAGE.to_string(),
        ErrorClass::NetworkUnreachable => NETWORK_UNREACHABLE_MESSAGE.to_string(),
        ErrorClass::Timeout => TIMEOUT_MESSAGE.to_string(),
        ErrorClass::HttpStatus | ErrorClass::Rejected => {
            http_status_message(err.status().unwrap_or_default())
        }
        ErrorClass::Other => err.to_string(),
    }
}
