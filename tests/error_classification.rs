//! Tests for error classification logic

use sst_request::client::error_classification::{
    http_status_message, DUPLICATE_MESSAGE, NETWORK_UNREACHABLE_MESSAGE, TIMEOUT_MESSAGE,
};
use sst_request::transport::TransportError;
use sst_request::{Error, ErrorClass};

#[test]
fn test_http_status_messages_embed_three_digit_code() {
    for status in [400u16, 401, 403, 404, 500, 502, 503] {
        let err = Error::HttpStatus {
            status,
            body: String::new(),
        };
        let msg = err.user_message();
        assert_eq!(msg, http_status_message(status));
        assert!(
            msg.contains(&status.to_string()),
            "message '{}' should embed status {}",
            msg,
            status
        );
    }
}

#[test]
fn test_notified_classes() {
    let notified = vec![
        Error::Transport(TransportError::Network("reset".into())),
        Error::Transport(TransportError::Timeout(10_000)),
        Error::HttpStatus {
            status: 500,
            body: String::new(),
        },
    ];
    for err in notified {
        assert!(err.class().is_notified(), "{:?} should be notified", err);
    }

    let silent = vec![
        Error::duplicate("get//status/undefined/undefined"),
        Error::Rejected {
            status: 204,
            body: serde_json::Value::Null,
        },
    ];
    for err in silent {
        assert!(!err.class().is_notified(), "{:?} should stay silent", err);
    }
}

#[test]
fn test_fixed_messages() {
    assert_eq!(
        Error::duplicate("k").user_message(),
        DUPLICATE_MESSAGE
    );
    assert_eq!(
        Error::Transport(TransportError::Network("x".into())).user_message(),
        NETWORK_UNREACHABLE_MESSAGE
    );
    assert_eq!(
        Error::Transport(TransportError::Timeout(1)).user_message(),
        TIMEOUT_MESSAGE
    );
}

#[test]
fn test_class_names_are_stable() {
    let names: Vec<&str> = [
        ErrorClass::Duplicate,
        ErrorClass::NetworkUnreachable,
        ErrorClass::Timeout,
        ErrorClass::HttpStatus,
        ErrorClass::Rejected,
        ErrorClass::Other,
    ]
    .iter()
    .map(|c| c.as_str())
    .collect();
    assert_eq!(
        names,
        vec![
            "duplicate",
            "network_unreachable",
            "timeout",
            "http_status",
            "rejected",
            "other"
        ]
    );
}
