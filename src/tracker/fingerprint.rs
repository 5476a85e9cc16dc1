//! Request fingerprints.

use reqwest::Method;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Placeholder written for an absent body or query.
const ABSENT: &str = "undefined";

/// Deterministic key identifying a logical request.
///
/// Layout is `{method}/{path}/{body}/{query}` with a lowercase method and
/// compact JSON for body and query. Query parameters live in an ordered map,
/// so insertion order does not change the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn new(
        method: &Method,
        path: &str,
        body: Option<&serde_json::Value>,
        query: Option<&BTreeMap<String, String>>,
    ) -> Self {
        let body = body
            .map(|b| serde_json::to_string(b).unwrap_or_else(|_| ABSENT.to_string()))
            .unwrap_or_else(|| ABSENT.to_string());
        let query = query
            .map(|q| serde_json::to_string(q).unwrap_or_else(|_| ABSENT.to_string()))
            .unwrap_or_else(|| ABSENT.to_string());
        Self(format!(
            "{}/{}/{}/{}",
            method.as_str().to_lowercase(),
            path,
            body,
            query
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short SHA-256 digest, safe to log without leaking request bodies.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.0.as_bytes());
        hasher
            .finalize()
            .iter()
            .take(6)
            .map(|b| format!("{:02x}", b))
            .collect()
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Fingerprint {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Fingerprint {
    fn from(s: String) -> Self {
        Self(s)
    }
}
