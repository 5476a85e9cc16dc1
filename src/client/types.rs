use crate::tracker::Fingerprint;
use reqwest::Method;
use std::collections::BTreeMap;

/// A logical API call, before base URL, auth, and tracking are applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<serde_json::Value>,
    pub query: Option<BTreeMap<String, String>>,
    pub headers: Vec<(String, String)>,
    /// Do not attach the bearer token even when one is available.
    pub skip_auth: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            query: None,
            headers: Vec::new(),
            skip_auth: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Serialize any value as the JSON body.
    pub fn json<T: serde::Serialize + ?Sized>(self, body: &T) -> crate::Result<Self> {
        Ok(self.body(serde_json::to_value(body)?))
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn skip_auth(mut self) -> Self {
        self.skip_auth = true;
        self
    }

    /// Headers do not take part; two calls differing only in headers are duplicates.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::new(
            &self.method,
            &self.path,
            self.body.as_ref(),
            self.query.as_ref(),
        )
    }
}
