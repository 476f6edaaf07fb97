//! Request descriptor types.

use serde_json::Value;
use std::fmt;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    /// Returns the method as an uppercase wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do with a failure before it reaches the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Propagate the error without presenting it.
    Silent,
    /// Present an error dialog, then propagate.
    #[default]
    Report,
    /// Present an error dialog and swallow the error.
    ReportAndSwallow,
}

/// Describes one outgoing request.
///
/// Constructed per call and fully consumed by a single `execute`
/// invocation. Query pairs are serialized in insertion order.
#[derive(Debug, Clone)]
pub struct Request {
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub method: Method,
    /// Bracket the dispatch with the shared loading indicator.
    pub spinner: bool,
    /// Skip the debounce delay when showing the indicator.
    pub instant_spinner: bool,
    pub error_policy: ErrorPolicy,
}

impl Request {
    /// Create a request with the default settings: spinner on (debounced),
    /// errors reported via dialog.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
            body: None,
            method,
            spinner: true,
            instant_spinner: false,
            error_policy: ErrorPolicy::default(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Append a query pair. Pairs serialize in the order they were added.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Set the JSON request body.
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Enable or disable the shared loading indicator for this call.
    pub fn spinner(mut self, spinner: bool) -> Self {
        self.spinner = spinner;
        self
    }

    /// Show the loading indicator without the debounce delay.
    pub fn instant_spinner(mut self, instant: bool) -> Self {
        self.instant_spinner = instant;
        self
    }

    pub fn error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_request_conventions() {
        let req = Request::get("/items");
        assert_eq!(req.method, Method::Get);
        assert!(req.spinner);
        assert!(!req.instant_spinner);
        assert_eq!(req.error_policy, ErrorPolicy::Report);
        assert!(req.query.is_empty());
        assert!(req.body.is_none());
    }

    #[test]
    fn query_preserves_insertion_order() {
        let req = Request::get("/items").query("b", "2").query("a", "1");
        assert_eq!(
            req.query,
            vec![("b".to_string(), "2".to_string()), ("a".to_string(), "1".to_string())]
        );
    }
}
