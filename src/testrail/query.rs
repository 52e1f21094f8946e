//! Query-string construction for TestRail list endpoints.
//!
//! TestRail routes requests through `index.php?/api/v2/<endpoint>`, so the
//! `?` is already taken by the route and filters are appended as
//! `&key=value`. Only parameters the caller supplied are emitted.

use std::fmt::Display;
use url::form_urlencoded;

/// Ordered set of query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(&'static str, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `key=value` when a value is present
    pub fn opt<V: Display>(mut self, key: &'static str, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.pairs.push((key, value.to_string()));
        }
        self
    }

    /// Add `key=a,b,c` when the list is present and non-empty
    pub fn list<V: Display>(mut self, key: &'static str, values: Option<&[V]>) -> Self {
        if let Some(values) = values.filter(|v| !v.is_empty()) {
            let joined = values
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",");
            self.pairs.push((key, joined));
        }
        self
    }

    /// Add `key=1` / `key=0` when a flag is present
    pub fn flag(mut self, key: &'static str, value: Option<bool>) -> Self {
        if let Some(value) = value {
            self.pairs.push((key, if value { "1" } else { "0" }.to_string()));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Parameter names in insertion order (safe to log)
    pub fn keys(&self) -> Vec<&'static str> {
        self.pairs.iter().map(|(k, _)| *k).collect()
    }

    /// Form-urlencoded `k=v&k=v`, without a leading separator
    pub fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.pairs {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }

    /// Append the query to an endpoint path
    pub fn apply(&self, endpoint: &str) -> String {
        if self.is_empty() {
            endpoint.to_string()
        } else {
            format!("{}&{}", endpoint, self.encode())
        }
    }
}
