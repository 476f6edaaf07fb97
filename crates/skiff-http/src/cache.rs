//! Cached-fetch adapter for reactive consumers.
//!
//! A thin stale-while-revalidate layer over the request pipeline: UI code
//! gets the last known body immediately while a background refresh runs.
//! Not part of the core pipeline.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;
use tracing::trace;

use skiff_core::{ErrorPolicy, Request, Result};

use crate::client::Client;

pub(crate) struct QueryCache {
    entries: Mutex<HashMap<String, Value>>,
}

impl QueryCache {
    pub(crate) fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn get(&self, path: &str) -> Option<Value> {
        self.entries.lock().unwrap().get(path).cloned()
    }

    fn put(&self, path: &str, value: Value) {
        self.entries.lock().unwrap().insert(path.to_string(), value);
    }

    fn remove(&self, path: &str) {
        self.entries.lock().unwrap().remove(path);
    }
}

impl Client {
    /// Cached GET of `path`.
    ///
    /// A hit returns the stored body immediately and revalidates in the
    /// background; the refresh runs without spinner or dialog so it never
    /// disturbs the UI. A miss fetches through the normal pipeline,
    /// stores, and returns.
    pub async fn fetch_cached(&self, path: &str) -> Result<Value> {
        if let Some(cached) = self.inner.cache.get(path) {
            trace!(path, "cache hit, revalidating in background");
            let client = self.clone();
            let path = path.to_string();
            tokio::spawn(async move {
                let refresh = Request::get(&path)
                    .spinner(false)
                    .error_policy(ErrorPolicy::Silent);
                if let Ok(Some(fresh)) = client.execute(refresh).await {
                    client.inner.cache.put(&path, fresh);
                }
            });
            return Ok(cached);
        }

        let body = self.execute(Request::get(path)).await?.unwrap_or(Value::Null);
        self.inner.cache.put(path, body.clone());
        Ok(body)
    }

    /// Drop the cached entry for `path`, forcing the next fetch to hit
    /// the network.
    pub fn invalidate_cached(&self, path: &str) {
        self.inner.cache.remove(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn put_get_remove() {
        let cache = QueryCache::new();
        assert!(cache.get("/feed").is_none());

        cache.put("/feed", json!({"v": 1}));
        assert_eq!(cache.get("/feed"), Some(json!({"v": 1})));

        cache.put("/feed", json!({"v": 2}));
        assert_eq!(cache.get("/feed"), Some(json!({"v": 2})));

        cache.remove("/feed");
        assert!(cache.get("/feed").is_none());
    }
}
