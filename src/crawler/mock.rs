//! In-memory JSON client for unit tests

use crate::crawler::{FetchError, JsonClient};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Serves canned JSON bodies keyed by URL
///
/// A request matches an exact URL first, then its path alone (query and
/// origin stripped). Unknown URLs answer HTTP 404.
#[derive(Debug, Default)]
pub struct MockJsonClient {
    responses: HashMap<String, Value>,
    failures: HashSet<String>,
    requests: Mutex<Vec<String>>,
}

impl MockJsonClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `body` for a full URL or a bare path
    pub fn with_response(mut self, key: &str, body: Value) -> Self {
        self.responses.insert(key.to_string(), body);
        self
    }

    /// Fails every request for a full URL or a bare path with a decode error
    pub fn with_failure(mut self, key: &str) -> Self {
        self.failures.insert(key.to_string());
        self
    }

    /// Every URL requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// How many requests targeted the given path
    pub fn request_count(&self, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|url| path_of(url) == path)
            .count()
    }
}

fn path_of(url: &str) -> &str {
    let without_query = url.split('?').next().unwrap_or(url);
    match without_query.find("://") {
        Some(scheme_end) => {
            let rest = &without_query[scheme_end + 3..];
            rest.find('/').map(|i| &rest[i..]).unwrap_or("/")
        }
        None => without_query,
    }
}

#[async_trait]
impl JsonClient for MockJsonClient {
    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        let path = path_of(url);

        if self.failures.contains(url) || self.failures.contains(path) {
            return Err(FetchError::Decode {
                url: url.to_string(),
                message: "simulated failure".to_string(),
            });
        }

        self.responses
            .get(url)
            .or_else(|| self.responses.get(path))
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_of() {
        assert_eq!(
            path_of("https://www.nemlig.com/dagligvarer/x?GetAsJson=1"),
            "/dagligvarer/x"
        );
        assert_eq!(path_of("https://www.nemlig.com"), "/");
        assert_eq!(path_of("/dagligvarer"), "/dagligvarer");
    }

    #[tokio::test]
    async fn test_failure_is_a_decode_error() {
        let client = MockJsonClient::new()
            .with_response("/dagligvarer/x", serde_json::json!({"content": []}))
            .with_failure("/dagligvarer/x");

        let err = client
            .get_json("https://www.nemlig.com/dagligvarer/x?GetAsJson=1")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }));
    }
}
