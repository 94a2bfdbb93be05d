//! Mock HTTP client for testing.
//!
//! Provides a configurable mock HTTP client that can return predefined
//! responses or errors, optionally after a simulated network latency so
//! tests can interleave concurrent callers at the suspension point.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::traits::{Headers, HttpClient, HttpError, Response};

/// A recorded HTTP request for verification in tests.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method
    pub method: String,
    /// Request URL
    pub url: String,
    /// Request headers
    pub headers: Headers,
    /// Request body (for POST/PUT requests)
    pub body: Option<String>,
}

/// Configuration for a mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return a response (any status, including 401/500)
    Success(Response),
    /// Return a transport error
    Error(HttpError),
}

/// Mock HTTP client for testing.
///
/// Responses are configured per URL; each URL holds a sequence that is
/// consumed in order, with the last entry repeating. URLs are matched
/// exactly first, then by prefix.
#[derive(Debug, Clone)]
pub struct MockHttpClient {
    /// Configured response sequences by URL pattern
    responses: Arc<Mutex<HashMap<String, VecDeque<MockResponse>>>>,
    /// Default response when no specific match
    default_response: Arc<Mutex<Option<MockResponse>>>,
    /// Recorded requests for verification
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    /// Simulated network latency applied to every request
    latency: Arc<Mutex<Option<Duration>>>,
}

impl MockHttpClient {
    /// Create a new mock HTTP client.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            default_response: Arc::new(Mutex::new(None)),
            requests: Arc::new(Mutex::new(Vec::new())),
            latency: Arc::new(Mutex::new(None)),
        }
    }

    /// Set the response for a URL, replacing any configured sequence.
    pub fn set_response(&self, url: &str, response: MockResponse) {
        let mut responses = self.responses.lock().unwrap();
        responses.insert(url.to_string(), VecDeque::from([response]));
    }

    /// Append a response to the URL's sequence.
    ///
    /// Sequences are consumed in order; the last entry repeats once the
    /// sequence is exhausted.
    pub fn push_response(&self, url: &str, response: MockResponse) {
        let mut responses = self.responses.lock().unwrap();
        responses
            .entry(url.to_string())
            .or_default()
            .push_back(response);
    }

    /// Set a default response for URLs without specific matches.
    pub fn set_default_response(&self, response: MockResponse) {
        let mut default = self.default_response.lock().unwrap();
        *default = Some(response);
    }

    /// Simulate network latency on every request.
    ///
    /// This creates a real suspension point, letting concurrent test tasks
    /// observe state mutated by an in-flight request.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = Some(latency);
    }

    /// Get all recorded requests.
    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Count recorded requests whose URL contains the fragment.
    pub fn request_count(&self, url_fragment: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.url.contains(url_fragment))
            .count()
    }

    /// Clear all recorded requests.
    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }

    /// Record a request.
    fn record_request(&self, method: &str, url: &str, headers: &Headers, body: Option<String>) {
        let mut requests = self.requests.lock().unwrap();
        requests.push(RecordedRequest {
            method: method.to_string(),
            url: url.to_string(),
            headers: headers.clone(),
            body,
        });
    }

    /// Take the next response for a URL.
    fn next_response(&self, url: &str) -> Option<MockResponse> {
        let mut responses = self.responses.lock().unwrap();

        // Exact match first, then prefix match
        let key = if responses.contains_key(url) {
            Some(url.to_string())
        } else {
            responses
                .keys()
                .find(|pattern| url.starts_with(pattern.as_str()))
                .cloned()
        };

        if let Some(key) = key {
            let queue = responses.get_mut(&key).expect("matched key exists");
            let response = queue.pop_front();
            if let Some(response) = &response {
                if queue.is_empty() {
                    // Last entry repeats
                    queue.push_back(response.clone());
                }
            }
            return response;
        }

        self.default_response.lock().unwrap().clone()
    }

    async fn handle(
        &self,
        method: &str,
        url: &str,
        headers: &Headers,
        body: Option<String>,
    ) -> Result<Response, HttpError> {
        self.record_request(method, url, headers, body);

        let latency = *self.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        match self.next_response(url) {
            Some(MockResponse::Success(response)) => Ok(response),
            Some(MockResponse::Error(err)) => Err(err),
            None => Err(HttpError::Other(format!(
                "No mock response for URL: {}",
                url
            ))),
        }
    }
}

impl Default for MockHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn get(&self, url: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.handle("GET", url, headers, None).await
    }

    async fn post(&self, url: &str, body: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.handle("POST", url, headers, Some(body.to_string()))
            .await
    }

    async fn put(&self, url: &str, body: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.handle("PUT", url, headers, Some(body.to_string()))
            .await
    }

    async fn delete(&self, url: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.handle("DELETE", url, headers, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[tokio::test]
    async fn test_get_with_response() {
        let client = MockHttpClient::new();
        client.set_response(
            "https://example.com/test",
            MockResponse::Success(Response::new(200, Bytes::from("Hello"))),
        );

        let response = client
            .get("https://example.com/test", &Headers::new())
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, Bytes::from("Hello"));

        let requests = client.get_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "GET");
        assert_eq!(requests[0].url, "https://example.com/test");
    }

    #[tokio::test]
    async fn test_get_with_error() {
        let client = MockHttpClient::new();
        client.set_response(
            "https://example.com/error",
            MockResponse::Error(HttpError::ConnectionFailed("refused".to_string())),
        );

        let result = client
            .get("https://example.com/error", &Headers::new())
            .await;
        assert!(matches!(result, Err(HttpError::ConnectionFailed(_))));
    }

    #[tokio::test]
    async fn test_post_records_body() {
        let client = MockHttpClient::new();
        client.set_response(
            "https://example.com/api",
            MockResponse::Success(Response::new(201, Bytes::from(r#"{"id": 1}"#))),
        );

        let response = client
            .post(
                "https://example.com/api",
                r#"{"name": "test"}"#,
                &Headers::new(),
            )
            .await
            .unwrap();

        assert_eq!(response.status, 201);

        let requests = client.get_requests();
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].body, Some(r#"{"name": "test"}"#.to_string()));
    }

    #[tokio::test]
    async fn test_sequence_consumed_in_order_last_repeats() {
        let client = MockHttpClient::new();
        client.push_response(
            "https://example.com/seq",
            MockResponse::Success(Response::new(401, Bytes::new())),
        );
        client.push_response(
            "https://example.com/seq",
            MockResponse::Success(Response::new(200, Bytes::from("ok"))),
        );

        let url = "https://example.com/seq";
        assert_eq!(client.get(url, &Headers::new()).await.unwrap().status, 401);
        assert_eq!(client.get(url, &Headers::new()).await.unwrap().status, 200);
        // Last entry repeats
        assert_eq!(client.get(url, &Headers::new()).await.unwrap().status, 200);
    }

    #[tokio::test]
    async fn test_no_response_configured() {
        let client = MockHttpClient::new();
        let result = client
            .get("https://example.com/missing", &Headers::new())
            .await;
        assert!(matches!(result, Err(HttpError::Other(_))));
    }

    #[tokio::test]
    async fn test_default_response() {
        let client = MockHttpClient::new();
        client.set_default_response(MockResponse::Success(Response::new(
            404,
            Bytes::from("Not Found"),
        )));

        let response = client
            .get("https://example.com/anything", &Headers::new())
            .await
            .unwrap();
        assert_eq!(response.status, 404);
    }

    #[tokio::test]
    async fn test_prefix_match() {
        let client = MockHttpClient::new();
        client.set_response(
            "https://example.com/api",
            MockResponse::Success(Response::new(200, Bytes::from("API response"))),
        );

        let response = client
            .get("https://example.com/api/v1/recipes", &Headers::new())
            .await
            .unwrap();
        assert_eq!(response.status, 200);
    }

    #[tokio::test]
    async fn test_headers_recorded() {
        let client = MockHttpClient::new();
        client.set_response(
            "https://example.com/auth",
            MockResponse::Success(Response::new(200, Bytes::new())),
        );

        let mut headers = Headers::new();
        headers.insert("Authorization".to_string(), "Bearer token123".to_string());

        client
            .get("https://example.com/auth", &headers)
            .await
            .unwrap();

        let requests = client.get_requests();
        assert_eq!(
            requests[0].headers.get("Authorization"),
            Some(&"Bearer token123".to_string())
        );
    }

    #[tokio::test]
    async fn test_request_count() {
        let client = MockHttpClient::new();
        client.set_default_response(MockResponse::Success(Response::new(200, Bytes::new())));

        client.get("https://x/a", &Headers::new()).await.unwrap();
        client.get("https://x/a", &Headers::new()).await.unwrap();
        client.get("https://x/b", &Headers::new()).await.unwrap();

        assert_eq!(client.request_count("/a"), 2);
        assert_eq!(client.request_count("/b"), 1);
    }

    #[tokio::test]
    async fn test_latency_applied() {
        let client = MockHttpClient::new();
        client.set_latency(Duration::from_millis(20));
        client.set_default_response(MockResponse::Success(Response::new(200, Bytes::new())));

        let start = std::time::Instant::now();
        client.get("https://x/slow", &Headers::new()).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn test_clone_shares_state() {
        let client = MockHttpClient::new();
        client.set_response(
            "https://example.com",
            MockResponse::Success(Response::new(200, Bytes::from("Hello"))),
        );

        let cloned = client.clone();
        cloned
            .get("https://example.com", &Headers::new())
            .await
            .unwrap();

        // Both share the same recorded requests
        assert_eq!(client.get_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_clear_requests() {
        let client = MockHttpClient::new();
        client.set_default_response(MockResponse::Success(Response::new(200, Bytes::new())));
        client.get("https://x", &Headers::new()).await.unwrap();
        assert_eq!(client.get_requests().len(), 1);

        client.clear_requests();
        assert!(client.get_requests().is_empty());
    }
}
