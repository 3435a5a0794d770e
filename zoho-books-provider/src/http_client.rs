//! Generic HTTP client tools
//!
//! Reusable request execution for the Books API and the OAuth endpoint:
//! sending through an [`HttpBackend`], logging, transient-status
//! classification and retry with exponential backoff.
//!
//! # design principles
//! - **Requests are plain data** - [`HttpRequest`] can be cloned and replayed on retry
//! - **Backends only report transport failures** - status handling lives here
//! - **Flexible response parsing** - callers decide how to interpret non-transient statuses

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;

use crate::error::{Result, ZohoError};
use crate::traits::HttpBackend;
use crate::utils::log_sanitizer::truncate_for_log;

/// Connect timeout for every outbound request (seconds)
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// HTTP verbs used against Zoho
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request payload
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    Form(Vec<(String, String)>),
}

/// A fully described outbound request.
#[derive(Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            query: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn query_pair(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    #[must_use]
    pub fn form(mut self, fields: Vec<(String, String)>) -> Self {
        self.body = RequestBody::Form(fields);
        self
    }

    /// Look up a header value (case-insensitive).
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Look up a query parameter value.
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

// Header values and form fields may carry tokens and client secrets.
impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: Vec<&str> = self.headers.iter().map(|(k, _)| k.as_str()).collect();
        let body = match &self.body {
            RequestBody::Empty => "empty",
            RequestBody::Json(_) => "json",
            RequestBody::Form(_) => "form",
        };
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &headers)
            .field("query", &self.query)
            .field("body", &body)
            .finish()
    }
}

/// Raw response as seen by the retry loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Parsed `Retry-After` header (seconds), if present.
    pub retry_after: Option<u64>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            retry_after: None,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn with_retry_after(mut self, secs: u64) -> Self {
        self.retry_after = Some(secs);
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// `reqwest`-backed [`HttpBackend`] with bounded timeouts.
pub struct ReqwestBackend {
    client: Client,
}

impl ReqwestBackend {
    /// Create a backend whose requests time out after `request_timeout`.
    pub fn new(request_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .timeout(request_timeout)
            .build()
            .map_err(|e| ZohoError::InvalidConfig {
                field: "http_client".to_string(),
                detail: e.to_string(),
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
            HttpMethod::Put => self.client.put(&request.url),
            HttpMethod::Delete => self.client.delete(&request.url),
        };

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(&body),
            RequestBody::Form(fields) => builder.form(&fields),
        };

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ZohoError::Timeout {
                    detail: e.to_string(),
                }
            } else {
                ZohoError::NetworkError {
                    detail: e.to_string(),
                }
            }
        })?;

        let status = response.status().as_u16();

        // Extract Retry-After header (before consuming response body)
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                ZohoError::Timeout {
                    detail: format!("Failed to read response body: {e}"),
                }
            } else {
                ZohoError::NetworkError {
                    detail: format!("Failed to read response body: {e}"),
                }
            }
        })?;

        Ok(HttpResponse {
            status,
            retry_after,
            body,
        })
    }
}

/// Retry ceiling and backoff shape.
///
/// Delay before retry `n` (0-based) is `base_delay * 2^n`, capped at
/// `max_delay`. A server `Retry-After` hint raises the delay but never above
/// `max_delay`. Each delay exceeds the previous one by at least `base_delay`
/// until the cap is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Policy with the default backoff and the given attempt ceiling (min 1).
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Single attempt, no retries.
    #[must_use]
    pub fn no_retry() -> Self {
        Self::with_max_attempts(1)
    }

    /// Exponential backoff for retry number `attempt` (0-based).
    #[must_use]
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let capped_attempt = attempt.min(20); // Prevent 2^attempt from overflowing
        let factor = 1_u32 << capped_attempt;
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Delay before retrying after `error` on retry number `attempt`.
    ///
    /// `previous` is the delay slept before this attempt, if any.
    #[must_use]
    pub fn retry_delay(
        &self,
        error: &ZohoError,
        attempt: u32,
        previous: Option<Duration>,
    ) -> Duration {
        let mut delay = self.backoff_delay(attempt);
        if let ZohoError::RateLimited {
            retry_after: Some(secs),
            ..
        } = error
        {
            delay = delay.max(Duration::from_secs(*secs));
        }
        if let Some(previous) = previous {
            delay = delay.max(previous.saturating_add(self.base_delay));
        }
        delay.min(self.max_delay)
    }
}

/// HTTP tool function set
pub struct HttpUtils;

impl HttpUtils {
    /// Performs one HTTP request.
    ///
    /// Transient statuses become errors so the retry loop can see them:
    /// * HTTP 429 → [`ZohoError::RateLimited`]
    /// * HTTP 5xx → [`ZohoError::ServerError`]
    ///
    /// Every other status is returned as `Ok` for the caller to interpret.
    pub async fn execute_request(
        backend: &dyn HttpBackend,
        request: HttpRequest,
        context: &str,
    ) -> Result<HttpResponse> {
        log::debug!("[{context}] {} {}", request.method, request.url);

        let response = backend.send(request).await?;
        log::debug!("[{context}] Response Status: {}", response.status);

        if response.status == 429 {
            log::warn!(
                "[{context}] Rate limited (HTTP 429), retry_after={:?}",
                response.retry_after
            );
            return Err(ZohoError::RateLimited {
                retry_after: response.retry_after,
                raw_message: non_empty(truncate_for_log(&response.body)),
            });
        }

        if (500..600).contains(&response.status) {
            log::warn!("[{context}] Server error (HTTP {})", response.status);
            return Err(ZohoError::ServerError {
                status: response.status,
                raw_message: non_empty(truncate_for_log(&response.body)),
            });
        }

        log::debug!(
            "[{context}] Response Body: {}",
            truncate_for_log(&response.body)
        );

        Ok(response)
    }

    /// Parse JSON response
    pub fn parse_json<T>(response_text: &str, context: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        serde_json::from_str(response_text).map_err(|e| {
            log::error!("[{context}] JSON parse failed: {e}");
            log::error!(
                "[{context}] Raw response: {}",
                truncate_for_log(response_text)
            );
            ZohoError::ParseError {
                detail: e.to_string(),
            }
        })
    }

    /// Performs an HTTP request with retries.
    ///
    /// # Retry strategy
    /// - Only transient errors are retried (network, timeout, 429, 5xx)
    /// - Exponential backoff per [`RetryPolicy`], honoring `Retry-After`
    /// - Business errors (4xx, 401) are returned to the caller untouched
    pub async fn execute_request_with_retry(
        backend: &dyn HttpBackend,
        request: HttpRequest,
        policy: &RetryPolicy,
        context: &str,
    ) -> Result<HttpResponse> {
        let max_attempts = policy.max_attempts.max(1);
        let mut attempt = 0;
        let mut previous = None;

        loop {
            match Self::execute_request(backend, request.clone(), context).await {
                Ok(resp) => return Ok(resp),
                Err(e) if attempt + 1 < max_attempts && e.is_retryable() => {
                    let delay = policy.retry_delay(&e, attempt, previous);
                    log::warn!(
                        "[{}] Request failed (attempt {}/{}), retrying in {:.1}s: {}",
                        context,
                        attempt + 1,
                        max_attempts,
                        delay.as_secs_f32(),
                        e
                    );
                    tokio::time::sleep(delay).await;
                    previous = Some(delay);
                    attempt += 1;
                }
                Err(e) => {
                    if e.is_retryable() {
                        log::error!("[{context}] Giving up after {} attempt(s): {e}", attempt + 1);
                    }
                    return Err(e);
                }
            }
        }
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Backend replaying canned results and recording what it was asked.
    struct Scripted {
        replies: Mutex<VecDeque<Result<HttpResponse>>>,
        seen: Mutex<Vec<HttpRequest>>,
        sent_at: Mutex<Vec<tokio::time::Instant>>,
    }

    impl Scripted {
        fn new(replies: Vec<Result<HttpResponse>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                seen: Mutex::new(Vec::new()),
                sent_at: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }

        /// Time slept between consecutive requests.
        fn gaps(&self) -> Vec<Duration> {
            self.sent_at
                .lock()
                .unwrap()
                .windows(2)
                .map(|pair| pair[1] - pair[0])
                .collect()
        }
    }

    #[async_trait]
    impl HttpBackend for Scripted {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
            self.seen.lock().unwrap().push(request);
            self.sent_at.lock().unwrap().push(tokio::time::Instant::now());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(HttpResponse::new(200, "{}")))
        }
    }

    fn get() -> HttpRequest {
        HttpRequest::new(HttpMethod::Get, "https://example.test/books/v3/contacts")
    }

    // ---- backoff ----

    #[test]
    fn backoff_doubles_from_one_second() {
        let p = RetryPolicy::default();
        assert_eq!(p.backoff_delay(0), Duration::from_secs(1));
        assert_eq!(p.backoff_delay(1), Duration::from_secs(2));
        assert_eq!(p.backoff_delay(2), Duration::from_secs(4));
    }

    #[test]
    fn backoff_capped_at_30s() {
        let p = RetryPolicy::default();
        assert_eq!(p.backoff_delay(5), Duration::from_secs(30));
        assert_eq!(p.backoff_delay(40), Duration::from_secs(30));
    }

    #[test]
    fn retry_after_raises_delay_but_respects_cap() {
        let p = RetryPolicy::default();
        let hinted = ZohoError::RateLimited {
            retry_after: Some(7),
            raw_message: None,
        };
        assert_eq!(p.retry_delay(&hinted, 0, None), Duration::from_secs(7));

        let huge = ZohoError::RateLimited {
            retry_after: Some(3600),
            raw_message: None,
        };
        assert_eq!(p.retry_delay(&huge, 0, None), Duration::from_secs(30));

        // A hint smaller than the backoff never shortens the wait.
        let tiny = ZohoError::RateLimited {
            retry_after: Some(1),
            raw_message: None,
        };
        assert_eq!(p.retry_delay(&tiny, 2, None), Duration::from_secs(4));
    }

    #[test]
    fn delay_never_drops_below_previous() {
        let p = RetryPolicy::default();
        let server = ZohoError::ServerError {
            status: 503,
            raw_message: None,
        };
        assert_eq!(
            p.retry_delay(&server, 1, Some(Duration::from_secs(10))),
            Duration::from_secs(11)
        );
        assert_eq!(
            p.retry_delay(&server, 1, Some(Duration::from_secs(30))),
            Duration::from_secs(30)
        );
    }

    #[test]
    fn zero_attempts_means_one() {
        assert_eq!(RetryPolicy::with_max_attempts(0).max_attempts, 1);
    }

    // ---- execute_request ----

    #[tokio::test]
    async fn status_429_becomes_rate_limited() {
        let backend = Scripted::new(vec![Ok(HttpResponse::new(429, "slow").with_retry_after(12))]);
        let err = HttpUtils::execute_request(&backend, get(), "test")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ZohoError::RateLimited {
                retry_after: Some(12),
                raw_message: Some("slow".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn status_500_becomes_server_error() {
        let backend = Scripted::new(vec![Ok(HttpResponse::new(500, ""))]);
        let err = HttpUtils::execute_request(&backend, get(), "test")
            .await
            .unwrap_err();
        assert!(matches!(err, ZohoError::ServerError { status: 500, raw_message: None }));
    }

    #[tokio::test]
    async fn client_errors_are_returned_as_responses() {
        let backend = Scripted::new(vec![Ok(HttpResponse::new(400, "{\"code\":4}"))]);
        let resp = HttpUtils::execute_request(&backend, get(), "test")
            .await
            .unwrap();
        assert_eq!(resp.status, 400);
    }

    // ---- execute_request_with_retry ----

    #[tokio::test(start_paused = true)]
    async fn retries_transient_then_succeeds() {
        let backend = Scripted::new(vec![
            Ok(HttpResponse::new(503, "")),
            Err(ZohoError::Timeout {
                detail: "elapsed".into(),
            }),
            Ok(HttpResponse::new(200, "{\"ok\":true}")),
        ]);
        let started = tokio::time::Instant::now();
        let resp = HttpUtils::execute_request_with_retry(
            &backend,
            get(),
            &RetryPolicy::default(),
            "test",
        )
        .await
        .unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(backend.calls(), 3);
        // 1s + 2s of backoff elapsed on the paused clock.
        assert!(started.elapsed() >= Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn hinted_rate_limit_then_server_error_keeps_delays_increasing() {
        let backend = Scripted::new(vec![
            Ok(HttpResponse::new(429, "").with_retry_after(10)),
            Ok(HttpResponse::new(503, "")),
            Ok(HttpResponse::new(503, "")),
            Ok(HttpResponse::new(200, "{}")),
        ]);
        let policy = RetryPolicy::with_max_attempts(4);
        let resp = HttpUtils::execute_request_with_retry(&backend, get(), &policy, "test")
            .await
            .unwrap();
        assert_eq!(resp.status, 200);

        let gaps = backend.gaps();
        assert_eq!(gaps.len(), 3);
        assert!(gaps[0] >= Duration::from_secs(10));
        assert!(gaps[1] > gaps[0], "{gaps:?}");
        assert!(gaps[2] > gaps[1], "{gaps:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_attempt_ceiling() {
        let backend = Scripted::new(vec![
            Ok(HttpResponse::new(429, "")),
            Ok(HttpResponse::new(429, "")),
            Ok(HttpResponse::new(429, "")),
            Ok(HttpResponse::new(200, "{}")),
        ]);
        let err = HttpUtils::execute_request_with_retry(
            &backend,
            get(),
            &RetryPolicy::default(),
            "test",
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ZohoError::RateLimited { .. }));
        assert_eq!(backend.calls(), 3);
    }

    #[tokio::test]
    async fn bad_request_is_never_retried() {
        let backend = Scripted::new(vec![
            Ok(HttpResponse::new(400, "{\"code\":1,\"message\":\"bad\"}")),
            Ok(HttpResponse::new(200, "{}")),
        ]);
        let resp = HttpUtils::execute_request_with_retry(
            &backend,
            get(),
            &RetryPolicy::default(),
            "test",
        )
        .await
        .unwrap();
        assert_eq!(resp.status, 400);
        assert_eq!(backend.calls(), 1);
    }

    // ---- misc ----

    #[test]
    fn debug_output_hides_header_values() {
        let req = get().header("Authorization", "Zoho-oauthtoken secret-token");
        let printed = format!("{req:?}");
        assert!(printed.contains("Authorization"));
        assert!(!printed.contains("secret-token"));
    }

    #[test]
    fn parse_json_invalid() {
        let result: Result<serde_json::Value> = HttpUtils::parse_json("not json", "test");
        assert!(matches!(result, Err(ZohoError::ParseError { .. })));
    }
}
