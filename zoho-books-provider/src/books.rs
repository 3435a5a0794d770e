//! Zoho Books REST request execution

use std::sync::Arc;

use serde_json::{Value, json};

use crate::error::{Result, ZohoError};
use crate::http_client::{HttpMethod, HttpRequest, HttpUtils, RetryPolicy};
use crate::traits::{HttpBackend, RawApiError};

/// Message returned for successful calls whose body is empty or not JSON.
pub const EMPTY_SUCCESS_MESSAGE: &str = "Operation completed successfully";

const CONTEXT: &str = "books";

/// Executes authenticated requests against one Zoho Books organization.
///
/// Token acquisition is the caller's job: every call takes the access token to
/// use, and a rejected token surfaces as [`ZohoError::Unauthorized`].
pub struct BooksApi {
    backend: Arc<dyn HttpBackend>,
    base_url: String,
    organization_id: String,
    retry: RetryPolicy,
}

impl BooksApi {
    pub fn new(
        backend: Arc<dyn HttpBackend>,
        base_url: impl Into<String>,
        organization_id: impl Into<String>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            backend,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            organization_id: organization_id.into(),
            retry,
        }
    }

    pub fn organization_id(&self) -> &str {
        &self.organization_id
    }

    /// Build the request for `method path` with the organization attached.
    fn build_request(
        &self,
        access_token: &str,
        method: HttpMethod,
        path: &str,
        params: &[(String, String)],
        body: Option<&Value>,
    ) -> HttpRequest {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };

        let mut request = HttpRequest::new(method, format!("{}{path}", self.base_url))
            .header("Authorization", format!("Zoho-oauthtoken {access_token}"))
            .header("Accept", "application/json");

        for (name, value) in params {
            request = request.query_pair(name.clone(), value.clone());
        }
        request = request.query_pair("organization_id", self.organization_id.clone());

        if let Some(body) = body {
            request = request.json(body.clone());
        }
        request
    }

    /// Perform one logical API call (with transient retries) and return the JSON body.
    ///
    /// - 2xx with JSON → the parsed body
    /// - 204, empty or non-JSON 2xx → `{"status":"success","message":...}`
    /// - 401 → [`ZohoError::Unauthorized`] (never retried here)
    /// - other 4xx → [`ZohoError::ApiError`] with the Zoho `code`/`message`
    /// - 429/5xx/network after the retry ceiling → the transient error
    pub async fn send(
        &self,
        access_token: &str,
        method: HttpMethod,
        path: &str,
        params: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<Value> {
        let request = self.build_request(access_token, method, path, params, body);
        let response = HttpUtils::execute_request_with_retry(
            self.backend.as_ref(),
            request,
            &self.retry,
            CONTEXT,
        )
        .await?;

        if response.is_success() {
            if response.status == 204 || response.body.trim().is_empty() {
                return Ok(empty_success());
            }
            return Ok(serde_json::from_str::<Value>(&response.body).unwrap_or_else(|_| {
                log::debug!("[{CONTEXT}] Non-JSON success body for {method} {path}");
                empty_success()
            }));
        }

        let raw = RawApiError::from_body(response.status, &response.body);
        if response.status == 401 {
            log::warn!("[{CONTEXT}] {method} {path} rejected the access token");
            return Err(ZohoError::Unauthorized {
                raw_code: raw.code,
                raw_message: Some(raw.message),
            });
        }

        let err = ZohoError::ApiError {
            status: response.status,
            raw_code: raw.code,
            raw_message: raw.message,
        };
        log::warn!("[{CONTEXT}] {method} {path} failed: {err}");
        Err(err)
    }
}

fn empty_success() -> Value {
    json!({
        "status": "success",
        "message": EMPTY_SUCCESS_MESSAGE,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::{HttpResponse, RequestBody};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct Scripted {
        replies: Mutex<VecDeque<HttpResponse>>,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl Scripted {
        fn new(replies: Vec<HttpResponse>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl HttpBackend for Scripted {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
            self.seen.lock().unwrap().push(request);
            Ok(self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| HttpResponse::new(200, "{}")))
        }
    }

    fn api(backend: Arc<Scripted>) -> BooksApi {
        BooksApi::new(
            backend,
            "https://www.zohoapis.com/books/v3/",
            "org-42",
            RetryPolicy::no_retry(),
        )
    }

    #[tokio::test]
    async fn attaches_token_header_and_organization() {
        let backend = Scripted::new(vec![HttpResponse::new(200, r#"{"code":0,"contacts":[]}"#)]);
        let params = vec![("page".to_string(), "2".to_string())];
        let value = api(backend.clone())
            .send("tok", HttpMethod::Get, "/contacts", &params, None)
            .await
            .unwrap();
        assert_eq!(value["code"], 0);

        let seen = backend.seen.lock().unwrap();
        let req = &seen[0];
        assert_eq!(req.url, "https://www.zohoapis.com/books/v3/contacts");
        assert_eq!(req.header_value("authorization"), Some("Zoho-oauthtoken tok"));
        assert_eq!(req.query_value("organization_id"), Some("org-42"));
        assert_eq!(req.query_value("page"), Some("2"));
        assert_eq!(req.body, RequestBody::Empty);
    }

    #[tokio::test]
    async fn sends_json_body() {
        let backend = Scripted::new(vec![HttpResponse::new(201, r#"{"contact":{"contact_id":"1"}}"#)]);
        let body = json!({"contact_name": "John Smith"});
        api(backend.clone())
            .send("tok", HttpMethod::Post, "contacts", &[], Some(&body))
            .await
            .unwrap();
        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen[0].url, "https://www.zohoapis.com/books/v3/contacts");
        assert_eq!(seen[0].body, RequestBody::Json(body));
    }

    #[tokio::test]
    async fn no_content_yields_success_message() {
        let backend = Scripted::new(vec![HttpResponse::new(204, "")]);
        let value = api(backend)
            .send("tok", HttpMethod::Delete, "/contacts/1", &[], None)
            .await
            .unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["message"], EMPTY_SUCCESS_MESSAGE);
    }

    #[tokio::test]
    async fn non_json_success_yields_success_message() {
        let backend = Scripted::new(vec![HttpResponse::new(200, "OK")]);
        let value = api(backend)
            .send("tok", HttpMethod::Post, "/invoices/1/status/sent", &[], None)
            .await
            .unwrap();
        assert_eq!(value["message"], EMPTY_SUCCESS_MESSAGE);
    }

    #[tokio::test]
    async fn status_401_is_unauthorized() {
        let backend = Scripted::new(vec![HttpResponse::new(
            401,
            r#"{"code":57,"message":"You are not authorized to perform this operation"}"#,
        )]);
        let err = api(backend)
            .send("stale", HttpMethod::Get, "/invoices", &[], None)
            .await
            .unwrap_err();
        assert!(matches!(err, ZohoError::Unauthorized { raw_code: Some(ref c), .. } if c == "57"));
    }

    #[tokio::test]
    async fn client_error_carries_zoho_code() {
        let backend = Scripted::new(vec![HttpResponse::new(
            404,
            r#"{"code":1002,"message":"Invoice does not exist."}"#,
        )]);
        let err = api(backend)
            .send("tok", HttpMethod::Get, "/invoices/9", &[], None)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ZohoError::ApiError {
                status: 404,
                raw_code: Some("1002".to_string()),
                raw_message: "Invoice does not exist.".to_string(),
            }
        );
    }
}
