use async_trait::async_trait;

use crate::error::Result;
use crate::http_client::{HttpRequest, HttpResponse};
use crate::oauth::TokenGrant;

/// Raw API error extracted from a Zoho error body (internal use)
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawApiError {
    /// Zoho error code (numeric codes for Books, strings for OAuth)
    pub code: Option<String>,
    /// Original error message
    pub message: String,
}

impl RawApiError {
    /// Parse a Zoho error body.
    ///
    /// Books errors look like `{"code": 1002, "message": "..."}`, OAuth errors
    /// like `{"error": "invalid_code"}`. Anything else becomes the message verbatim.
    pub fn from_body(status: u16, body: &str) -> Self {
        let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
        let Some(value) = parsed.filter(serde_json::Value::is_object) else {
            let message = if body.trim().is_empty() {
                format!("HTTP error {status}")
            } else {
                body.trim().to_string()
            };
            return Self {
                code: None,
                message,
            };
        };

        let code = value
            .get("code")
            .or_else(|| value.get("error"))
            .and_then(|c| match c {
                serde_json::Value::String(s) => Some(s.clone()),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            });
        let message = value
            .get("message")
            .or_else(|| value.get("error_description"))
            .and_then(serde_json::Value::as_str)
            .map_or_else(|| format!("HTTP error {status}"), ToString::to_string);

        Self { code, message }
    }
}

/// Outbound HTTP seam.
///
/// The production implementation is [`ReqwestBackend`](crate::ReqwestBackend);
/// tests plug in scripted backends to observe requests without a network.
/// Implementations only report transport failures as errors
/// ([`NetworkError`](crate::ZohoError::NetworkError) /
/// [`Timeout`](crate::ZohoError::Timeout)); every HTTP status is returned as a response.
#[async_trait]
pub trait HttpBackend: Send + Sync {
    /// Send one request and return the raw response.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// OAuth token endpoint.
#[async_trait]
pub trait TokenEndpoint: Send + Sync {
    /// Exchange a refresh token for a new access token.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant>;

    /// Exchange an authorization code (from the consent redirect) for tokens.
    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<TokenGrant>;

    /// Consent URL the operator opens to start the authorization-code flow.
    fn authorization_url(&self, redirect_uri: &str, scopes: &[&str]) -> Result<String>;
}
