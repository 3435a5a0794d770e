//! Zoho OAuth v2 token endpoint client

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{Result, ZohoError};
use crate::http_client::{HttpMethod, HttpRequest, HttpUtils, RetryPolicy};
use crate::traits::{HttpBackend, RawApiError, TokenEndpoint};

/// Lifetime assumed when the token response omits `expires_in`.
pub const DEFAULT_EXPIRES_IN_SECS: u64 = 3600;

/// Scopes requested by the consent URL.
pub const DEFAULT_SCOPES: &[&str] = &["ZohoBooks.fullaccess.all"];

const CONTEXT: &str = "oauth";

/// Tokens issued by the token endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub access_token: String,
    /// Only present for the authorization-code grant (or if Zoho rotates it).
    pub refresh_token: Option<String>,
    /// Lifetime of `access_token` in seconds.
    pub expires_in: u64,
    /// API domain reported by Zoho, e.g. `https://www.zohoapis.eu`.
    pub api_domain: Option<String>,
}

impl fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenGrant")
            .field("access_token", &"<redacted>")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "<redacted>"),
            )
            .field("expires_in", &self.expires_in)
            .field("api_domain", &self.api_domain)
            .finish()
    }
}

/// Wire shape of `/oauth/v2/token`. Zoho reports some failures with HTTP 200
/// and an `error` field, so every field is optional.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_in: Option<u64>,
    api_domain: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// Token endpoint client for one OAuth client registration.
pub struct OAuthClient {
    backend: Arc<dyn HttpBackend>,
    auth_base_url: String,
    client_id: String,
    client_secret: String,
    retry: RetryPolicy,
}

impl OAuthClient {
    pub fn new(
        backend: Arc<dyn HttpBackend>,
        auth_base_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            backend,
            auth_base_url: auth_base_url.into().trim_end_matches('/').to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            retry,
        }
    }

    fn token_url(&self) -> String {
        format!("{}/token", self.auth_base_url)
    }

    async fn request_token(&self, grant_fields: Vec<(String, String)>) -> Result<TokenGrant> {
        let mut fields = grant_fields;
        fields.push(("client_id".to_string(), self.client_id.clone()));
        fields.push(("client_secret".to_string(), self.client_secret.clone()));

        let request = HttpRequest::new(HttpMethod::Post, self.token_url()).form(fields);
        let response = HttpUtils::execute_request_with_retry(
            self.backend.as_ref(),
            request,
            &self.retry,
            CONTEXT,
        )
        .await?;

        if !response.is_success() {
            let raw = RawApiError::from_body(response.status, &response.body);
            return Err(if matches!(response.status, 400 | 401 | 403) {
                log::warn!(
                    "[{CONTEXT}] Token request rejected (HTTP {}): {}",
                    response.status,
                    raw.message
                );
                ZohoError::InvalidCredentials {
                    raw_code: raw.code,
                    raw_message: Some(raw.message),
                }
            } else {
                ZohoError::ApiError {
                    status: response.status,
                    raw_code: raw.code,
                    raw_message: raw.message,
                }
            });
        }

        let parsed: TokenResponse = HttpUtils::parse_json(&response.body, CONTEXT)?;

        if let Some(code) = parsed.error {
            log::warn!("[{CONTEXT}] Token request rejected: {code}");
            return Err(ZohoError::InvalidCredentials {
                raw_code: Some(code),
                raw_message: parsed.error_description,
            });
        }

        let access_token = parsed
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ZohoError::ParseError {
                detail: "token response is missing access_token".to_string(),
            })?;

        Ok(TokenGrant {
            access_token,
            refresh_token: parsed.refresh_token.filter(|t| !t.is_empty()),
            expires_in: parsed.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS),
            api_domain: parsed.api_domain,
        })
    }
}

#[async_trait]
impl TokenEndpoint for OAuthClient {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant> {
        log::debug!("[{CONTEXT}] Refreshing access token");
        self.request_token(vec![
            ("refresh_token".to_string(), refresh_token.to_string()),
            ("grant_type".to_string(), "refresh_token".to_string()),
        ])
        .await
    }

    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<TokenGrant> {
        log::debug!("[{CONTEXT}] Exchanging authorization code");
        self.request_token(vec![
            ("code".to_string(), code.to_string()),
            ("redirect_uri".to_string(), redirect_uri.to_string()),
            ("grant_type".to_string(), "authorization_code".to_string()),
        ])
        .await
    }

    fn authorization_url(&self, redirect_uri: &str, scopes: &[&str]) -> Result<String> {
        let scope = scopes.join(",");
        let url = url::Url::parse_with_params(
            &format!("{}/auth", self.auth_base_url),
            &[
                ("scope", scope.as_str()),
                ("client_id", self.client_id.as_str()),
                ("response_type", "code"),
                ("access_type", "offline"),
                ("prompt", "consent"),
                ("redirect_uri", redirect_uri),
            ],
        )
        .map_err(|e| ZohoError::InvalidConfig {
            field: "ZOHO_AUTH_BASE_URL".to_string(),
            detail: e.to_string(),
        })?;
        Ok(url.into())
    }
}
