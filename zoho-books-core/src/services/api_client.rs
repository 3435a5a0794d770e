//! Authenticated request dispatch

use std::sync::Arc;

use serde_json::Value;
use zoho_books_provider::{BooksApi, HttpMethod, ZohoError};

use crate::error::{CoreError, CoreResult};
use crate::services::TokenManager;

/// Sends Books API requests with a valid access token.
///
/// A 401 triggers exactly one forced refresh and one retry. Transient
/// failures are retried below this layer by the provider's retry policy.
pub struct ApiClient {
    books: BooksApi,
    tokens: Arc<TokenManager>,
}

impl ApiClient {
    pub fn new(books: BooksApi, tokens: Arc<TokenManager>) -> Self {
        Self { books, tokens }
    }

    pub fn tokens(&self) -> &Arc<TokenManager> {
        &self.tokens
    }

    pub fn organization_id(&self) -> &str {
        self.books.organization_id()
    }

    pub async fn call(
        &self,
        method: HttpMethod,
        path: &str,
        params: &[(String, String)],
        body: Option<&Value>,
    ) -> CoreResult<Value> {
        let token = self.tokens.get_valid_access_token().await?;

        match self
            .books
            .send(token.as_str(), method, path, params, body)
            .await
        {
            Err(ZohoError::Unauthorized { .. }) => {
                log::warn!("[api] {method} {path} got 401, refreshing the token once");
            }
            other => return other.map_err(CoreError::from),
        }

        let token = self.tokens.force_refresh(&token).await?;
        match self
            .books
            .send(token.as_str(), method, path, params, body)
            .await
        {
            Err(ZohoError::Unauthorized {
                raw_code,
                raw_message,
            }) => {
                log::error!("[api] {method} {path} rejected a freshly refreshed token");
                Err(CoreError::auth(
                    raw_code,
                    raw_message.unwrap_or_else(|| "Zoho rejected a refreshed access token".into()),
                ))
            }
            other => other.map_err(CoreError::from),
        }
    }

    pub async fn get(&self, path: &str, params: &[(String, String)]) -> CoreResult<Value> {
        self.call(HttpMethod::Get, path, params, None).await
    }

    pub async fn post(&self, path: &str, body: Option<&Value>) -> CoreResult<Value> {
        self.call(HttpMethod::Post, path, &[], body).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> CoreResult<Value> {
        self.call(HttpMethod::Put, path, &[], Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> CoreResult<Value> {
        self.call(HttpMethod::Delete, path, &[], None).await
    }
}
