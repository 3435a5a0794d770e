use super::*;

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use secrecy::Secret;
use serde_json::Value;
use tokio::sync::RwLock;
use zoho_books_core::services::{ApiClient, TokenManager};
use zoho_books_core::traits::CredentialStore;
use zoho_books_core::types::{CredentialKey, StoredCredential};
use zoho_books_provider::{
    BooksApi, HttpBackend, HttpRequest, HttpResponse, Region, RetryPolicy, TokenEndpoint,
    TokenGrant, ZohoError,
};

pub const ORG_ID: &str = "10234695";
pub const API_BASE: &str = "https://www.zohoapis.com/books/v3";

/// HTTP backend replaying canned responses and recording every request.
///
/// An unscripted request gets a 418 so a test never hangs on a missing reply.
#[derive(Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedBackend {
    pub fn reply(&self, status: u16, body: &Value) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(HttpResponse::new(status, body.to_string()));
        self
    }

    pub fn reply_json(&self, body: &Value) -> &Self {
        self.reply(200, body)
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpBackend for ScriptedBackend {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ZohoError> {
        self.requests.lock().unwrap().push(request);
        Ok(self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| HttpResponse::new(418, r#"{"code":-1,"message":"unscripted"}"#)))
    }
}

/// Token endpoint handing out `at-1`, `at-2`, ...
#[derive(Default)]
pub struct CountingTokenEndpoint {
    refreshes: AtomicUsize,
}

impl CountingTokenEndpoint {
    pub fn refresh_calls(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenEndpoint for CountingTokenEndpoint {
    async fn refresh(&self, _refresh_token: &str) -> Result<TokenGrant, ZohoError> {
        let n = self.refreshes.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(TokenGrant {
            access_token: format!("at-{n}"),
            refresh_token: None,
            expires_in: 3600,
            api_domain: None,
        })
    }

    async fn exchange_code(
        &self,
        _code: &str,
        _redirect_uri: &str,
    ) -> Result<TokenGrant, ZohoError> {
        Err(ZohoError::InvalidCredentials {
            raw_code: Some("invalid_code".to_string()),
            raw_message: None,
        })
    }

    fn authorization_url(&self, redirect_uri: &str, scopes: &[&str]) -> Result<String, ZohoError> {
        Ok(format!(
            "https://accounts.zoho.com/oauth/v2/auth?scope={}&redirect_uri={redirect_uri}",
            scopes.join(",")
        ))
    }
}

#[derive(Default)]
pub struct MemoryCredentialStore {
    entries: RwLock<HashMap<String, StoredCredential>>,
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load(&self, key: &CredentialKey) -> CoreResult<Option<StoredCredential>> {
        Ok(self.entries.read().await.get(&key.to_string()).cloned())
    }

    async fn save(&self, credential: &StoredCredential) -> CoreResult<()> {
        self.entries
            .write()
            .await
            .insert(credential.key().to_string(), credential.clone());
        Ok(())
    }

    async fn remove(&self, key: &CredentialKey) -> CoreResult<()> {
        self.entries.write().await.remove(&key.to_string());
        Ok(())
    }
}

/// A server wired to scripted collaborators, holding a valid cached token `at-0`.
pub struct TestServer {
    pub backend: Arc<ScriptedBackend>,
    pub endpoint: Arc<CountingTokenEndpoint>,
    pub server: ZohoBooksMcp,
}

pub(crate) async fn build_server() -> TestServer {
    let backend = Arc::new(ScriptedBackend::default());
    let endpoint = Arc::new(CountingTokenEndpoint::default());
    let store = Arc::new(MemoryCredentialStore::default());
    store
        .save(&StoredCredential {
            access_token: "at-0".to_string(),
            expires_at: Utc::now().timestamp() + 3600,
            refresh_token: Some("rt-cached".to_string()),
            organization_id: ORG_ID.to_string(),
            region: Region::Us,
            updated_at: Utc::now(),
        })
        .await
        .unwrap();

    let tokens = Arc::new(TokenManager::new(
        endpoint.clone(),
        store,
        CredentialKey::new(Region::Us, ORG_ID),
        Some(Secret::new("rt-config".to_string())),
    ));
    let books = BooksApi::new(backend.clone(), API_BASE, ORG_ID, RetryPolicy::no_retry());
    let ctx = Arc::new(ServiceContext::new(ApiClient::new(books, tokens)));

    TestServer {
        backend,
        endpoint,
        server: ZohoBooksMcp::new(&ctx),
    }
}

/// Text of the single content block of a tool result, parsed as JSON.
pub fn result_json(result: &CallToolResult) -> Value {
    let text = result.content[0]
        .as_text()
        .map(|t| t.text.clone())
        .unwrap_or_else(|| panic!("expected text content, got {:?}", result.content));
    serde_json::from_str(&text).unwrap()
}
