//! Test helpers
//!
//! In-memory collaborators and a fully wired service context.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use secrecy::Secret;
use serde_json::Value;
use tokio::sync::RwLock;
use zoho_books_provider::{
    BooksApi, HttpBackend, HttpRequest, HttpResponse, Region, RetryPolicy, TokenEndpoint,
    TokenGrant, ZohoError,
};

use crate::error::{CoreError, CoreResult};
use crate::services::{ApiClient, ServiceContext, TokenManager};
use crate::traits::CredentialStore;
use crate::types::{CredentialKey, StoredCredential};

pub const ORG_ID: &str = "org-1";
pub const API_BASE: &str = "https://www.zohoapis.com/books/v3";

pub fn key() -> CredentialKey {
    CredentialKey::new(Region::Us, ORG_ID)
}

/// A stored credential whose access token expires `expires_in` seconds from now.
pub fn stored(access_token: &str, expires_in: i64) -> StoredCredential {
    let now = Utc::now();
    StoredCredential {
        access_token: access_token.to_string(),
        expires_at: now.timestamp() + expires_in,
        refresh_token: Some("rt-stored".to_string()),
        organization_id: ORG_ID.to_string(),
        region: Region::Us,
        updated_at: now,
    }
}

pub fn grant(access_token: &str) -> TokenGrant {
    TokenGrant {
        access_token: access_token.to_string(),
        refresh_token: None,
        expires_in: 3600,
        api_domain: None,
    }
}

// ===== InMemoryCredentialStore =====

#[derive(Default)]
pub struct InMemoryCredentialStore {
    entries: RwLock<HashMap<String, StoredCredential>>,
    /// When set, `save` fails with this message
    save_error: RwLock<Option<String>>,
    /// When set, `save` never completes
    hang_saves: AtomicBool,
    saves: AtomicUsize,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with(credential: StoredCredential) -> Self {
        let store = Self::new();
        store
            .entries
            .write()
            .await
            .insert(credential.key().to_string(), credential);
        store
    }

    pub async fn set_save_error(&self, err: Option<String>) {
        *self.save_error.write().await = err;
    }

    pub fn set_hang_saves(&self, hang: bool) {
        self.hang_saves.store(hang, Ordering::SeqCst);
    }

    pub async fn get(&self, key: &CredentialKey) -> Option<StoredCredential> {
        self.entries.read().await.get(&key.to_string()).cloned()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn load(&self, key: &CredentialKey) -> CoreResult<Option<StoredCredential>> {
        Ok(self.entries.read().await.get(&key.to_string()).cloned())
    }

    async fn save(&self, credential: &StoredCredential) -> CoreResult<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        if self.hang_saves.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if let Some(ref msg) = *self.save_error.read().await {
            return Err(CoreError::StorageError(msg.clone()));
        }
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

// ===== MockTokenEndpoint =====

/// Token endpoint that hands out `at-1`, `at-2`, ... unless scripted otherwise.
#[derive(Default)]
pub struct MockTokenEndpoint {
    script: Mutex<VecDeque<Result<TokenGrant, ZohoError>>>,
    refresh_calls: AtomicUsize,
    code_calls: AtomicUsize,
    last_refresh_token: Mutex<Option<String>>,
    delay: Option<Duration>,
}

impl MockTokenEndpoint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every exchange takes `delay` (lets concurrent callers pile up).
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn push(&self, reply: Result<TokenGrant, ZohoError>) {
        self.script.lock().unwrap().push_back(reply);
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn last_refresh_token(&self) -> Option<String> {
        self.last_refresh_token.lock().unwrap().clone()
    }

    pub fn code_calls(&self) -> usize {
        self.code_calls.load(Ordering::SeqCst)
    }

    fn next(&self, n: usize) -> Result<TokenGrant, ZohoError> {
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(grant(&format!("at-{n}"))))
    }
}

#[async_trait]
impl TokenEndpoint for MockTokenEndpoint {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, ZohoError> {
        let n = self.refresh_calls.fetch_add(1, Ordering::SeqCst) + 1;
        *self.last_refresh_token.lock().unwrap() = Some(refresh_token.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.next(n)
    }

    async fn exchange_code(
        &self,
        _code: &str,
        _redirect_uri: &str,
    ) -> Result<TokenGrant, ZohoError> {
        let n = self.code_calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.next(n)
    }

    fn authorization_url(&self, redirect_uri: &str, scopes: &[&str]) -> Result<String, ZohoError> {
        Ok(format!(
            "https://accounts.zoho.com/oauth/v2/auth?scope={}&redirect_uri={redirect_uri}",
            scopes.join(",")
        ))
    }
}

// ===== ScriptedBackend =====

/// HTTP backend replaying canned responses and recording every request.
#[derive(Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, status: u16, body: &str) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(HttpResponse::new(status, body));
        self
    }

    pub fn reply_json(&self, body: &Value) -> &Self {
        self.reply(200, &body.to_string())
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

// ===== Harness =====

/// Fully wired service context over scripted collaborators.
pub struct Harness {
    pub backend: Arc<ScriptedBackend>,
    pub endpoint: Arc<MockTokenEndpoint>,
    pub store: Arc<InMemoryCredentialStore>,
    pub ctx: Arc<ServiceContext>,
}

impl Harness {
    /// A harness whose cached token `at-0` is valid for an hour.
    pub async fn new() -> Self {
        Self::with_parts(
            InMemoryCredentialStore::with(stored("at-0", 3600)).await,
            MockTokenEndpoint::new(),
        )
    }

    pub fn with_parts(store: InMemoryCredentialStore, endpoint: MockTokenEndpoint) -> Self {
        let backend = Arc::new(ScriptedBackend::new());
        let endpoint = Arc::new(endpoint);
        let store = Arc::new(store);
        let tokens = Arc::new(TokenManager::new(
            endpoint.clone(),
            store.clone(),
            key(),
            Some(Secret::new("rt-config".to_string())),
        ));
        let books = BooksApi::new(backend.clone(), API_BASE, ORG_ID, RetryPolicy::no_retry());
        let ctx = Arc::new(ServiceContext::new(ApiClient::new(books, tokens)));
        Self {
            backend,
            endpoint,
            store,
            ctx,
        }
    }
}
