//! OAuth access-token lifecycle

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, Secret};
use tokio::sync::Mutex;

use zoho_books_provider::log_sanitizer::mask_secret;
use zoho_books_provider::{DEFAULT_SCOPES, TokenEndpoint, TokenGrant, ZohoError};

use crate::error::{CoreError, CoreResult};
use crate::traits::CredentialStore;
use crate::types::{AccessToken, CredentialKey, StoredCredential};

/// A token this close to expiry is refreshed instead of used.
pub const DEFAULT_SAFETY_MARGIN: Duration = Duration::from_secs(60);

enum TokenState {
    /// Nothing read from the store yet; holds the configured refresh token.
    Unloaded(Option<Secret<String>>),
    /// No usable credential. Calls fail fast until re-authorization.
    Unauthenticated { code: Option<String>, reason: String },
    Authenticated(CachedToken),
}

struct CachedToken {
    /// Empty until the first exchange when bootstrapped from a refresh token.
    access_token: String,
    expires_at: DateTime<Utc>,
    refresh_token: Option<Secret<String>>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>, margin: chrono::Duration) -> bool {
        !self.access_token.is_empty() && self.expires_at - now > margin
    }
}

/// Owns the credential of one organization.
///
/// A single mutex guards the state and is held across the refresh exchange,
/// so concurrent callers that find the token stale trigger one exchange and
/// all observe its result.
pub struct TokenManager {
    endpoint: Arc<dyn TokenEndpoint>,
    store: Arc<dyn CredentialStore>,
    key: CredentialKey,
    safety_margin: chrono::Duration,
    state: Mutex<TokenState>,
}

impl TokenManager {
    /// `refresh_token` is the configured bootstrap token; it takes precedence
    /// over a refresh token found in the store.
    pub fn new(
        endpoint: Arc<dyn TokenEndpoint>,
        store: Arc<dyn CredentialStore>,
        key: CredentialKey,
        refresh_token: Option<Secret<String>>,
    ) -> Self {
        Self {
            endpoint,
            store,
            key,
            safety_margin: margin(DEFAULT_SAFETY_MARGIN),
            state: Mutex::new(TokenState::Unloaded(
                refresh_token.filter(|t| !t.expose_secret().trim().is_empty()),
            )),
        }
    }

    #[must_use]
    pub fn with_safety_margin(mut self, safety_margin: Duration) -> Self {
        self.safety_margin = margin(safety_margin);
        self
    }

    pub fn key(&self) -> &CredentialKey {
        &self.key
    }

    /// A token valid for at least the safety margin.
    ///
    /// Reuses the cached token when it is fresh; otherwise refreshes it.
    pub async fn get_valid_access_token(&self) -> CoreResult<AccessToken> {
        let mut state = self.state.lock().await;
        self.ensure_loaded(&mut state).await;

        match &*state {
            TokenState::Unauthenticated { code, reason } => {
                Err(CoreError::auth(code.clone(), reason))
            }
            TokenState::Authenticated(cached) if cached.is_fresh(Utc::now(), self.safety_margin) => {
                Ok(AccessToken::new(cached.access_token.clone()))
            }
            _ => self.refresh_locked(&mut state).await,
        }
    }

    /// Refresh after the API rejected `stale`.
    ///
    /// When another caller already replaced `stale`, its token is returned
    /// without a second exchange.
    pub async fn force_refresh(&self, stale: &AccessToken) -> CoreResult<AccessToken> {
        let mut state = self.state.lock().await;
        self.ensure_loaded(&mut state).await;

        match &*state {
            TokenState::Unauthenticated { code, reason } => {
                Err(CoreError::auth(code.clone(), reason))
            }
            TokenState::Authenticated(cached)
                if cached.access_token != stale.as_str()
                    && cached.is_fresh(Utc::now(), self.safety_margin) =>
            {
                log::debug!("[token] Token already refreshed by another caller");
                Ok(AccessToken::new(cached.access_token.clone()))
            }
            _ => self.refresh_locked(&mut state).await,
        }
    }

    /// Exchange an authorization code from the consent redirect and persist
    /// the resulting credential. This is the way out of the unauthenticated state.
    pub async fn authorize_with_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> CoreResult<AccessToken> {
        if code.trim().is_empty() {
            return Err(CoreError::ValidationError(
                "authorization code must not be empty".to_string(),
            ));
        }

        let mut state = self.state.lock().await;
        self.ensure_loaded(&mut state).await;

        let grant = self
            .endpoint
            .exchange_code(code.trim(), redirect_uri)
            .await
            .map_err(CoreError::from)?;

        let previous = match &*state {
            TokenState::Authenticated(cached) => cached
                .refresh_token
                .as_ref()
                .map(|t| t.expose_secret().clone()),
            _ => None,
        };
        let Some(refresh_token) = grant.refresh_token.clone().or(previous) else {
            return Err(CoreError::auth(
                None,
                "Zoho did not return a refresh token; revoke the app's existing grant \
                 and repeat the consent flow",
            ));
        };

        let (token, cached, stored) = self.materialize(grant, refresh_token);
        *state = TokenState::Authenticated(cached);
        self.persist(stored).await?;

        log::info!("[token] Authorization complete for {}", self.key);
        Ok(token)
    }

    /// Consent URL for the authorization-code flow.
    pub fn authorization_url(&self, redirect_uri: &str) -> CoreResult<String> {
        self.endpoint
            .authorization_url(redirect_uri, DEFAULT_SCOPES)
            .map_err(CoreError::from)
    }

    /// Forget the credential, in memory and in the store.
    pub async fn clear(&self) -> CoreResult<()> {
        let mut state = self.state.lock().await;
        self.store.remove(&self.key).await?;
        *state = TokenState::Unauthenticated {
            code: None,
            reason: "the credential cache was cleared".to_string(),
        };
        log::info!("[token] Cleared credential for {}", self.key);
        Ok(())
    }

    /// Expiry of the cached access token, if there is one.
    pub async fn expires_at(&self) -> Option<DateTime<Utc>> {
        let mut state = self.state.lock().await;
        self.ensure_loaded(&mut state).await;
        match &*state {
            TokenState::Authenticated(cached) if !cached.access_token.is_empty() => {
                Some(cached.expires_at)
            }
            _ => None,
        }
    }

    async fn ensure_loaded(&self, state: &mut TokenState) {
        let TokenState::Unloaded(configured) = state else {
            return;
        };
        let configured = configured.take();

        let stored = match self.store.load(&self.key).await {
            Ok(stored) => stored,
            Err(e) => {
                log::warn!("[token] Ignoring unreadable credential cache: {e}");
                None
            }
        };

        let refresh_token = configured.or_else(|| {
            stored
                .as_ref()
                .and_then(|s| s.refresh_token.clone())
                .map(Secret::new)
        });

        *state = match (stored, refresh_token) {
            (Some(stored), refresh_token) => {
                log::debug!("[token] Loaded cached credential for {}", self.key);
                TokenState::Authenticated(CachedToken {
                    expires_at: stored.expires_at(),
                    access_token: stored.access_token,
                    refresh_token,
                })
            }
            (None, Some(refresh_token)) => TokenState::Authenticated(CachedToken {
                access_token: String::new(),
                expires_at: DateTime::UNIX_EPOCH,
                refresh_token: Some(refresh_token),
            }),
            (None, None) => TokenState::Unauthenticated {
                code: None,
                reason: "no refresh token is configured".to_string(),
            },
        };
    }

    /// Refresh exchange; the caller holds the state lock.
    async fn refresh_locked(&self, state: &mut TokenState) -> CoreResult<AccessToken> {
        let refresh_token = match &*state {
            TokenState::Authenticated(CachedToken {
                refresh_token: Some(token),
                ..
            }) => token.expose_secret().clone(),
            TokenState::Unauthenticated { code, reason } => {
                return Err(CoreError::auth(code.clone(), reason));
            }
            _ => {
                let reason = "the access token expired and no refresh token is configured";
                *state = TokenState::Unauthenticated {
                    code: None,
                    reason: reason.to_string(),
                };
                return Err(CoreError::auth(None, reason));
            }
        };

        log::debug!(
            "[token] Refreshing access token for {} with refresh token {}",
            self.key,
            mask_secret(&refresh_token)
        );
        let grant = match self.endpoint.refresh(&refresh_token).await {
            Ok(grant) => grant,
            Err(ZohoError::InvalidCredentials {
                raw_code,
                raw_message,
            }) => {
                let reason = format!(
                    "Zoho rejected the refresh token ({})",
                    raw_message
                        .as_deref()
                        .or(raw_code.as_deref())
                        .unwrap_or("no detail")
                );
                log::warn!("[token] {reason}");
                let err = CoreError::auth(raw_code.clone(), &reason);
                *state = TokenState::Unauthenticated {
                    code: raw_code,
                    reason,
                };
                return Err(err);
            }
            Err(e) => {
                log::warn!("[token] Refresh failed, keeping current state: {e}");
                return Err(e.into());
            }
        };

        let refresh_token = grant.refresh_token.clone().unwrap_or(refresh_token);
        let (token, cached, stored) = self.materialize(grant, refresh_token);
        let expires_at = stored.expires_at();

        // Installed before the write: the exchange may have rotated the refresh token
        *state = TokenState::Authenticated(cached);
        if let Err(e) = self.persist(stored).await {
            log::error!("[token] Failed to persist refreshed credential: {e}");
        }
        log::info!(
            "[token] Access token {} refreshed, valid until {expires_at}",
            mask_secret(token.as_str())
        );
        Ok(token)
    }

    /// Write `stored` on a detached task, so a cancelled caller cannot abandon
    /// the write halfway.
    async fn persist(&self, stored: StoredCredential) -> CoreResult<()> {
        let store = Arc::clone(&self.store);
        tokio::spawn(async move { store.save(&stored).await })
            .await
            .map_err(|e| CoreError::StorageError(format!("credential write did not finish: {e}")))?
    }

    fn materialize(
        &self,
        grant: TokenGrant,
        refresh_token: String,
    ) -> (AccessToken, CachedToken, StoredCredential) {
        let now = Utc::now();
        let lifetime = i64::try_from(grant.expires_in).unwrap_or(i64::MAX);
        let expires_at = now
            .checked_add_signed(chrono::Duration::seconds(lifetime.min(i64::from(u32::MAX))))
            .unwrap_or(now);

        let stored = StoredCredential {
            access_token: grant.access_token.clone(),
            expires_at: expires_at.timestamp(),
            refresh_token: Some(refresh_token.clone()),
            organization_id: self.key.organization_id.clone(),
            region: self.key.region,
            updated_at: now,
        };
        let cached = CachedToken {
            access_token: grant.access_token.clone(),
            expires_at,
            refresh_token: Some(Secret::new(refresh_token)),
        };
        (AccessToken::new(grant.access_token), cached, stored)
    }
}

fn margin(duration: Duration) -> chrono::Duration {
    chrono::Duration::from_std(duration).unwrap_or(chrono::Duration::seconds(60))
}

#[cfg(test)]
#[path = "token_service_tests.rs"]
mod tests;
