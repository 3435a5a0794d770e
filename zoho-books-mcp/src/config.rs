//! Runtime settings read from the environment (and an optional `.env` file).

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use secrecy::Secret;
use zoho_books_core::types::CredentialKey;
use zoho_books_provider::Region;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_REDIRECT_URI: &str = "http://localhost:8099/callback";

/// Everything the server needs to reach one Zoho Books organization.
pub struct Settings {
    pub client_id: Option<String>,
    pub client_secret: Option<Secret<String>>,
    /// Bootstrap refresh token; a cached credential may stand in for it.
    pub refresh_token: Option<Secret<String>>,
    pub organization_id: Option<String>,
    pub region: Region,
    pub api_base_url: String,
    pub auth_base_url: String,
    pub token_cache_path: PathBuf,
    pub request_timeout: Duration,
    /// Attempt ceiling for retryable failures (429, 5xx, network).
    pub max_retries: u32,
    pub redirect_uri: String,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build settings from `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let region = match var("ZOHO_REGION") {
            Some(code) => code
                .parse::<Region>()
                .with_context(|| format!("ZOHO_REGION={code} is not a Zoho region"))?,
            None => Region::Us,
        };

        let request_timeout = match var("REQUEST_TIMEOUT") {
            Some(secs) => secs
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .map(Duration::from_secs)
                .with_context(|| {
                    format!("REQUEST_TIMEOUT={secs} must be a positive number of seconds")
                })?,
            None => Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        };

        let max_retries = match var("MAX_RETRIES") {
            Some(n) => n
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .with_context(|| format!("MAX_RETRIES={n} must be a positive integer"))?,
            None => DEFAULT_MAX_RETRIES,
        };

        Ok(Self {
            client_id: var("ZOHO_CLIENT_ID"),
            client_secret: var("ZOHO_CLIENT_SECRET").map(Secret::new),
            refresh_token: var("ZOHO_REFRESH_TOKEN").map(Secret::new),
            organization_id: var("ZOHO_ORGANIZATION_ID"),
            api_base_url: var("ZOHO_API_BASE_URL").unwrap_or_else(|| region.api_base_url()),
            auth_base_url: var("ZOHO_AUTH_BASE_URL").unwrap_or_else(|| region.auth_base_url()),
            region,
            token_cache_path: var("TOKEN_CACHE_PATH")
                .map_or_else(default_token_cache_path, PathBuf::from),
            request_timeout,
            max_retries,
            redirect_uri: var("ZOHO_REDIRECT_URI")
                .unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string()),
        })
    }

    /// Every required setting that is missing, in one error.
    ///
    /// The refresh token is only required when nothing else (a cached
    /// credential, interactive setup) can supply it.
    pub fn validate(&self, refresh_token_required: bool) -> Result<()> {
        let mut missing = Vec::new();
        if self.client_id.is_none() {
            missing.push("ZOHO_CLIENT_ID");
        }
        if self.client_secret.is_none() {
            missing.push("ZOHO_CLIENT_SECRET");
        }
        if self.organization_id.is_none() {
            missing.push("ZOHO_ORGANIZATION_ID");
        }
        if refresh_token_required && self.refresh_token.is_none() {
            missing.push("ZOHO_REFRESH_TOKEN");
        }
        if !missing.is_empty() {
            bail!(
                "missing required settings: {} (set them in the environment or a .env file)",
                missing.join(", ")
            );
        }
        Ok(())
    }

    /// Store key of the configured organization.
    pub fn credential_key(&self) -> Result<CredentialKey> {
        let organization_id = self
            .organization_id
            .as_deref()
            .context("ZOHO_ORGANIZATION_ID is not set")?;
        Ok(CredentialKey::new(self.region, organization_id))
    }
}

/// Log filter directive: `--log-level`, then `LOG_LEVEL`. `None` defers to `RUST_LOG`.
pub fn log_directive(cli_level: Option<&str>) -> Option<String> {
    cli_level
        .map(ToString::to_string)
        .or_else(|| std::env::var("LOG_LEVEL").ok())
        .map(|level| level.trim().to_ascii_lowercase())
        .filter(|level| !level.is_empty())
}

fn default_token_cache_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".zoho-mcp")
        .join(".token_cache")
}
