//! Credential types

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use zoho_books_provider::Region;

/// Identifies the single credential of one organization in one region.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CredentialKey {
    pub region: Region,
    pub organization_id: String,
}

impl CredentialKey {
    pub fn new(region: Region, organization_id: impl Into<String>) -> Self {
        Self {
            region,
            organization_id: organization_id.into(),
        }
    }
}

impl fmt::Display for CredentialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.region, self.organization_id)
    }
}

/// Persisted form of a credential.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredential {
    pub access_token: String,
    /// Access-token expiry, unix seconds.
    pub expires_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub organization_id: String,
    pub region: Region,
    #[serde(with = "crate::utils::datetime")]
    pub updated_at: DateTime<Utc>,
}

impl StoredCredential {
    #[must_use]
    pub fn key(&self) -> CredentialKey {
        CredentialKey::new(self.region, self.organization_id.clone())
    }

    /// Expiry as a timestamp; out-of-range values count as already expired.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.expires_at, 0).unwrap_or(DateTime::UNIX_EPOCH)
    }
}

impl fmt::Debug for StoredCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredCredential")
            .field("access_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "<redacted>"),
            )
            .field("organization_id", &self.organization_id)
            .field("region", &self.region)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Bearer token handed out by the token manager.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}
