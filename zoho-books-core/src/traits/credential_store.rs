//! Credential store abstraction

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::{CredentialKey, StoredCredential};

/// Persistent credential cache.
///
/// Holds at most one credential per [`CredentialKey`]. Implementations:
/// - `FileCredentialStore` in the MCP binary (JSON map, atomic replace, 0600)
/// - `InMemoryCredentialStore` in tests
///
/// `save` must be atomic: a reader observes the old credential or the new
/// one, never a partial write.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Load the credential stored under `key`
    ///
    /// # Returns
    /// * `Ok(Some(credential))` - credential exists
    /// * `Ok(None)` - nothing stored for this key
    async fn load(&self, key: &CredentialKey) -> CoreResult<Option<StoredCredential>>;

    /// Save a credential, replacing the previous one under the same key
    async fn save(&self, credential: &StoredCredential) -> CoreResult<()>;

    /// Remove a credential; removing a missing key succeeds
    async fn remove(&self, key: &CredentialKey) -> CoreResult<()>;
}
