//! File-backed credential store
//!
//! One JSON file holds a map `{region}:{organization_id} -> credential`.
//! Writes go to a temp file in the same directory which is then renamed
//! over the cache, so readers see the old map or the new one.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use zoho_books_core::error::{CoreError, CoreResult};
use zoho_books_core::traits::CredentialStore;
use zoho_books_core::types::{CredentialKey, StoredCredential};

/// Larger caches are refused unread.
const MAX_CACHE_BYTES: u64 = 1024 * 1024;

type CredentialMap = BTreeMap<String, StoredCredential>;

pub struct FileCredentialStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileCredentialStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when the file does not exist.
    async fn read_map(&self) -> CoreResult<Option<CredentialMap>> {
        let metadata = match tokio::fs::metadata(&self.path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(storage_error("stat", &self.path, &e)),
        };
        if metadata.len() > MAX_CACHE_BYTES {
            return Err(CoreError::StorageError(format!(
                "token cache {} is {} bytes, larger than the {MAX_CACHE_BYTES} byte limit",
                self.path.display(),
                metadata.len()
            )));
        }

        let data = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| storage_error("read", &self.path, &e))?;
        if data.trim().is_empty() {
            return Ok(Some(CredentialMap::new()));
        }
        serde_json::from_str(&data).map(Some).map_err(|e| {
            CoreError::StorageError(format!(
                "token cache {} is not valid JSON: {e}",
                self.path.display()
            ))
        })
    }

    async fn write_map(&self, map: &CredentialMap) -> CoreResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_error("create directory for", &self.path, &e))?;
        }

        let data = serde_json::to_vec_pretty(map)?;
        let tmp = self.temp_path();
        if let Err(e) = write_private(&tmp, &data).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(storage_error("write", &tmp, &e));
        }
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(storage_error("replace", &self.path, &e));
        }
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map_or_else(|| "token_cache".to_string(), |n| n.to_string_lossy().into_owned());
        self.path
            .with_file_name(format!(".{name}.tmp-{}", std::process::id()))
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self, key: &CredentialKey) -> CoreResult<Option<StoredCredential>> {
        Ok(self
            .read_map()
            .await?
            .and_then(|mut map| map.remove(&key.to_string())))
    }

    async fn save(&self, credential: &StoredCredential) -> CoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut map = match self.read_map().await {
            Ok(map) => map.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Replacing unreadable token cache: {e}");
                CredentialMap::new()
            }
        };
        map.insert(credential.key().to_string(), credential.clone());
        self.write_map(&map).await?;
        tracing::debug!("Saved credential for {}", credential.key());
        Ok(())
    }

    async fn remove(&self, key: &CredentialKey) -> CoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let Some(mut map) = self.read_map().await? else {
            return Ok(());
        };
        if map.remove(&key.to_string()).is_some() {
            self.write_map(&map).await?;
        }
        Ok(())
    }
}

/// Create `path` readable by the owner only and fill it with `data`.
async fn write_private(path: &Path, data: &[u8]) -> std::io::Result<()> {
    use tokio::io::AsyncWriteExt;

    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path).await?;
    file.write_all(data).await?;
    file.sync_all().await?;
    Ok(())
}

fn storage_error(action: &str, path: &Path, err: &std::io::Error) -> CoreError {
    CoreError::StorageError(format!("failed to {action} {}: {err}", path.display()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use zoho_books_provider::Region;

    use super::*;

    fn credential(organization_id: &str, access_token: &str) -> StoredCredential {
        StoredCredential {
            access_token: access_token.to_string(),
            expires_at: Utc::now().timestamp() + 3600,
            refresh_token: Some("rt".to_string()),
            organization_id: organization_id.to_string(),
            region: Region::Eu,
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn missing_file_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("cache"));
        let key = CredentialKey::new(Region::Eu, "org");
        assert_eq!(store.load(&key).await.unwrap(), None);
        store.remove(&key).await.unwrap();
    }

    #[tokio::test]
    async fn save_replaces_only_its_own_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("nested").join(".token_cache"));

        store.save(&credential("a", "at-a1")).await.unwrap();
        store.save(&credential("b", "at-b1")).await.unwrap();
        store.save(&credential("a", "at-a2")).await.unwrap();

        let a = store
            .load(&CredentialKey::new(Region::Eu, "a"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(a.access_token, "at-a2");
        let b = store
            .load(&CredentialKey::new(Region::Eu, "b"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(b.access_token, "at-b1");

        let leftovers: Vec<_> = std::fs::read_dir(store.path().parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers.len(), 1, "temp file left behind: {leftovers:?}");
    }

    #[tokio::test]
    async fn remove_deletes_the_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("cache"));
        let saved = credential("a", "at");
        store.save(&saved).await.unwrap();

        store.remove(&saved.key()).await.unwrap();
        assert_eq!(store.load(&saved.key()).await.unwrap(), None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn cache_is_private_to_the_owner() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("cache"));
        store.save(&credential("a", "at")).await.unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[tokio::test]
    async fn corrupt_cache_fails_load_but_save_recovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache");
        std::fs::write(&path, "{not json").unwrap();
        let store = FileCredentialStore::new(&path);
        let saved = credential("a", "at");

        assert!(matches!(
            store.load(&saved.key()).await,
            Err(CoreError::StorageError(_))
        ));
        store.save(&saved).await.unwrap();
        assert_eq!(store.load(&saved.key()).await.unwrap(), Some(saved));
    }

    #[tokio::test]
    async fn oversized_cache_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache");
        let size = usize::try_from(MAX_CACHE_BYTES).unwrap() + 1;
        std::fs::write(&path, vec![b' '; size]).unwrap();

        let store = FileCredentialStore::new(&path);
        let err = store
            .load(&CredentialKey::new(Region::Eu, "a"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("limit"));
    }
}
