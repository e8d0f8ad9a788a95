use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;

use models::account::StoredCredential;

use crate::auth::errors::AuthError;
use crate::auth::repository::AccountRepository;
use crate::storage::json_map_store::JsonMapStore;

/// File-backed account repository: a map of `username -> credential`
/// persisted as JSON.
#[derive(Clone)]
pub struct JsonAccountRepository {
    store: Arc<JsonMapStore<String, StoredCredential>>,
}

impl JsonAccountRepository {
    /// Initialize from the given file path. Creates the file if missing.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, AuthError> {
        let store = JsonMapStore::<String, StoredCredential>::new(path)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(Arc::new(Self { store }))
    }
}

#[async_trait]
impl AccountRepository for JsonAccountRepository {
    async fn find(&self, username: &str) -> Result<Option<StoredCredential>, AuthError> {
        Ok(self.store.get(&username.to_string()).await)
    }

    async fn exists(&self, username: &str) -> Result<bool, AuthError> {
        Ok(self.store.contains_key(&username.to_string()).await)
    }

    async fn create(&self, username: &str, credential: StoredCredential) -> Result<(), AuthError> {
        let inserted = self
            .store
            .insert_if_absent(username.to_string(), credential)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        if !inserted {
            return Err(AuthError::Conflict);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn create_find_and_duplicate_detection() -> Result<(), anyhow::Error> {
        let tmp = std::env::temp_dir().join(format!("accounts_{}.json", Uuid::new_v4()));
        let repo = JsonAccountRepository::new(&tmp).await?;

        assert!(!repo.exists("alice").await?);
        repo.create("alice", StoredCredential { password_hash: "hash-a".into() }).await?;
        assert!(repo.exists("alice").await?);
        assert_eq!(repo.find("alice").await?.unwrap().password_hash, "hash-a");

        // duplicate username is refused and the stored hash is untouched
        let dup = repo
            .create("alice", StoredCredential { password_hash: "hash-b".into() })
            .await;
        assert!(matches!(dup, Err(AuthError::Conflict)));
        assert_eq!(repo.find("alice").await?.unwrap().password_hash, "hash-a");

        // persisted across a reload
        let reloaded = JsonAccountRepository::new(&tmp).await?;
        assert!(reloaded.exists("alice").await?);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }
}
