use std::{collections::HashMap, hash::Hash, path::PathBuf, sync::Arc};

use tokio::{fs, sync::RwLock};
use tracing::warn;

use crate::errors::ServiceError;

/// Generic JSON file-backed key-value map store.
///
/// Persists a `HashMap<K, V>` to a JSON file and provides simple CRUD
/// helpers. The write guard is held across mutate-and-persist, so one
/// load-modify-save cycle per file runs at a time within this process.
#[derive(Clone)]
pub struct JsonMapStore<K, V> {
    inner: Arc<RwLock<HashMap<K, V>>>,
    file_path: PathBuf,
}

impl<K, V> JsonMapStore<K, V>
where
    K: Eq + Hash + serde::Serialize + serde::de::DeserializeOwned + Clone,
    V: serde::Serialize + serde::de::DeserializeOwned + Clone,
{
    /// Initialize the store from a path. A missing file is created with an
    /// empty map; an unparsable file is abandoned in favor of the empty
    /// default. The recovery is deliberately lossy: corrupted content is
    /// discarded on the next save rather than failing startup.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.ok();
        }

        let map: HashMap<K, V> = match fs::read(&file_path).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(map) => map,
                Err(e) => {
                    warn!(path = %file_path.display(), error = %e, "unparsable collection file, starting from empty");
                    HashMap::new()
                }
            },
            Err(_) => {
                let empty: HashMap<K, V> = HashMap::new();
                let data = serde_json::to_vec_pretty(&empty)
                    .map_err(|e| ServiceError::Storage(e.to_string()))?;
                super::write_atomic(&file_path, &data).await?;
                empty
            }
        };

        Ok(Arc::new(Self { inner: Arc::new(RwLock::new(map)), file_path }))
    }

    async fn persist(&self, map: &HashMap<K, V>) -> Result<(), ServiceError> {
        let data = serde_json::to_vec_pretty(map)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        super::write_atomic(&self.file_path, &data).await
    }

    /// List all entries as `(key, value)` pairs.
    pub async fn list(&self) -> Vec<(K, V)> {
        let map = self.inner.read().await;
        map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    /// Get value by key.
    pub async fn get(&self, key: &K) -> Option<V> {
        let map = self.inner.read().await;
        map.get(key).cloned()
    }

    pub async fn contains_key(&self, key: &K) -> bool {
        let map = self.inner.read().await;
        map.contains_key(key)
    }

    /// Insert or update a value by key and persist.
    pub async fn insert(&self, key: K, value: V) -> Result<(), ServiceError> {
        self.update_map(|map| {
            map.insert(key, value);
            Ok(())
        })
        .await
    }

    /// Insert only if the key is absent; returns whether the insert happened.
    /// The existence check and the insert run under one write guard.
    pub async fn insert_if_absent(&self, key: K, value: V) -> Result<bool, ServiceError> {
        let mut inserted = false;
        self.update_map(|map| {
            if !map.contains_key(&key) {
                map.insert(key, value);
                inserted = true;
            }
            Ok(())
        })
        .await?;
        Ok(inserted)
    }

    /// Remove a key and persist; returns whether it existed.
    pub async fn remove(&self, key: &K) -> Result<bool, ServiceError> {
        let mut existed = false;
        self.update_map(|map| {
            existed = map.remove(key).is_some();
            Ok(())
        })
        .await?;
        Ok(existed)
    }

    /// Apply a mutation to the underlying map and persist. The closure runs
    /// against a copy of the collection; the in-memory state only advances
    /// once the rewrite reaches disk, so a failed save or a rejecting
    /// closure leaves memory and file agreeing.
    pub async fn update_map<F>(&self, f: F) -> Result<(), ServiceError>
    where
        F: FnOnce(&mut HashMap<K, V>) -> Result<(), ServiceError>,
    {
        let mut map = self.inner.write().await;
        let mut next = map.clone();
        f(&mut next)?;
        self.persist(&next).await?;
        *map = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("{}_{}.json", tag, uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn json_map_store_crud_persists() -> Result<(), anyhow::Error> {
        let tmp = temp_path("json_map_store");
        let store = JsonMapStore::<String, String>::new(&tmp).await?;

        // initially empty
        assert_eq!(store.list().await.len(), 0);

        store.insert("a".into(), "1".into()).await?;
        store.insert("b".into(), "2".into()).await?;
        assert!(store.contains_key(&"a".into()).await);
        assert_eq!(store.get(&"a".into()).await.unwrap(), "1");

        store
            .update_map(|m| {
                if let Some(v) = m.get_mut(&"a".to_string()) {
                    *v = "10".into();
                }
                Ok(())
            })
            .await?;
        assert_eq!(store.get(&"a".into()).await.unwrap(), "10");

        // remove, then reload from disk to check persistence
        let existed = store.remove(&"b".into()).await?;
        assert!(existed);
        let reloaded = JsonMapStore::<String, String>::new(&tmp).await?;
        assert_eq!(reloaded.list().await.len(), 1);
        assert_eq!(reloaded.get(&"a".into()).await.unwrap(), "10");

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn insert_if_absent_refuses_duplicates() -> Result<(), anyhow::Error> {
        let tmp = temp_path("json_map_store_dup");
        let store = JsonMapStore::<String, String>::new(&tmp).await?;

        assert!(store.insert_if_absent("k".into(), "first".into()).await?);
        assert!(!store.insert_if_absent("k".into(), "second".into()).await?);
        assert_eq!(store.get(&"k".into()).await.unwrap(), "first");

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn unparsable_file_loads_as_empty() -> Result<(), anyhow::Error> {
        let tmp = temp_path("json_map_store_corrupt");
        tokio::fs::write(&tmp, b"{ not json at all").await?;

        let store = JsonMapStore::<String, String>::new(&tmp).await?;
        assert_eq!(store.list().await.len(), 0);

        // next save replaces the corrupted content wholesale
        store.insert("a".into(), "1".into()).await?;
        let reloaded = JsonMapStore::<String, String>::new(&tmp).await?;
        assert_eq!(reloaded.get(&"a".into()).await.unwrap(), "1");

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn missing_file_is_created_empty() -> Result<(), anyhow::Error> {
        let tmp = temp_path("json_map_store_missing");
        let _store = JsonMapStore::<String, String>::new(&tmp).await?;
        let bytes = tokio::fs::read(&tmp).await?;
        let map: std::collections::HashMap<String, String> = serde_json::from_slice(&bytes)?;
        assert!(map.is_empty());

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }
}
