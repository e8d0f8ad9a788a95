use std::{path::PathBuf, sync::Arc};

use tokio::{fs, sync::RwLock};
use tracing::warn;

use crate::errors::ServiceError;

/// Generic JSON file-backed ordered sequence store.
///
/// The sibling of [`super::json_map_store::JsonMapStore`] for collections
/// that are arrays on disk. Insertion order is preserved; every mutation
/// rewrites the full sequence. Deletion is expressed as a [`Self::update`]
/// closure that filters the owned `Vec`, so find-and-remove stays a single
/// lock-mutate-persist cycle.
#[derive(Clone)]
pub struct JsonListStore<T> {
    inner: Arc<RwLock<Vec<T>>>,
    file_path: PathBuf,
}

impl<T> JsonListStore<T>
where
    T: serde::Serialize + serde::de::DeserializeOwned + Clone,
{
    /// Initialize the store from a path. A missing file is created with an
    /// empty array; an unparsable file loads as the empty default and is
    /// overwritten on the next save.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.ok();
        }

        let items: Vec<T> = match fs::read(&file_path).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(items) => items,
                Err(e) => {
                    warn!(path = %file_path.display(), error = %e, "unparsable collection file, starting from empty");
                    Vec::new()
                }
            },
            Err(_) => {
                let empty: Vec<T> = Vec::new();
                let data = serde_json::to_vec_pretty(&empty)
                    .map_err(|e| ServiceError::Storage(e.to_string()))?;
                super::write_atomic(&file_path, &data).await?;
                empty
            }
        };

        Ok(Arc::new(Self { inner: Arc::new(RwLock::new(items)), file_path }))
    }

    async fn persist(&self, items: &Vec<T>) -> Result<(), ServiceError> {
        let data = serde_json::to_vec_pretty(items)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        super::write_atomic(&self.file_path, &data).await
    }

    /// All items in insertion order.
    pub async fn list(&self) -> Vec<T> {
        let items = self.inner.read().await;
        items.clone()
    }

    /// Append an item and persist.
    pub async fn push(&self, item: T) -> Result<(), ServiceError> {
        self.update(|items| {
            items.push(item);
            Ok(())
        })
        .await
    }

    /// Apply a mutation to the whole sequence and persist. The closure runs
    /// against a copy of the collection; the in-memory state only advances
    /// once the rewrite reaches disk, so a failed save or a rejecting
    /// closure leaves memory and file agreeing.
    pub async fn update<F>(&self, f: F) -> Result<(), ServiceError>
    where
        F: FnOnce(&mut Vec<T>) -> Result<(), ServiceError>,
    {
        let mut items = self.inner.write().await;
        let mut next = items.clone();
        f(&mut next)?;
        self.persist(&next).await?;
        *items = next;
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
    async fn push_preserves_insertion_order() -> Result<(), anyhow::Error> {
        let tmp = temp_path("json_list_store");
        let store = JsonListStore::<String>::new(&tmp).await?;
        assert!(store.list().await.is_empty());

        store.push("first".into()).await?;
        store.push("second".into()).await?;
        store.push("third".into()).await?;
        assert_eq!(store.list().await, vec!["first", "second", "third"]);

        // reload from disk, order intact
        let reloaded = JsonListStore::<String>::new(&tmp).await?;
        assert_eq!(reloaded.list().await, vec!["first", "second", "third"]);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn update_filters_and_persists() -> Result<(), anyhow::Error> {
        let tmp = temp_path("json_list_store_update");
        let store = JsonListStore::<i32>::new(&tmp).await?;
        for n in 1..=5 {
            store.push(n).await?;
        }

        store
            .update(|items| {
                items.retain(|n| n % 2 == 0);
                Ok(())
            })
            .await?;
        assert_eq!(store.list().await, vec![2, 4]);

        let reloaded = JsonListStore::<i32>::new(&tmp).await?;
        assert_eq!(reloaded.list().await, vec![2, 4]);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn unparsable_file_loads_as_empty() -> Result<(), anyhow::Error> {
        let tmp = temp_path("json_list_store_corrupt");
        tokio::fs::write(&tmp, b"[1, 2, oops").await?;

        let store = JsonListStore::<i32>::new(&tmp).await?;
        assert!(store.list().await.is_empty());

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn failed_update_closure_leaves_file_untouched() -> Result<(), anyhow::Error> {
        let tmp = temp_path("json_list_store_failed");
        let store = JsonListStore::<i32>::new(&tmp).await?;
        store.push(1).await?;

        let res = store
            .update(|items| {
                items.clear();
                Err(ServiceError::Validation("rejected".into()))
            })
            .await;
        assert!(res.is_err());

        // neither memory nor disk took the cleared state
        assert_eq!(store.list().await, vec![1]);
        let reloaded = JsonListStore::<i32>::new(&tmp).await?;
        assert_eq!(reloaded.list().await, vec![1]);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }
}
