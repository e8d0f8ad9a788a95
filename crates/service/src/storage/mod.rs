//! Storage abstractions for the service layer
//!
//! Two generic JSON file-backed stores: an ordered sequence
//! ([`json_list_store::JsonListStore`], used for cars and contact messages)
//! and a key-keyed map ([`json_map_store::JsonMapStore`], used for accounts).
//! Both load a typed default when the backing file is missing or unparsable,
//! and persist by rewriting the whole collection through a temp file rename.

pub mod json_list_store;
pub mod json_map_store;

use std::path::Path;

use crate::errors::ServiceError;

/// Write `data` to `path` via a sibling temp file and atomic rename, so a
/// crash mid-write never leaves a truncated collection behind.
pub(crate) async fn write_atomic(path: &Path, data: &[u8]) -> Result<(), ServiceError> {
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, data)
        .await
        .map_err(|e| ServiceError::Storage(e.to_string()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| ServiceError::Storage(e.to_string()))?;
    Ok(())
}
