use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use crate::errors::ServiceError;

/// Photo extensions accepted by the upload endpoint, matched
/// case-insensitively against the original filename.
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

/// Manages the photo upload directory: validates incoming files, assigns
/// collision-free storage names, and removes files when their owning
/// listing goes away. References handed out are bare filenames; callers
/// never see (or supply) paths into the directory.
#[derive(Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Validate and store uploaded bytes; returns the storage filename to
    /// persist in the owning record. Files whose extension is not in
    /// [`ALLOWED_EXTENSIONS`] are rejected, never silently dropped.
    pub async fn accept(&self, bytes: &[u8], original_filename: &str) -> Result<String, ServiceError> {
        let sanitized = sanitize_filename(original_filename);
        let ext = allowed_extension(&sanitized).ok_or_else(|| {
            ServiceError::Validation(format!("file type not allowed: {original_filename}"))
        })?;

        // Random token per upload: identical original names never collide,
        // and a re-upload of the same name gets a fresh cache identity.
        let stored = format!("{}.{}", Uuid::new_v4(), ext);
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        fs::write(self.dir.join(&stored), bytes)
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        debug!(stored = %stored, original = %original_filename, size = bytes.len(), "photo stored");
        Ok(stored)
    }

    /// Delete a stored file. Absence is not an error; references that try
    /// to name anything outside the managed directory are rejected.
    pub async fn remove(&self, reference: &str) -> Result<(), ServiceError> {
        if reference.is_empty() || reference.contains(['/', '\\']) || reference.contains("..") {
            return Err(ServiceError::Validation(format!(
                "invalid storage reference: {reference}"
            )));
        }
        match fs::remove_file(self.dir.join(reference)).await {
            Ok(()) => {
                debug!(reference = %reference, "photo removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ServiceError::Storage(e.to_string())),
        }
    }
}

/// Collapse a client-supplied filename to a filesystem-safe form: keep only
/// the last path segment, then only `[A-Za-z0-9._-]` characters.
pub fn sanitize_filename(name: &str) -> String {
    let last = name.rsplit(['/', '\\']).next().unwrap_or(name);
    last.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect()
}

/// The lowercased extension of `filename` if it is on the allow-list.
pub fn allowed_extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    if ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        Some(ext)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(tag: &str) -> UploadStore {
        UploadStore::new(std::env::temp_dir().join(format!("uploads_{}_{}", tag, Uuid::new_v4())))
    }

    #[tokio::test]
    async fn accepts_allowed_extensions_case_insensitively() -> Result<(), anyhow::Error> {
        let store = temp_store("ext");

        let stored = store.accept(b"png bytes", "photo.PNG").await?;
        assert!(stored.ends_with(".png"));
        assert!(store.dir().join(&stored).exists());

        for name in ["a.jpg", "b.JPEG", "c.gif"] {
            store.accept(b"bytes", name).await?;
        }
        Ok(())
    }

    #[tokio::test]
    async fn rejects_disallowed_and_extensionless_files() {
        let store = temp_store("reject");
        for name in ["malware.exe", "notes.txt", "archive.tar.gz", "noext"] {
            let res = store.accept(b"bytes", name).await;
            assert!(
                matches!(res, Err(ServiceError::Validation(_))),
                "{name} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn identical_original_names_never_collide() -> Result<(), anyhow::Error> {
        let store = temp_store("collide");
        let first = store.accept(b"first", "car.jpg").await?;
        let second = store.accept(b"second", "car.jpg").await?;
        assert_ne!(first, second);

        // both retrievable independently
        assert_eq!(tokio::fs::read(store.dir().join(&first)).await?, b"first");
        assert_eq!(tokio::fs::read(store.dir().join(&second)).await?, b"second");
        Ok(())
    }

    #[tokio::test]
    async fn remove_is_idempotent() -> Result<(), anyhow::Error> {
        let store = temp_store("remove");
        let stored = store.accept(b"bytes", "car.png").await?;

        store.remove(&stored).await?;
        assert!(!store.dir().join(&stored).exists());
        // second removal of the same reference is a no-op, not an error
        store.remove(&stored).await?;
        Ok(())
    }

    #[tokio::test]
    async fn path_escaping_references_rejected() {
        let store = temp_store("escape");
        for reference in ["../etc/passwd", "a/b.png", "a\\b.png", ""] {
            let res = store.remove(reference).await;
            assert!(matches!(res, Err(ServiceError::Validation(_))));
        }
    }

    #[test]
    fn sanitize_strips_paths_and_control_characters() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("dir\\sub\\photo.png"), "photo.png");
        assert_eq!(sanitize_filename("we ird\x07name.jpg"), "weirdname.jpg");
        assert_eq!(sanitize_filename("plain-name_1.jpeg"), "plain-name_1.jpeg");
    }
}
