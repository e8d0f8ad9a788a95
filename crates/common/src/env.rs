//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

/// Ensure the data and upload directories exist, creating them if missing.
/// Collection files live under `data_dir`; stored photos under `upload_dir`.
pub async fn ensure_env(data_dir: &str, upload_dir: &str) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(data_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {data_dir}: {e}"))?;
    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {upload_dir}: {e}"))?;
    Ok(())
}
