use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4) }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_dir: default_data_dir(), upload_dir: default_upload_dir() }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AuthConfig {
    /// HS256 secret for session tokens. Empty means "fill from JWT_SECRET".
    #[serde(default)]
    pub jwt_secret: String,
}

fn default_data_dir() -> String { "data".into() }
fn default_upload_dir() -> String { "data/uploads".into() }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load from `config.toml` (or `CONFIG_PATH`). A missing file falls
    /// back to defaults; a malformed one is an error, not a fallback.
    pub fn load_and_validate() -> Result<Self> {
        let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        let mut cfg = if std::path::Path::new(&path).exists() {
            load_from_file(&path)?
        } else {
            AppConfig::default()
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.storage.normalize_from_env();
        self.storage.validate()?;
        self.auth.normalize_from_env();
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if let Some(w) = self.worker_threads {
            if w == 0 { self.worker_threads = Some(4); }
        } else {
            self.worker_threads = Some(4);
        }
        Ok(())
    }
}

impl StorageConfig {
    pub fn normalize_from_env(&mut self) {
        if let Ok(dir) = std::env::var("DATA_DIR") {
            if !dir.trim().is_empty() { self.data_dir = dir; }
        }
        if let Ok(dir) = std::env::var("UPLOAD_DIR") {
            if !dir.trim().is_empty() { self.upload_dir = dir; }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.data_dir.trim().is_empty() {
            return Err(anyhow!("storage.data_dir must not be empty"));
        }
        if self.upload_dir.trim().is_empty() {
            return Err(anyhow!("storage.upload_dir must not be empty"));
        }
        Ok(())
    }
}

impl AuthConfig {
    pub fn normalize_from_env(&mut self) {
        // TOML value wins; the env var only fills an absent secret.
        if self.jwt_secret.trim().is_empty() {
            if let Ok(secret) = std::env::var("JWT_SECRET") {
                self.jwt_secret = secret;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable() {
        let mut cfg = AppConfig::default();
        cfg.normalize_and_validate().expect("defaults validate");
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.storage.data_dir, "data");
        assert_eq!(cfg.storage.upload_dir, "data/uploads");
    }

    #[test]
    fn zero_port_rejected() {
        let mut cfg = AppConfig::default();
        cfg.server.port = 0;
        assert!(cfg.normalize_and_validate().is_err());
    }

    #[test]
    fn toml_overrides_parse() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000

            [storage]
            data_dir = "/var/lib/carlot"
            "#,
        )
        .expect("parse");
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.storage.data_dir, "/var/lib/carlot");
        // upload_dir falls back to its serde default
        assert_eq!(cfg.storage.upload_dir, "data/uploads");
    }
}
