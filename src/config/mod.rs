//! Configuration loading and management
//!
//! Configuration comes from an optional YAML file (path in `LEDGER_CONFIG`),
//! then a handful of environment overrides. Every field has a default, so an
//! empty file or no file at all yields a runnable development setup.
//!
//! ```yaml
//! server:
//!   bind_addr: "0.0.0.0:5000"
//! auth:
//!   jwt_secret: "change-me"
//!   static_tokens:
//!     dev-token: "6f1c7a52-3d1e-4c89-9a57-0d6f3b1c2e4a"
//! interchange:
//!   transient_dir: "/var/tmp/ledger"
//!   max_upload_bytes: 5242880
//! storage:
//!   backend: mongodb
//!   mongodb_uri: "mongodb://localhost:27017"
//!   database: "ledger"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use uuid::Uuid;

pub const CONFIG_PATH_ENV: &str = "LEDGER_CONFIG";
pub const BIND_ADDR_ENV: &str = "LEDGER_BIND_ADDR";
pub const JWT_SECRET_ENV: &str = "LEDGER_JWT_SECRET";
pub const TRANSIENT_DIR_ENV: &str = "LEDGER_TRANSIENT_DIR";
pub const MONGODB_URI_ENV: &str = "LEDGER_MONGODB_URI";

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub interchange: InterchangeConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5000".to_string(),
        }
    }
}

/// Identity provider settings
///
/// When `jwt_secret` is set, bearer tokens are validated as HS256 JWTs;
/// otherwise `static_tokens` (token -> caller id) is used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: Option<String>,
    pub static_tokens: HashMap<String, Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InterchangeConfig {
    /// Directory for export and upload transient files
    pub transient_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl Default for InterchangeConfig {
    fn default() -> Self {
        Self {
            transient_dir: std::env::temp_dir(),
            max_upload_bytes: 5 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    InMemory,
    Mongodb,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub mongodb_uri: String,
    pub database: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::InMemory,
            mongodb_uri: "mongodb://localhost:27017".to_string(),
            database: "project_ledger".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path))?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Load from `LEDGER_CONFIG` (if set) and apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_yaml_file(&path)?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from a key lookup (the process environment in `load`)
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = lookup(BIND_ADDR_ENV) {
            self.server.bind_addr = addr;
        }
        if let Some(secret) = lookup(JWT_SECRET_ENV).filter(|s| !s.is_empty()) {
            self.auth.jwt_secret = Some(secret);
        }
        if let Some(dir) = lookup(TRANSIENT_DIR_ENV) {
            self.interchange.transient_dir = PathBuf::from(dir);
        }
        if let Some(uri) = lookup(MONGODB_URI_ENV) {
            self.storage.mongodb_uri = uri;
            self.storage.backend = StorageBackend::Mongodb;
        }
    }
}
