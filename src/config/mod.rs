//! Configuration loading and management
//!
//! Configuration comes from an optional YAML file, then a few environment
//! overrides. Every field has a default, so an empty file (or none at all)
//! yields a working in-memory server.

use crate::core::money::PricingPolicy;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Environment variable naming the YAML config file
pub const CONFIG_PATH_ENV: &str = "STOREFRONT_CONFIG";
/// Environment override for `server.bind`
pub const BIND_ENV: &str = "STOREFRONT_BIND";
/// Environment override for `storage.uri`
pub const MONGODB_URI_ENV: &str = "STOREFRONT_MONGODB_URI";

/// Complete service configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub pricing: PricingPolicy,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub events: EventsConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to bind (e.g., "0.0.0.0:5000")
    pub bind: String,

    /// Prefix under which `/orders` and `/products` are mounted
    pub route_prefix: String,

    /// Allow any origin (development)
    pub permissive_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".to_string(),
            route_prefix: "/api/v1".to_string(),
            permissive_cors: false,
        }
    }
}

/// Role granted to a configured token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenRole {
    User,
    Admin,
}

/// One bearer token and the principal it stands for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenEntry {
    pub token: String,
    pub user_id: Uuid,
    pub role: TokenRole,
}

/// Bearer-token table for the static auth provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub tokens: Vec<TokenEntry>,
}

/// Storage backend selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    InMemory,
    Mongodb,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Connection string (MongoDB backend)
    pub uri: Option<String>,
    /// Database name (MongoDB backend)
    pub database: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::InMemory,
            uri: None,
            database: "storefront".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Buffer size of the broadcast channel
    pub capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self { capacity: 1024 }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path))?;
        Self::from_yaml_str(&content).with_context(|| format!("invalid config file {}", path))
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        // An empty document deserializes to unit, not to a mapping
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `STOREFRONT_CONFIG` (if set) and apply env overrides
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_yaml_file(&path)?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (the environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup(BIND_ENV) {
            self.server.bind = bind;
        }
        if let Some(uri) = lookup(MONGODB_URI_ENV) {
            self.storage.uri = Some(uri);
            self.storage.backend = StorageBackend::Mongodb;
        }
    }

    /// Reject settings that would produce a broken service
    pub fn validate(&self) -> Result<()> {
        let p = &self.pricing;
        if !(0.0..=1.0).contains(&p.tax_rate) {
            bail!("pricing.tax_rate must be between 0 and 1, got {}", p.tax_rate);
        }
        if p.free_shipping_threshold < 0.0 || p.flat_shipping_fee < 0.0 {
            bail!("pricing amounts must be non-negative");
        }
        if self.storage.backend == StorageBackend::Mongodb && self.storage.uri.is_none() {
            bail!("storage.uri is required for the mongodb backend");
        }
        if self.events.capacity == 0 {
            bail!("events.capacity must be greater than zero");
        }
        if !self.server.route_prefix.is_empty() && !self.server.route_prefix.starts_with('/') {
            bail!("server.route_prefix must start with '/'");
        }
        Ok(())
    }
}
