//! Application settings.
//!
//! Non-secret settings live in `config.toml` (path overridable with `COUPON_CONFIG`);
//! every section has defaults, so a missing file still yields a usable configuration.
//! Partner credentials are read from the environment only and never stored in the file.

use crate::config::database::DEFAULT_DATABASE_URL;
use crate::core::product::ProductUpsert;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info, warn};

/// Default config file location
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Structure of the whole config.toml file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener settings
    pub server: ServerConfig,
    /// Storage settings
    pub database: DatabaseConfig,
    /// Partner catalog API settings
    pub partner: PartnerConfig,
    /// Products inserted on startup when the catalog is empty
    pub products: Vec<ProductUpsert>,
}

/// HTTP listener settings
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8089,
        }
    }
}

/// Storage settings
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SeaORM` connection URL
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
        }
    }
}

/// Partner catalog API settings
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PartnerConfig {
    /// Scheme and host of the partner API, without a trailing slash
    pub base_url: String,
    /// Transport timeout for one catalog request
    pub timeout_secs: u64,
}

impl Default for PartnerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.coufun.co.kr".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Credentials for the partner catalog API
#[derive(Clone)]
pub struct PartnerCredentials {
    /// Bearer token
    pub api_key: String,
    /// Partner client id sent as `cp_id`
    pub cp_id: String,
}

impl std::fmt::Debug for PartnerCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartnerCredentials")
            .field("api_key", &"<redacted>")
            .field("cp_id", &self.cp_id)
            .finish()
    }
}

impl PartnerCredentials {
    /// Reads `COUPON_API_KEY` and `COUPON_CP_ID` from the environment.
    ///
    /// # Errors
    /// Returns `Error::Config` naming the first variable that is unset.
    pub fn from_env() -> Result<Self> {
        let read = |name: &str| {
            std::env::var(name).map_err(|e| Error::Config {
                message: format!("{name} is not set: {e}"),
            })
        };
        Ok(Self {
            api_key: read("COUPON_API_KEY")?,
            cp_id: read("COUPON_CP_ID")?,
        })
    }
}

/// Parses a config file.
///
/// # Errors
/// Returns `Error::Config` if the file cannot be read or is not valid TOML.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

/// Loads the application configuration from `COUPON_CONFIG` (or ./config.toml).
///
/// A missing file falls back to defaults; a malformed one is an error. `DATABASE_URL`
/// overrides `database.url`.
pub fn load_app_config() -> Result<AppConfig> {
    let path = std::env::var("COUPON_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

    let mut config = if Path::new(&path).exists() {
        let config = load_config(&path)?;
        info!("Loaded configuration from {}", path);
        config
    } else {
        warn!("Config file {} not found, using defaults", path);
        AppConfig::default()
    };

    if let Ok(url) = std::env::var("DATABASE_URL") {
        config.database.url = url;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            [server]
            host = "127.0.0.1"
            port = 9000

            [database]
            url = "sqlite::memory:"

            [partner]
            base_url = "http://partner.test"
            timeout_secs = 3

            [[products]]
            goods_id = "P0001"
            goods_name = "아메리카노 (R)"
            goods_price = 2000
            exc_branch = "카페 A, 카페 B 전 지점"
        "#;

        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.partner.base_url, "http://partner.test");
        assert_eq!(config.partner.timeout_secs, 3);
        assert_eq!(config.products.len(), 1);
        assert_eq!(config.products[0].goods_id, "P0001");
        assert_eq!(config.products[0].goods_price, Some(Some(2000)));
        assert_eq!(config.products[0].goods_ori_price, None);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8089);
        assert_eq!(config.database.url, DEFAULT_DATABASE_URL);
        assert_eq!(config.partner.timeout_secs, 10);
        assert!(config.products.is_empty());
    }

    #[test]
    fn test_load_config_reports_missing_file() {
        let result = load_config("does/not/exist.toml");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_credentials_debug_redacts_key() {
        let creds = PartnerCredentials {
            api_key: "secret".to_string(),
            cp_id: "CP01".to_string(),
        };
        let printed = format!("{creds:?}");
        assert!(!printed.contains("secret"));
        assert!(printed.contains("CP01"));
    }
}
