//! Configuration management

use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use config::builder::DefaultState;
use serde::Deserialize;

use crate::constants::{DEFAULT_IDENTITY_RETRIES, DEFAULT_IDENTITY_TIMEOUT_MS};
use crate::error::AppError;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub jwt: JwtSettings,
    pub identity: IdentitySettings,
    #[serde(default = "default_tenants")]
    pub tenants: Vec<TenantSettings>,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub requests: RequestSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub env: String,
    pub host: String,
    pub port: u16,
    pub name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

/// Secret shared with the SSO service that signs bearer tokens.
#[derive(Debug, Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IdentitySettings {
    pub base_url: String,
    #[serde(default = "default_identity_timeout")]
    pub timeout_ms: u64,
    #[serde(default = "default_identity_retries")]
    pub retries: u32,
}

/// One institute: the partition (schema) it lives in and every spelling
/// that should route to it.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct TenantSettings {
    pub schema: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LoggingSettings {
    pub directory: Option<String>,
    pub file_prefix: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct RequestSettings {
    pub deadline_ms: Option<u64>,
}

fn default_identity_timeout() -> u64 {
    DEFAULT_IDENTITY_TIMEOUT_MS
}

fn default_identity_retries() -> u32 {
    DEFAULT_IDENTITY_RETRIES
}

pub fn default_tenants() -> Vec<TenantSettings> {
    vec![
        TenantSettings {
            schema: "grafit".into(),
            aliases: vec!["grafit".into(), "Grafit".into(), "графит".into(), "Графит".into()],
        },
        TenantSettings {
            schema: "giredmet".into(),
            aliases: vec!["giredmet".into(), "Giredmet".into(), "гиредмет".into(), "Гиредмет".into()],
        },
    ]
}

impl AppConfig {
    pub fn load() -> Result<Self, AppError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let config = Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("PHONEBOOK").prefix_separator("__").separator("__").try_parsing(true))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Builds a configuration from an inline TOML document layered over the defaults.
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        Self::defaults()?
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("app.env", "development")?
            .set_default("app.host", "127.0.0.1")?
            .set_default("app.port", 8080)?
            .set_default("app.name", "phonebook-server")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("database.acquire_timeout_secs", 3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [database]
        url = "postgres://localhost/phonebook"

        [jwt]
        secret = "test-secret"

        [identity]
        base_url = "http://localhost:44044"
    "#;

    #[test]
    fn test_defaults_fill_missing_sections() {
        let cfg = AppConfig::from_toml(MINIMAL).unwrap();
        assert_eq!(cfg.app.port, 8080);
        assert_eq!(cfg.database.max_connections, 10);
        assert_eq!(cfg.identity.timeout_ms, DEFAULT_IDENTITY_TIMEOUT_MS);
        assert_eq!(cfg.identity.retries, DEFAULT_IDENTITY_RETRIES);
        assert_eq!(cfg.tenants, default_tenants());
        assert!(cfg.requests.deadline_ms.is_none());
    }

    #[test]
    fn test_tenants_override() {
        let source = format!(
            "{}\n[[tenants]]\nschema = \"acme\"\naliases = [\"ACME\"]\n",
            MINIMAL
        );
        let cfg = AppConfig::from_toml(&source).unwrap();
        assert_eq!(cfg.tenants.len(), 1);
        assert_eq!(cfg.tenants[0].schema, "acme");
    }

    #[test]
    fn test_missing_jwt_is_error() {
        let source = r#"
            [database]
            url = "postgres://localhost/phonebook"
            [identity]
            base_url = "http://localhost:44044"
        "#;
        assert!(AppConfig::from_toml(source).is_err());
    }
}
