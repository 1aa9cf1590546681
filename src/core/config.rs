//! Configuration management for the MCP server.
//!
//! Configuration is read from environment variables (a `.env` file is loaded
//! first when present) and validated eagerly: a server with an unusable
//! Redmine configuration never starts serving.

use super::transport::TransportConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

/// Default per-request timeout in milliseconds.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Errors detected while loading configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("{0} is required")]
    Missing(&'static str),

    /// A variable is set to something unusable.
    #[error("{name}: {reason}")]
    Invalid { name: &'static str, reason: String },

    /// Authentication settings are missing or contradictory.
    #[error("{0}")]
    Auth(String),
}

impl ConfigError {
    fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            name,
            reason: reason.into(),
        }
    }
}

/// Main configuration structure for the MCP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Redmine connection settings.
    pub redmine: RedmineConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "mcp-server-redmine".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter: trace, debug, info, warn or error.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// How requests authenticate against Redmine.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AuthConfig {
    /// `X-Redmine-API-Key` header.
    ApiKey(String),

    /// HTTP basic authentication.
    Basic { username: String, password: String },
}

/// Custom Debug implementation to redact secrets from logs.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiKey(_) => f.debug_tuple("ApiKey").field(&"[REDACTED]").finish(),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"[REDACTED]")
                .finish(),
        }
    }
}

impl AuthConfig {
    /// Short description for startup logs.
    pub fn mode(&self) -> &'static str {
        match self {
            Self::ApiKey(_) => "API key",
            Self::Basic { .. } => "basic auth",
        }
    }
}

/// Redmine connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedmineConfig {
    /// Base URL of the Redmine instance.
    pub url: Url,

    /// Authentication mode.
    pub auth: AuthConfig,

    /// Verify TLS certificates.
    pub ssl_verify: bool,

    /// Extra PEM CA bundle to trust.
    pub ca_cert: Option<PathBuf>,

    /// Per-request timeout in milliseconds.
    pub request_timeout_ms: u64,

    /// Retries after the first attempt for transient failures.
    pub max_retries: u32,

    /// Also retry POST/PUT/DELETE requests.
    pub retry_writes: bool,
}

impl RedmineConfig {
    /// Settings for `url` and `auth` with every other option at its default.
    pub fn new(url: Url, auth: AuthConfig) -> Self {
        Self {
            url,
            auth,
            ssl_verify: true,
            ca_cert: None,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_writes: false,
        }
    }
}

impl Config {
    /// Configuration for `redmine` with defaults everywhere else.
    pub fn new(redmine: RedmineConfig) -> Self {
        Self {
            server: ServerConfig::default(),
            redmine,
            logging: LoggingConfig::default(),
            transport: TransportConfig::default(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Redmine settings use the `REDMINE_` prefix (`REDMINE_URL`,
    /// `REDMINE_API_KEY`, ...); `LOG_LEVEL` and `MCP_SERVER_NAME` control the
    /// server itself.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let raw_url = var("REDMINE_URL").ok_or(ConfigError::Missing("REDMINE_URL"))?;
        let url = Url::parse(raw_url.trim())
            .map_err(|e| ConfigError::invalid("REDMINE_URL", format!("Invalid Redmine URL ({})", e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::invalid(
                "REDMINE_URL",
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }

        let auth = resolve_auth(
            var("REDMINE_API_KEY"),
            var("REDMINE_USERNAME"),
            var("REDMINE_PASSWORD"),
        )?;

        let mut redmine = RedmineConfig::new(url, auth);

        if let Some(flag) = var("REDMINE_SSL_VERIFY") {
            redmine.ssl_verify = parse_bool("REDMINE_SSL_VERIFY", &flag)?;
        }

        if let Some(path) = var("REDMINE_CA_CERT") {
            let path = PathBuf::from(path);
            if !path.is_file() {
                return Err(ConfigError::invalid(
                    "REDMINE_CA_CERT",
                    format!("file not found: {}", path.display()),
                ));
            }
            redmine.ca_cert = Some(path);
        }

        if let Some(timeout) = var("REDMINE_REQUEST_TIMEOUT") {
            redmine.request_timeout_ms = parse_number("REDMINE_REQUEST_TIMEOUT", &timeout)?;
            if redmine.request_timeout_ms == 0 {
                return Err(ConfigError::invalid(
                    "REDMINE_REQUEST_TIMEOUT",
                    "must be greater than zero",
                ));
            }
        }

        if let Some(retries) = var("REDMINE_MAX_RETRIES") {
            redmine.max_retries = parse_number("REDMINE_MAX_RETRIES", &retries)?;
        }

        if let Some(flag) = var("REDMINE_RETRY_WRITES") {
            redmine.retry_writes = parse_bool("REDMINE_RETRY_WRITES", &flag)?;
        }

        let mut config = Self::new(redmine);

        if let Some(name) = var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Some(level) = var("LOG_LEVEL") {
            let level = level.trim().to_lowercase();
            if !matches!(level.as_str(), "trace" | "debug" | "info" | "warn" | "error") {
                return Err(ConfigError::invalid(
                    "LOG_LEVEL",
                    format!("expected one of trace, debug, info, warn, error; got '{}'", level),
                ));
            }
            config.logging.level = level;
        }

        if let Some(timeout) = var("MCP_HANDSHAKE_TIMEOUT") {
            config.transport.handshake_timeout_ms =
                parse_number("MCP_HANDSHAKE_TIMEOUT", &timeout)?;
        }

        Ok(config)
    }
}

/// Exactly one authentication mode must be configured.
fn resolve_auth(
    api_key: Option<String>,
    username: Option<String>,
    password: Option<String>,
) -> Result<AuthConfig, ConfigError> {
    match (api_key, username, password) {
        (Some(key), None, None) => Ok(AuthConfig::ApiKey(key)),
        (None, Some(username), Some(password)) => Ok(AuthConfig::Basic { username, password }),
        (None, None, None) => Err(ConfigError::Auth(
            "Either API key or username/password must be provided for authentication".to_string(),
        )),
        (None, Some(_), None) | (None, None, Some(_)) => Err(ConfigError::Auth(
            "REDMINE_USERNAME and REDMINE_PASSWORD must be set together".to_string(),
        )),
        (Some(_), _, _) => Err(ConfigError::Auth(
            "Configure either REDMINE_API_KEY or REDMINE_USERNAME/REDMINE_PASSWORD, not both"
                .to_string(),
        )),
    }
}

fn parse_bool(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(ConfigError::invalid(
            name,
            format!("expected true or false, got '{}'", other),
        )),
    }
}

fn parse_number<T: std::str::FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::invalid(name, format!("expected a non-negative integer, got '{}'", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use std::sync::Mutex;

    // Mutex to ensure env var tests run serially
    static ENV_TEST_LOCK: Mutex<()> = Mutex::new(());

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_api_key_config_with_defaults() {
        let config = load(&[
            ("REDMINE_URL", "https://redmine.example.com"),
            ("REDMINE_API_KEY", "abc123"),
        ])
        .unwrap();

        assert_eq!(config.redmine.auth, AuthConfig::ApiKey("abc123".into()));
        assert!(config.redmine.ssl_verify);
        assert_eq!(config.redmine.request_timeout_ms, 30_000);
        assert_eq!(config.redmine.max_retries, 3);
        assert!(!config.redmine.retry_writes);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.server.name, "mcp-server-redmine");
    }

    #[test]
    fn test_basic_auth_config() {
        let config = load(&[
            ("REDMINE_URL", "http://localhost:3000"),
            ("REDMINE_USERNAME", "admin"),
            ("REDMINE_PASSWORD", "secret"),
            ("REDMINE_SSL_VERIFY", "false"),
            ("REDMINE_REQUEST_TIMEOUT", "5000"),
            ("REDMINE_MAX_RETRIES", "1"),
            ("LOG_LEVEL", "DEBUG"),
        ])
        .unwrap();

        assert_eq!(config.redmine.auth.mode(), "basic auth");
        assert!(!config.redmine.ssl_verify);
        assert_eq!(config.redmine.request_timeout_ms, 5000);
        assert_eq!(config.redmine.max_retries, 1);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_missing_url_is_rejected() {
        let err = load(&[("REDMINE_API_KEY", "abc")]).unwrap_err();
        assert_eq!(err, ConfigError::Missing("REDMINE_URL"));
    }

    #[test]
    fn test_malformed_url_is_rejected() {
        let err = load(&[("REDMINE_URL", "not a url"), ("REDMINE_API_KEY", "abc")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "REDMINE_URL", .. }));
    }

    #[test]
    fn test_auth_modes_are_exclusive() {
        let url = ("REDMINE_URL", "https://redmine.example.com");

        let err = load(&[url]).unwrap_err();
        assert!(err.to_string().contains("Either API key or username/password"));

        let err = load(&[url, ("REDMINE_USERNAME", "admin")]).unwrap_err();
        assert!(matches!(err, ConfigError::Auth(_)));

        let err = load(&[
            url,
            ("REDMINE_API_KEY", "abc"),
            ("REDMINE_USERNAME", "admin"),
            ("REDMINE_PASSWORD", "secret"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("not both"));
    }

    #[test]
    fn test_invalid_numbers_and_levels() {
        let base = [
            ("REDMINE_URL", "https://redmine.example.com"),
            ("REDMINE_API_KEY", "abc"),
        ];

        let mut vars = base.to_vec();
        vars.push(("REDMINE_MAX_RETRIES", "-1"));
        assert!(matches!(
            load(&vars).unwrap_err(),
            ConfigError::Invalid { name: "REDMINE_MAX_RETRIES", .. }
        ));

        let mut vars = base.to_vec();
        vars.push(("LOG_LEVEL", "verbose"));
        assert!(matches!(
            load(&vars).unwrap_err(),
            ConfigError::Invalid { name: "LOG_LEVEL", .. }
        ));
    }

    #[test]
    fn test_ca_cert_must_exist() {
        let base = [
            ("REDMINE_URL", "https://redmine.example.com"),
            ("REDMINE_API_KEY", "abc"),
        ];

        let mut vars = base.to_vec();
        vars.push(("REDMINE_CA_CERT", "/definitely/not/here.pem"));
        assert!(matches!(
            load(&vars).unwrap_err(),
            ConfigError::Invalid { name: "REDMINE_CA_CERT", .. }
        ));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "-----BEGIN CERTIFICATE-----").unwrap();
        let path = file.path().to_string_lossy().to_string();
        let mut vars = base.to_vec();
        vars.push(("REDMINE_CA_CERT", path.as_str()));
        let config = load(&vars).unwrap();
        assert_eq!(config.redmine.ca_cert.as_deref(), Some(file.path()));
    }

    #[test]
    fn test_secrets_redacted_in_debug() {
        let auth = AuthConfig::Basic {
            username: "admin".into(),
            password: "super_secret".into(),
        };
        let debug_str = format!("{:?}", auth);
        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("super_secret"));

        let debug_str = format!("{:?}", AuthConfig::ApiKey("super_secret_key".into()));
        assert!(!debug_str.contains("super_secret_key"));
    }

    #[test]
    fn test_from_env_reads_process_environment() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("REDMINE_URL", "https://env.example.com");
            std::env::set_var("REDMINE_API_KEY", "env_key");
        }
        let config = Config::from_env().unwrap();
        assert_eq!(config.redmine.url.as_str(), "https://env.example.com/");
        unsafe {
            std::env::remove_var("REDMINE_URL");
            std::env::remove_var("REDMINE_API_KEY");
        }
    }
}
