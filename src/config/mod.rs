//! Configuration management
//!
//! YAML-based configuration with support for:
//! - Multiple configuration file locations
//! - Environment variable overrides
//! - Default values for all settings

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::middleware::rate_limit::RateLimitConfig;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub rate_limit: RateLimitSettings,
    /// Debug mode: error responses carry a trace field in addition to the
    /// message. Never enable in production.
    #[serde(default)]
    pub debug: bool,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_workers() -> usize {
    num_cpus::get()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: default_workers(),
        }
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Process-wide token signing secret. Must be set; an absent or short
    /// secret is a fatal startup error.
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_token_expiry")]
    pub token_expiry_hours: u64,
    #[serde(default = "default_password_min_length")]
    pub password_min_length: usize,
    /// Password for the bootstrap super_admin account created when the users
    /// table is empty. If unset, no account is seeded.
    #[serde(default)]
    pub bootstrap_admin_password: Option<String>,
}

fn default_token_expiry() -> u64 {
    24
}

fn default_password_min_length() -> usize {
    8
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_expiry_hours: default_token_expiry(),
            password_min_length: default_password_min_length(),
            bootstrap_admin_password: None,
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_database_url() -> String {
    "sqlite://./data/factory.db".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_connect_timeout() -> u64 {
    30
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
    #[serde(default)]
    pub target: LogTarget,
    /// Directory for log files (used when target is "file" or "both")
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    #[serde(default = "default_log_prefix")]
    pub log_prefix: String,
    #[serde(default = "default_log_rotation")]
    pub daily_rotation: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

/// Log output target
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogTarget {
    #[default]
    Console,
    File,
    Both,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("./logs")
}

fn default_log_prefix() -> String {
    "factory-api".to_string()
}

fn default_log_rotation() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            target: LogTarget::default(),
            log_dir: default_log_dir(),
            log_prefix: default_log_prefix(),
            daily_rotation: default_log_rotation(),
        }
    }
}

/// Response cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,
    /// TTL for cached GET responses in seconds. Writes do not invalidate
    /// cache entries, so this is also the staleness bound for reads.
    #[serde(default = "default_response_ttl")]
    pub response_ttl_secs: u64,
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
    /// Background eviction interval in seconds (0 to disable)
    #[serde(default = "default_eviction_interval")]
    pub eviction_interval_secs: u64,
}

fn default_cache_enabled() -> bool {
    true
}

fn default_response_ttl() -> u64 {
    300
}

fn default_max_entries() -> usize {
    10000
}

fn default_eviction_interval() -> u64 {
    600
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            response_ttl_secs: default_response_ttl(),
            max_entries: default_max_entries(),
            eviction_interval_secs: default_eviction_interval(),
        }
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitSettings {
    /// Loopback clients bypass counting entirely when set
    #[serde(default = "default_trust_loopback")]
    pub trust_loopback: bool,
    /// Quota for read (GET) endpoints
    #[serde(default = "read_rate_limit_config")]
    pub read: RateLimitConfig,
    /// Quota for write (POST/PUT/DELETE) endpoints
    #[serde(default = "write_rate_limit_config")]
    pub write: RateLimitConfig,
    /// Quota for login/registration endpoints
    #[serde(default = "auth_rate_limit_config")]
    pub auth: RateLimitConfig,
}

fn default_trust_loopback() -> bool {
    true
}

/// Standard quota for read endpoints: 10 requests per minute
pub fn read_rate_limit_config() -> RateLimitConfig {
    RateLimitConfig {
        limit: 10,
        window_secs: 60,
    }
}

/// Stricter quota for write endpoints: 5 requests per minute
pub fn write_rate_limit_config() -> RateLimitConfig {
    RateLimitConfig {
        limit: 5,
        window_secs: 60,
    }
}

/// Quota for authentication endpoints (brute force protection)
pub fn auth_rate_limit_config() -> RateLimitConfig {
    RateLimitConfig {
        limit: 10,
        window_secs: 60,
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            trust_loopback: default_trust_loopback(),
            read: read_rate_limit_config(),
            write: write_rate_limit_config(),
            auth: auth_rate_limit_config(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
            cache: CacheConfig::default(),
            rate_limit: RateLimitSettings::default(),
            debug: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment.
    ///
    /// The file is located via `FACTORY_CONFIG` or the standard search paths;
    /// when no file exists, defaults apply. Environment variables override
    /// file values, and the result is validated before being returned.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let config_path = std::env::var("FACTORY_CONFIG")
            .map(PathBuf::from)
            .ok()
            .or_else(Self::find_config_file);

        let mut config = if let Some(ref path) = config_path {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            serde_norway::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            AppConfig::default()
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Find the configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let paths = [
            PathBuf::from("config.yaml"),
            PathBuf::from("config/config.yaml"),
            PathBuf::from("/etc/factory-api/config.yaml"),
            dirs::config_dir()
                .map(|p| p.join("factory-api/config.yaml"))
                .unwrap_or_default(),
        ];

        paths.into_iter().find(|p| p.exists())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("FACTORY_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("FACTORY_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.database.url = url;
        }
        if let Ok(secret) = std::env::var("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Ok(password) = std::env::var("FACTORY_ADMIN_PASSWORD") {
            self.auth.bootstrap_admin_password = Some(password);
        }
        if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("FACTORY_LOG_FORMAT") {
            self.logging.format = match format.to_lowercase().as_str() {
                "json" => LogFormat::Json,
                "compact" => LogFormat::Compact,
                _ => LogFormat::Pretty,
            };
        }
        if let Ok(debug) = std::env::var("FACTORY_DEBUG") {
            self.debug = matches!(debug.to_lowercase().as_str(), "1" | "true" | "yes");
        }
    }

    /// Validate the configuration, failing startup on unusable values.
    fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.len() < 32 {
            anyhow::bail!(
                "auth.jwt_secret must be set and at least 32 characters (use the JWT_SECRET environment variable)"
            );
        }
        if self.database.url.is_empty() {
            anyhow::bail!("database.url must not be empty");
        }
        if self.auth.token_expiry_hours == 0 {
            anyhow::bail!("auth.token_expiry_hours must be greater than zero");
        }
        Ok(())
    }
}
