//! Configuration module for feedsync.

use serde::Deserialize;
use std::path::Path;

use crate::{FeedSyncError, Result};

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/feedsync.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/feedsync.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// How an existing document is brought up to date with its feed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileStrategy {
    /// Permanently delete the matching document, then insert a fresh one.
    #[default]
    DeleteAndInsert,
    /// Rewrite the matching document under its existing identifier.
    /// Falls back to delete and insert when the store cannot update.
    UpdateInPlace,
}

/// Feed synchronization configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Maximum number of feeds fetched concurrently in one pass.
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
    /// Maximum feed size in bytes.
    #[serde(default = "default_max_feed_size")]
    pub max_feed_size_bytes: u64,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Read timeout in seconds.
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,
    /// Total request timeout in seconds.
    #[serde(default = "default_total_timeout")]
    pub total_timeout_secs: u64,
    /// Maximum number of redirects.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    /// User agent sent with feed requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Allow feeds on loopback, private and local hosts.
    #[serde(default)]
    pub allow_private_hosts: bool,
    /// Reconcile strategy for documents that already exist.
    #[serde(default)]
    pub strategy: ReconcileStrategy,
    /// Author ID assigned to synced documents.
    #[serde(default = "default_author_id")]
    pub author_id: i64,
    /// Category assigned to synced documents.
    #[serde(default = "default_category")]
    pub category: String,
    /// Tag assigned to synced documents.
    #[serde(default = "default_tag")]
    pub tag: String,
    /// Periodic refresh interval in seconds (0 = disabled).
    #[serde(default)]
    pub refresh_interval_secs: u64,
}

fn default_max_concurrent_fetches() -> usize {
    4
}

fn default_max_feed_size() -> u64 {
    5 * 1024 * 1024 // 5MB
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_read_timeout() -> u64 {
    20
}

fn default_total_timeout() -> u64 {
    30
}

fn default_max_redirects() -> usize {
    5
}

fn default_user_agent() -> String {
    concat!("feedsync/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_author_id() -> i64 {
    1
}

fn default_category() -> String {
    "news-and-community".to_string()
}

fn default_tag() -> String {
    "rss-feed".to_string()
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: default_max_concurrent_fetches(),
            max_feed_size_bytes: default_max_feed_size(),
            connect_timeout_secs: default_connect_timeout(),
            read_timeout_secs: default_read_timeout(),
            total_timeout_secs: default_total_timeout(),
            max_redirects: default_max_redirects(),
            user_agent: default_user_agent(),
            allow_private_hosts: false,
            strategy: ReconcileStrategy::default(),
            author_id: default_author_id(),
            category: default_category(),
            tag: default_tag(),
            refresh_interval_secs: 0,
        }
    }
}

/// Web API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// Whether the Web API is enabled.
    #[serde(default)]
    pub enabled: bool,
    /// Host address to bind.
    #[serde(default = "default_web_host")]
    pub host: String,
    /// Port number for the Web API.
    #[serde(default = "default_web_port")]
    pub port: u16,
    /// CORS allowed origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Bearer token granting the manage-options capability.
    #[serde(default)]
    pub admin_token: String,
}

fn default_web_host() -> String {
    "127.0.0.1".to_string()
}

fn default_web_port() -> u16 {
    8080
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: default_web_host(),
            port: default_web_port(),
            cors_origins: vec![],
            admin_token: String::new(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Sync configuration.
    #[serde(default)]
    pub sync: SyncConfig,
    /// Web API configuration.
    #[serde(default)]
    pub web: WebConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(FeedSyncError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| FeedSyncError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `FEEDSYNC_ADMIN_TOKEN`: Override the admin bearer token
    pub fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var("FEEDSYNC_ADMIN_TOKEN") {
            if !token.is_empty() {
                self.web.admin_token = token;
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.web.enabled && self.web.admin_token.is_empty() {
            return Err(FeedSyncError::Config(
                "Web API is enabled but admin_token is not set. \
                 Set it in config.toml or via FEEDSYNC_ADMIN_TOKEN environment variable."
                    .to_string(),
            ));
        }
        if self.sync.max_concurrent_fetches == 0 {
            return Err(FeedSyncError::Config(
                "sync.max_concurrent_fetches must be at least 1".to_string(),
            ));
        }
        if self.sync.total_timeout_secs == 0 {
            return Err(FeedSyncError::Config(
                "sync.total_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.database.path, "data/feedsync.db");

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file, "logs/feedsync.log");

        assert_eq!(config.sync.max_concurrent_fetches, 4);
        assert_eq!(config.sync.max_feed_size_bytes, 5 * 1024 * 1024);
        assert_eq!(config.sync.connect_timeout_secs, 10);
        assert_eq!(config.sync.read_timeout_secs, 20);
        assert_eq!(config.sync.total_timeout_secs, 30);
        assert_eq!(config.sync.max_redirects, 5);
        assert!(config.sync.user_agent.starts_with("feedsync/"));
        assert!(!config.sync.allow_private_hosts);
        assert_eq!(config.sync.strategy, ReconcileStrategy::DeleteAndInsert);
        assert_eq!(config.sync.author_id, 1);
        assert_eq!(config.sync.category, "news-and-community");
        assert_eq!(config.sync.tag, "rss-feed");
        assert_eq!(config.sync.refresh_interval_secs, 0);

        assert!(!config.web.enabled);
        assert_eq!(config.web.host, "127.0.0.1");
        assert_eq!(config.web.port, 8080);
        assert!(config.web.cors_origins.is_empty());
        assert!(config.web.admin_token.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[database]
path = "custom/db.sqlite"

[logging]
level = "debug"
file = "custom/logs/app.log"

[sync]
max_concurrent_fetches = 8
max_feed_size_bytes = 1048576
connect_timeout_secs = 5
read_timeout_secs = 6
total_timeout_secs = 7
max_redirects = 2
user_agent = "MySync/2.0"
allow_private_hosts = true
strategy = "update_in_place"
author_id = 7
category = "press"
tag = "syndicated"
refresh_interval_secs = 900

[web]
enabled = true
host = "0.0.0.0"
port = 3000
cors_origins = ["http://localhost:5173"]
admin_token = "secret"
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.database.path, "custom/db.sqlite");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file, "custom/logs/app.log");

        assert_eq!(config.sync.max_concurrent_fetches, 8);
        assert_eq!(config.sync.max_feed_size_bytes, 1048576);
        assert_eq!(config.sync.connect_timeout_secs, 5);
        assert_eq!(config.sync.read_timeout_secs, 6);
        assert_eq!(config.sync.total_timeout_secs, 7);
        assert_eq!(config.sync.max_redirects, 2);
        assert_eq!(config.sync.user_agent, "MySync/2.0");
        assert!(config.sync.allow_private_hosts);
        assert_eq!(config.sync.strategy, ReconcileStrategy::UpdateInPlace);
        assert_eq!(config.sync.author_id, 7);
        assert_eq!(config.sync.category, "press");
        assert_eq!(config.sync.tag, "syndicated");
        assert_eq!(config.sync.refresh_interval_secs, 900);

        assert!(config.web.enabled);
        assert_eq!(config.web.host, "0.0.0.0");
        assert_eq!(config.web.port, 3000);
        assert_eq!(config.web.cors_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.web.admin_token, "secret");
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[sync]
max_concurrent_fetches = 2
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.sync.max_concurrent_fetches, 2);
        assert_eq!(config.sync.total_timeout_secs, 30);
        assert_eq!(config.database.path, "data/feedsync.db");
    }

    #[test]
    fn test_parse_empty_config() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.sync.category, "news-and-community");
        assert_eq!(config.web.port, 8080);
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = Config::parse("this is not valid toml [[[");

        assert!(result.is_err());
        if let Err(FeedSyncError::Config(msg)) = result {
            assert!(msg.contains("config parse error"));
        } else {
            panic!("Expected Config error");
        }
    }

    #[test]
    fn test_parse_unknown_strategy() {
        let result = Config::parse("[sync]\nstrategy = \"merge\"\n");
        assert!(matches!(result, Err(FeedSyncError::Config(_))));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::load("nonexistent.toml");
        assert!(matches!(result, Err(FeedSyncError::Io(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[database]\npath = \"x.db\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.database.path, "x.db");
    }

    #[test]
    fn test_validate_web_enabled_no_token() {
        let mut config = Config::default();
        config.web.enabled = true;

        let result = config.validate();
        assert!(matches!(result, Err(FeedSyncError::Config(ref msg)) if msg.contains("admin_token")));
    }

    #[test]
    fn test_validate_web_enabled_with_token() {
        let mut config = Config::default();
        config.web.enabled = true;
        config.web.admin_token = "token".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_concurrency() {
        let mut config = Config::default();
        config.sync.max_concurrent_fetches = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_apply_env_overrides_admin_token() {
        let original = std::env::var("FEEDSYNC_ADMIN_TOKEN").ok();

        std::env::set_var("FEEDSYNC_ADMIN_TOKEN", "env-token");
        let mut config = Config::default();
        config.apply_env_overrides();
        assert_eq!(config.web.admin_token, "env-token");

        std::env::set_var("FEEDSYNC_ADMIN_TOKEN", "");
        let mut config = Config::default();
        config.web.admin_token = "original".to_string();
        config.apply_env_overrides();
        assert_eq!(config.web.admin_token, "original");

        if let Some(val) = original {
            std::env::set_var("FEEDSYNC_ADMIN_TOKEN", val);
        } else {
            std::env::remove_var("FEEDSYNC_ADMIN_TOKEN");
        }
    }
}
