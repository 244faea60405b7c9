//! Configuration loading.
//!
//! A single optional YAML file with serde defaults for every field; CLI
//! flags override the file. A missing file yields pure defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default listen port.
pub const DEFAULT_PORT: u16 = 3000;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (default: 127.0.0.1).
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Listen port (default: 3000).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            db_path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for signing tokens. Override the dev default in any
    /// real deployment.
    #[serde(default = "default_secret")]
    pub secret: String,

    /// Token lifetime in minutes.
    #[serde(default = "default_token_ttl_minutes")]
    pub token_ttl_minutes: i64,

    /// Age in minutes after which a valid token is reissued on response.
    #[serde(default = "default_refresh_after_minutes")]
    pub refresh_after_minutes: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: default_secret(),
            token_ttl_minutes: default_token_ttl_minutes(),
            refresh_after_minutes: default_refresh_after_minutes(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_db_path() -> PathBuf {
    PathBuf::from("task-tree.db")
}

fn default_secret() -> String {
    "dev-secret-change-me".to_string()
}

fn default_token_ttl_minutes() -> i64 {
    60
}

fn default_refresh_after_minutes() -> i64 {
    15
}

impl Config {
    /// Load from a YAML file, or return defaults when no path is given or
    /// the file does not exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_no_path() {
        let config = Config::load(None).unwrap();
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.auth.refresh_after_minutes, 15);
    }

    #[test]
    fn partial_yaml_fills_in_defaults() {
        let config: Config = serde_yaml::from_str("server:\n  port: 8080\n").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.bind, "127.0.0.1");
        assert_eq!(config.auth.token_ttl_minutes, 60);
    }

    #[test]
    fn full_yaml_roundtrip() {
        let yaml = "\
server:
  bind: 0.0.0.0
  port: 9000
  db_path: /tmp/tasks.db
auth:
  secret: s3cret
  token_ttl_minutes: 120
  refresh_after_minutes: 30
";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.server.bind, "0.0.0.0");
        assert_eq!(config.auth.secret, "s3cret");
        assert_eq!(config.auth.refresh_after_minutes, 30);
    }
}
