use std::str::FromStr;
use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::errors::Error;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub db: DbConfig,
    pub redis: RedisConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub invitation: InvitationConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DbConfig {
    pub postgres: PostgresConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    #[serde(default = "default_conn")]
    pub max_connections: u32,
    #[serde(default = "default_migrations")]
    pub migrations: String,
}

fn default_conn() -> u32 {
    5
}

fn default_migrations() -> String {
    "./db/migrations".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// invitation code and friend list settings, all durations are in seconds
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InvitationConfig {
    #[serde(default = "default_code_expire")]
    pub code_expire: u64,
    #[serde(default = "default_friend_cache_expire")]
    pub friend_cache_expire: u64,
    #[serde(default = "default_max_friends")]
    pub max_friends: usize,
    #[serde(default = "default_code_len")]
    pub code_len: usize,
}

fn default_code_expire() -> u64 {
    24 * 60 * 60
}

fn default_friend_cache_expire() -> u64 {
    7 * 24 * 60 * 60
}

fn default_max_friends() -> usize {
    50
}

fn default_code_len() -> usize {
    6
}

impl Default for InvitationConfig {
    fn default() -> Self {
        Self {
            code_expire: default_code_expire(),
            friend_cache_expire: default_friend_cache_expire(),
            max_friends: default_max_friends(),
            code_len: default_code_len(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub output: LogOutput,
    #[serde(default = "default_log_path")]
    pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Console,
    File,
}

fn default_level() -> String {
    "debug".to_string()
}

fn default_log_path() -> String {
    "./logs".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            output: LogOutput::default(),
            path: default_log_path(),
        }
    }
}

impl Config {
    pub fn load(filename: impl AsRef<Path>) -> Result<Self, Error> {
        let content = fs::read_to_string(filename)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}

impl PostgresConfig {
    pub fn server_url(&self) -> String {
        if self.password.is_empty() {
            return format!("postgres://{}@{}:{}", self.user, self.host, self.port);
        }
        format!(
            "postgres://{}:{}@{}:{}",
            self.user, self.password, self.host, self.port
        )
    }

    pub fn url(&self) -> String {
        format!("{}/{}", self.server_url(), self.database)
    }
}

impl LogConfig {
    /// None when `level` is not a tracing level name
    pub fn max_level(&self) -> Option<tracing::Level> {
        tracing::Level::from_str(&self.level).ok()
    }
}

impl RedisConfig {
    pub fn url(&self) -> String {
        format!("redis://{}:{}", self.host, self.port)
    }
}

impl ServerConfig {
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn test_load() {
        let config = Config::load("./fixtures/config.yml").unwrap();
        assert_eq!(config.db.postgres.host, "localhost");
        assert_eq!(config.db.postgres.port, 5432);
        assert_eq!(config.db.postgres.user, "postgres");
        assert_eq!(config.db.postgres.password, "postgres");
        assert_eq!(config.redis.url(), "redis://localhost:6379");
        assert_eq!(config.server.server_url(), "127.0.0.1:50010");
        assert_eq!(config.invitation.max_friends, 50);
        assert_eq!(config.log.output, LogOutput::Console);
    }

    #[test]
    fn missing_sections_should_use_defaults() {
        let content = r#"
db:
  postgres:
    host: db
    port: 5432
    user: helper
    password: ""
    database: helper
redis:
  host: cache
  port: 6379
server:
  host: 0.0.0.0
  port: 8080
"#;
        let config: Config = serde_yaml::from_str(content).unwrap();
        assert_eq!(config.db.postgres.max_connections, 5);
        assert_eq!(config.db.postgres.url(), "postgres://helper@db:5432/helper");
        assert_eq!(config.invitation.code_expire, 86400);
        assert_eq!(config.invitation.code_len, 6);
        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn log_level_should_parse() {
        let mut log = LogConfig {
            level: "info".to_string(),
            ..Default::default()
        };
        assert_eq!(log.max_level(), Some(tracing::Level::INFO));

        log.level = "verbose".to_string();
        assert_eq!(log.max_level(), None);
    }

    #[test]
    fn load_missing_file_should_fail() {
        let err = Config::load("./fixtures/not_exists.yml").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::IOError);
    }
}
