use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub films: FilmsConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Sqlite,
    Memory,
}

impl StorageBackend {
    pub fn parse(value: &str) -> anyhow::Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StorageBackend::Sqlite),
            "memory" | "in-memory" | "in_memory" => Ok(StorageBackend::Memory),
            other => anyhow::bail!("Unknown STORAGE_BACKEND '{}'", other),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StorageBackend,
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// In-memory SQLite databases exist per connection
    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }

    pub fn effective_max_connections(&self) -> u32 {
        if self.is_in_memory() {
            1
        } else {
            self.max_connections.max(1)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilmsConfig {
    /// Count used by the popular-films query when the caller gives none
    pub popular_default_count: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                backend: StorageBackend::Sqlite,
                url: "sqlite::memory:".to_string(),
                max_connections: 5,
            },
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            films: FilmsConfig {
                popular_default_count: 10,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();
        let backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => StorageBackend::parse(&value)?,
            Err(_) => defaults.database.backend,
        };

        Ok(Self {
            database: DatabaseConfig {
                backend,
                url: env::var("DATABASE_URL").unwrap_or(defaults.database.url),
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.database.max_connections),
            },
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: env::var("SERVER_PORT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.server.port),
            },
            films: FilmsConfig {
                popular_default_count: env::var("POPULAR_DEFAULT_COUNT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.films.popular_default_count),
            },
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Config for an isolated in-memory store, used by tests and demos
    pub fn in_memory(backend: StorageBackend) -> Self {
        let mut config = Self::default();
        config.database.backend = backend;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_parsing() {
        assert_eq!(StorageBackend::parse("SQLite").unwrap(), StorageBackend::Sqlite);
        assert_eq!(StorageBackend::parse(" memory ").unwrap(), StorageBackend::Memory);
        assert!(StorageBackend::parse("postgres").is_err());
    }

    #[test]
    fn test_in_memory_url_forces_single_connection() {
        let mut config = Config::default();
        config.database.max_connections = 8;
        assert_eq!(config.database.effective_max_connections(), 1);

        config.database.url = "sqlite:data/filmorate.db".to_string();
        assert_eq!(config.database.effective_max_connections(), 8);
    }

    #[test]
    fn test_server_address() {
        let config = Config::default();
        assert_eq!(config.server_address(), "0.0.0.0:8080");
    }
}
