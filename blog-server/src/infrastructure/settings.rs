use std::str::FromStr;

use anyhow::{Context, Result, anyhow};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl FromStr for AppEnv {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "dev" | "development" | "test" => Ok(Self::Development),
            "prod" | "production" => Ok(Self::Production),
            other => Err(anyhow!("unknown environment '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" | "in-memory" => Ok(Self::Memory),
            other => Err(anyhow!("unknown storage backend '{other}'")),
        }
    }
}

#[derive(Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

impl std::fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("url", &"[REDACTED]")
            .field("max_connections", &self.max_connections)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub app_env: AppEnv,
    pub storage_backend: StorageBackend,
    pub database: Option<DatabaseSettings>,
    pub http_addr: String,
    pub cors_origins: Vec<String>,
    pub log_level: String,
    pub http_request_body_limit_bytes: usize,
    pub http_concurrency_limit: usize,
    pub http_request_timeout_secs: u64,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let app_env = env
            .get("APP_ENV")
            .or_else(|| env.get("NODE_ENV"))
            .unwrap_or_default()
            .parse::<AppEnv>()
            .context("Failed to parse APP_ENV")?;
        let storage_backend = env
            .get("STORAGE_BACKEND")
            .unwrap_or_else(|| "postgres".to_string())
            .parse::<StorageBackend>()
            .context("Failed to parse STORAGE_BACKEND")?;

        let database = match env.get_non_empty("DATABASE_URL")? {
            Some(url) => Some(DatabaseSettings {
                url,
                max_connections: env.parse_positive("DB_MAX_CONNECTIONS", 10u32)?,
                connect_timeout_secs: env.parse_positive("DB_CONNECT_TIMEOUT_SECS", 30u64)?,
            }),
            None => None,
        };
        if storage_backend == StorageBackend::Postgres && database.is_none() {
            return Err(anyhow!(
                "DATABASE_URL is required when STORAGE_BACKEND=postgres"
            ));
        }

        let http_addr = env
            .get("HTTP_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8080".to_string());
        let cors_origins = parse_cors_origins(
            env.get("CORS_ORIGINS")
                .unwrap_or_else(|| "http://localhost:5173,http://127.0.0.1:5173".to_string()),
        );
        let log_level = env
            .get("LOG_LEVEL")
            .or_else(|| env.get("RUST_LOG"))
            .unwrap_or_else(|| "info".to_string());
        let http_request_body_limit_bytes =
            env.parse_positive("HTTP_REQUEST_BODY_LIMIT_BYTES", 1024 * 1024usize)?;
        let http_concurrency_limit = env.parse_positive("HTTP_CONCURRENCY_LIMIT", 256usize)?;
        let http_request_timeout_secs = env.parse_positive("HTTP_REQUEST_TIMEOUT_SECS", 10u64)?;

        Ok(Self {
            app_env,
            storage_backend,
            database,
            http_addr,
            cors_origins,
            log_level,
            http_request_body_limit_bytes,
            http_concurrency_limit,
            http_request_timeout_secs,
        })
    }

    pub fn require_database(&self) -> Result<&DatabaseSettings> {
        self.database
            .as_ref()
            .ok_or_else(|| anyhow!("DATABASE_URL is required for this command"))
    }
}

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
    }

    fn get_non_empty(&self, key: &str) -> Result<Option<String>> {
        match self.get(key) {
            Some(value) => {
                let value = value.trim().to_string();
                if value.is_empty() {
                    return Err(anyhow!("{key} must not be empty"));
                }
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn parse_positive<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: FromStr + PartialEq + Default + ToString,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        let value = self
            .get(key)
            .unwrap_or_else(|| default.to_string())
            .trim()
            .parse::<T>()
            .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?;

        if value == T::default() {
            return Err(anyhow!("{key} must be > 0"));
        }
        Ok(value)
    }
}

fn parse_cors_origins(raw: String) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}
