//! Server configuration, read from the process environment

use anyhow::{Context, Result};
use config::Environment;
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub database_backend: DatabaseBackend,
    pub postgres: PostgresConfig,
    pub users_cache_ttl: Duration,
}

/// Flat view of the environment variables, e.g. `POSTGRES_HOST` -> `postgres_host`
///
/// Values stay strings until serde asks for a number, so credentials such as
/// `0123` are passed through untouched.
#[derive(Debug, Deserialize)]
struct RawConfig {
    bind_address: String,
    database_backend: DatabaseBackend,
    postgres_host: String,
    postgres_port: u16,
    postgres_user: String,
    postgres_password: String,
    postgres_database: String,
    users_cache_ttl_ms: u64,
}

impl Config {
    /// Load configuration from the process environment
    pub fn load() -> Result<Self> {
        info!("Loading configuration from environment...");
        Self::from_environment(Environment::default())
    }

    pub fn from_environment(env: Environment) -> Result<Self> {
        let raw: RawConfig = config::Config::builder()
            .set_default("bind_address", "0.0.0.0:3000")?
            .set_default("database_backend", "postgres")?
            .set_default("postgres_host", "localhost")?
            .set_default("postgres_port", 5432)?
            .set_default("postgres_user", "postgres")?
            .set_default("postgres_password", "")?
            .set_default("postgres_database", "postgres")?
            .set_default("users_cache_ttl_ms", 10_000)?
            .add_source(env)
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;

        Ok(raw.into())
    }
}

impl From<RawConfig> for Config {
    fn from(raw: RawConfig) -> Self {
        Config {
            bind_address: raw.bind_address,
            database_backend: raw.database_backend,
            postgres: PostgresConfig {
                host: raw.postgres_host,
                port: raw.postgres_port,
                user: raw.postgres_user,
                password: raw.postgres_password,
                database: raw.postgres_database,
            },
            users_cache_ttl: Duration::from_millis(raw.users_cache_ttl_ms),
        }
    }
}
