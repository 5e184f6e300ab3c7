use std::{env, fmt::Display, str::FromStr, time::Duration};

use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use crate::{
    constants::{DEFAULT_ACQUIRE_TIMEOUT_SECS, DEFAULT_MAX_CONNECTIONS},
    error::QueryError,
    postgres::PgStore,
};

pub const DATABASE_URL_KEY: &str = "FOODGRAM_DATABASE_URL";
pub const MAX_CONNECTIONS_KEY: &str = "FOODGRAM_MAX_CONNECTIONS";
pub const ACQUIRE_TIMEOUT_KEY: &str = "FOODGRAM_ACQUIRE_TIMEOUT";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Environment variable {0} is required")]
    Missing(&'static str),

    #[error("Invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup(DATABASE_URL_KEY)
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| {
                log::warn!("{DATABASE_URL_KEY} not set");
                ConfigError::Missing(DATABASE_URL_KEY)
            })?;

        Ok(Self {
            database_url,
            max_connections: try_load(&lookup, MAX_CONNECTIONS_KEY, DEFAULT_MAX_CONNECTIONS)?,
            acquire_timeout_secs: try_load(
                &lookup,
                ACQUIRE_TIMEOUT_KEY,
                DEFAULT_ACQUIRE_TIMEOUT_SECS,
            )?,
        })
    }

    pub async fn connect(&self) -> Result<PgStore, QueryError> {
        let pool = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(Duration::from_secs(self.acquire_timeout_secs))
            .connect(&self.database_url)
            .await
            .map_err(|e| {
                log::error!("Could not connect to database: {e}");
                QueryError::from(e)
            })?;

        Ok(PgStore::new(pool))
    }
}

fn try_load<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key) {
        Some(value) => value.trim().parse().map_err(|e: T::Err| {
            log::warn!("Invalid {key} value: {e}");
            ConfigError::Invalid {
                key,
                value: value.to_owned(),
                reason: e.to_string(),
            }
        }),
        None => {
            log::info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config =
            Config::from_lookup(lookup(&[(DATABASE_URL_KEY, "postgres://localhost/foodgram")]))
                .unwrap();

        assert_eq!(config.database_url, "postgres://localhost/foodgram");
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(config.acquire_timeout_secs, DEFAULT_ACQUIRE_TIMEOUT_SECS);
    }

    #[test]
    fn values_are_parsed() {
        let config = Config::from_lookup(lookup(&[
            (DATABASE_URL_KEY, "postgres://db/foodgram"),
            (MAX_CONNECTIONS_KEY, " 20 "),
            (ACQUIRE_TIMEOUT_KEY, "10"),
        ]))
        .unwrap();

        assert_eq!(config.max_connections, 20);
        assert_eq!(config.acquire_timeout_secs, 10);
    }

    #[test]
    fn database_url_is_required() {
        assert_eq!(
            Config::from_lookup(lookup(&[])),
            Err(ConfigError::Missing(DATABASE_URL_KEY))
        );
        assert_eq!(
            Config::from_lookup(lookup(&[(DATABASE_URL_KEY, "  ")])),
            Err(ConfigError::Missing(DATABASE_URL_KEY))
        );
    }

    #[test]
    fn malformed_number_is_reported() {
        let err = Config::from_lookup(lookup(&[
            (DATABASE_URL_KEY, "postgres://db/foodgram"),
            (MAX_CONNECTIONS_KEY, "many"),
        ]))
        .unwrap_err();

        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: MAX_CONNECTIONS_KEY,
                ..
            }
        ));
    }
}
