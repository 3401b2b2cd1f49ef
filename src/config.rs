use crate::vote::VoteStrategy;
use std::{env, path::PathBuf, time::Duration};
use thiserror::Error;
use tracing::info;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DATA_PATH: &str = "data/state.json";
pub const DEFAULT_REDIS_KEY: &str = "be-there:count";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin";
pub const DEFAULT_REMOTE_TIMEOUT_MS: u64 = 500;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub redis_url: Option<String>,
    pub redis_key: String,
    pub admin_password: String,
    pub vote_strategy: VoteStrategy,
    pub remote_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = match get("PORT") {
            Some(value) => value.trim().parse::<u16>().map_err(|err| ConfigError::Invalid {
                key: "PORT",
                value: value.clone(),
                reason: err.to_string(),
            })?,
            None => {
                info!("PORT not set, using default: {DEFAULT_PORT}");
                DEFAULT_PORT
            }
        };

        let data_path = get("APP_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                info!("APP_DATA_PATH not set, using default: {DEFAULT_DATA_PATH}");
                PathBuf::from(DEFAULT_DATA_PATH)
            });

        let redis_key = get("REDIS_KEY").unwrap_or_else(|| {
            info!("REDIS_KEY not set, using default: {DEFAULT_REDIS_KEY}");
            DEFAULT_REDIS_KEY.to_string()
        });

        let admin_password = get("ADMIN_PASSWORD").unwrap_or_else(|| {
            info!("ADMIN_PASSWORD not set, using the built-in default");
            DEFAULT_ADMIN_PASSWORD.to_string()
        });

        let vote_strategy = match get("VOTE_STRATEGY") {
            Some(value) => value.parse::<VoteStrategy>().map_err(|reason| ConfigError::Invalid {
                key: "VOTE_STRATEGY",
                value: value.clone(),
                reason,
            })?,
            None => {
                let strategy = VoteStrategy::default();
                info!("VOTE_STRATEGY not set, using default: {strategy}");
                strategy
            }
        };

        let timeout_ms = match get("REMOTE_TIMEOUT_MS") {
            Some(value) => value.trim().parse::<u64>().map_err(|err| ConfigError::Invalid {
                key: "REMOTE_TIMEOUT_MS",
                value: value.clone(),
                reason: err.to_string(),
            })?,
            None => {
                info!("REMOTE_TIMEOUT_MS not set, using default: {DEFAULT_REMOTE_TIMEOUT_MS}");
                DEFAULT_REMOTE_TIMEOUT_MS
            }
        };

        Ok(Self {
            port,
            data_path,
            redis_url: get("REDIS_URL"),
            redis_key,
            admin_password,
            vote_strategy,
            remote_timeout: Duration::from_millis(timeout_ms),
        })
    }
}
