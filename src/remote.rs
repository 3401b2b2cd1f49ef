//! Redis-backed numeric counter.
//!
//! Only the count lives remotely; `INCR` gives an atomic increment across
//! processes. Voters and event text stay in the local record.

use crate::errors::StoreError;
use crate::store::RemoteCounter;
use async_trait::async_trait;
use redis::{
    AsyncCommands, Client,
    aio::{ConnectionManager, ConnectionManagerConfig},
};
use std::time::Duration;

#[derive(Clone)]
pub struct RedisCounter {
    connection: ConnectionManager,
    key: String,
}

impl RedisCounter {
    /// Connects with a single retry, giving up after `timeout`.
    pub async fn connect(
        url: &str,
        key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let config = ConnectionManagerConfig::new().set_number_of_retries(1);
        let client = Client::open(url)?;
        let connection = tokio::time::timeout(
            timeout,
            client.get_connection_manager_with_config(config),
        )
        .await
        .map_err(|_| StoreError::Timeout(timeout))??;

        Ok(Self {
            connection,
            key: key.into(),
        })
    }
}

#[async_trait]
impl RemoteCounter for RedisCounter {
    async fn get(&self) -> Result<u64, StoreError> {
        let mut connection = self.connection.clone();
        let value: Option<u64> = connection.get(&self.key).await?;
        Ok(value.unwrap_or(0))
    }

    async fn incr(&self) -> Result<u64, StoreError> {
        let mut connection = self.connection.clone();
        let value: u64 = connection.incr(&self.key, 1u64).await?;
        Ok(value)
    }

    async fn reset(&self) -> Result<(), StoreError> {
        let mut connection = self.connection.clone();
        let _: () = connection.set(&self.key, 0u64).await?;
        Ok(())
    }
}
