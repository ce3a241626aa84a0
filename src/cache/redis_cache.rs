//! Redis cache backend.
//!
//! A single [`ConnectionManager`] is created at startup and cloned per call; it
//! multiplexes requests over one connection and reconnects on its own.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, RedisResult, aio::ConnectionManager};

use crate::application::cache::{CacheError, TodoCache, decode_todo, encode_todo};
use crate::domain::entities::{Todo, TodoId};

use super::keys::todo_key;

#[derive(Clone)]
pub struct RedisTodoCache {
    connection: ConnectionManager,
    ttl: Duration,
    timeout: Duration,
}

impl RedisTodoCache {
    pub async fn connect(url: &str, ttl: Duration, timeout: Duration) -> Result<Self, CacheError> {
        let client = redis::Client::open(url).map_err(CacheError::backend)?;
        let connection = within(timeout, ConnectionManager::new(client)).await?;
        Ok(Self {
            connection,
            ttl,
            timeout,
        })
    }
}

#[async_trait]
impl TodoCache for RedisTodoCache {
    async fn get(&self, id: &TodoId) -> Result<Option<Todo>, CacheError> {
        let mut connection = self.connection.clone();
        let payload: Option<Vec<u8>> = within(self.timeout, connection.get(todo_key(id))).await?;

        match payload {
            Some(bytes) => decode_todo(&bytes).map(Some),
            None => Ok(None),
        }
    }

    async fn set(&self, todo: &Todo) -> Result<(), CacheError> {
        let payload = encode_todo(todo)?;
        let mut connection = self.connection.clone();
        within(
            self.timeout,
            connection.set_ex::<_, _, ()>(todo_key(&todo.id), payload, self.ttl.as_secs()),
        )
        .await
    }

    async fn invalidate(&self, id: &TodoId) -> Result<(), CacheError> {
        let mut connection = self.connection.clone();
        within(self.timeout, connection.del::<_, ()>(todo_key(id))).await
    }
}

async fn within<T>(
    limit: Duration,
    operation: impl Future<Output = RedisResult<T>>,
) -> Result<T, CacheError> {
    match tokio::time::timeout(limit, operation).await {
        Ok(result) => result.map_err(CacheError::backend),
        Err(_) => Err(CacheError::Timeout),
    }
}
