//! Cache contract shared by every backend.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::{Todo, TodoId};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to serialize cache payload: {0}")]
    Serialization(#[source] serde_json::Error),
    #[error("failed to deserialize cache payload: {0}")]
    Deserialization(#[source] serde_json::Error),
    #[error("cache backend error: {0}")]
    Backend(String),
    #[error("cache operation timed out")]
    Timeout,
}

impl CacheError {
    pub fn backend(err: impl std::fmt::Display) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Transient, expiring copy of todos keyed by identifier. Never authoritative.
#[async_trait]
pub trait TodoCache: Send + Sync {
    /// `Ok(None)` when the key is absent or expired.
    async fn get(&self, id: &TodoId) -> Result<Option<Todo>, CacheError>;

    /// Store `todo` under its id with the backend's fixed expiration.
    async fn set(&self, todo: &Todo) -> Result<(), CacheError>;

    async fn invalidate(&self, id: &TodoId) -> Result<(), CacheError>;
}

pub fn encode_todo(todo: &Todo) -> Result<Vec<u8>, CacheError> {
    serde_json::to_vec(todo).map_err(CacheError::Serialization)
}

pub fn decode_todo(payload: &[u8]) -> Result<Todo, CacheError> {
    serde_json::from_slice(payload).map_err(CacheError::Deserialization)
}
