//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::{Todo, TodoId};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }

    pub fn duplicate(constraint: impl Into<String>) -> Self {
        Self::Duplicate {
            constraint: constraint.into(),
        }
    }
}

/// Document store of record for todos.
#[async_trait]
pub trait TodosRepo: Send + Sync {
    async fn find_by_id(&self, id: &TodoId) -> Result<Option<Todo>, RepoError>;

    async fn find_by_type(&self, todo_type: &str) -> Result<Option<Todo>, RepoError>;

    /// All todos, in whatever order the store yields them.
    async fn list_all(&self) -> Result<Vec<Todo>, RepoError>;

    /// Insert a new todo; the store assigns its identity.
    async fn insert(&self, todo_type: &str) -> Result<Todo, RepoError>;

    /// Set `type` on the document with `id`, creating it when absent.
    async fn upsert(&self, id: &TodoId, todo_type: &str) -> Result<(), RepoError>;

    /// Returns the number of documents removed.
    async fn delete(&self, id: &TodoId) -> Result<u64, RepoError>;

    async fn ping(&self) -> Result<(), RepoError>;
}
