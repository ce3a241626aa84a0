//! Todo lookup, insertion, update and removal through the cache and the store.

use std::sync::Arc;

use metrics::counter;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::application::cache::TodoCache;
use crate::application::repos::{RepoError, TodosRepo};
use crate::domain::entities::{Todo, TodoId};

#[derive(Debug, Error)]
pub enum TodoError {
    #[error("todo type must not be empty")]
    EmptyType,
    #[error("a todo with type `{0}` already exists")]
    AlreadyExists(String),
    #[error("todo `{0}` not found")]
    NotFound(TodoId),
    #[error("todo `{0}` does not exist")]
    NothingDeleted(TodoId),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateResult {
    pub id: TodoId,
    #[serde(rename = "type")]
    pub todo_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteResult {
    pub id: TodoId,
}

/// Cache-aside over the store.
///
/// Invalidation is best-effort. A read that misses can fetch a row, lose the
/// race to a concurrent delete and then write the deleted todo back; that
/// entry stays readable until the cache TTL expires it.
#[derive(Clone)]
pub struct TodoService {
    store: Arc<dyn TodosRepo>,
    cache: Arc<dyn TodoCache>,
}

impl TodoService {
    pub fn new(store: Arc<dyn TodosRepo>, cache: Arc<dyn TodoCache>) -> Self {
        Self { store, cache }
    }

    pub async fn ping_store(&self) -> Result<(), RepoError> {
        self.store.ping().await
    }

    /// Cache first; on a miss the store answer is returned and written back.
    pub async fn get(&self, id: TodoId) -> Result<Todo, TodoError> {
        if let Some(todo) = self.cached(&id).await {
            return Ok(todo);
        }

        let todo = self
            .store
            .find_by_id(&id)
            .await?
            .ok_or(TodoError::NotFound(id))?;
        self.remember(&todo).await;
        Ok(todo)
    }

    pub async fn list(&self) -> Result<Vec<Todo>, TodoError> {
        self.store.list_all().await.map_err(TodoError::from)
    }

    pub async fn create(&self, todo_type: String) -> Result<Todo, TodoError> {
        ensure_type(&todo_type)?;

        if self.store.find_by_type(&todo_type).await?.is_some() {
            return Err(TodoError::AlreadyExists(todo_type));
        }

        // The unique index settles races the pre-check above cannot see.
        match self.store.insert(&todo_type).await {
            Ok(todo) => Ok(todo),
            Err(RepoError::Duplicate { .. }) => Err(TodoError::AlreadyExists(todo_type)),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn update(&self, id: TodoId, todo_type: String) -> Result<UpdateResult, TodoError> {
        ensure_type(&todo_type)?;

        match self.store.upsert(&id, &todo_type).await {
            Ok(()) => {}
            Err(RepoError::Duplicate { .. }) => return Err(TodoError::AlreadyExists(todo_type)),
            Err(err) => return Err(err.into()),
        }

        let todo = Todo::new(id, todo_type);
        self.remember(&todo).await;

        Ok(UpdateResult {
            id,
            todo_type: todo.todo_type,
        })
    }

    pub async fn delete(&self, id: TodoId) -> Result<DeleteResult, TodoError> {
        let removed = self.store.delete(&id).await?;
        if removed == 0 {
            return Err(TodoError::NothingDeleted(id));
        }

        self.forget(&id).await;
        Ok(DeleteResult { id })
    }

    async fn cached(&self, id: &TodoId) -> Option<Todo> {
        match self.cache.get(id).await {
            Ok(Some(todo)) => {
                counter!("todos_cache_hit_total").increment(1);
                Some(todo)
            }
            Ok(None) => {
                counter!("todos_cache_miss_total").increment(1);
                None
            }
            Err(err) => {
                counter!("todos_cache_miss_total").increment(1);
                counter!("todos_cache_error_total", "op" => "get").increment(1);
                warn!(
                    target = "todos::cache",
                    id = %id,
                    error = %err,
                    "cache read failed; falling back to store"
                );
                None
            }
        }
    }

    async fn remember(&self, todo: &Todo) {
        match self.cache.set(todo).await {
            Ok(()) => debug!(target = "todos::cache", id = %todo.id, "cached todo"),
            Err(err) => {
                counter!("todos_cache_error_total", "op" => "set").increment(1);
                warn!(
                    target = "todos::cache",
                    id = %todo.id,
                    error = %err,
                    "cache write failed; continuing without caching"
                );
            }
        }
    }

    async fn forget(&self, id: &TodoId) {
        if let Err(err) = self.cache.invalidate(id).await {
            counter!("todos_cache_error_total", "op" => "invalidate").increment(1);
            warn!(
                target = "todos::cache",
                id = %id,
                error = %err,
                "cache invalidation failed; entry expires on its own"
            );
        }
    }
}

fn ensure_type(todo_type: &str) -> Result<(), TodoError> {
    if todo_type.is_empty() {
        return Err(TodoError::EmptyType);
    }
    Ok(())
}
