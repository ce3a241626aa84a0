use async_trait::async_trait;

use crate::application::cache::{CacheError, TodoCache};
use crate::domain::entities::{Todo, TodoId};

/// Backend used when caching is switched off: every read misses.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTodoCache;

#[async_trait]
impl TodoCache for NoopTodoCache {
    async fn get(&self, _id: &TodoId) -> Result<Option<Todo>, CacheError> {
        Ok(None)
    }

    async fn set(&self, _todo: &Todo) -> Result<(), CacheError> {
        Ok(())
    }

    async fn invalidate(&self, _id: &TodoId) -> Result<(), CacheError> {
        Ok(())
    }
}
