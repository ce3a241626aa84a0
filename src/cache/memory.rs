//! In-process cache backend.
//!
//! Entries are held as the same JSON payload the Redis backend writes, under an
//! LRU bound, and expire a fixed time after they were stored.

use std::num::NonZeroUsize;
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use lru::LruCache;
use tokio::time::Instant;

use crate::application::cache::{CacheError, TodoCache, decode_todo, encode_todo};
use crate::domain::entities::{Todo, TodoId};

use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::memory";

struct Entry {
    payload: Vec<u8>,
    expires_at: Instant,
}

pub struct MemoryTodoCache {
    entries: RwLock<LruCache<TodoId, Entry>>,
    ttl: Duration,
}

impl MemoryTodoCache {
    pub fn new(capacity: NonZeroUsize, ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(capacity)),
            ttl,
        }
    }

    /// Number of stored entries, including any not yet swept after expiring.
    pub fn len(&self) -> usize {
        rw_read(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl TodoCache for MemoryTodoCache {
    async fn get(&self, id: &TodoId) -> Result<Option<Todo>, CacheError> {
        let payload = {
            let mut entries = rw_write(&self.entries, SOURCE, "get");
            let live = match entries.get(id) {
                Some(entry) if entry.expires_at > Instant::now() => Some(entry.payload.clone()),
                Some(_) => None,
                None => return Ok(None),
            };
            if live.is_none() {
                entries.pop(id);
            }
            live
        };

        payload.map(|bytes| decode_todo(&bytes)).transpose()
    }

    async fn set(&self, todo: &Todo) -> Result<(), CacheError> {
        let payload = encode_todo(todo)?;
        let entry = Entry {
            payload,
            expires_at: Instant::now() + self.ttl,
        };
        rw_write(&self.entries, SOURCE, "set").put(todo.id, entry);
        Ok(())
    }

    async fn invalidate(&self, id: &TodoId) -> Result<(), CacheError> {
        rw_write(&self.entries, SOURCE, "invalidate").pop(id);
        Ok(())
    }
}
