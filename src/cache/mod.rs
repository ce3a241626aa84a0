//! Todo cache backends.
//!
//! - **Redis**: the shared cache in front of the store, one multiplexed connection.
//! - **Memory**: per-process LRU with the same expiry semantics.
//! - **Disabled**: every read misses, every write is dropped.
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! backend = "redis"
//! url = "127.0.0.1:6379"
//! ttl_seconds = 10
//! ```

mod keys;
mod lock;
mod memory;
mod noop;
mod redis_cache;

use std::sync::Arc;

use tracing::info;

use crate::application::cache::TodoCache;
use crate::config::{CacheBackend, CacheSettings};
use crate::infra::error::InfraError;

pub use memory::MemoryTodoCache;
pub use noop::NoopTodoCache;
pub use redis_cache::RedisTodoCache;

/// Build the configured backend, connecting to Redis when selected.
pub async fn connect(settings: &CacheSettings) -> Result<Arc<dyn TodoCache>, InfraError> {
    let cache: Arc<dyn TodoCache> = match settings.backend {
        CacheBackend::Redis => {
            let cache = RedisTodoCache::connect(&settings.redis_url, settings.ttl, settings.timeout)
                .await
                .map_err(|err| InfraError::cache(err.to_string()))?;
            info!(
                target = "todos::cache",
                ttl_secs = settings.ttl.as_secs(),
                "Connected to Redis"
            );
            Arc::new(cache)
        }
        CacheBackend::Memory => {
            info!(
                target = "todos::cache",
                ttl_secs = settings.ttl.as_secs(),
                capacity = settings.memory_capacity.get(),
                "Using in-process cache"
            );
            Arc::new(MemoryTodoCache::new(settings.memory_capacity, settings.ttl))
        }
        CacheBackend::Disabled => {
            info!(target = "todos::cache", "Cache disabled");
            Arc::new(NoopTodoCache)
        }
    };

    Ok(cache)
}
