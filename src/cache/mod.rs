//! Generic in-memory caching layer for async requests.
//!
//! This module provides an API-agnostic caching mechanism that:
//! - Keys results by query identity (kind + parameters)
//! - Serves entries until their per-call staleness window elapses
//! - Collapses concurrent requests for one key into a single fetch
//! - Never caches failures

mod layer;
mod storage;
mod traits;

pub use layer::QueryCache;
pub use storage::{AnyStorage, CacheEntry, CacheStorage, CachedValue, MemoryStorage, NoopStorage};
pub use traits::{CacheError, CacheResult, CacheSource, Cacheable, QueryKey};
