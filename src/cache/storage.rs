//! Cache storage trait and in-memory implementation.

use chrono::{DateTime, Utc};
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::time::Instant;

/// A cached value with its concrete type erased.
pub type CachedValue = Arc<dyn Any + Send + Sync>;

/// A single cached query result.
#[derive(Clone)]
pub struct CacheEntry {
  pub value: CachedValue,
  /// Entity type name of the stored value
  pub entity_type: &'static str,
  /// Monotonic fetch time, used for staleness
  pub fetched_at: Instant,
  /// Wall-clock fetch time, reported to consumers
  pub cached_at: DateTime<Utc>,
}

impl CacheEntry {
  pub fn new(value: CachedValue, entity_type: &'static str) -> Self {
    Self {
      value,
      entity_type,
      fetched_at: Instant::now(),
      cached_at: Utc::now(),
    }
  }

  /// True once the entry is at least `stale_time` old.
  pub fn is_stale(&self, stale_time: std::time::Duration) -> bool {
    self.fetched_at.elapsed() >= stale_time
  }
}

impl std::fmt::Debug for CacheEntry {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("CacheEntry")
      .field("entity_type", &self.entity_type)
      .field("fetched_at", &self.fetched_at)
      .field("cached_at", &self.cached_at)
      .finish_non_exhaustive()
  }
}

/// Trait for cache storage backends.
pub trait CacheStorage: Send + Sync + 'static {
  /// Get the entry stored under a key.
  fn get(&self, key: &str) -> Option<CacheEntry>;

  /// Store an entry, replacing any previous one.
  fn store(&self, key: &str, entry: CacheEntry);

  /// Remove an entry. Returns whether one was present.
  fn remove(&self, key: &str) -> bool;

  /// Remove every entry.
  fn clear(&self);

  /// Number of stored entries.
  fn len(&self) -> usize;

  fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

/// Storage implementation that doesn't cache anything.
/// Used when caching is disabled - all operations are no-ops.
#[derive(Debug, Default)]
pub struct NoopStorage;

impl CacheStorage for NoopStorage {
  fn get(&self, _key: &str) -> Option<CacheEntry> {
    None // Always miss
  }

  fn store(&self, _key: &str, _entry: CacheEntry) {
    // Discard
  }

  fn remove(&self, _key: &str) -> bool {
    false
  }

  fn clear(&self) {}

  fn len(&self) -> usize {
    0
  }
}

/// Process-local storage; lives as long as the owning cache.
#[derive(Debug, Default)]
pub struct MemoryStorage {
  entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }

  fn entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
    // Entries are replaced whole, so a panic elsewhere can't leave one half-written
    self.entries.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl CacheStorage for MemoryStorage {
  fn get(&self, key: &str) -> Option<CacheEntry> {
    self.entries().get(key).cloned()
  }

  fn store(&self, key: &str, entry: CacheEntry) {
    self.entries().insert(key.to_string(), entry);
  }

  fn remove(&self, key: &str) -> bool {
    self.entries().remove(key).is_some()
  }

  fn clear(&self) {
    self.entries().clear();
  }

  fn len(&self) -> usize {
    self.entries().len()
  }
}

/// Either storage backend, chosen at runtime from configuration.
#[derive(Debug)]
pub enum AnyStorage {
  Memory(MemoryStorage),
  Noop(NoopStorage),
}

impl AnyStorage {
  pub fn new(enabled: bool) -> Self {
    if enabled {
      AnyStorage::Memory(MemoryStorage::new())
    } else {
      AnyStorage::Noop(NoopStorage)
    }
  }

  fn backend(&self) -> &dyn CacheStorage {
    match self {
      AnyStorage::Memory(s) => s,
      AnyStorage::Noop(s) => s,
    }
  }
}

impl CacheStorage for AnyStorage {
  fn get(&self, key: &str) -> Option<CacheEntry> {
    self.backend().get(key)
  }

  fn store(&self, key: &str, entry: CacheEntry) {
    self.backend().store(key, entry)
  }

  fn remove(&self, key: &str) -> bool {
    self.backend().remove(key)
  }

  fn clear(&self) {
    self.backend().clear()
  }

  fn len(&self) -> usize {
    self.backend().len()
  }
}
