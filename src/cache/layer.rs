//! Cache layer that orchestrates caching logic with network fetching.

use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, warn};

use super::storage::{CacheEntry, CacheStorage, CachedValue, MemoryStorage};
use super::traits::{CacheError, CacheResult, Cacheable, QueryKey};

/// Outcome of one fetch, shared by every caller that joined it
type PendingFetch<E> = Shared<BoxFuture<'static, Result<CachedValue, E>>>;

struct Inner<S, E> {
  storage: S,
  in_flight: Mutex<HashMap<String, PendingFetch<E>>>,
}

impl<S: CacheStorage, E: CacheError> Inner<S, E> {
  fn in_flight(&self) -> MutexGuard<'_, HashMap<String, PendingFetch<E>>> {
    self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Record a finished fetch: store successes, never errors.
  fn complete(&self, key: &str, description: &str, entity_type: &'static str, result: &Result<CachedValue, E>) {
    let mut in_flight = self.in_flight();
    match result {
      Ok(value) => {
        self
          .storage
          .store(key, CacheEntry::new(Arc::clone(value), entity_type));
        debug!(query = description, entity_type, "Cached fetch result");
      }
      Err(_) => {
        debug!(query = description, "Fetch failed, nothing cached");
      }
    }
    in_flight.remove(key);
  }
}

/// Owned by a fetch task. If the task unwinds or is aborted before
/// `complete` runs, dropping this frees the key for the next caller.
struct InFlightSlot<S: CacheStorage, E: CacheError> {
  inner: Arc<Inner<S, E>>,
  hash: String,
  completed: bool,
}

impl<S: CacheStorage, E: CacheError> Drop for InFlightSlot<S, E> {
  fn drop(&mut self) {
    if !self.completed {
      warn!(key = %self.hash, "Fetch task ended without a result");
      self.inner.in_flight().remove(&self.hash);
    }
  }
}

/// Cache layer that manages caching logic and network fetching.
///
/// This layer sits between the application and the network client:
/// fresh entries are served without a request, concurrent requests for the
/// same key share one fetch, and failures are never cached.
///
/// Cloning is cheap and every clone shares the same entries.
pub struct QueryCache<E, S: CacheStorage = MemoryStorage> {
  inner: Arc<Inner<S, E>>,
  _error: PhantomData<fn() -> E>,
}

impl<E: CacheError> QueryCache<E, MemoryStorage> {
  /// Create an empty in-memory cache.
  pub fn in_memory() -> Self {
    Self::new(MemoryStorage::new())
  }
}

impl<E: CacheError, S: CacheStorage> QueryCache<E, S> {
  /// Create a new cache layer with the given storage backend.
  pub fn new(storage: S) -> Self {
    Self {
      inner: Arc::new(Inner {
        storage,
        in_flight: Mutex::new(HashMap::new()),
      }),
      _error: PhantomData,
    }
  }

  /// Fetch through the cache.
  ///
  /// 1. Fresh entry (younger than `stale_time`) - return it, no fetch
  /// 2. Fetch already in flight for this key - join it
  /// 3. Otherwise start a fetch; its result replaces the entry on success
  ///
  /// A stale entry is never returned: the caller waits for the refetch.
  /// The fetch runs on its own task, so a caller that stops waiting does
  /// not cancel it and the result still lands in the cache.
  pub async fn fetch<K, T, F, Fut>(
    &self,
    key: &K,
    stale_time: Duration,
    fetcher: F,
  ) -> Result<CacheResult<Arc<T>>, E>
  where
    K: QueryKey,
    T: Cacheable,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
  {
    let hash = key.cache_hash();
    let description = key.description();

    let (pending, joined) = {
      let mut in_flight = self.inner.in_flight();

      if let Some(entry) = self.inner.storage.get(&hash) {
        if !entry.is_stale(stale_time) {
          match entry.value.downcast::<T>() {
            Ok(value) => {
              debug!(query = %description, "Cache hit");
              return Ok(CacheResult::from_cache(value, entry.cached_at));
            }
            Err(_) => warn!(
              query = %description,
              stored = entry.entity_type,
              expected = T::entity_type(),
              "Cached value has unexpected type, refetching"
            ),
          }
        } else {
          debug!(query = %description, "Cache entry stale");
        }
      }

      match in_flight.get(&hash) {
        Some(pending) => {
          debug!(query = %description, "Joining in-flight fetch");
          (pending.clone(), true)
        }
        None => {
          let pending = self.spawn_fetch(hash.clone(), description.clone(), T::entity_type(), fetcher());
          in_flight.insert(hash, pending.clone());
          (pending, false)
        }
      }
    };

    let value = pending.await?;
    let value = value.downcast::<T>().map_err(|_| {
      E::cache_failure(
        &description,
        format!("joined fetch produced a value that is not {}", T::entity_type()),
      )
    })?;

    Ok(if joined {
      CacheResult::joined(value)
    } else {
      CacheResult::from_network(value)
    })
  }

  fn spawn_fetch<T, Fut>(
    &self,
    hash: String,
    description: String,
    entity_type: &'static str,
    fut: Fut,
  ) -> PendingFetch<E>
  where
    T: Cacheable,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
  {
    let mut slot = InFlightSlot {
      inner: Arc::clone(&self.inner),
      hash,
      completed: false,
    };
    let task_description = description.clone();
    let handle = tokio::spawn(async move {
      let result = fut.await.map(|value| Arc::new(value) as CachedValue);
      slot
        .inner
        .complete(&slot.hash, &task_description, entity_type, &result);
      slot.completed = true;
      result
    });

    async move {
      match handle.await {
        Ok(result) => result,
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(e) => Err(E::cache_failure(
          &description,
          format!("fetch task was cancelled: {}", e),
        )),
      }
    }
    .boxed()
    .shared()
  }

  /// True while a fetch for this key is running.
  pub fn is_fetching<K: QueryKey>(&self, key: &K) -> bool {
    self.inner.in_flight().contains_key(&key.cache_hash())
  }

  /// Drop the cached entry for a key. The next request refetches.
  pub fn invalidate<K: QueryKey>(&self, key: &K) -> bool {
    let removed = self.inner.storage.remove(&key.cache_hash());
    if removed {
      debug!(query = %key.description(), "Invalidated cache entry");
    }
    removed
  }

  /// Drop every cached entry. In-flight fetches still complete and store.
  pub fn clear(&self) {
    self.inner.storage.clear();
  }

  /// Number of cached entries.
  pub fn len(&self) -> usize {
    self.inner.storage.len()
  }

  pub fn is_empty(&self) -> bool {
    self.inner.storage.is_empty()
  }
}

impl<E, S: CacheStorage> Clone for QueryCache<E, S> {
  fn clone(&self) -> Self {
    Self {
      inner: Arc::clone(&self.inner),
      _error: PhantomData,
    }
  }
}
