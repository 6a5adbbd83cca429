//! Core traits and types for the caching system.

use chrono::{DateTime, Utc};

/// Trait for values that can be stored in the cache.
///
/// Values are shared behind `Arc` and looked up by query key, so the only
/// requirement beyond thread safety is a type name for logs.
pub trait Cacheable: Send + Sync + 'static {
  /// Entity type name for logs (e.g., "pokemon", "species")
  fn entity_type() -> &'static str;
}

/// Identity of a cached request: the query kind plus every parameter that
/// affects the result.
pub trait QueryKey {
  /// Stable, fixed-length key. Equal queries must hash equal.
  fn cache_hash(&self) -> String;

  /// Human-readable description for logs and errors
  fn description(&self) -> String;
}

/// Errors that can be shared between every caller joined on one fetch.
pub trait CacheError: Clone + Send + Sync + 'static {
  /// Error reported when a fetch task ended without producing a result
  /// (e.g. the runtime shut down underneath it).
  fn cache_failure(resource: &str, message: String) -> Self;
}

/// Result from a cache operation, including data and metadata about the source.
#[derive(Debug, Clone)]
pub struct CacheResult<T> {
  /// The actual data
  pub data: T,
  /// Where the data came from
  pub source: CacheSource,
  /// When the data was cached (if from cache)
  pub cached_at: Option<DateTime<Utc>>,
}

impl<T> CacheResult<T> {
  /// Create a new cache result from data this call fetched.
  pub fn from_network(data: T) -> Self {
    Self {
      data,
      source: CacheSource::Network,
      cached_at: None,
    }
  }

  /// Create a new cache result from fresh cached data.
  pub fn from_cache(data: T, cached_at: DateTime<Utc>) -> Self {
    Self {
      data,
      source: CacheSource::CacheFresh,
      cached_at: Some(cached_at),
    }
  }

  /// Create a new cache result for a call that joined another caller's fetch.
  pub fn joined(data: T) -> Self {
    Self {
      data,
      source: CacheSource::InFlight,
      cached_at: None,
    }
  }
}

/// Indicates where cached data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
  /// This call started the network fetch
  Network,
  /// Data from cache, still within its staleness window
  CacheFresh,
  /// Joined a fetch another caller had already started
  InFlight,
}
