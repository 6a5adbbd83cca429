//! Cached PokeAPI client that wraps PokeApiClient with transparent caching.

use color_eyre::Result;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::cache::{AnyStorage, CacheResult, Cacheable, QueryCache, QueryKey};
use crate::config::{CacheConfig, Config};

use super::cache::{PokeQueryKey, QueryKind};
use super::client::PokeApiClient;
use super::error::{ApiError, ApiResult};
use super::types::{EvolutionChain, Identifier, ListPage, Pokemon, Species};

/// Staleness window for each query kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaleTimes {
  pub list: Duration,
  pub pokemon: Duration,
  pub search: Duration,
  pub species: Duration,
  pub catalog: Duration,
}

impl StaleTimes {
  pub fn for_kind(&self, kind: QueryKind) -> Duration {
    match kind {
      QueryKind::List => self.list,
      QueryKind::Pokemon => self.pokemon,
      QueryKind::Search => self.search,
      QueryKind::Species => self.species,
      QueryKind::Catalog => self.catalog,
    }
  }
}

impl From<&CacheConfig> for StaleTimes {
  fn from(config: &CacheConfig) -> Self {
    Self {
      list: Duration::from_secs(config.list_secs),
      pokemon: Duration::from_secs(config.pokemon_secs),
      search: Duration::from_secs(config.search_secs),
      species: Duration::from_secs(config.species_secs),
      catalog: Duration::from_secs(config.catalog_secs),
    }
  }
}

impl Default for StaleTimes {
  fn default() -> Self {
    Self::from(&CacheConfig::default())
  }
}

/// PokeAPI client with transparent caching support.
///
/// This wraps the underlying PokeApiClient and provides the same API, but
/// values come back as shared `Arc`s: a fresh cached value is the same
/// allocation every time it is returned.
///
/// Create one per session and hand out clones; clones share the cache.
#[derive(Clone)]
pub struct CachedPokeApiClient {
  inner: PokeApiClient,
  cache: QueryCache<ApiError, AnyStorage>,
  stale_times: StaleTimes,
  page_size: u32,
  debounce: Duration,
}

impl CachedPokeApiClient {
  /// Create a new cached client.
  pub fn new(config: &Config) -> Result<Self> {
    let inner = PokeApiClient::new(&config.api)?;
    let cache = QueryCache::new(AnyStorage::new(config.cache.enabled));

    Ok(Self {
      inner,
      cache,
      stale_times: StaleTimes::from(&config.cache),
      page_size: config.api.page_size,
      debounce: config.search.debounce(),
    })
  }

  pub fn cache(&self) -> &QueryCache<ApiError, AnyStorage> {
    &self.cache
  }

  pub fn stale_times(&self) -> StaleTimes {
    self.stale_times
  }

  pub fn page_size(&self) -> u32 {
    self.page_size
  }

  pub fn debounce(&self) -> Duration {
    self.debounce
  }

  /// Get one page of the pokemon list with caching.
  pub async fn get_pokemon_list(&self, limit: u32, offset: u32) -> ApiResult<Arc<ListPage>> {
    let inner = self.inner.clone();
    self
      .cached(PokeQueryKey::PokemonList { limit, offset }, move || async move {
        inner.get_pokemon_list(limit, offset).await
      })
      .await
  }

  /// Get a single pokemon by name or id with caching.
  ///
  /// Not-found results are not cached; asking again goes back upstream.
  pub async fn get_pokemon(&self, id: &Identifier) -> ApiResult<Arc<Pokemon>> {
    let inner = self.inner.clone();
    let lookup = id.clone();
    self
      .cached(PokeQueryKey::Pokemon { id: id.clone() }, move || async move {
        inner.get_pokemon(&lookup).await
      })
      .await
  }

  /// Get species metadata with caching.
  pub async fn get_species(&self, id: &Identifier) -> ApiResult<Arc<Species>> {
    let inner = self.inner.clone();
    let lookup = id.clone();
    self
      .cached(PokeQueryKey::Species { id: id.clone() }, move || async move {
        inner.get_species(&lookup).await
      })
      .await
  }

  /// Get an evolution chain by URL with caching.
  pub async fn get_evolution_chain(&self, url: &str) -> ApiResult<Arc<EvolutionChain>> {
    let inner = self.inner.clone();
    let chain_url = url.to_string();
    self
      .cached(
        PokeQueryKey::EvolutionChain {
          url: url.to_string(),
        },
        move || async move { inner.get_evolution_chain(&chain_url).await },
      )
      .await
  }

  /// Search pokemon by name substring with caching.
  ///
  /// A blank query is "no search": it returns an empty page and touches
  /// neither the cache nor the network.
  pub async fn search_pokemon(&self, query: &str) -> ApiResult<Arc<ListPage>> {
    if query.trim().is_empty() {
      return Ok(Arc::new(ListPage::empty()));
    }

    let inner = self.inner.clone();
    let needle = query.to_string();
    self
      .cached(
        PokeQueryKey::Search {
          query: query.to_string(),
        },
        move || async move { inner.search_pokemon(&needle).await },
      )
      .await
  }

  /// Get the type catalog with caching.
  pub async fn get_types(&self) -> ApiResult<Arc<ListPage>> {
    let inner = self.inner.clone();
    self
      .cached(PokeQueryKey::Types, move || async move {
        inner.get_types().await
      })
      .await
  }

  /// Get the ability catalog with caching.
  pub async fn get_abilities(&self) -> ApiResult<Arc<ListPage>> {
    let inner = self.inner.clone();
    self
      .cached(PokeQueryKey::Abilities, move || async move {
        inner.get_abilities().await
      })
      .await
  }

  async fn cached<T, F, Fut>(&self, key: PokeQueryKey, fetcher: F) -> ApiResult<Arc<T>>
  where
    T: Cacheable,
    F: FnOnce() -> Fut,
    Fut: Future<Output = ApiResult<T>> + Send + 'static,
  {
    let result = self.cached_with_source(key, fetcher).await?;
    Ok(result.data)
  }

  /// Fetch through the cache, keeping where the value came from.
  async fn cached_with_source<T, F, Fut>(
    &self,
    key: PokeQueryKey,
    fetcher: F,
  ) -> ApiResult<CacheResult<Arc<T>>>
  where
    T: Cacheable,
    F: FnOnce() -> Fut,
    Fut: Future<Output = ApiResult<T>> + Send + 'static,
  {
    let stale_time = self.stale_times.for_kind(key.kind());
    let result = self.cache.fetch(&key, stale_time, fetcher).await?;
    debug!(query = %key.description(), source = ?result.source, "Resolved query");
    Ok(result)
  }
}
