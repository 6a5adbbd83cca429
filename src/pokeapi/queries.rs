//! Queries bound to a `CachedPokeApiClient`, plus the composed sessions a
//! Pokedex screen drives from its event loop.

use std::sync::Arc;

use crate::query::{Debounced, InfiniteQuery, Query, QueryStatus};

use super::cache::QueryKind;
use super::cached_client::CachedPokeApiClient;
use super::error::ApiError;
use super::pagination::next_offset;
use super::types::{EvolutionChain, Identifier, ListPage, NamedResource, Pokemon, Species};

/// Query over one cached PokeAPI value
pub type PokeQuery<T> = Query<Arc<T>, ApiError>;

/// Infinite query over pages of the pokemon list
pub type PokeListQuery = InfiniteQuery<Arc<ListPage>, ApiError>;

impl CachedPokeApiClient {
  /// One page of the pokemon list.
  pub fn pokemon_list_query(&self, limit: u32, offset: u32) -> PokeQuery<ListPage> {
    let client = self.clone();
    Query::new(move || {
      let client = client.clone();
      async move { client.get_pokemon_list(limit, offset).await }
    })
    .with_stale_time(self.stale_times().for_kind(QueryKind::List))
  }

  /// The whole pokemon list, `page_size` entries at a time.
  pub fn infinite_pokemon_list_query(&self) -> PokeListQuery {
    let client = self.clone();
    let limit = self.page_size();
    InfiniteQuery::new(
      0,
      move |offset| {
        let client = client.clone();
        async move { client.get_pokemon_list(limit, offset).await }
      },
      |page: &Arc<ListPage>, offset| next_offset(page, offset),
    )
    .with_stale_time(self.stale_times().for_kind(QueryKind::List))
  }

  pub fn pokemon_query(&self, id: Identifier) -> PokeQuery<Pokemon> {
    let client = self.clone();
    Query::new(move || {
      let client = client.clone();
      let id = id.clone();
      async move { client.get_pokemon(&id).await }
    })
    .with_stale_time(self.stale_times().for_kind(QueryKind::Pokemon))
  }

  pub fn species_query(&self, id: Identifier) -> PokeQuery<Species> {
    let client = self.clone();
    Query::new(move || {
      let client = client.clone();
      let id = id.clone();
      async move { client.get_species(&id).await }
    })
    .with_stale_time(self.stale_times().for_kind(QueryKind::Species))
  }

  /// Evolution chain query; disabled until a chain URL is known.
  pub fn evolution_chain_query(&self, url: Option<String>) -> PokeQuery<EvolutionChain> {
    let client = self.clone();
    let enabled = url.is_some();
    let url = url.unwrap_or_default();
    Query::new(move || {
      let client = client.clone();
      let url = url.clone();
      async move { client.get_evolution_chain(&url).await }
    })
    .with_stale_time(self.stale_times().for_kind(QueryKind::Species))
    .with_enabled(enabled)
  }

  /// Name search; disabled for blank input.
  pub fn search_query(&self, query: &str) -> PokeQuery<ListPage> {
    let client = self.clone();
    let enabled = !query.trim().is_empty();
    let query = query.to_string();
    Query::new(move || {
      let client = client.clone();
      let query = query.clone();
      async move { client.search_pokemon(&query).await }
    })
    .with_stale_time(self.stale_times().for_kind(QueryKind::Search))
    .with_enabled(enabled)
  }

  pub fn types_query(&self) -> PokeQuery<ListPage> {
    let client = self.clone();
    Query::new(move || {
      let client = client.clone();
      async move { client.get_types().await }
    })
    .with_stale_time(self.stale_times().for_kind(QueryKind::Catalog))
  }

  pub fn abilities_query(&self) -> PokeQuery<ListPage> {
    let client = self.clone();
    Query::new(move || {
      let client = client.clone();
      async move { client.get_abilities().await }
    })
    .with_stale_time(self.stale_times().for_kind(QueryKind::Catalog))
  }
}

// ============================================================================
// Listing
// ============================================================================

/// Load-more pokemon list.
#[derive(Debug)]
pub struct PokemonListing {
  query: PokeListQuery,
}

impl PokemonListing {
  pub fn new(client: &CachedPokeApiClient) -> Self {
    Self {
      query: client.infinite_pokemon_list_query(),
    }
  }

  /// Load the first page.
  pub fn fetch(&mut self) {
    self.query.fetch();
  }

  /// Load the next page. Returns false if there is nothing to do yet.
  pub fn load_more(&mut self) -> bool {
    self.query.fetch_next_page()
  }

  pub fn refetch(&mut self) {
    self.query.refetch();
  }

  /// Reload from the first page once the list has gone stale.
  pub fn refetch_if_stale(&mut self) -> bool {
    self.query.refetch_if_stale()
  }

  pub fn poll(&mut self) -> bool {
    self.query.poll()
  }

  pub async fn settle(&mut self) -> bool {
    self.query.settle().await
  }

  pub fn status(&self) -> QueryStatus {
    self.query.status()
  }

  pub fn error(&self) -> Option<&ApiError> {
    self.query.error()
  }

  pub fn has_more(&self) -> bool {
    self.query.has_next_page()
  }

  pub fn is_loading_more(&self) -> bool {
    self.query.is_fetching_next_page()
  }

  /// Total pokemon upstream, as reported by the first page
  pub fn total(&self) -> Option<u32> {
    self.query.pages().first().map(|page| page.count)
  }

  /// Every entry loaded so far, in list order, each name once.
  pub fn results(&self) -> Vec<&NamedResource> {
    self
      .query
      .items(|page| page.results.as_slice(), |entry| entry.name.clone())
  }

  pub fn query(&self) -> &PokeListQuery {
    &self.query
  }
}

// ============================================================================
// Search
// ============================================================================

/// Debounced search box.
///
/// Typing goes through `set_input`; the search itself is only issued once
/// the input has settled (or on `submit`). Blank input issues nothing.
pub struct PokemonSearch {
  client: CachedPokeApiClient,
  input: Debounced<String>,
  query: PokeQuery<ListPage>,
}

impl PokemonSearch {
  pub fn new(client: &CachedPokeApiClient) -> Self {
    Self {
      client: client.clone(),
      input: Debounced::new(String::new(), client.debounce()),
      query: client.search_query(""),
    }
  }

  pub fn set_input(&mut self, text: impl Into<String>) {
    self.input.set(text.into());
  }

  /// Raw text in the box
  pub fn input(&self) -> &str {
    self.input.input()
  }

  /// Term the current results belong to
  pub fn term(&self) -> &str {
    self.input.value()
  }

  pub fn is_debouncing(&self) -> bool {
    self.input.is_pending()
  }

  /// Search now. For an unchanged term, a failed or stale search is
  /// repeated and a fresh one is left alone.
  ///
  /// Returns true if a request started.
  pub fn submit(&mut self) -> bool {
    if self.input.submit() {
      return self.restart();
    }
    if self.query.is_error() {
      self.query.refetch();
      return true;
    }
    self.query.refetch_if_stale()
  }

  /// Repeat the current search once its results have gone stale.
  pub fn refetch_if_stale(&mut self) -> bool {
    self.query.refetch_if_stale()
  }

  /// Advance the debounce timer and pick up results.
  ///
  /// Returns true if anything visible changed.
  pub fn tick(&mut self) -> bool {
    let mut changed = false;
    if self.input.poll() {
      self.restart();
      changed = true;
    }
    changed | self.query.poll()
  }

  /// Wait out the debounce, then the search it triggers.
  pub async fn settle(&mut self) -> bool {
    let mut changed = false;
    if self.input.settled().await {
      self.restart();
      changed = true;
    }
    changed | self.query.settle().await
  }

  pub fn query(&self) -> &PokeQuery<ListPage> {
    &self.query
  }

  /// Matches for the current term; empty while idle or loading.
  pub fn results(&self) -> &[NamedResource] {
    self
      .query
      .data()
      .map(|page| page.results.as_slice())
      .unwrap_or(&[])
  }

  fn restart(&mut self) -> bool {
    self.query = self.client.search_query(self.input.value());
    self.query.fetch();
    self.query.is_loading()
  }
}

impl std::fmt::Debug for PokemonSearch {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("PokemonSearch")
      .field("input", &self.input)
      .field("query", &self.query)
      .finish_non_exhaustive()
  }
}

// ============================================================================
// Detail
// ============================================================================

/// Pokemon detail screen: the pokemon, its species, and the evolution chain
/// the species points at.
///
/// The chain query stays disabled until species data arrives.
pub struct PokemonDetail {
  client: CachedPokeApiClient,
  pokemon: PokeQuery<Pokemon>,
  species: PokeQuery<Species>,
  evolution: PokeQuery<EvolutionChain>,
}

impl PokemonDetail {
  pub fn new(client: &CachedPokeApiClient, id: Identifier) -> Self {
    Self {
      client: client.clone(),
      pokemon: client.pokemon_query(id.clone()),
      species: client.species_query(id),
      evolution: client.evolution_chain_query(None),
    }
  }

  pub fn fetch(&mut self) {
    self.pokemon.fetch();
    self.species.fetch();
  }

  /// Refetch whatever has gone stale.
  pub fn refetch_if_stale(&mut self) {
    self.pokemon.refetch_if_stale();
    self.species.refetch_if_stale();
    self.evolution.refetch_if_stale();
  }

  /// Pick up results. Returns true if anything visible changed.
  pub fn tick(&mut self) -> bool {
    let mut changed = self.pokemon.poll();
    changed |= self.species.poll();
    changed |= self.link_evolution();
    changed | self.evolution.poll()
  }

  /// Wait for every query, following species into the evolution chain.
  pub async fn settle(&mut self) {
    self.pokemon.settle().await;
    self.species.settle().await;
    self.link_evolution();
    self.evolution.settle().await;
  }

  pub fn pokemon(&self) -> &PokeQuery<Pokemon> {
    &self.pokemon
  }

  pub fn species(&self) -> &PokeQuery<Species> {
    &self.species
  }

  pub fn evolution(&self) -> &PokeQuery<EvolutionChain> {
    &self.evolution
  }

  /// Species names along the evolution chain; empty until it loads.
  pub fn evolution_line(&self) -> Vec<&str> {
    self
      .evolution
      .data()
      .map(|chain| chain.flatten())
      .unwrap_or_default()
  }

  pub fn flavor_text(&self) -> Option<String> {
    self.species.data().and_then(|s| s.english_flavor_text())
  }

  pub fn genus(&self) -> Option<&str> {
    self.species.data().and_then(|s| s.english_genus())
  }

  fn link_evolution(&mut self) -> bool {
    if self.evolution.is_enabled() {
      return false;
    }
    let Some(species) = self.species.data() else {
      return false;
    };
    let url = species.evolution_chain_url.clone();
    self.evolution = self.client.evolution_chain_query(Some(url));
    self.evolution.fetch();
    true
  }
}

impl std::fmt::Debug for PokemonDetail {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("PokemonDetail")
      .field("pokemon", &self.pokemon)
      .field("species", &self.species)
      .field("evolution", &self.evolution)
      .finish_non_exhaustive()
  }
}
