//! Caching implementations for PokeAPI types.

use sha2::{Digest, Sha256};

use crate::cache::{Cacheable, QueryKey};

use super::types::{EvolutionChain, Identifier, ListPage, Pokemon, Species};

// ============================================================================
// Cacheable implementations
// ============================================================================

impl Cacheable for Pokemon {
  fn entity_type() -> &'static str {
    "pokemon"
  }
}

impl Cacheable for ListPage {
  fn entity_type() -> &'static str {
    "list_page"
  }
}

impl Cacheable for Species {
  fn entity_type() -> &'static str {
    "species"
  }
}

impl Cacheable for EvolutionChain {
  fn entity_type() -> &'static str {
    "evolution_chain"
  }
}

// ============================================================================
// Query key types
// ============================================================================

/// Query key types for PokeAPI calls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PokeQueryKey {
  /// One page of the pokemon list (plain or infinite)
  PokemonList { limit: u32, offset: u32 },
  /// A single pokemon by name or id
  Pokemon { id: Identifier },
  /// Name substring search
  Search { query: String },
  /// Species metadata by name or id
  Species { id: Identifier },
  /// Evolution chain by its upstream URL
  EvolutionChain { url: String },
  /// Type catalog
  Types,
  /// Ability catalog
  Abilities,
}

/// Which staleness window a key falls under
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueryKind {
  List,
  Pokemon,
  Search,
  Species,
  Catalog,
}

impl PokeQueryKey {
  pub fn kind(&self) -> QueryKind {
    match self {
      Self::PokemonList { .. } => QueryKind::List,
      Self::Pokemon { .. } => QueryKind::Pokemon,
      Self::Search { .. } => QueryKind::Search,
      Self::Species { .. } | Self::EvolutionChain { .. } => QueryKind::Species,
      Self::Types | Self::Abilities => QueryKind::Catalog,
    }
  }

  /// Canonical `kind:params` string the hash is computed over
  fn canonical(&self) -> String {
    match self {
      Self::PokemonList { limit, offset } => format!("pokemon_list:{}:{}", limit, offset),
      Self::Pokemon { id } => format!("pokemon:{}", identifier_part(id)),
      Self::Search { query } => format!("search:{}", query),
      Self::Species { id } => format!("species:{}", identifier_part(id)),
      Self::EvolutionChain { url } => format!("evolution_chain:{}", url),
      Self::Types => "types".to_string(),
      Self::Abilities => "abilities".to_string(),
    }
  }
}

impl QueryKey for PokeQueryKey {
  fn cache_hash(&self) -> String {
    // SHA256 hash for stable, fixed-length keys
    let mut hasher = Sha256::new();
    hasher.update(self.canonical().as_bytes());
    let result = hasher.finalize();
    hex::encode(result)
  }

  fn description(&self) -> String {
    match self {
      Self::PokemonList { limit, offset } => {
        format!("pokemon list (limit {}, offset {})", limit, offset)
      }
      Self::Pokemon { id } => format!("pokemon {}", id),
      Self::Search { query } => format!("search \"{}\"", query),
      Self::Species { id } => format!("species {}", id),
      Self::EvolutionChain { url } => format!("evolution chain {}", url),
      Self::Types => "type catalog".to_string(),
      Self::Abilities => "ability catalog".to_string(),
    }
  }
}

/// Names and ids live in separate namespaces so "25" the name can never
/// collide with 25 the id.
fn identifier_part(id: &Identifier) -> String {
  match id {
    Identifier::Name(name) => format!("name={}", name),
    Identifier::Id(id) => format!("id={}", id),
  }
}
