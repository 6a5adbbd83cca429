//! Data layer for a Pokedex front end: a typed PokeAPI client with a
//! deduplicating, staleness-aware query cache.

pub mod cache;
pub mod config;
pub mod logging;
pub mod pokeapi;
pub mod query;

pub use config::Config;
pub use pokeapi::{ApiError, ApiResult, CachedPokeApiClient, Identifier, PokeApiClient};
pub use query::{Query, QueryState, QueryStatus};
