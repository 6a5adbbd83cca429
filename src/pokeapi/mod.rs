//! PokeAPI client, cached client, and the queries built on top of them.

mod api_types;
mod cache;
mod cached_client;
mod client;
mod error;
mod evolution;
mod pagination;
mod queries;
pub mod types;

pub use cache::{PokeQueryKey, QueryKind};
pub use cached_client::{CachedPokeApiClient, StaleTimes};
pub use client::PokeApiClient;
pub use error::{ApiError, ApiResult};
pub use pagination::next_offset;
pub use queries::{PokeListQuery, PokeQuery, PokemonDetail, PokemonListing, PokemonSearch};
pub use types::{
  EvolutionChain, EvolutionNode, Identifier, ListPage, NamedResource, Pokemon, Species,
};
