use crate::config::ApiConfig;
use crate::pokeapi::api_types::{ApiEvolutionChain, ApiListResponse, ApiPokemon, ApiSpecies};
use crate::pokeapi::error::{ApiError, ApiResult};
use crate::pokeapi::types::{EvolutionChain, Identifier, ListPage, Pokemon, Species};
use color_eyre::{eyre::eyre, Result};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use url::Url;

/// Whether a 404 means "this entity doesn't exist" or a broken endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lookup {
  Collection,
  ByIdentifier,
}

/// PokeAPI client wrapper
#[derive(Clone)]
pub struct PokeApiClient {
  http: reqwest::Client,
  base_url: Url,
  catalog_limit: u32,
}

impl PokeApiClient {
  pub fn new(config: &ApiConfig) -> Result<Self> {
    let base_url = Url::parse(&config.base_url)
      .map_err(|e| eyre!("Invalid API base URL {}: {}", config.base_url, e))?;
    if base_url.cannot_be_a_base() {
      return Err(eyre!("API base URL cannot carry a path: {}", base_url));
    }

    let http = reqwest::Client::builder()
      .user_agent(config.user_agent.clone())
      .timeout(config.timeout())
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      http,
      base_url,
      catalog_limit: config.catalog_limit,
    })
  }

  pub fn base_url(&self) -> &Url {
    &self.base_url
  }

  /// Get one page of the pokemon list
  pub async fn get_pokemon_list(&self, limit: u32, offset: u32) -> ApiResult<ListPage> {
    let mut url = self.endpoint(&["pokemon"]);
    url
      .query_pairs_mut()
      .append_pair("limit", &limit.to_string())
      .append_pair("offset", &offset.to_string());

    let response: ApiListResponse = self.get_json(&url, Lookup::Collection).await?;
    response.into_page(url.as_str())
  }

  /// Get a single pokemon by name or id
  pub async fn get_pokemon(&self, id: &Identifier) -> ApiResult<Pokemon> {
    let url = self.endpoint(&["pokemon", &id.path_segment()]);
    let response: ApiPokemon = self.get_json(&url, Lookup::ByIdentifier).await?;
    response.into_pokemon(url.as_str())
  }

  /// Get species metadata by name or id
  pub async fn get_species(&self, id: &Identifier) -> ApiResult<Species> {
    let url = self.endpoint(&["pokemon-species", &id.path_segment()]);
    let response: ApiSpecies = self.get_json(&url, Lookup::ByIdentifier).await?;
    response.into_species(url.as_str())
  }

  /// Get an evolution chain by the absolute URL found in species data
  pub async fn get_evolution_chain(&self, chain_url: &str) -> ApiResult<EvolutionChain> {
    let url = Url::parse(chain_url).map_err(|e| {
      ApiError::parse(chain_url, format!("evolution chain url is not absolute: {}", e))
    })?;
    let response: ApiEvolutionChain = self.get_json(&url, Lookup::ByIdentifier).await?;
    response.into_chain(url.as_str())
  }

  /// Search pokemon by case-insensitive name substring.
  ///
  /// Upstream has no search endpoint, so this downloads the whole catalog
  /// (one page of `catalog_limit` entries) and filters it locally. A blank
  /// query matches nothing and makes no request.
  pub async fn search_pokemon(&self, query: &str) -> ApiResult<ListPage> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
      return Ok(ListPage::empty());
    }

    let mut url = self.endpoint(&["pokemon"]);
    url
      .query_pairs_mut()
      .append_pair("limit", &self.catalog_limit.to_string());

    let response: ApiListResponse = self.get_json(&url, Lookup::Collection).await?;
    let catalog = response.into_page(url.as_str())?;

    let results: Vec<_> = catalog
      .results
      .into_iter()
      .filter(|p| p.name.to_lowercase().contains(&needle))
      .collect();

    debug!(query, matches = results.len(), "Filtered pokemon catalog");

    Ok(ListPage {
      count: results.len() as u32,
      next: None,
      previous: None,
      results,
    })
  }

  /// Get the type catalog
  pub async fn get_types(&self) -> ApiResult<ListPage> {
    let url = self.endpoint(&["type"]);
    let response: ApiListResponse = self.get_json(&url, Lookup::Collection).await?;
    response.into_page(url.as_str())
  }

  /// Get the ability catalog
  pub async fn get_abilities(&self) -> ApiResult<ListPage> {
    let url = self.endpoint(&["ability"]);
    let response: ApiListResponse = self.get_json(&url, Lookup::Collection).await?;
    response.into_page(url.as_str())
  }

  /// Base URL with the given path segments appended (percent-encoded)
  fn endpoint(&self, segments: &[&str]) -> Url {
    let mut url = self.base_url.clone();
    // cannot_be_a_base was rejected in new(), so this always succeeds
    if let Ok(mut path) = url.path_segments_mut() {
      path.pop_if_empty().extend(segments);
    }
    url
  }

  async fn get_json<T: DeserializeOwned>(&self, url: &Url, lookup: Lookup) -> ApiResult<T> {
    let resource = url.as_str();
    info!(url = resource, "GET");

    let response = self
      .http
      .get(url.clone())
      .send()
      .await
      .map_err(|e| ApiError::transport(resource, &e))?;

    let status = response.status();
    if status == StatusCode::NOT_FOUND && lookup == Lookup::ByIdentifier {
      return Err(ApiError::NotFound {
        resource: resource.to_string(),
      });
    }
    if !status.is_success() {
      return Err(ApiError::status(resource, status));
    }

    let body = response
      .bytes()
      .await
      .map_err(|e| ApiError::transport(resource, &e))?;

    serde_json::from_slice(&body).map_err(|e| ApiError::parse(resource, e.to_string()))
  }
}
