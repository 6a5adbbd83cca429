//! Serde-deserializable types matching PokeAPI responses.
//!
//! These types are separate from domain types so required fields are
//! enforced by deserialization and the remaining shape rules are checked
//! once, here, before anything reaches the cache.

use serde::Deserialize;

use super::error::{ApiError, ApiResult};
use super::types::{
  Ability, EvolutionChain, EvolutionNode, FlavorText, Genus, ListPage, NamedResource, Pokemon,
  PokemonType, Species, Sprites, Stat,
};

// ============================================================================
// Common nested field types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiNamedResource {
  pub name: String,
  pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiUrlRef {
  pub url: String,
}

/// Reference where only the name is needed (language, version, habitat, shape)
#[derive(Debug, Deserialize)]
pub struct ApiName {
  pub name: String,
}

// ============================================================================
// List endpoints (/pokemon, /type, /ability)
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiListResponse {
  pub count: u32,
  pub next: Option<String>,
  pub previous: Option<String>,
  pub results: Vec<ApiNamedResource>,
}

// ============================================================================
// Pokemon endpoint
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiArtwork {
  pub front_default: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiOtherSprites {
  #[serde(rename = "official-artwork")]
  pub official_artwork: Option<ApiArtwork>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiSprites {
  pub front_default: Option<String>,
  pub front_shiny: Option<String>,
  pub back_default: Option<String>,
  pub back_shiny: Option<String>,
  pub other: Option<ApiOtherSprites>,
}

#[derive(Debug, Deserialize)]
pub struct ApiPokemonType {
  pub slot: u8,
  #[serde(rename = "type")]
  pub type_ref: ApiNamedResource,
}

#[derive(Debug, Deserialize)]
pub struct ApiStat {
  pub base_stat: u32,
  #[serde(default)]
  pub effort: u32,
  pub stat: ApiNamedResource,
}

#[derive(Debug, Deserialize)]
pub struct ApiAbility {
  pub ability: ApiNamedResource,
  #[serde(default)]
  pub is_hidden: bool,
  pub slot: u8,
}

#[derive(Debug, Deserialize)]
pub struct ApiMove {
  #[serde(rename = "move")]
  pub move_ref: ApiNamedResource,
}

#[derive(Debug, Deserialize)]
pub struct ApiPokemon {
  pub id: u32,
  pub name: String,
  pub height: u32,
  pub weight: u32,
  pub base_experience: Option<u32>,
  #[serde(default)]
  pub sprites: ApiSprites,
  pub types: Vec<ApiPokemonType>,
  pub stats: Vec<ApiStat>,
  #[serde(default)]
  pub abilities: Vec<ApiAbility>,
  pub species: ApiNamedResource,
  #[serde(default)]
  pub moves: Vec<ApiMove>,
}

// ============================================================================
// Species endpoint
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiFlavorText {
  pub flavor_text: String,
  pub language: ApiName,
  pub version: Option<ApiName>,
}

#[derive(Debug, Deserialize)]
pub struct ApiGenus {
  pub genus: String,
  pub language: ApiName,
}

#[derive(Debug, Deserialize)]
pub struct ApiSpecies {
  pub id: u32,
  pub name: String,
  #[serde(default)]
  pub flavor_text_entries: Vec<ApiFlavorText>,
  #[serde(default)]
  pub genera: Vec<ApiGenus>,
  pub evolution_chain: ApiUrlRef,
  pub habitat: Option<ApiName>,
  pub shape: Option<ApiName>,
}

// ============================================================================
// Evolution chain endpoint
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiChainLink {
  pub species: ApiNamedResource,
  #[serde(default)]
  pub evolves_to: Vec<ApiChainLink>,
}

#[derive(Debug, Deserialize)]
pub struct ApiEvolutionChain {
  pub id: u32,
  pub chain: ApiChainLink,
}

// ============================================================================
// Conversions to domain types
// ============================================================================

impl From<ApiNamedResource> for NamedResource {
  fn from(r: ApiNamedResource) -> Self {
    NamedResource {
      name: r.name,
      url: r.url,
    }
  }
}

impl ApiListResponse {
  pub fn into_page(self, resource: &str) -> ApiResult<ListPage> {
    if let Some(blank) = self.results.iter().position(|r| r.name.is_empty()) {
      return Err(ApiError::parse(
        resource,
        format!("result {} has an empty name", blank),
      ));
    }
    Ok(ListPage {
      count: self.count,
      next: self.next,
      previous: self.previous,
      results: self.results.into_iter().map(NamedResource::from).collect(),
    })
  }
}

impl ApiPokemon {
  pub fn into_pokemon(self, resource: &str) -> ApiResult<Pokemon> {
    if self.id == 0 {
      return Err(ApiError::parse(resource, "pokemon id must be positive"));
    }
    if self.name.is_empty() {
      return Err(ApiError::parse(resource, "pokemon name is empty"));
    }
    if self.types.is_empty() || self.types.len() > 2 {
      return Err(ApiError::parse(
        resource,
        format!("expected 1-2 types, got {}", self.types.len()),
      ));
    }
    if self.stats.is_empty() {
      return Err(ApiError::parse(resource, "pokemon has no stats"));
    }

    let mut types: Vec<PokemonType> = self
      .types
      .into_iter()
      .map(|t| PokemonType {
        slot: t.slot,
        name: t.type_ref.name,
        url: t.type_ref.url,
      })
      .collect();
    types.sort_by_key(|t| t.slot);

    let sprites = self.sprites;
    let official_artwork = sprites
      .other
      .and_then(|o| o.official_artwork)
      .and_then(|a| a.front_default);

    Ok(Pokemon {
      id: self.id,
      name: self.name,
      height: self.height,
      weight: self.weight,
      base_experience: self.base_experience,
      sprites: Sprites {
        front_default: sprites.front_default,
        front_shiny: sprites.front_shiny,
        back_default: sprites.back_default,
        back_shiny: sprites.back_shiny,
        official_artwork,
      },
      types,
      stats: self
        .stats
        .into_iter()
        .map(|s| Stat {
          name: s.stat.name,
          base_stat: s.base_stat,
          effort: s.effort,
        })
        .collect(),
      abilities: self
        .abilities
        .into_iter()
        .map(|a| Ability {
          name: a.ability.name,
          url: a.ability.url,
          is_hidden: a.is_hidden,
          slot: a.slot,
        })
        .collect(),
      species: self.species.into(),
      moves: self.moves.into_iter().map(|m| m.move_ref.into()).collect(),
    })
  }
}

impl ApiSpecies {
  pub fn into_species(self, resource: &str) -> ApiResult<Species> {
    if self.id == 0 {
      return Err(ApiError::parse(resource, "species id must be positive"));
    }
    if url::Url::parse(&self.evolution_chain.url).is_err() {
      return Err(ApiError::parse(
        resource,
        format!(
          "evolution chain url is not absolute: {}",
          self.evolution_chain.url
        ),
      ));
    }

    Ok(Species {
      id: self.id,
      name: self.name,
      flavor_text_entries: self
        .flavor_text_entries
        .into_iter()
        .map(|e| FlavorText {
          text: e.flavor_text,
          language: e.language.name,
          version: e.version.map(|v| v.name),
        })
        .collect(),
      genera: self
        .genera
        .into_iter()
        .map(|g| Genus {
          genus: g.genus,
          language: g.language.name,
        })
        .collect(),
      evolution_chain_url: self.evolution_chain.url,
      habitat: self.habitat.map(|h| h.name),
      shape: self.shape.map(|s| s.name),
    })
  }
}

impl From<ApiChainLink> for EvolutionNode {
  fn from(link: ApiChainLink) -> Self {
    EvolutionNode {
      species: link.species.into(),
      evolves_to: link
        .evolves_to
        .into_iter()
        .map(EvolutionNode::from)
        .collect(),
    }
  }
}

impl ApiEvolutionChain {
  pub fn into_chain(self, resource: &str) -> ApiResult<EvolutionChain> {
    if self.chain.species.name.is_empty() {
      return Err(ApiError::parse(resource, "evolution chain root has no species"));
    }
    Ok(EvolutionChain {
      id: self.id,
      chain: self.chain.into(),
    })
  }
}
