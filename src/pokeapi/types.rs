use std::fmt;

/// How a Pokémon or species is addressed upstream: by name or by numeric id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identifier {
  Name(String),
  Id(u32),
}

impl Identifier {
  /// Parse user input. All-digit input is an id (must be positive),
  /// anything else is a name. Returns None for blank input or id 0.
  pub fn parse(input: &str) -> Option<Self> {
    let input = input.trim();
    if input.is_empty() {
      return None;
    }
    if input.bytes().all(|b| b.is_ascii_digit()) {
      return match input.parse::<u32>() {
        Ok(0) | Err(_) => None,
        Ok(id) => Some(Identifier::Id(id)),
      };
    }
    Some(Identifier::Name(input.to_string()))
  }

  /// The URL path segment for this identifier.
  pub fn path_segment(&self) -> String {
    match self {
      Identifier::Name(name) => name.clone(),
      Identifier::Id(id) => id.to_string(),
    }
  }
}

impl fmt::Display for Identifier {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Identifier::Name(name) => f.write_str(name),
      Identifier::Id(id) => write!(f, "#{}", id),
    }
  }
}

impl From<u32> for Identifier {
  fn from(id: u32) -> Self {
    Identifier::Id(id)
  }
}

/// A lightweight reference to another resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedResource {
  pub name: String,
  pub url: String,
}

/// One page of a paginated collection
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListPage {
  pub count: u32,
  /// Absolute URL of the next page, carrying an `offset` query parameter
  pub next: Option<String>,
  pub previous: Option<String>,
  pub results: Vec<NamedResource>,
}

impl ListPage {
  /// A page with no results and no cursors.
  pub fn empty() -> Self {
    Self::default()
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PokemonType {
  pub slot: u8,
  pub name: String,
  pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stat {
  pub name: String,
  pub base_stat: u32,
  pub effort: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ability {
  pub name: String,
  pub url: String,
  pub is_hidden: bool,
  pub slot: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sprites {
  pub front_default: Option<String>,
  pub front_shiny: Option<String>,
  pub back_default: Option<String>,
  pub back_shiny: Option<String>,
  pub official_artwork: Option<String>,
}

/// Full Pokémon record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pokemon {
  pub id: u32,
  pub name: String,
  /// Decimetres
  pub height: u32,
  /// Hectograms
  pub weight: u32,
  pub base_experience: Option<u32>,
  pub sprites: Sprites,
  /// Sorted by slot
  pub types: Vec<PokemonType>,
  pub stats: Vec<Stat>,
  pub abilities: Vec<Ability>,
  pub species: NamedResource,
  pub moves: Vec<NamedResource>,
}

impl Pokemon {
  /// Name of the first type slot, "normal" when there is none.
  pub fn primary_type(&self) -> &str {
    self.types.first().map(|t| t.name.as_str()).unwrap_or("normal")
  }

  pub fn type_names(&self) -> Vec<&str> {
    self.types.iter().map(|t| t.name.as_str()).collect()
  }

  /// Base value of the named stat (e.g. "hp", "special-attack").
  pub fn stat(&self, name: &str) -> Option<u32> {
    self
      .stats
      .iter()
      .find(|s| s.name == name)
      .map(|s| s.base_stat)
  }

  /// Official artwork, falling back to the default front sprite.
  pub fn artwork_url(&self) -> Option<&str> {
    self
      .sprites
      .official_artwork
      .as_deref()
      .or(self.sprites.front_default.as_deref())
  }

  pub fn move_names(&self, limit: usize) -> Vec<&str> {
    self
      .moves
      .iter()
      .take(limit)
      .map(|m| m.name.as_str())
      .collect()
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlavorText {
  pub text: String,
  pub language: String,
  pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genus {
  pub genus: String,
  pub language: String,
}

/// Species metadata for a Pokémon
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Species {
  pub id: u32,
  pub name: String,
  pub flavor_text_entries: Vec<FlavorText>,
  pub genera: Vec<Genus>,
  /// Absolute URL of the evolution chain resource
  pub evolution_chain_url: String,
  pub habitat: Option<String>,
  pub shape: Option<String>,
}

const ENGLISH: &str = "en";

impl Species {
  /// First English flavor text, with embedded line and page breaks
  /// replaced by spaces.
  pub fn english_flavor_text(&self) -> Option<String> {
    self
      .flavor_text_entries
      .iter()
      .find(|e| e.language == ENGLISH)
      .map(|e| e.text.replace(['\u{000C}', '\n', '\r'], " "))
  }

  pub fn english_genus(&self) -> Option<&str> {
    self
      .genera
      .iter()
      .find(|g| g.language == ENGLISH)
      .map(|g| g.genus.as_str())
  }
}

/// A node in an evolution chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvolutionNode {
  pub species: NamedResource,
  pub evolves_to: Vec<EvolutionNode>,
}

/// Evolution chain rooted at the base species
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvolutionChain {
  pub id: u32,
  pub chain: EvolutionNode,
}
