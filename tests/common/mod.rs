//! Fixtures shared by the integration tests.

#![allow(dead_code)]

use pokedex::config::Config;
use serde_json::{json, Value};

/// Default config pointed at a mock server
pub fn config(mock_uri: &str) -> Config {
  let mut config = Config::default();
  config.api.base_url = mock_uri.to_string();
  config
}

pub fn named(name: &str, kind: &str, id: u32) -> Value {
  json!({
    "name": name,
    "url": format!("https://pokeapi.co/api/v2/{}/{}/", kind, id),
  })
}

/// One page of `/pokemon`
pub fn list_page(mock_uri: &str, count: u32, names: &[&str], next_offset: Option<u32>, limit: u32) -> Value {
  let results: Vec<Value> = names
    .iter()
    .enumerate()
    .map(|(i, name)| named(name, "pokemon", i as u32 + 1))
    .collect();
  let next = next_offset.map(|offset| format!("{}/pokemon?offset={}&limit={}", mock_uri, offset, limit));
  json!({
    "count": count,
    "next": next,
    "previous": null,
    "results": results,
  })
}

pub fn pikachu() -> Value {
  let stat = |name: &str, base: u32| {
    json!({ "base_stat": base, "effort": 0, "stat": { "name": name, "url": "https://pokeapi.co/api/v2/stat/1/" } })
  };
  json!({
    "id": 25,
    "name": "pikachu",
    "height": 4,
    "weight": 60,
    "base_experience": 112,
    "sprites": {
      "front_default": "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/25.png",
      "front_shiny": null,
      "back_default": null,
      "back_shiny": null,
      "other": {
        "official-artwork": {
          "front_default": "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/other/official-artwork/25.png"
        }
      }
    },
    "types": [
      { "slot": 1, "type": { "name": "electric", "url": "https://pokeapi.co/api/v2/type/13/" } }
    ],
    "stats": [
      stat("hp", 35),
      stat("attack", 55),
      stat("defense", 40),
      stat("special-attack", 50),
      stat("special-defense", 50),
      stat("speed", 90)
    ],
    "abilities": [
      { "ability": { "name": "static", "url": "https://pokeapi.co/api/v2/ability/9/" }, "is_hidden": false, "slot": 1 },
      { "ability": { "name": "lightning-rod", "url": "https://pokeapi.co/api/v2/ability/31/" }, "is_hidden": true, "slot": 3 }
    ],
    "species": { "name": "pikachu", "url": "https://pokeapi.co/api/v2/pokemon-species/25/" },
    "moves": [
      { "move": { "name": "mega-punch", "url": "https://pokeapi.co/api/v2/move/5/" } },
      { "move": { "name": "pay-day", "url": "https://pokeapi.co/api/v2/move/6/" } }
    ]
  })
}

/// Pikachu's species, pointing its evolution chain at the mock server
pub fn pikachu_species(mock_uri: &str) -> Value {
  json!({
    "id": 25,
    "name": "pikachu",
    "flavor_text_entries": [
      {
        "flavor_text": "Cuando se enfadan,\ndescargan energía.",
        "language": { "name": "es", "url": "https://pokeapi.co/api/v2/language/7/" },
        "version": { "name": "x", "url": "https://pokeapi.co/api/v2/version/23/" }
      },
      {
        "flavor_text": "When several of\nthese POKéMON gather,\u{000C}their electricity",
        "language": { "name": "en", "url": "https://pokeapi.co/api/v2/language/9/" },
        "version": { "name": "red", "url": "https://pokeapi.co/api/v2/version/1/" }
      }
    ],
    "genera": [
      { "genus": "Mouse Pokémon", "language": { "name": "en", "url": "https://pokeapi.co/api/v2/language/9/" } }
    ],
    "evolution_chain": { "url": format!("{}/evolution-chain/10/", mock_uri) },
    "habitat": { "name": "forest", "url": "https://pokeapi.co/api/v2/pokemon-habitat/2/" },
    "shape": { "name": "quadruped", "url": "https://pokeapi.co/api/v2/pokemon-shape/8/" }
  })
}

/// pichu -> pikachu -> raichu
pub fn pikachu_chain() -> Value {
  json!({
    "id": 10,
    "chain": {
      "species": named("pichu", "pokemon-species", 172),
      "evolves_to": [
        {
          "species": named("pikachu", "pokemon-species", 25),
          "evolves_to": [
            { "species": named("raichu", "pokemon-species", 26), "evolves_to": [] }
          ]
        }
      ]
    }
  })
}

/// Catalog used by name search
pub fn catalog() -> Value {
  let names = [
    "bulbasaur",
    "charmander",
    "charmeleon",
    "charizard",
    "squirtle",
    "pikachu",
    "charcadet",
  ];
  let results: Vec<Value> = names
    .iter()
    .enumerate()
    .map(|(i, name)| named(name, "pokemon", i as u32 + 1))
    .collect();
  json!({
    "count": names.len(),
    "next": null,
    "previous": null,
    "results": results,
  })
}
