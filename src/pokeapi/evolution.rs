//! Flattening of evolution chains for display.

use std::collections::HashSet;

use super::types::{EvolutionChain, EvolutionNode};

impl EvolutionNode {
  /// Species names in pre-order: parent before children, siblings in the
  /// order upstream gave them.
  ///
  /// A species name that was already emitted is skipped along with its
  /// subtree, so a malformed chain that repeats a species cannot loop.
  pub fn flatten(&self) -> Vec<&str> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut order = Vec::new();
    let mut stack = vec![self];

    while let Some(node) = stack.pop() {
      let name = node.species.name.as_str();
      if !seen.insert(name) {
        continue;
      }
      order.push(name);
      // Reverse so the first child is popped next
      stack.extend(node.evolves_to.iter().rev());
    }

    order
  }
}

impl EvolutionChain {
  /// See [`EvolutionNode::flatten`].
  pub fn flatten(&self) -> Vec<&str> {
    self.chain.flatten()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::pokeapi::types::NamedResource;

  fn node(name: &str, evolves_to: Vec<EvolutionNode>) -> EvolutionNode {
    EvolutionNode {
      species: NamedResource {
        name: name.to_string(),
        url: format!("https://pokeapi.co/api/v2/pokemon-species/{}/", name),
      },
      evolves_to,
    }
  }

  #[test]
  fn test_preorder_traversal() {
    let chain = EvolutionChain {
      id: 1,
      chain: node(
        "a",
        vec![node("b", vec![node("d", vec![])]), node("c", vec![])],
      ),
    };
    assert_eq!(chain.flatten(), vec!["a", "b", "d", "c"]);
  }

  #[test]
  fn test_single_stage() {
    let chain = EvolutionChain {
      id: 66,
      chain: node("tauros", vec![]),
    };
    assert_eq!(chain.flatten(), vec!["tauros"]);
  }

  #[test]
  fn test_linear_chain() {
    let chain = node(
      "charmander",
      vec![node("charmeleon", vec![node("charizard", vec![])])],
    );
    assert_eq!(chain.flatten(), vec!["charmander", "charmeleon", "charizard"]);
  }

  #[test]
  fn test_repeated_species_visited_once() {
    // "a" reappears under "b": it and its subtree must not be expanded again
    let chain = node(
      "a",
      vec![
        node("b", vec![node("a", vec![node("x", vec![])])]),
        node("c", vec![]),
      ],
    );
    assert_eq!(chain.flatten(), vec!["a", "b", "c"]);
  }
}
