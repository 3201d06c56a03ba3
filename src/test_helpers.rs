//! Test graph factories
//!
//! Small, fully deterministic graphs used across the unit tests.

use crate::graph::InteractionGraph;

// ============================================================================
// Graph factories
// ============================================================================

/// Path `n1 – n2 – … – n{len}`.
pub fn path_graph(len: usize) -> InteractionGraph {
    let mut g = InteractionGraph::new();
    for i in 1..len {
        g.add_edge(&format!("n{i}"), &format!("n{}", i + 1));
    }
    if len == 1 {
        g.add_node("n1");
    }
    g
}

/// Star with `center` joined to each of `leaves`.
pub fn star_graph(center: &str, leaves: &[&str]) -> InteractionGraph {
    let mut g = InteractionGraph::new();
    for leaf in leaves {
        g.add_edge(center, leaf);
    }
    g
}

/// Complete graph on `{prefix}1..={prefix}{size}`, added into `g`.
pub fn add_clique(g: &mut InteractionGraph, prefix: &str, size: usize) {
    for i in 1..=size {
        for j in (i + 1)..=size {
            g.add_edge(&format!("{prefix}{i}"), &format!("{prefix}{j}"));
        }
    }
}

/// Two cliques `a1..a{size}` and `b1..b{size}` joined by the bridge `a1 – b1`.
pub fn two_cliques(size: usize) -> InteractionGraph {
    let mut g = InteractionGraph::new();
    add_clique(&mut g, "a", size);
    add_clique(&mut g, "b", size);
    g.add_edge("a1", "b1");
    g
}

/// `base` plus an isolated node `id`.
pub fn with_isolated(mut base: InteractionGraph, id: &str) -> InteractionGraph {
    base.add_node(id);
    base
}

/// Owned seed list from string literals.
pub fn seeds(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}
