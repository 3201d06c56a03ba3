//! Seed identifier reconciliation.
//!
//! Seed lists and networks often disagree on version suffixes
//! (`3702.AT1G54410.1` vs `3702.AT1G54410`, `AT1G54410.2` vs `AT1G54410`).
//! [`normalize`] maps a seed list onto graph nodes in up to three phases and
//! stops at the first phase that matches anything:
//!
//! 1. **Canonical** — compare [`canonical`] forms of seeds and nodes.
//! 2. **Prefix** — accept nodes that start with any canonical seed.
//! 3. **VersionSuffix** — compare canonical forms with one trailing
//!    `.<digits>` suffix dropped, for seeds that carry a version the network
//!    lacks (`AT1G54410.2` vs `AT1G54410`).
//!
//! Phases 2 and 3 are heuristics and are reported as such in
//! [`SeedResolution::strategy`]. The output is always in graph node order, so
//! the result does not depend on the order of the seed list.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::models::InteractionGraph;
use crate::error::{PropagationError, Result};

/// How the seed list was matched onto the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Canonical forms matched exactly.
    Canonical,
    /// Matched by string prefix.
    Prefix,
    /// Matched after stripping a numeric version suffix.
    VersionSuffix,
}

impl MatchStrategy {
    /// Whether a fallback heuristic (not an exact canonical match) was used.
    pub fn is_heuristic(&self) -> bool {
        !matches!(self, Self::Canonical)
    }
}

impl std::fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Canonical => write!(f, "canonical"),
            Self::Prefix => write!(f, "prefix"),
            Self::VersionSuffix => write!(f, "version_suffix"),
        }
    }
}

/// Reconciled seed set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedResolution {
    /// Graph node IDs used as seeds, in graph node order
    pub seeds: Vec<String>,
    /// Phase that produced the match
    pub strategy: MatchStrategy,
    /// Number of identifiers in the input seed list
    pub input_count: usize,
}

impl SeedResolution {
    pub fn len(&self) -> usize {
        self.seeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seeds.is_empty()
    }
}

/// Canonical form of an identifier.
///
/// The last dot-segment is stripped only when the identifier contains more
/// than one dot, so a lone suffix such as `AT1G54410.2` is kept intact.
pub fn canonical(id: &str) -> &str {
    if id.matches('.').count() > 1 {
        id.rsplit_once('.').map(|(head, _)| head).unwrap_or(id)
    } else {
        id
    }
}

/// Drop one trailing `.<digits>` suffix, if present.
pub fn strip_version_suffix(id: &str) -> &str {
    match id.rsplit_once('.') {
        Some((head, tail))
            if !head.is_empty() && !tail.is_empty() && tail.bytes().all(|b| b.is_ascii_digit()) =>
        {
            head
        }
        _ => id,
    }
}

fn version_key(id: &str) -> &str {
    strip_version_suffix(canonical(id))
}

/// Graph nodes whose key appears among the seed keys, in graph order.
fn match_by_key<S: AsRef<str>>(
    seeds: &[S],
    graph: &InteractionGraph,
    key: fn(&str) -> &str,
) -> Vec<String> {
    let seed_keys: HashSet<&str> = seeds.iter().map(|s| key(s.as_ref())).collect();
    graph
        .nodes()
        .filter(|node| seed_keys.contains(key(node)))
        .map(str::to_string)
        .collect()
}

fn match_by_prefix<S: AsRef<str>>(seeds: &[S], graph: &InteractionGraph) -> Vec<String> {
    let prefixes: HashSet<&str> = seeds.iter().map(|s| canonical(s.as_ref())).collect();
    graph
        .nodes()
        .filter(|node| prefixes.iter().any(|p| node.starts_with(p)))
        .map(str::to_string)
        .collect()
}

/// Reconcile `seeds` against the node identifiers of `graph`.
///
/// Fails with [`PropagationError::NoSeedsMatched`] when no phase matches.
pub fn normalize<S: AsRef<str>>(seeds: &[S], graph: &InteractionGraph) -> Result<SeedResolution> {
    let input_count = seeds.len();
    let resolution = |matched: Vec<String>, strategy| SeedResolution {
        seeds: matched,
        strategy,
        input_count,
    };

    let matched = match_by_key(seeds, graph, canonical);
    let result = if !matched.is_empty() {
        resolution(matched, MatchStrategy::Canonical)
    } else {
        warn!("No seed matches the network directly; trying prefix matching");
        let matched = match_by_prefix(seeds, graph);
        if !matched.is_empty() {
            resolution(matched, MatchStrategy::Prefix)
        } else {
            warn!("No prefix match either; trying version-suffix matching");
            let matched = match_by_key(seeds, graph, version_key);
            if matched.is_empty() {
                return Err(PropagationError::NoSeedsMatched { seeds: input_count });
            }
            resolution(matched, MatchStrategy::VersionSuffix)
        }
    };

    info!(
        strategy = %result.strategy,
        "{} valid seeds found in the network ({} identifiers supplied)",
        result.len(),
        input_count
    );
    if tracing::enabled!(tracing::Level::DEBUG) {
        let mut sorted: Vec<&str> = result.seeds.iter().map(String::as_str).collect();
        sorted.sort_unstable();
        debug!("Seeds: {}", sorted.join(", "));
    }

    Ok(result)
}
