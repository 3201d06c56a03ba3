//! Edge-list and seed-list readers.
//!
//! Edge lists hold one interaction per line, `<nodeA> <nodeB>`. Each line is
//! first split on a single space; if that does not give exactly two
//! identifiers the line is re-split on arbitrary whitespace (tabs, repeated
//! spaces). Only when both attempts fail is the line rejected. Malformed lines
//! abort loading; they are never skipped.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use super::models::{EdgeInsert, InteractionGraph};
use crate::error::{PropagationError, Result};

/// Counters collected while reading an edge list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    /// Edge records read (excluding blank and comment lines)
    pub records: usize,
    /// Records that needed the whitespace fallback split
    pub fallback_splits: usize,
    /// Records that repeated an existing edge
    pub duplicate_edges: usize,
    /// Records whose two endpoints were identical
    pub self_loops: usize,
}

/// Split an edge line into its two endpoints.
///
/// Returns `None` when neither the single-space split nor the whitespace
/// split yields exactly two non-empty tokens. The boolean is `true` when the
/// fallback split was used.
pub fn split_edge_line(line: &str) -> Option<(&str, &str, bool)> {
    let mut strict = line.split(' ');
    if let (Some(a), Some(b), None) = (strict.next(), strict.next(), strict.next()) {
        if !a.is_empty() && !b.is_empty() {
            return Some((a, b, false));
        }
    }

    let mut loose = line.split_whitespace();
    match (loose.next(), loose.next(), loose.next()) {
        (Some(a), Some(b), None) => Some((a, b, true)),
        _ => None,
    }
}

/// Parse edge-list text into a graph.
///
/// Blank lines and lines starting with `#` are ignored.
pub fn parse_edge_list(text: &str) -> Result<(InteractionGraph, LoadStats)> {
    let mut graph = InteractionGraph::new();
    let mut stats = LoadStats::default();

    for (line_no, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let (a, b, fallback) =
            split_edge_line(line).ok_or_else(|| PropagationError::MalformedEdge {
                line: line_no + 1,
                content: line.to_string(),
            })?;

        stats.records += 1;
        if fallback {
            stats.fallback_splits += 1;
        }
        match graph.add_edge(a, b) {
            EdgeInsert::Added => {}
            EdgeInsert::Duplicate => stats.duplicate_edges += 1,
            EdgeInsert::SelfLoop => stats.self_loops += 1,
        }
    }

    if graph.node_count() == 0 {
        return Err(PropagationError::EmptyNetwork);
    }

    if stats.fallback_splits > 0 {
        debug!(
            lines = stats.fallback_splits,
            "Edge lines parsed with whitespace fallback"
        );
    }

    Ok((graph, stats))
}

/// Read and parse an edge-list file.
pub fn load_edge_list(path: &Path) -> Result<(InteractionGraph, LoadStats)> {
    let text = std::fs::read_to_string(path).map_err(|source| PropagationError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let (graph, stats) = parse_edge_list(&text)?;

    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        duplicates = stats.duplicate_edges,
        self_loops = stats.self_loops,
        "Network loaded from {}",
        path.display()
    );

    Ok((graph, stats))
}

/// Parse a seed list: one identifier per line or comma separated.
///
/// Entries are trimmed, blanks are ignored, and repeated identifiers keep
/// their first position.
pub fn parse_seed_list(text: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    text.split(|c: char| c == ',' || c == '\n')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.to_string()))
        .map(str::to_string)
        .collect()
}

/// Read and parse a seed-list file.
pub fn load_seed_list(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path).map_err(|source| PropagationError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let seeds = parse_seed_list(&text);
    info!("Read {} seed identifiers from {}", seeds.len(), path.display());
    Ok(seeds)
}
