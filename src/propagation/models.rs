//! Propagation result types.
//!
//! - [`Engine`] — which algorithm produced a result
//! - [`StopReason`] — why an engine stopped (never an error)
//! - [`AddedNode`] / [`DiamondOutcome`] — DIAMOnD module state
//! - [`NodeScore`] / [`RankedNode`] / [`RwrOutcome`] — RWR score vector and top-K

use serde::{Deserialize, Serialize};

/// Propagation algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Engine {
    Diamond,
    Rwr,
}

impl Engine {
    /// Stem used for output file names (`diamond_results.csv`, ...).
    pub fn file_stem(&self) -> &'static str {
        match self {
            Self::Diamond => "diamond",
            Self::Rwr => "rwr",
        }
    }
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Diamond => write!(f, "DIAMOnD"),
            Self::Rwr => write!(f, "RWR"),
        }
    }
}

/// Why an engine stopped. Every variant comes with a valid result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StopReason {
    /// No candidate nodes remain adjacent to the module.
    FrontierExhausted,
    /// The best candidate's p-value exceeded the cutoff; it was not added.
    NotSignificant { p_value: f64 },
    /// The configured number of nodes has been added.
    GrowthLimitReached { added: usize },
    /// The iteration cap was hit.
    IterationLimitReached { iterations: usize },
    /// RWR iterates moved less than the tolerance.
    Converged { residual: f64 },
    /// The observer asked to stop between iterations.
    Cancelled,
}

impl StopReason {
    /// `true` for the RWR outcome that reached its tolerance.
    pub fn is_converged(&self) -> bool {
        matches!(self, Self::Converged { .. })
    }
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FrontierExhausted => write!(f, "frontier exhausted"),
            Self::NotSignificant { p_value } => write!(f, "not significant (p={p_value:.3e})"),
            Self::GrowthLimitReached { added } => {
                write!(f, "growth limit reached ({added} nodes added)")
            }
            Self::IterationLimitReached { iterations } => {
                write!(f, "iteration limit reached ({iterations} iterations)")
            }
            Self::Converged { residual } => write!(f, "converged (residual={residual:.3e})"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

// ============================================================================
// DIAMOnD
// ============================================================================

/// A node added by DIAMOnD, with the statistics it was selected on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddedNode {
    pub node: String,
    /// Hypergeometric p-value at the time of addition
    pub p_value: f64,
    /// Links into the module at the time of addition
    pub connectivity: usize,
}

/// Result of one DIAMOnD run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiamondOutcome {
    /// Seed nodes, in the order they were supplied
    pub seeds: Vec<String>,
    /// Added nodes in addition order
    pub added: Vec<AddedNode>,
    pub stop_reason: StopReason,
    /// Selection iterations entered, including the one that stopped the run
    pub iterations: usize,
    /// Population size N used by the hypergeometric test
    pub node_count: usize,
}

impl DiamondOutcome {
    /// Seeds followed by added nodes.
    pub fn module(&self) -> Vec<&str> {
        self.seeds
            .iter()
            .map(String::as_str)
            .chain(self.added.iter().map(|a| a.node.as_str()))
            .collect()
    }

    pub fn module_size(&self) -> usize {
        self.seeds.len() + self.added.len()
    }
}

// ============================================================================
// RWR
// ============================================================================

/// Steady-state score of one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeScore {
    pub node: String,
    pub score: f64,
    pub is_seed: bool,
}

/// A non-seed node selected into the RWR module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedNode {
    pub node: String,
    pub score: f64,
    /// 1-based rank among non-seed nodes
    pub rank: usize,
}

/// Result of one RWR run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RwrOutcome {
    /// Seed nodes, in the order they were supplied
    pub seeds: Vec<String>,
    /// Every node, sorted by descending score (ties by node ID)
    pub scores: Vec<NodeScore>,
    /// Top-K non-seed nodes with positive score
    pub added: Vec<RankedNode>,
    pub stop_reason: StopReason,
    pub iterations: usize,
    /// L1 distance between the last two iterates
    pub residual: f64,
}

impl RwrOutcome {
    pub fn converged(&self) -> bool {
        self.stop_reason.is_converged()
    }

    /// Seeds followed by added nodes.
    pub fn module(&self) -> Vec<&str> {
        self.seeds
            .iter()
            .map(String::as_str)
            .chain(self.added.iter().map(|a| a.node.as_str()))
            .collect()
    }

    pub fn module_size(&self) -> usize {
        self.seeds.len() + self.added.len()
    }

    /// Score of a single node, if present.
    pub fn score_of(&self, node: &str) -> Option<f64> {
        self.scores.iter().find(|s| s.node == node).map(|s| s.score)
    }

    /// Sum of all scores.
    pub fn total_mass(&self) -> f64 {
        self.scores.iter().map(|s| s.score).sum()
    }
}
