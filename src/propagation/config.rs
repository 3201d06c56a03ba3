//! Configuration for the propagation engines.
//!
//! Every parameter has a default and can be overridden from YAML,
//! environment variables or CLI flags (see [`Config`](crate::Config)).

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{PropagationError, Result};

/// Configuration for DIAMOnD module expansion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiamondConfig {
    /// Hypergeometric p-value above which the best candidate is rejected
    /// and the expansion stops.
    pub significance_cutoff: f64,

    /// Maximum number of nodes added on top of the seeds.
    pub max_added: usize,

    /// Maximum number of selection iterations.
    pub max_iterations: usize,
}

impl Default for DiamondConfig {
    fn default() -> Self {
        Self {
            significance_cutoff: 0.05,
            max_added: 100,
            max_iterations: 200,
        }
    }
}

impl DiamondConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.significance_cutoff > 0.0 && self.significance_cutoff <= 1.0) {
            return Err(PropagationError::InvalidConfig(format!(
                "significance_cutoff must be in (0, 1], got {}",
                self.significance_cutoff
            )));
        }
        if self.max_added == 0 {
            return Err(PropagationError::InvalidConfig(
                "max_added must be at least 1".to_string(),
            ));
        }
        if self.max_iterations == 0 {
            return Err(PropagationError::InvalidConfig(
                "diamond max_iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Largest graph the dense operator is ever built for (an `n × n` matrix of
/// `f64`, 128 MiB at this size). Larger graphs always use the sparse operator.
pub const MAX_DENSE_NODES: usize = 4096;

/// Which transition-operator representation the RWR engine builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorKind {
    /// Dense for graphs up to `dense_threshold` nodes, sparse above.
    Auto,
    Sparse,
    Dense,
}

impl std::str::FromStr for OperatorKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "sparse" => Ok(Self::Sparse),
            "dense" => Ok(Self::Dense),
            other => Err(format!(
                "unknown operator '{other}' (expected auto, sparse or dense)"
            )),
        }
    }
}

impl std::fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Sparse => write!(f, "sparse"),
            Self::Dense => write!(f, "dense"),
        }
    }
}

/// Configuration for random walk with restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RwrConfig {
    /// Probability α of jumping back to the seeds at each step.
    pub restart_probability: f64,

    /// L1 distance between successive iterates below which the walk has converged.
    pub tolerance: f64,

    /// Iteration cap; hitting it is reported, not treated as an error.
    pub max_iterations: usize,

    /// Number of highest-scoring non-seed nodes added to the module.
    pub top_k: usize,

    /// Operator representation.
    pub operator: OperatorKind,

    /// Node count up to which `Auto` picks the dense operator.
    pub dense_threshold: usize,
}

impl Default for RwrConfig {
    fn default() -> Self {
        Self {
            restart_probability: 0.5,
            tolerance: 1e-8,
            max_iterations: 200,
            top_k: 100,
            operator: OperatorKind::Auto,
            dense_threshold: 512,
        }
    }
}

impl RwrConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.restart_probability > 0.0 && self.restart_probability <= 1.0) {
            return Err(PropagationError::InvalidConfig(format!(
                "restart_probability must be in (0, 1], got {}",
                self.restart_probability
            )));
        }
        if !(self.tolerance > 0.0) {
            return Err(PropagationError::InvalidConfig(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(PropagationError::InvalidConfig(
                "rwr max_iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve `Auto` against a concrete graph size.
    ///
    /// Dense is never chosen above [`MAX_DENSE_NODES`], even when requested
    /// explicitly.
    pub fn resolved_operator(&self, node_count: usize) -> OperatorKind {
        let dense_limit = self.dense_threshold.min(MAX_DENSE_NODES);
        match self.operator {
            OperatorKind::Auto if node_count <= dense_limit => OperatorKind::Dense,
            OperatorKind::Auto => OperatorKind::Sparse,
            OperatorKind::Dense if node_count > MAX_DENSE_NODES => {
                warn!(
                    nodes = node_count,
                    limit = MAX_DENSE_NODES,
                    "Dense operator requested for a large network; using sparse instead"
                );
                OperatorKind::Sparse
            }
            other => other,
        }
    }
}
