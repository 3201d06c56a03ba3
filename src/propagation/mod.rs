//! Network propagation engines.
//!
//! Two independent ways of growing a seed set into a module on the same
//! read-only [`InteractionGraph`]:
//!
//! ```text
//!                    ┌──► DiamondEngine ──► DiamondOutcome
//! seeds ─► normalize ┤
//!                    └──► RwrEngine ─────► RwrOutcome
//! ```
//!
//! ## Modules
//!
//! - [`config`] — `DiamondConfig`, `RwrConfig`, `OperatorKind`
//! - [`models`] — outcomes, `StopReason`, per-node statistics
//! - [`events`] — `PropagationObserver` and the events engines emit
//! - [`hypergeom`] — hypergeometric upper tail used by DIAMOnD
//! - [`diamond`] — greedy hypergeometric module expansion
//! - [`linalg`] — `LinearOperator`, sparse and dense transition matrices
//! - [`rwr`] — random walk with restart

pub mod config;
pub mod diamond;
pub mod events;
pub mod hypergeom;
pub mod linalg;
pub mod models;
pub mod rwr;

use std::collections::HashSet;

use petgraph::graph::NodeIndex;
use tracing::warn;

use crate::error::{PropagationError, Result};
use crate::graph::InteractionGraph;

// Re-export primary types for convenience
pub use config::{DiamondConfig, OperatorKind, RwrConfig, MAX_DENSE_NODES};
pub use diamond::DiamondEngine;
pub use events::{
    Cancellable, NoopObserver, PropagationEvent, PropagationObserver, RecordingObserver,
    TracingObserver,
};
pub use linalg::{CsrMatrix, DenseMatrix, LinearOperator, TransitionOperator};
pub use models::{
    AddedNode, DiamondOutcome, Engine, NodeScore, RankedNode, RwrOutcome, StopReason,
};
pub use rwr::RwrEngine;

/// Map seed IDs onto graph indices, dropping unknown IDs and duplicates.
///
/// Supplied order is kept. Fails with [`PropagationError::EmptySeed`] when
/// nothing maps.
pub(crate) fn seed_indices<S: AsRef<str>>(
    graph: &InteractionGraph,
    seeds: &[S],
) -> Result<Vec<NodeIndex>> {
    let mut seen = HashSet::new();
    let mut indices = Vec::with_capacity(seeds.len());
    for seed in seeds {
        match graph.get_index(seed.as_ref()) {
            Some(idx) => {
                if seen.insert(idx) {
                    indices.push(idx);
                }
            }
            None => warn!(seed = seed.as_ref(), "Seed is not a graph node; ignored"),
        }
    }
    if indices.is_empty() {
        return Err(PropagationError::EmptySeed);
    }
    Ok(indices)
}
