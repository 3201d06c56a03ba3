//! Error types for network propagation runs.
//!
//! Errors fall into four families so callers can tell a bad file from a bad
//! seed list:
//! - **Input** — unreadable files, malformed edge lines, invalid parameters
//! - **Seed matching** — no overlap between the seed list and the network
//! - **Output** — failures while writing result files
//! - **Computation** — a statistical routine rejected its parameters
//!
//! Algorithmic stop conditions (frontier exhausted, caps reached, RWR
//! non-convergence) are *not* errors; they are reported as
//! [`StopReason`](crate::propagation::StopReason) values next to the result.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for propagation operations.
pub type Result<T> = std::result::Result<T, PropagationError>;

/// Broad error family, used by the CLI to pick an exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Input,
    SeedMatching,
    Output,
    Computation,
}

#[derive(Debug, Error)]
pub enum PropagationError {
    // ========== Input errors ==========
    /// A required input file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An edge-list line did not split into exactly two identifiers.
    #[error("malformed edge at line {line}: {content:?}")]
    MalformedEdge { line: usize, content: String },

    /// The edge list produced no nodes at all.
    #[error("network contains no nodes")]
    EmptyNetwork,

    /// A configuration value is out of its valid range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // ========== Seed-matching errors ==========
    /// None of the seed identifiers could be reconciled with the network,
    /// even after canonicalization and the fallback strategies.
    #[error("none of the {seeds} seed identifiers match a network node, even after normalization")]
    NoSeedsMatched { seeds: usize },

    /// The reconciled seed set did not map onto any graph index.
    #[error("seed set is empty after mapping onto the network")]
    EmptySeed,

    // ========== Output errors ==========
    /// A result file could not be created or written.
    #[error("failed to write {}: {source}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // ========== Computation errors ==========
    /// A probability distribution could not be built from its parameters.
    #[error("distribution error: {0}")]
    Distribution(String),
}

impl PropagationError {
    /// Which error family this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io { .. } | Self::MalformedEdge { .. } | Self::EmptyNetwork => ErrorKind::Input,
            Self::InvalidConfig(_) => ErrorKind::Input,
            Self::NoSeedsMatched { .. } | Self::EmptySeed => ErrorKind::SeedMatching,
            Self::Output { .. } | Self::Csv(_) | Self::Json(_) => ErrorKind::Output,
            Self::Distribution(_) => ErrorKind::Computation,
        }
    }

    pub fn is_seed_matching(&self) -> bool {
        self.kind() == ErrorKind::SeedMatching
    }
}
