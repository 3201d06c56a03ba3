//! Interaction network model.
//!
//! Loads an undirected, unweighted interaction network from an edge list into
//! petgraph and reconciles caller-supplied seed identifiers against its nodes.
//!
//! ## Architecture
//!
//! ```text
//! edge list ──► loader ──► InteractionGraph (petgraph::UnGraph)
//!                                  │
//! seed list ──► loader ──► normalize ──► SeedResolution
//! ```
//!
//! ## Modules
//!
//! - [`models`] — `InteractionGraph`, the petgraph wrapper with ID mapping
//! - [`loader`] — edge-list and seed-list parsing
//! - [`normalize`] — multi-phase seed identifier reconciliation

pub mod loader;
pub mod models;
pub mod normalize;

// Re-export primary types for convenience
pub use loader::{load_edge_list, load_seed_list, parse_edge_list, parse_seed_list, LoadStats};
pub use models::{EdgeInsert, InteractionGraph};
pub use normalize::{canonical, normalize, MatchStrategy, SeedResolution};
