//! Result assembly and output files.
//!
//! - [`assembler`] — `ResultTable`: seeds then added nodes with engine statistics
//! - [`summary`] — `RunSummary`: stop reason, match strategy, parameters
//! - [`compare`] — `ModuleComparison` between two engines' modules
//! - [`writer`] — `ReportWriter`: CSV tables, gene lists, JSON summaries

pub mod assembler;
pub mod compare;
pub mod summary;
pub mod writer;

// Re-export primary types for convenience
pub use assembler::{ModuleEntry, ResultTable, Role, Statistic};
pub use compare::ModuleComparison;
pub use summary::{EngineParameters, NetworkSummary, RunSummary, SeedSummary};
pub use writer::{ReportWriter, WrittenFiles};
