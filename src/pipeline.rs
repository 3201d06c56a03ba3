//! End-to-end runs: load, reconcile, propagate, write.
//!
//! ```text
//! network + seeds ──► prepare ──► PreparedInput
//!                                     │
//!                  ┌──────────────────┼──────────────────┐
//!            run_diamond          run_both            run_rwr
//!                  │          (rayon::join)               │
//!                  └──────────► ReportWriter ◄────────────┘
//! ```
//!
//! Everything that can fail on input (unreadable files, malformed edges, no
//! matching seeds) happens in [`Pipeline::prepare`], before the output
//! directory is touched.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::Result;
use crate::graph::{self, InteractionGraph, LoadStats, SeedResolution};
use crate::propagation::{
    DiamondConfig, DiamondEngine, DiamondOutcome, Engine, RwrConfig, RwrEngine, RwrOutcome,
};
use crate::report::{
    ModuleComparison, NetworkSummary, ReportWriter, ResultTable, RunSummary, WrittenFiles,
};
use crate::Config;

/// Loaded network with its reconciled seed set.
#[derive(Debug, Clone)]
pub struct PreparedInput {
    pub graph: InteractionGraph,
    pub load_stats: LoadStats,
    pub seeds: SeedResolution,
}

impl PreparedInput {
    /// Reconcile `seeds` against an already built graph.
    pub fn from_graph<S: AsRef<str>>(
        graph: InteractionGraph,
        load_stats: LoadStats,
        seeds: &[S],
    ) -> Result<Self> {
        let seeds = graph::normalize(seeds, &graph)?;
        Ok(Self {
            graph,
            load_stats,
            seeds,
        })
    }

    pub fn network_summary(&self) -> NetworkSummary {
        NetworkSummary::new(&self.graph, &self.load_stats)
    }
}

/// A finished DIAMOnD run.
#[derive(Debug, Clone)]
pub struct DiamondRun {
    pub outcome: DiamondOutcome,
    pub table: ResultTable,
    pub summary: RunSummary,
}

/// A finished RWR run.
#[derive(Debug, Clone)]
pub struct RwrRun {
    pub outcome: RwrOutcome,
    pub table: ResultTable,
    pub summary: RunSummary,
}

/// Both engines on the same input, plus their module overlap.
#[derive(Debug, Clone)]
pub struct CombinedRun {
    pub diamond: DiamondRun,
    pub rwr: RwrRun,
    pub comparison: ModuleComparison,
}

/// Run DIAMOnD on prepared input.
pub fn run_diamond(input: &PreparedInput, config: &DiamondConfig) -> Result<DiamondRun> {
    let outcome = DiamondEngine::new(&input.graph, config.clone()).run(&input.seeds.seeds)?;
    let table = ResultTable::from_diamond(&outcome);
    let summary = RunSummary::for_diamond(&outcome, input.network_summary(), &input.seeds, config);
    info!(
        added = outcome.added.len(),
        module_size = outcome.module_size(),
        "DIAMOnD completed ({})",
        outcome.stop_reason
    );
    Ok(DiamondRun {
        outcome,
        table,
        summary,
    })
}

/// Run RWR on prepared input.
pub fn run_rwr(input: &PreparedInput, config: &RwrConfig) -> Result<RwrRun> {
    let outcome = RwrEngine::new(&input.graph, config.clone()).run(&input.seeds.seeds)?;
    let table = ResultTable::from_rwr(&outcome);
    let summary = RunSummary::for_rwr(&outcome, input.network_summary(), &input.seeds, config);
    info!(
        added = outcome.added.len(),
        iterations = outcome.iterations,
        converged = outcome.converged(),
        "RWR completed"
    );
    Ok(RwrRun {
        outcome,
        table,
        summary,
    })
}

/// Run both engines concurrently on the shared, read-only graph.
pub fn run_both(
    input: &PreparedInput,
    diamond: &DiamondConfig,
    rwr: &RwrConfig,
) -> Result<CombinedRun> {
    let (diamond_run, rwr_run) = rayon::join(|| run_diamond(input, diamond), || run_rwr(input, rwr));
    let (diamond, rwr) = (diamond_run?, rwr_run?);
    let comparison = ModuleComparison::between(
        Engine::Diamond,
        &diamond.outcome.module(),
        Engine::Rwr,
        &rwr.outcome.module(),
    );
    Ok(CombinedRun {
        diamond,
        rwr,
        comparison,
    })
}

/// Files written by [`Pipeline::run_all`].
#[derive(Debug, Clone)]
pub struct CombinedFiles {
    pub diamond: WrittenFiles,
    pub rwr: WrittenFiles,
    /// `None` if the comparison could not be written
    pub comparison: Option<PathBuf>,
}

/// Configured pipeline writing into `config.output_dir`.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    /// Validate `config` and build a pipeline.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load the network and seed list and reconcile them.
    pub fn prepare(&self, network: &Path, seeds: &Path) -> Result<PreparedInput> {
        let (graph, load_stats) = graph::load_edge_list(network)?;
        let seed_ids = graph::load_seed_list(seeds)?;
        PreparedInput::from_graph(graph, load_stats, &seed_ids)
    }

    fn writer(&self) -> Result<ReportWriter> {
        ReportWriter::create(&self.config.output_dir)
    }

    pub fn diamond(&self, network: &Path, seeds: &Path) -> Result<(DiamondRun, WrittenFiles)> {
        let input = self.prepare(network, seeds)?;
        let run = run_diamond(&input, &self.config.diamond)?;
        let files = self.writer()?.write_run(&run.table, &run.summary, None)?;
        Ok((run, files))
    }

    pub fn rwr(&self, network: &Path, seeds: &Path) -> Result<(RwrRun, WrittenFiles)> {
        let input = self.prepare(network, seeds)?;
        let run = run_rwr(&input, &self.config.rwr)?;
        let files = self
            .writer()?
            .write_run(&run.table, &run.summary, Some(&run.outcome))?;
        Ok((run, files))
    }

    /// Both engines, both result sets, then the comparison.
    ///
    /// The comparison is written last; failing to write it is logged and
    /// leaves the engine results in place.
    pub fn run_all(&self, network: &Path, seeds: &Path) -> Result<(CombinedRun, CombinedFiles)> {
        let input = self.prepare(network, seeds)?;
        let run = run_both(&input, &self.config.diamond, &self.config.rwr)?;

        let writer = self.writer()?;
        let diamond = writer.write_run(&run.diamond.table, &run.diamond.summary, None)?;
        let rwr = writer.write_run(&run.rwr.table, &run.rwr.summary, Some(&run.rwr.outcome))?;
        let comparison = match writer.write_comparison(&run.comparison) {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Failed to write module comparison: {}", e);
                None
            }
        };

        Ok((
            run,
            CombinedFiles {
                diamond,
                rwr,
                comparison,
            },
        ))
    }
}
