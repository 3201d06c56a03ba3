//! Writes result tables, gene lists and summaries into an output directory.
//!
//! Layout for an engine with file stem `<engine>`:
//!
//! ```text
//! <out>/<engine>_results.csv   node,role,<statistics>
//! <out>/<engine>_genes.txt     one node ID per line
//! <out>/<engine>_summary.json  RunSummary
//! <out>/rwr_scores.csv         node,score,is_seed (RWR only)
//! <out>/comparison.json        ModuleComparison (both engines)
//! ```

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use super::assembler::{ResultTable, Role, Statistic};
use super::compare::ModuleComparison;
use super::summary::RunSummary;
use crate::error::{PropagationError, Result};
use crate::propagation::{Engine, RwrOutcome};

#[derive(Serialize)]
struct DiamondRow<'a> {
    node: &'a str,
    role: Role,
    p_value: Option<f64>,
    connectivity: Option<usize>,
}

#[derive(Serialize)]
struct RwrRow<'a> {
    node: &'a str,
    role: Role,
    score: Option<f64>,
    rank: Option<usize>,
}

#[derive(Serialize)]
struct ScoreRow<'a> {
    node: &'a str,
    score: f64,
    is_seed: bool,
}

/// Paths written for one engine run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFiles {
    pub table: PathBuf,
    pub genes: PathBuf,
    pub summary: PathBuf,
    /// RWR only
    pub scores: Option<PathBuf>,
}

/// Writer bound to one output directory.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    out_dir: PathBuf,
}

impl ReportWriter {
    /// Create the output directory if needed.
    pub fn create(out_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(out_dir).map_err(|source| PropagationError::Output {
            path: out_dir.to_path_buf(),
            source,
        })?;
        Ok(Self {
            out_dir: out_dir.to_path_buf(),
        })
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    fn path_for(&self, engine: Engine, suffix: &str) -> PathBuf {
        self.out_dir.join(format!("{}_{}", engine.file_stem(), suffix))
    }

    /// Write the module membership table as CSV.
    pub fn write_table(&self, table: &ResultTable) -> Result<PathBuf> {
        let path = self.path_for(table.engine, "results.csv");
        let mut wtr = csv::Writer::from_path(&path)?;
        for entry in table.entries() {
            match (table.engine, &entry.statistic) {
                (Engine::Diamond, Some(Statistic::Diamond { p_value, connectivity })) => {
                    wtr.serialize(DiamondRow {
                        node: &entry.node,
                        role: entry.role,
                        p_value: Some(*p_value),
                        connectivity: Some(*connectivity),
                    })?
                }
                (Engine::Diamond, _) => wtr.serialize(DiamondRow {
                    node: &entry.node,
                    role: entry.role,
                    p_value: None,
                    connectivity: None,
                })?,
                (Engine::Rwr, Some(Statistic::Rwr { score, rank })) => wtr.serialize(RwrRow {
                    node: &entry.node,
                    role: entry.role,
                    score: Some(*score),
                    rank: Some(*rank),
                })?,
                (Engine::Rwr, _) => wtr.serialize(RwrRow {
                    node: &entry.node,
                    role: entry.role,
                    score: None,
                    rank: None,
                })?,
            }
        }
        self.flush(wtr, &path)?;
        Ok(path)
    }

    /// Write the flat module gene list.
    pub fn write_gene_list(&self, table: &ResultTable) -> Result<PathBuf> {
        let path = self.path_for(table.engine, "genes.txt");
        let mut text = table.gene_list().join("\n");
        text.push('\n');
        self.write_text(&path, &text)?;
        Ok(path)
    }

    /// Write every node's RWR score, highest first.
    pub fn write_scores(&self, outcome: &RwrOutcome) -> Result<PathBuf> {
        let path = self.out_dir.join("rwr_scores.csv");
        let mut wtr = csv::Writer::from_path(&path)?;
        for s in &outcome.scores {
            wtr.serialize(ScoreRow {
                node: &s.node,
                score: s.score,
                is_seed: s.is_seed,
            })?;
        }
        self.flush(wtr, &path)?;
        Ok(path)
    }

    pub fn write_summary(&self, summary: &RunSummary) -> Result<PathBuf> {
        let path = self.path_for(summary.engine, "summary.json");
        self.write_json(&path, summary)?;
        Ok(path)
    }

    pub fn write_comparison(&self, comparison: &ModuleComparison) -> Result<PathBuf> {
        let path = self.out_dir.join("comparison.json");
        self.write_json(&path, comparison)?;
        info!(
            shared = comparison.shared.len(),
            jaccard = comparison.jaccard,
            "Module comparison written to {}",
            path.display()
        );
        Ok(path)
    }

    /// Write table, gene list and summary (plus scores for RWR).
    pub fn write_run(
        &self,
        table: &ResultTable,
        summary: &RunSummary,
        rwr: Option<&RwrOutcome>,
    ) -> Result<WrittenFiles> {
        let files = WrittenFiles {
            table: self.write_table(table)?,
            genes: self.write_gene_list(table)?,
            scores: rwr.map(|outcome| self.write_scores(outcome)).transpose()?,
            summary: self.write_summary(summary)?,
        };
        info!(
            engine = %table.engine,
            module_size = table.len(),
            "Results saved to {} and {}",
            files.table.display(),
            files.genes.display()
        );
        Ok(files)
    }

    fn flush(&self, mut wtr: csv::Writer<std::fs::File>, path: &Path) -> Result<()> {
        wtr.flush().map_err(|source| PropagationError::Output {
            path: path.to_path_buf(),
            source,
        })
    }

    fn write_text(&self, path: &Path, text: &str) -> Result<()> {
        std::fs::write(path, text).map_err(|source| PropagationError::Output {
            path: path.to_path_buf(),
            source,
        })
    }

    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        self.write_text(path, &json)
    }
}
