//! Module membership tables.
//!
//! A [`ResultTable`] lists the seeds first, sorted by ID, then the added nodes
//! in the order the engine produced them (addition order for DIAMOnD,
//! descending score for RWR).

use serde::{Deserialize, Serialize};

use crate::propagation::{DiamondOutcome, Engine, RwrOutcome};

/// Why a node is in the module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Seed,
    Added,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Seed => write!(f, "Seed"),
            Self::Added => write!(f, "Added"),
        }
    }
}

/// Engine statistic attached to an added node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Statistic {
    Diamond { p_value: f64, connectivity: usize },
    Rwr { score: f64, rank: usize },
}

/// One row of a [`ResultTable`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleEntry {
    pub node: String,
    pub role: Role,
    /// `None` for seeds
    pub statistic: Option<Statistic>,
}

/// Ordered module membership produced by one engine run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    pub engine: Engine,
    entries: Vec<ModuleEntry>,
}

fn seed_entries(seeds: &[String]) -> Vec<ModuleEntry> {
    let mut sorted: Vec<&String> = seeds.iter().collect();
    sorted.sort();
    sorted
        .into_iter()
        .map(|node| ModuleEntry {
            node: node.clone(),
            role: Role::Seed,
            statistic: None,
        })
        .collect()
}

impl ResultTable {
    pub fn from_diamond(outcome: &DiamondOutcome) -> Self {
        let mut entries = seed_entries(&outcome.seeds);
        entries.extend(outcome.added.iter().map(|a| ModuleEntry {
            node: a.node.clone(),
            role: Role::Added,
            statistic: Some(Statistic::Diamond {
                p_value: a.p_value,
                connectivity: a.connectivity,
            }),
        }));
        Self {
            engine: Engine::Diamond,
            entries,
        }
    }

    pub fn from_rwr(outcome: &RwrOutcome) -> Self {
        let mut entries = seed_entries(&outcome.seeds);
        entries.extend(outcome.added.iter().map(|a| ModuleEntry {
            node: a.node.clone(),
            role: Role::Added,
            statistic: Some(Statistic::Rwr {
                score: a.score,
                rank: a.rank,
            }),
        }));
        Self {
            engine: Engine::Rwr,
            entries,
        }
    }

    pub fn entries(&self) -> &[ModuleEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn seed_count(&self) -> usize {
        self.entries.iter().filter(|e| e.role == Role::Seed).count()
    }

    pub fn added_count(&self) -> usize {
        self.len() - self.seed_count()
    }

    /// Every module node ID, seeds then added nodes.
    pub fn gene_list(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.node.as_str()).collect()
    }
}
