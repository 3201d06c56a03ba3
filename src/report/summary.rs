//! Run metadata written next to each result table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::graph::{InteractionGraph, LoadStats, MatchStrategy, SeedResolution};
use crate::propagation::{DiamondConfig, DiamondOutcome, Engine, RwrConfig, RwrOutcome, StopReason};

/// Size and load counters of the network a run used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkSummary {
    pub nodes: usize,
    pub edges: usize,
    pub records: usize,
    pub duplicate_edges: usize,
    pub self_loops: usize,
    pub fallback_splits: usize,
}

impl NetworkSummary {
    pub fn new(graph: &InteractionGraph, stats: &LoadStats) -> Self {
        Self {
            nodes: graph.node_count(),
            edges: graph.edge_count(),
            records: stats.records,
            duplicate_edges: stats.duplicate_edges,
            self_loops: stats.self_loops,
            fallback_splits: stats.fallback_splits,
        }
    }
}

/// How the seed list was reconciled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedSummary {
    pub supplied: usize,
    pub matched: usize,
    pub strategy: MatchStrategy,
    /// `true` when a fallback strategy produced the match
    pub heuristic: bool,
}

impl From<&SeedResolution> for SeedSummary {
    fn from(resolution: &SeedResolution) -> Self {
        Self {
            supplied: resolution.input_count,
            matched: resolution.len(),
            strategy: resolution.strategy,
            heuristic: resolution.strategy.is_heuristic(),
        }
    }
}

/// Parameters the engine ran with, tagged by engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "engine", rename_all = "snake_case")]
pub enum EngineParameters {
    Diamond(DiamondConfig),
    Rwr(RwrConfig),
}

/// Metadata for one engine run, serialized to `<engine>_summary.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub engine: Engine,
    pub computed_at: DateTime<Utc>,
    pub network: NetworkSummary,
    pub seeds: SeedSummary,
    pub parameters: EngineParameters,
    pub added: usize,
    pub module_size: usize,
    pub iterations: usize,
    pub stop_reason: StopReason,
    /// Human-readable form of `stop_reason`
    pub stop_criterion: String,
    /// RWR only
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub converged: Option<bool>,
    /// RWR only
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub residual: Option<f64>,
}

impl RunSummary {
    pub fn for_diamond(
        outcome: &DiamondOutcome,
        network: NetworkSummary,
        seeds: &SeedResolution,
        config: &DiamondConfig,
    ) -> Self {
        Self {
            engine: Engine::Diamond,
            computed_at: Utc::now(),
            network,
            seeds: seeds.into(),
            parameters: EngineParameters::Diamond(config.clone()),
            added: outcome.added.len(),
            module_size: outcome.module_size(),
            iterations: outcome.iterations,
            stop_criterion: outcome.stop_reason.to_string(),
            stop_reason: outcome.stop_reason.clone(),
            converged: None,
            residual: None,
        }
    }

    pub fn for_rwr(
        outcome: &RwrOutcome,
        network: NetworkSummary,
        seeds: &SeedResolution,
        config: &RwrConfig,
    ) -> Self {
        Self {
            engine: Engine::Rwr,
            computed_at: Utc::now(),
            network,
            seeds: seeds.into(),
            parameters: EngineParameters::Rwr(config.clone()),
            added: outcome.added.len(),
            module_size: outcome.module_size(),
            iterations: outcome.iterations,
            stop_criterion: outcome.stop_reason.to_string(),
            stop_reason: outcome.stop_reason.clone(),
            converged: Some(outcome.converged()),
            residual: outcome.residual.is_finite().then_some(outcome.residual),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolution(strategy: MatchStrategy) -> SeedResolution {
        SeedResolution {
            seeds: vec!["a".into(), "b".into()],
            strategy,
            input_count: 3,
        }
    }

    #[test]
    fn test_seed_summary_flags_heuristics() {
        let exact = SeedSummary::from(&resolution(MatchStrategy::Canonical));
        assert!(!exact.heuristic);
        assert_eq!(exact.supplied, 3);
        assert_eq!(exact.matched, 2);

        assert!(SeedSummary::from(&resolution(MatchStrategy::Prefix)).heuristic);
    }

    #[test]
    fn test_diamond_summary_json() {
        let outcome = DiamondOutcome {
            seeds: vec!["a".into(), "b".into()],
            added: Vec::new(),
            stop_reason: StopReason::NotSignificant { p_value: 0.2 },
            iterations: 1,
            node_count: 5,
        };
        let summary = RunSummary::for_diamond(
            &outcome,
            NetworkSummary::default(),
            &resolution(MatchStrategy::VersionSuffix),
            &DiamondConfig::default(),
        );
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["engine"], "diamond");
        assert_eq!(json["stop_reason"]["kind"], "not_significant");
        assert_eq!(json["seeds"]["strategy"], "version_suffix");
        assert_eq!(json["seeds"]["heuristic"], true);
        assert_eq!(json["parameters"]["engine"], "diamond");
        assert_eq!(json["parameters"]["max_added"], 100);
        assert!(json.get("converged").is_none());
        assert!(json["computed_at"].is_string());
    }

    #[test]
    fn test_rwr_summary_reads_back() {
        let outcome = RwrOutcome {
            seeds: vec!["a".into()],
            scores: Vec::new(),
            added: Vec::new(),
            stop_reason: StopReason::Converged { residual: 1e-9 },
            iterations: 12,
            residual: 1e-9,
        };
        let config = RwrConfig {
            top_k: 7,
            restart_probability: 0.3,
            ..Default::default()
        };
        let summary = RunSummary::for_rwr(
            &outcome,
            NetworkSummary::default(),
            &resolution(MatchStrategy::Canonical),
            &config,
        );

        let text = serde_json::to_string(&summary).unwrap();
        let back: RunSummary = serde_json::from_str(&text).unwrap();
        assert_eq!(back.parameters, EngineParameters::Rwr(config));
        assert_eq!(back, summary);
    }
}
