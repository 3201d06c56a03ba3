//! Random walk with restart.
//!
//! Scores every node by the stationary probability of a walk that follows a
//! random edge with probability `1 − α` and jumps back to a uniformly chosen
//! seed with probability `α`:
//!
//! ```text
//! p₀ = r,   p_{t+1} = (1 − α)·W·p_t + α·r
//! ```
//!
//! Degree-0 columns of `W` are zero, so mass on an isolated node would leak
//! on every step. Each iterate is therefore rescaled to unit L1 mass, which
//! returns the leaked share proportionally and keeps an isolated seed at
//! probability 1.

use std::cmp::Ordering;

use tracing::debug;

use super::config::RwrConfig;
use super::events::{PropagationEvent, PropagationObserver, TracingObserver};
use super::linalg::{l1_distance, normalize_l1, LinearOperator, TransitionOperator};
use super::models::{Engine, NodeScore, RankedNode, RwrOutcome, StopReason};
use super::seed_indices;
use crate::error::{PropagationError, Result};
use crate::graph::InteractionGraph;

/// RWR engine bound to one graph.
#[derive(Debug, Clone)]
pub struct RwrEngine<'g> {
    graph: &'g InteractionGraph,
    config: RwrConfig,
}

impl<'g> RwrEngine<'g> {
    pub fn new(graph: &'g InteractionGraph, config: RwrConfig) -> Self {
        Self { graph, config }
    }

    pub fn config(&self) -> &RwrConfig {
        &self.config
    }

    /// Transition operator for this graph, as selected by the config.
    pub fn build_operator(&self) -> TransitionOperator {
        let kind = self.config.resolved_operator(self.graph.node_count());
        debug!(operator = %kind, nodes = self.graph.node_count(), "Building transition operator");
        TransitionOperator::build(self.graph, kind)
    }

    /// Score all nodes for `seeds`, logging through `tracing`.
    pub fn run<S: AsRef<str>>(&self, seeds: &[S]) -> Result<RwrOutcome> {
        self.run_with_observer(seeds, &mut TracingObserver)
    }

    pub fn run_with_observer<S, O>(&self, seeds: &[S], observer: &mut O) -> Result<RwrOutcome>
    where
        S: AsRef<str>,
        O: PropagationObserver + ?Sized,
    {
        let operator = self.build_operator();
        self.run_with_operator(seeds, &operator, observer)
    }

    /// Score all nodes using a caller-supplied operator.
    ///
    /// `operator` must be the column-stochastic transition matrix of this
    /// engine's graph, indexed by `NodeIndex::index()`.
    pub fn run_with_operator<S, M, O>(
        &self,
        seeds: &[S],
        operator: &M,
        observer: &mut O,
    ) -> Result<RwrOutcome>
    where
        S: AsRef<str>,
        M: LinearOperator + ?Sized,
        O: PropagationObserver + ?Sized,
    {
        let n = self.graph.node_count();
        if operator.dim() != n {
            return Err(PropagationError::InvalidConfig(format!(
                "operator dimension {} does not match node count {}",
                operator.dim(),
                n
            )));
        }
        let seed_idx = seed_indices(self.graph, seeds)?;

        let alpha = self.config.restart_probability;
        let mut restart = vec![0.0; n];
        let share = 1.0 / seed_idx.len() as f64;
        for s in &seed_idx {
            restart[s.index()] = share;
        }

        let mut current = restart.clone();
        let mut next = vec![0.0; n];
        let mut iterations = 0;
        let mut residual = f64::INFINITY;
        let mut stop_reason = None;

        for iteration in 1..=self.config.max_iterations {
            if observer.is_cancelled() {
                stop_reason = Some(StopReason::Cancelled);
                break;
            }
            iterations = iteration;

            operator.apply(&current, &mut next);
            for (value, r) in next.iter_mut().zip(&restart) {
                *value = (1.0 - alpha) * *value + alpha * r;
            }
            normalize_l1(&mut next);

            residual = l1_distance(&next, &current);
            std::mem::swap(&mut current, &mut next);
            observer.on_event(&PropagationEvent::WalkStep {
                iteration,
                residual,
            });

            if residual < self.config.tolerance {
                stop_reason = Some(StopReason::Converged { residual });
                break;
            }
        }

        let stop_reason = stop_reason.unwrap_or(StopReason::IterationLimitReached { iterations });
        observer.on_event(&PropagationEvent::Stopped {
            engine: Engine::Rwr,
            iterations,
            reason: stop_reason.clone(),
        });

        let mut is_seed = vec![false; n];
        for s in &seed_idx {
            is_seed[s.index()] = true;
        }

        let mut scores: Vec<NodeScore> = self
            .graph
            .graph
            .node_indices()
            .map(|idx| NodeScore {
                node: self.graph.node_id(idx).to_string(),
                score: current[idx.index()],
                is_seed: is_seed[idx.index()],
            })
            .collect();
        scores.sort_by(|a, b| match b.score.total_cmp(&a.score) {
            Ordering::Equal => a.node.cmp(&b.node),
            other => other,
        });

        let added: Vec<RankedNode> = scores
            .iter()
            .filter(|s| !s.is_seed && s.score > 0.0)
            .take(self.config.top_k)
            .enumerate()
            .map(|(i, s)| RankedNode {
                node: s.node.clone(),
                score: s.score,
                rank: i + 1,
            })
            .collect();

        Ok(RwrOutcome {
            seeds: seed_idx
                .iter()
                .map(|&i| self.graph.node_id(i).to_string())
                .collect(),
            scores,
            added,
            stop_reason,
            iterations,
            residual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::propagation::config::OperatorKind;
    use crate::propagation::events::{Cancellable, NoopObserver, RecordingObserver};
    use crate::test_helpers::{path_graph, seeds, star_graph, two_cliques, with_isolated};

    fn run(g: &InteractionGraph, config: RwrConfig, ids: &[&str]) -> RwrOutcome {
        RwrEngine::new(g, config)
            .run_with_observer(&seeds(ids), &mut NoopObserver)
            .unwrap()
    }

    #[test]
    fn test_isolated_seed_keeps_all_mass() {
        let g = with_isolated(path_graph(4), "iso");
        let out = run(&g, RwrConfig::default(), &["iso"]);

        assert!(out.converged());
        assert!((out.score_of("iso").unwrap() - 1.0).abs() < 1e-12);
        assert!(out
            .scores
            .iter()
            .filter(|s| s.node != "iso")
            .all(|s| s.score == 0.0));
        assert!(out.added.is_empty());
        assert_eq!(out.module(), vec!["iso"]);
    }

    #[test]
    fn test_scores_sum_to_one() {
        for g in [two_cliques(5), path_graph(7), with_isolated(path_graph(3), "x")] {
            let first = g.nodes().next().unwrap().to_string();
            let out = run(&g, RwrConfig::default(), &[first.as_str()]);
            assert!((out.total_mass() - 1.0).abs() < 1e-6);
            assert!(out.scores.iter().all(|s| s.score >= 0.0));
        }
    }

    #[test]
    fn test_mass_conserved_without_convergence() {
        let g = two_cliques(4);
        let config = RwrConfig {
            max_iterations: 1,
            tolerance: 1e-15,
            ..Default::default()
        };
        let out = run(&g, config, &["a2"]);
        assert!(!out.converged());
        assert_eq!(out.stop_reason, StopReason::IterationLimitReached { iterations: 1 });
        assert!((out.total_mass() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_converged_residual_below_tolerance() {
        let g = path_graph(6);
        let out = run(&g, RwrConfig::default(), &["n1"]);
        assert!(out.converged());
        assert!(out.residual < 1e-8);
        assert!(out.iterations < 200);
    }

    #[test]
    fn test_deterministic() {
        let g = two_cliques(6);
        let a = run(&g, RwrConfig::default(), &["a2", "b3"]);
        let b = run(&g, RwrConfig::default(), &["a2", "b3"]);
        assert_eq!(a.scores, b.scores);
        assert_eq!(a.added, b.added);
    }

    #[test]
    fn test_dense_matches_sparse() {
        let g = two_cliques(5);
        let dense = run(
            &g,
            RwrConfig {
                operator: OperatorKind::Dense,
                ..Default::default()
            },
            &["a2", "a3"],
        );
        let sparse = run(
            &g,
            RwrConfig {
                operator: OperatorKind::Sparse,
                ..Default::default()
            },
            &["a2", "a3"],
        );
        for s in &dense.scores {
            let other = sparse.score_of(&s.node).unwrap();
            assert!((s.score - other).abs() < 1e-10);
        }
    }

    #[test]
    fn test_seed_clique_ranks_first() {
        let g = two_cliques(5);
        let config = RwrConfig {
            top_k: 3,
            ..Default::default()
        };
        let out = run(&g, config, &["a2", "a3"]);
        let mut added: Vec<&str> = out.added.iter().map(|a| a.node.as_str()).collect();
        added.sort();
        assert_eq!(added, vec!["a1", "a4", "a5"]);
        assert_eq!(out.added.iter().map(|a| a.rank).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(out.scores.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_equal_scores_ordered_by_id() {
        let g = star_graph("hub", &["z", "b", "m"]);
        let out = run(&g, RwrConfig::default(), &["hub"]);
        let added: Vec<&str> = out.added.iter().map(|a| a.node.as_str()).collect();
        assert_eq!(added, vec!["b", "m", "z"]);
        assert_eq!(out.scores[0].node, "hub");
        assert!(out.scores[0].is_seed);
    }

    #[test]
    fn test_top_k_limits_added() {
        let g = path_graph(10);
        let config = RwrConfig {
            top_k: 2,
            ..Default::default()
        };
        let out = run(&g, config, &["n1"]);
        assert_eq!(out.added.len(), 2);
        assert_eq!(out.added[0].node, "n2");
        assert_eq!(out.module_size(), 3);
    }

    #[test]
    fn test_observer_sees_every_step() {
        let g = path_graph(5);
        let mut recorder = RecordingObserver::new();
        let out = RwrEngine::new(&g, RwrConfig::default())
            .run_with_observer(&seeds(&["n3"]), &mut recorder)
            .unwrap();
        let steps = recorder
            .events
            .iter()
            .filter(|e| matches!(e, PropagationEvent::WalkStep { .. }))
            .count();
        assert_eq!(steps, out.iterations);
        assert_eq!(recorder.stop_reason(), Some(&out.stop_reason));
    }

    #[test]
    fn test_cancelled_returns_restart_vector() {
        let g = path_graph(5);
        let mut observer = Cancellable::new(NoopObserver);
        observer.cancel();
        let out = RwrEngine::new(&g, RwrConfig::default())
            .run_with_observer(&seeds(&["n1", "n5"]), &mut observer)
            .unwrap();
        assert_eq!(out.stop_reason, StopReason::Cancelled);
        assert_eq!(out.iterations, 0);
        assert!((out.score_of("n1").unwrap() - 0.5).abs() < 1e-12);
        assert!(out.added.is_empty());
    }

    #[test]
    fn test_unmapped_seeds_error() {
        let g = path_graph(3);
        let err = RwrEngine::new(&g, RwrConfig::default())
            .run_with_observer(&seeds(&["nope"]), &mut NoopObserver)
            .unwrap_err();
        assert!(matches!(err, PropagationError::EmptySeed));
    }

    #[test]
    fn test_operator_dimension_mismatch() {
        let g = path_graph(3);
        let other = path_graph(4);
        let op = TransitionOperator::build(&other, OperatorKind::Sparse);
        let err = RwrEngine::new(&g, RwrConfig::default())
            .run_with_operator(&seeds(&["n1"]), &op, &mut NoopObserver)
            .unwrap_err();
        assert!(matches!(err, PropagationError::InvalidConfig(_)));
    }
}
