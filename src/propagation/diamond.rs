//! DIAMOnD module expansion.
//!
//! Greedily grows a module from the seeds by adding, one per iteration, the
//! frontier node whose links into the module are least likely under a
//! hypergeometric null (population `N` = node count, `K` = seed count, draws =
//! candidate degree). Equal p-values are broken by node ID.
//!
//! Stop checks, in order, each iteration:
//! 1. cancellation requested by the observer
//! 2. empty frontier
//! 3. best p-value above the cutoff (node not added)
//! 4. `max_added` reached after the addition
//!
//! and [`StopReason::IterationLimitReached`] once `max_iterations` have run.

use std::cmp::Ordering;
use std::collections::HashSet;

use petgraph::graph::NodeIndex;
use tracing::debug;

use super::config::DiamondConfig;
use super::events::{PropagationEvent, PropagationObserver, TracingObserver};
use super::hypergeom::HypergeometricTest;
use super::models::{AddedNode, DiamondOutcome, Engine, StopReason};
use super::seed_indices;
use crate::error::Result;
use crate::graph::InteractionGraph;

/// DIAMOnD engine bound to one graph.
#[derive(Debug, Clone)]
pub struct DiamondEngine<'g> {
    graph: &'g InteractionGraph,
    config: DiamondConfig,
}

/// Mutable state of one expansion run.
struct ExpansionState {
    in_module: Vec<bool>,
    /// Links from each node into the current module
    links: Vec<usize>,
    frontier: HashSet<NodeIndex>,
    /// p-value per node, cleared whenever `links` changes
    p_cache: Vec<Option<f64>>,
}

impl<'g> DiamondEngine<'g> {
    pub fn new(graph: &'g InteractionGraph, config: DiamondConfig) -> Self {
        Self { graph, config }
    }

    pub fn config(&self) -> &DiamondConfig {
        &self.config
    }

    /// Expand `seeds`, logging decisions through `tracing`.
    pub fn run<S: AsRef<str>>(&self, seeds: &[S]) -> Result<DiamondOutcome> {
        self.run_with_observer(seeds, &mut TracingObserver)
    }

    /// Expand `seeds`, reporting every decision to `observer`.
    ///
    /// Seeds that are not graph nodes are ignored; [`EmptySeed`](crate::PropagationError::EmptySeed)
    /// is returned when none remain.
    pub fn run_with_observer<S, O>(&self, seeds: &[S], observer: &mut O) -> Result<DiamondOutcome>
    where
        S: AsRef<str>,
        O: PropagationObserver + ?Sized,
    {
        let seed_idx = seed_indices(self.graph, seeds)?;
        let n = self.graph.node_count();
        let k_seeds = seed_idx.len();
        let degrees = self.graph.degrees();
        let test = HypergeometricTest::new(n, k_seeds)?;

        let mut state = ExpansionState {
            in_module: vec![false; n],
            links: vec![0; n],
            frontier: HashSet::new(),
            p_cache: vec![None; n],
        };
        for &s in &seed_idx {
            state.in_module[s.index()] = true;
        }
        for &s in &seed_idx {
            self.absorb_neighbors(&mut state, s);
        }

        debug!(
            nodes = n,
            seeds = k_seeds,
            frontier = state.frontier.len(),
            "Starting DIAMOnD expansion"
        );

        let mut added: Vec<AddedNode> = Vec::new();
        let mut iterations = 0;
        let mut stop_reason = None;

        for iteration in 1..=self.config.max_iterations {
            if observer.is_cancelled() {
                stop_reason = Some(StopReason::Cancelled);
                break;
            }
            iterations = iteration;

            let Some((best, p_value)) = self.best_candidate(&mut state, &test, &degrees)? else {
                stop_reason = Some(StopReason::FrontierExhausted);
                break;
            };

            if p_value > self.config.significance_cutoff {
                stop_reason = Some(StopReason::NotSignificant { p_value });
                break;
            }

            let connectivity = state.links[best.index()];
            state.in_module[best.index()] = true;
            state.frontier.remove(&best);
            self.absorb_neighbors(&mut state, best);

            let node = self.graph.node_id(best).to_string();
            observer.on_event(&PropagationEvent::NodeAdded {
                iteration,
                node: node.clone(),
                p_value,
                connectivity,
                module_size: k_seeds + added.len() + 1,
            });
            added.push(AddedNode {
                node,
                p_value,
                connectivity,
            });

            if added.len() >= self.config.max_added {
                stop_reason = Some(StopReason::GrowthLimitReached { added: added.len() });
                break;
            }
        }

        let stop_reason = stop_reason.unwrap_or(StopReason::IterationLimitReached { iterations });
        observer.on_event(&PropagationEvent::Stopped {
            engine: Engine::Diamond,
            iterations,
            reason: stop_reason.clone(),
        });

        Ok(DiamondOutcome {
            seeds: seed_idx
                .iter()
                .map(|&i| self.graph.node_id(i).to_string())
                .collect(),
            added,
            stop_reason,
            iterations,
            node_count: n,
        })
    }

    /// Count links from a newly added module node and grow the frontier.
    fn absorb_neighbors(&self, state: &mut ExpansionState, node: NodeIndex) {
        for nb in self.graph.neighbor_indices(node) {
            let i = nb.index();
            state.links[i] += 1;
            state.p_cache[i] = None;
            if !state.in_module[i] {
                state.frontier.insert(nb);
            }
        }
    }

    /// Frontier node with the smallest p-value, ties broken by node ID.
    fn best_candidate(
        &self,
        state: &mut ExpansionState,
        test: &HypergeometricTest,
        degrees: &[usize],
    ) -> Result<Option<(NodeIndex, f64)>> {
        let mut best: Option<(NodeIndex, f64)> = None;
        for &candidate in &state.frontier {
            let i = candidate.index();
            let p = match state.p_cache[i] {
                Some(p) => p,
                None => {
                    let p = test.upper_tail(degrees[i], state.links[i])?;
                    state.p_cache[i] = Some(p);
                    p
                }
            };
            let better = match best {
                None => true,
                Some((current, current_p)) => match p.total_cmp(&current_p) {
                    Ordering::Less => true,
                    Ordering::Equal => self.graph.node_id(candidate) < self.graph.node_id(current),
                    Ordering::Greater => false,
                },
            };
            if better {
                best = Some((candidate, p));
            }
        }
        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PropagationError;
    use crate::propagation::events::{Cancellable, NoopObserver, RecordingObserver};
    use crate::test_helpers::{path_graph, seeds, star_graph, with_isolated};

    fn permissive() -> DiamondConfig {
        DiamondConfig {
            significance_cutoff: 1.0,
            ..Default::default()
        }
    }

    /// Clique a1..a4 with a tail a1 – x1 – x2 – … – x30.
    fn clique_with_tail() -> InteractionGraph {
        let mut g = InteractionGraph::new();
        crate::test_helpers::add_clique(&mut g, "a", 4);
        g.add_edge("a1", "x1");
        for i in 1..30 {
            g.add_edge(&format!("x{i}"), &format!("x{}", i + 1));
        }
        g
    }

    #[test]
    fn test_path_stops_when_not_significant() {
        let g = path_graph(5);
        let engine = DiamondEngine::new(&g, DiamondConfig::default());
        let out = engine.run_with_observer(&seeds(&["n1"]), &mut NoopObserver).unwrap();

        assert!(out.added.is_empty());
        assert_eq!(out.module(), vec!["n1"]);
        assert_eq!(out.iterations, 1);
        match out.stop_reason {
            StopReason::NotSignificant { p_value } => assert!((p_value - 0.4).abs() < 1e-12),
            other => panic!("unexpected stop reason {other:?}"),
        }
    }

    #[test]
    fn test_path_consumed_with_permissive_cutoff() {
        let g = path_graph(5);
        let engine = DiamondEngine::new(&g, permissive());
        let out = engine.run_with_observer(&seeds(&["n1"]), &mut NoopObserver).unwrap();

        assert_eq!(out.module(), vec!["n1", "n2", "n3", "n4", "n5"]);
        assert_eq!(out.stop_reason, StopReason::FrontierExhausted);
        assert_eq!(out.iterations, 5);
        assert!((out.added[0].p_value - 0.4).abs() < 1e-12);
        assert!((out.added[3].p_value - 0.2).abs() < 1e-12);
        assert!(out.added.iter().all(|a| a.connectivity == 1));
    }

    #[test]
    fn test_isolated_seed_exhausts_frontier() {
        let g = with_isolated(path_graph(3), "alone");
        let engine = DiamondEngine::new(&g, DiamondConfig::default());
        let out = engine.run_with_observer(&seeds(&["alone"]), &mut NoopObserver).unwrap();

        assert_eq!(out.stop_reason, StopReason::FrontierExhausted);
        assert_eq!(out.module(), vec!["alone"]);
        assert_eq!(out.iterations, 1);
    }

    #[test]
    fn test_significant_candidates_added_then_stop() {
        let g = clique_with_tail();
        let engine = DiamondEngine::new(&g, DiamondConfig::default());
        let mut recorder = RecordingObserver::new();
        let out = engine
            .run_with_observer(&seeds(&["a1", "a2"]), &mut recorder)
            .unwrap();

        // a3 and a4 tie on the first step; a3 wins by ID.
        assert_eq!(recorder.added_nodes(), vec!["a3", "a4"]);
        assert!((out.added[0].p_value - 32.0 / 5984.0).abs() < 1e-12);
        assert_eq!(out.added[0].connectivity, 2);
        // a4 then links to three module nodes with only two seeds.
        assert_eq!(out.added[1].p_value, 0.0);
        assert_eq!(out.added[1].connectivity, 3);

        match out.stop_reason {
            StopReason::NotSignificant { p_value } => {
                assert!((p_value - (1.0 - 496.0 / 561.0)).abs() < 1e-12)
            }
            other => panic!("unexpected stop reason {other:?}"),
        }
        assert!(!out.module().contains(&"x1"));
    }

    #[test]
    fn test_equal_p_values_break_by_id() {
        let g = star_graph("c", &["z", "b", "m"]);
        let engine = DiamondEngine::new(&g, permissive());
        let out = engine.run_with_observer(&seeds(&["c"]), &mut NoopObserver).unwrap();

        assert_eq!(out.module(), vec!["c", "b", "m", "z"]);
        assert_eq!(out.stop_reason, StopReason::FrontierExhausted);
    }

    #[test]
    fn test_growth_limit() {
        let g = path_graph(10);
        let config = DiamondConfig {
            max_added: 3,
            ..permissive()
        };
        let out = DiamondEngine::new(&g, config)
            .run_with_observer(&seeds(&["n1"]), &mut NoopObserver)
            .unwrap();

        assert_eq!(out.module(), vec!["n1", "n2", "n3", "n4"]);
        assert_eq!(out.stop_reason, StopReason::GrowthLimitReached { added: 3 });
        assert_eq!(out.iterations, 3);
    }

    #[test]
    fn test_iteration_limit() {
        let g = path_graph(10);
        let config = DiamondConfig {
            max_iterations: 2,
            ..permissive()
        };
        let out = DiamondEngine::new(&g, config)
            .run_with_observer(&seeds(&["n1"]), &mut NoopObserver)
            .unwrap();

        assert_eq!(out.added.len(), 2);
        assert_eq!(out.stop_reason, StopReason::IterationLimitReached { iterations: 2 });
    }

    #[test]
    fn test_growth_limit_wins_over_iteration_limit() {
        let g = path_graph(10);
        let config = DiamondConfig {
            max_iterations: 2,
            max_added: 2,
            ..permissive()
        };
        let out = DiamondEngine::new(&g, config)
            .run_with_observer(&seeds(&["n1"]), &mut NoopObserver)
            .unwrap();
        assert_eq!(out.stop_reason, StopReason::GrowthLimitReached { added: 2 });
    }

    #[test]
    fn test_cancelled_before_first_iteration() {
        let g = path_graph(5);
        let mut observer = Cancellable::new(RecordingObserver::new());
        observer.cancel();
        let out = DiamondEngine::new(&g, permissive())
            .run_with_observer(&seeds(&["n1"]), &mut observer)
            .unwrap();

        assert_eq!(out.stop_reason, StopReason::Cancelled);
        assert_eq!(out.iterations, 0);
        assert_eq!(out.module(), vec!["n1"]);
        assert_eq!(
            observer.into_inner().stop_reason(),
            Some(&StopReason::Cancelled)
        );
    }

    /// Cancels once `limit` nodes have been added.
    struct CancelAfter {
        limit: usize,
        seen: usize,
    }

    impl PropagationObserver for CancelAfter {
        fn on_event(&mut self, event: &PropagationEvent) {
            if matches!(event, PropagationEvent::NodeAdded { .. }) {
                self.seen += 1;
            }
        }

        fn is_cancelled(&self) -> bool {
            self.seen >= self.limit
        }
    }

    #[test]
    fn test_cancelled_between_iterations_keeps_partial_module() {
        let g = path_graph(8);
        let mut observer = CancelAfter { limit: 2, seen: 0 };
        let out = DiamondEngine::new(&g, permissive())
            .run_with_observer(&seeds(&["n1"]), &mut observer)
            .unwrap();

        assert_eq!(out.module(), vec!["n1", "n2", "n3"]);
        assert_eq!(out.stop_reason, StopReason::Cancelled);
        assert_eq!(out.iterations, 2);
    }

    #[test]
    fn test_module_grows_monotonically_under_cutoff() {
        let g = clique_with_tail();
        let config = DiamondConfig::default();
        let mut recorder = RecordingObserver::new();
        DiamondEngine::new(&g, config.clone())
            .run_with_observer(&seeds(&["a1", "a2"]), &mut recorder)
            .unwrap();

        let mut last_size = 2;
        for event in &recorder.events {
            if let PropagationEvent::NodeAdded {
                p_value,
                module_size,
                ..
            } = event
            {
                assert!(*p_value <= config.significance_cutoff);
                assert_eq!(*module_size, last_size + 1);
                last_size = *module_size;
            }
        }
        assert!(matches!(
            recorder.events.last(),
            Some(PropagationEvent::Stopped { .. })
        ));
    }

    #[test]
    fn test_halts_within_bounds_on_larger_graph() {
        let g = path_graph(400);
        let out = DiamondEngine::new(&g, permissive())
            .run_with_observer(&seeds(&["n1"]), &mut NoopObserver)
            .unwrap();
        assert_eq!(out.added.len(), 100);
        assert!(out.iterations <= 200);
        assert_eq!(out.stop_reason, StopReason::GrowthLimitReached { added: 100 });
    }

    #[test]
    fn test_unknown_seeds_are_dropped() {
        let g = path_graph(3);
        let out = DiamondEngine::new(&g, permissive())
            .run_with_observer(&seeds(&["ghost", "n2", "n2"]), &mut NoopObserver)
            .unwrap();
        assert_eq!(out.seeds, vec!["n2"]);

        let err = DiamondEngine::new(&g, permissive())
            .run_with_observer(&seeds(&["ghost"]), &mut NoopObserver)
            .unwrap_err();
        assert!(matches!(err, PropagationError::EmptySeed));
    }

    #[test]
    fn test_deterministic_across_runs() {
        let g = clique_with_tail();
        let engine = DiamondEngine::new(&g, permissive());
        let a = engine.run_with_observer(&seeds(&["a1", "a2"]), &mut NoopObserver).unwrap();
        let b = engine.run_with_observer(&seeds(&["a1", "a2"]), &mut NoopObserver).unwrap();
        assert_eq!(a.added, b.added);
        assert_eq!(a.stop_reason, b.stop_reason);
    }
}
