//! Per-iteration decision events and their observers.
//!
//! Engines never print. Each decision (node chosen, p-value, stop reason,
//! RWR residual) is handed to a [`PropagationObserver`]; the CLI uses
//! [`TracingObserver`] and tests use [`RecordingObserver`] to assert on the
//! exact sequence of decisions.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, trace, warn};

use super::models::{Engine, StopReason};

/// One decision taken by an engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PropagationEvent {
    /// DIAMOnD added `node` to the module.
    NodeAdded {
        iteration: usize,
        node: String,
        p_value: f64,
        connectivity: usize,
        module_size: usize,
    },
    /// One RWR step finished.
    WalkStep { iteration: usize, residual: f64 },
    /// An engine stopped.
    Stopped {
        engine: Engine,
        iterations: usize,
        reason: StopReason,
    },
}

/// Receives engine decisions.
///
/// `is_cancelled` is polled before every iteration, never inside one, so a
/// cancelled run still returns a consistent partial result.
pub trait PropagationObserver {
    fn on_event(&mut self, event: &PropagationEvent);

    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Discards all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl PropagationObserver for NoopObserver {
    fn on_event(&mut self, _event: &PropagationEvent) {}
}

/// Logs events through `tracing`.
///
/// DIAMOnD additions are logged at `info` for the first ten iterations and
/// every tenth after that; the rest go to `debug`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl PropagationObserver for TracingObserver {
    fn on_event(&mut self, event: &PropagationEvent) {
        match event {
            PropagationEvent::NodeAdded {
                iteration,
                node,
                p_value,
                connectivity,
                module_size,
            } => {
                if *iteration <= 10 || iteration % 10 == 0 {
                    info!(
                        module_size,
                        "Iteration {:03}: added {} (p={:.2e}, connections={})",
                        iteration,
                        node,
                        p_value,
                        connectivity
                    );
                } else {
                    debug!(
                        module_size,
                        "Iteration {:03}: added {} (p={:.2e}, connections={})",
                        iteration,
                        node,
                        p_value,
                        connectivity
                    );
                }
            }
            PropagationEvent::WalkStep {
                iteration,
                residual,
            } => {
                trace!(iteration, residual, "RWR step");
            }
            PropagationEvent::Stopped {
                engine,
                iterations,
                reason,
            } => match (engine, reason) {
                (Engine::Rwr, StopReason::IterationLimitReached { .. }) => {
                    warn!(%engine, iterations, "Stop criterion: {} (scores not converged)", reason);
                }
                _ => info!(%engine, iterations, "Stop criterion: {}", reason),
            },
        }
    }
}

/// Stores every event in order.
#[derive(Debug, Default, Clone)]
pub struct RecordingObserver {
    pub events: Vec<PropagationEvent>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nodes from `NodeAdded` events, in order.
    pub fn added_nodes(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                PropagationEvent::NodeAdded { node, .. } => Some(node.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Reason from the last `Stopped` event.
    pub fn stop_reason(&self) -> Option<&StopReason> {
        self.events.iter().rev().find_map(|e| match e {
            PropagationEvent::Stopped { reason, .. } => Some(reason),
            _ => None,
        })
    }
}

impl PropagationObserver for RecordingObserver {
    fn on_event(&mut self, event: &PropagationEvent) {
        self.events.push(event.clone());
    }
}

/// Wraps an observer with a shared cancellation flag.
///
/// The flag can be set from another thread; the engine sees it at the next
/// iteration boundary.
#[derive(Debug, Clone)]
pub struct Cancellable<O> {
    inner: O,
    flag: Arc<AtomicBool>,
}

impl<O: PropagationObserver> Cancellable<O> {
    pub fn new(inner: O) -> Self {
        Self {
            inner,
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Handle that cancels the run when set.
    pub fn flag(&self) -> Arc<AtomicBool> {
        self.flag.clone()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn into_inner(self) -> O {
        self.inner
    }
}

impl<O: PropagationObserver> PropagationObserver for Cancellable<O> {
    fn on_event(&mut self, event: &PropagationEvent) {
        self.inner.on_event(event);
    }

    fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst) || self.inner.is_cancelled()
    }
}
