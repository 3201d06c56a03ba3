//! Overlap between two modules.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::propagation::Engine;

/// Set comparison of two module memberships. Node lists are sorted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleComparison {
    pub left: Engine,
    pub right: Engine,
    pub left_size: usize,
    pub right_size: usize,
    pub shared: Vec<String>,
    pub left_only: Vec<String>,
    pub right_only: Vec<String>,
    /// `|shared| / |left ∪ right|`, 0 when both modules are empty
    pub jaccard: f64,
}

impl ModuleComparison {
    pub fn between<L, R>(left: Engine, left_module: &[L], right: Engine, right_module: &[R]) -> Self
    where
        L: AsRef<str>,
        R: AsRef<str>,
    {
        let a: BTreeSet<&str> = left_module.iter().map(|s| s.as_ref()).collect();
        let b: BTreeSet<&str> = right_module.iter().map(|s| s.as_ref()).collect();

        let shared: Vec<String> = a.intersection(&b).map(|s| s.to_string()).collect();
        let left_only: Vec<String> = a.difference(&b).map(|s| s.to_string()).collect();
        let right_only: Vec<String> = b.difference(&a).map(|s| s.to_string()).collect();

        let union = shared.len() + left_only.len() + right_only.len();
        let jaccard = if union == 0 {
            0.0
        } else {
            shared.len() as f64 / union as f64
        };

        Self {
            left,
            right,
            left_size: a.len(),
            right_size: b.len(),
            shared,
            left_only,
            right_only,
            jaccard,
        }
    }
}
