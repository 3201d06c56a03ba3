//! Transition operators for the random walk.
//!
//! The walk only ever needs `y = W·x` for a fixed column-stochastic `W`, so
//! the engine is written against [`LinearOperator`] and never sees the
//! storage. Two implementations:
//!
//! - [`CsrMatrix`]: compressed sparse rows, O(edges) per product
//! - [`DenseMatrix`]: row-major `n × n`, for small graphs
//!
//! Column `u` of `W` holds `1/deg(u)` at each neighbor of `u`. Columns of
//! degree-0 nodes are all zero.

use super::config::OperatorKind;
use crate::graph::InteractionGraph;

/// Square operator applied to score vectors.
pub trait LinearOperator {
    /// Dimension `n` of the operator.
    fn dim(&self) -> usize;

    /// Write `self · x` into `y`. Both slices have length [`dim`](Self::dim).
    fn apply(&self, x: &[f64], y: &mut [f64]);
}

// ============================================================================
// Sparse
// ============================================================================

/// Compressed Sparse Row matrix.
///
/// - `row_ptr[i]..row_ptr[i + 1]` indexes the entries of row `i`
/// - `col_idx` / `values` hold column and value per entry, columns ascending
#[derive(Debug, Clone)]
pub struct CsrMatrix {
    pub num_rows: usize,
    pub row_ptr: Vec<usize>,
    pub col_idx: Vec<usize>,
    pub values: Vec<f64>,
}

impl CsrMatrix {
    /// Column-normalized adjacency of `graph`.
    pub fn transition(graph: &InteractionGraph) -> Self {
        let n = graph.node_count();
        let degrees = graph.degrees();

        let mut row_ptr = Vec::with_capacity(n + 1);
        let mut col_idx = Vec::with_capacity(2 * graph.edge_count());
        let mut values = Vec::with_capacity(2 * graph.edge_count());
        row_ptr.push(0);

        for v in graph.graph.node_indices() {
            // Row v: mass arriving at v from each neighbor u.
            let mut cols: Vec<usize> = graph.neighbor_indices(v).map(|u| u.index()).collect();
            cols.sort_unstable();
            for u in cols {
                col_idx.push(u);
                values.push(1.0 / degrees[u] as f64);
            }
            row_ptr.push(col_idx.len());
        }

        Self {
            num_rows: n,
            row_ptr,
            col_idx,
            values,
        }
    }

    /// Number of stored entries.
    pub fn num_nonzeros(&self) -> usize {
        self.col_idx.len()
    }

    /// Sum of each column.
    pub fn column_sums(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.num_rows];
        for (&col, &val) in self.col_idx.iter().zip(&self.values) {
            sums[col] += val;
        }
        sums
    }
}

impl LinearOperator for CsrMatrix {
    fn dim(&self) -> usize {
        self.num_rows
    }

    fn apply(&self, x: &[f64], y: &mut [f64]) {
        for (row, out) in y.iter_mut().enumerate().take(self.num_rows) {
            let start = self.row_ptr[row];
            let end = self.row_ptr[row + 1];
            *out = self.col_idx[start..end]
                .iter()
                .zip(&self.values[start..end])
                .map(|(&col, &val)| val * x[col])
                .sum();
        }
    }
}

// ============================================================================
// Dense
// ============================================================================

/// Row-major dense square matrix.
#[derive(Debug, Clone)]
pub struct DenseMatrix {
    n: usize,
    data: Vec<f64>,
}

impl DenseMatrix {
    /// Column-normalized adjacency of `graph`.
    pub fn transition(graph: &InteractionGraph) -> Self {
        let n = graph.node_count();
        let degrees = graph.degrees();
        let mut data = vec![0.0; n * n];
        for u in graph.graph.node_indices() {
            let weight = 1.0 / degrees[u.index()].max(1) as f64;
            for v in graph.neighbor_indices(u) {
                data[v.index() * n + u.index()] = weight;
            }
        }
        Self { n, data }
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.n + col]
    }

    /// Sum of each column.
    pub fn column_sums(&self) -> Vec<f64> {
        (0..self.n)
            .map(|col| (0..self.n).map(|row| self.get(row, col)).sum())
            .collect()
    }
}

impl LinearOperator for DenseMatrix {
    fn dim(&self) -> usize {
        self.n
    }

    fn apply(&self, x: &[f64], y: &mut [f64]) {
        for (row, out) in y.iter_mut().enumerate().take(self.n) {
            let r = &self.data[row * self.n..(row + 1) * self.n];
            *out = r.iter().zip(x).map(|(a, b)| a * b).sum();
        }
    }
}

// ============================================================================
// Runtime selection
// ============================================================================

/// Either representation, chosen at runtime.
#[derive(Debug, Clone)]
pub enum TransitionOperator {
    Sparse(CsrMatrix),
    Dense(DenseMatrix),
}

impl TransitionOperator {
    /// Build the operator for `graph`. `Auto` is treated as sparse; resolve
    /// it against the graph size first with
    /// [`RwrConfig::resolved_operator`](super::config::RwrConfig::resolved_operator).
    pub fn build(graph: &InteractionGraph, kind: OperatorKind) -> Self {
        match kind {
            OperatorKind::Dense => Self::Dense(DenseMatrix::transition(graph)),
            OperatorKind::Sparse | OperatorKind::Auto => Self::Sparse(CsrMatrix::transition(graph)),
        }
    }

    pub fn kind(&self) -> OperatorKind {
        match self {
            Self::Sparse(_) => OperatorKind::Sparse,
            Self::Dense(_) => OperatorKind::Dense,
        }
    }
}

impl LinearOperator for TransitionOperator {
    fn dim(&self) -> usize {
        match self {
            Self::Sparse(m) => m.dim(),
            Self::Dense(m) => m.dim(),
        }
    }

    fn apply(&self, x: &[f64], y: &mut [f64]) {
        match self {
            Self::Sparse(m) => m.apply(x, y),
            Self::Dense(m) => m.apply(x, y),
        }
    }
}

// ============================================================================
// Vector helpers
// ============================================================================

/// `‖a − b‖₁`
pub fn l1_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum()
}

/// Scale `v` to unit L1 mass. Returns the mass before scaling; a zero
/// vector is left unchanged.
pub fn normalize_l1(v: &mut [f64]) -> f64 {
    let mass: f64 = v.iter().map(|x| x.abs()).sum();
    if mass > 0.0 {
        for x in v.iter_mut() {
            *x /= mass;
        }
    }
    mass
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{path_graph, star_graph, with_isolated};

    fn assert_close(a: &[f64], b: &[f64]) {
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b) {
            assert!((x - y).abs() < 1e-12, "{a:?} != {b:?}");
        }
    }

    #[test]
    fn test_columns_are_stochastic() {
        let g = with_isolated(star_graph("hub", &["a", "b", "c"]), "iso");
        let csr = CsrMatrix::transition(&g);
        let dense = DenseMatrix::transition(&g);
        let iso = g.get_index("iso").unwrap().index();

        for (i, s) in csr.column_sums().iter().enumerate() {
            let expected = if i == iso { 0.0 } else { 1.0 };
            assert!((s - expected).abs() < 1e-12);
        }
        assert_close(&csr.column_sums(), &dense.column_sums());
        assert_eq!(csr.num_nonzeros(), 6);
    }

    #[test]
    fn test_sparse_and_dense_agree() {
        let g = path_graph(6);
        let csr = CsrMatrix::transition(&g);
        let dense = DenseMatrix::transition(&g);
        let x: Vec<f64> = (0..6).map(|i| (i + 1) as f64).collect();

        let mut ys = vec![0.0; 6];
        let mut yd = vec![0.0; 6];
        csr.apply(&x, &mut ys);
        dense.apply(&x, &mut yd);
        assert_close(&ys, &yd);

        // n2 receives all of n1 (degree 1) and half of n3 (degree 2).
        let n2 = g.get_index("n2").unwrap().index();
        assert!((ys[n2] - (1.0 + 3.0 / 2.0)).abs() < 1e-12);
    }

    #[test]
    fn test_csr_columns_sorted_within_rows() {
        let g = star_graph("hub", &["z", "y", "x"]);
        let csr = CsrMatrix::transition(&g);
        for row in 0..csr.num_rows {
            let cols = &csr.col_idx[csr.row_ptr[row]..csr.row_ptr[row + 1]];
            assert!(cols.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_operator_selection() {
        let g = path_graph(3);
        assert_eq!(TransitionOperator::build(&g, OperatorKind::Dense).kind(), OperatorKind::Dense);
        assert_eq!(TransitionOperator::build(&g, OperatorKind::Sparse).kind(), OperatorKind::Sparse);
        assert_eq!(TransitionOperator::build(&g, OperatorKind::Sparse).dim(), 3);
    }

    #[test]
    fn test_vector_helpers() {
        assert!((l1_distance(&[0.5, 0.5], &[1.0, 0.0]) - 1.0).abs() < 1e-12);

        let mut v = vec![1.0, 3.0];
        let mass = normalize_l1(&mut v);
        assert!((mass - 4.0).abs() < 1e-12);
        assert_close(&v, &[0.25, 0.75]);

        let mut zero = vec![0.0, 0.0];
        assert_eq!(normalize_l1(&mut zero), 0.0);
        assert_eq!(zero, vec![0.0, 0.0]);
    }
}
