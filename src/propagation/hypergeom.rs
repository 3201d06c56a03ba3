//! Hypergeometric upper-tail probabilities.
//!
//! DIAMOnD scores a candidate with degree `k` and `ks` links into the module
//! by `P(X ≥ ks)` for `X ~ Hypergeometric(N, K, k)`: the chance of drawing at
//! least `ks` seed-connected neighbours when `k` neighbours are drawn from `N`
//! nodes of which `K` are seeds. The tail is the survival function of
//! [`statrs::distribution::Hypergeometric`] evaluated at `ks − 1`.

use statrs::distribution::{Discrete, DiscreteCDF, Hypergeometric};

use crate::error::{PropagationError, Result};

/// Hypergeometric test with a fixed population `N` and success count `K`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HypergeometricTest {
    population: u64,
    successes: u64,
}

impl HypergeometricTest {
    /// Fails when `successes > population`.
    pub fn new(population: usize, successes: usize) -> Result<Self> {
        let test = Self {
            population: population as u64,
            successes: successes as u64,
        };
        test.distribution(0)?;
        Ok(test)
    }

    pub fn population(&self) -> usize {
        self.population as usize
    }

    pub fn successes(&self) -> usize {
        self.successes as usize
    }

    fn distribution(&self, draws: usize) -> Result<Hypergeometric> {
        Hypergeometric::new(self.population, self.successes, draws as u64).map_err(|e| {
            PropagationError::Distribution(format!(
                "hypergeometric(N={}, K={}, n={}): {}",
                self.population, self.successes, draws, e
            ))
        })
    }

    /// `P(X = x)` for `draws` draws.
    pub fn pmf(&self, draws: usize, x: usize) -> Result<f64> {
        Ok(self.distribution(draws)?.pmf(x as u64))
    }

    /// `P(X ≥ observed)` for `draws` draws.
    ///
    /// An `observed` count above `min(draws, K)` lies outside the support and
    /// gives 0.
    pub fn upper_tail(&self, draws: usize, observed: usize) -> Result<f64> {
        let dist = self.distribution(draws)?;
        if observed == 0 {
            return Ok(1.0);
        }
        Ok(dist.sf(observed as u64 - 1).clamp(0.0, 1.0))
    }
}
