//! Fitness of a control assignment.
//!
//! With `T` targets, `D` distinct driver nodes and `P` genes whose driver is a
//! preferred node:
//!
//! ```text
//! fitness = (T - D) + P / (T + 1)
//! ```
//!
//! The preferred term stays below 1, so using one driver node fewer always
//! outranks any gain in preferred drivers. Higher is better.

use serde::{Deserialize, Serialize};

/// Score of one chromosome together with the counts it was derived from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub fitness: f64,
    /// Distinct driver nodes used across all genes
    pub driver_count: usize,
    /// Genes whose driver node is preferred
    pub preferred_count: usize,
}

pub fn fitness_score(target_count: usize, driver_count: usize, preferred_count: usize) -> f64 {
    (target_count as f64 - driver_count as f64)
        + preferred_count as f64 / (target_count as f64 + 1.0)
}

/// Evaluate genes (driver node index per target) against the preferred flags
pub fn evaluate(genes: &[usize], is_preferred: &[bool]) -> Evaluation {
    let mut drivers = genes.to_vec();
    drivers.sort_unstable();
    drivers.dedup();

    let preferred_count = genes.iter().filter(|&&node| is_preferred[node]).count();

    Evaluation {
        fitness: fitness_score(genes.len(), drivers.len(), preferred_count),
        driver_count: drivers.len(),
        preferred_count,
    }
}
