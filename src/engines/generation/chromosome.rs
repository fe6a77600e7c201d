use crate::engines::evaluation::{evaluate, Evaluation};
use crate::engines::network::Reachability;
use serde::{Deserialize, Serialize};

/// Candidate control configuration.
///
/// `genes[t]` is the index of the driver node chosen for the target at
/// position `t` of the target list. Every gene must be an ancestor of its
/// target; the genetic operators only ever draw replacement values from the
/// target's reachability set, so this holds for every chromosome they build.
///
/// Fitness and the counts it derives from are cached next to the genes, so a
/// persisted population can be ranked without re-evaluating it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chromosome {
    pub genes: Vec<usize>,
    pub fitness: f64,
    pub driver_count: usize,
    pub preferred_count: usize,
}

impl Chromosome {
    /// Wrap genes and evaluate them
    pub fn from_genes(genes: Vec<usize>, is_preferred: &[bool]) -> Self {
        let mut chromosome = Self {
            genes,
            fitness: 0.0,
            driver_count: 0,
            preferred_count: 0,
        };
        chromosome.evaluate(is_preferred);
        chromosome
    }

    pub fn evaluate(&mut self, is_preferred: &[bool]) {
        let Evaluation {
            fitness,
            driver_count,
            preferred_count,
        } = evaluate(&self.genes, is_preferred);
        self.fitness = fitness;
        self.driver_count = driver_count;
        self.preferred_count = preferred_count;
    }

    pub fn evaluation(&self) -> Evaluation {
        Evaluation {
            fitness: self.fitness,
            driver_count: self.driver_count,
            preferred_count: self.preferred_count,
        }
    }

    /// Every gene lies in its target's reachability set
    pub fn is_feasible(&self, reachability: &Reachability) -> bool {
        self.genes.len() == reachability.target_count()
            && self
                .genes
                .iter()
                .enumerate()
                .all(|(target, &node)| reachability.contains(target, node))
    }

    /// Distinct driver nodes, ascending
    pub fn driver_nodes(&self) -> Vec<usize> {
        let mut drivers = self.genes.clone();
        drivers.sort_unstable();
        drivers.dedup();
        drivers
    }
}
