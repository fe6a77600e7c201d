use crate::engines::generation::Chromosome;
use crate::engines::network::{GraphIndex, Reachability};
use serde::{Deserialize, Serialize};

/// How one target is driven
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlPath {
    pub target: String,
    pub driver: String,
    /// Shortest walk length from driver to target
    pub path_length: Option<usize>,
}

/// A chromosome translated back to node identifiers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlSolution {
    pub fitness: f64,
    pub driver_nodes: Vec<String>,
    pub preferred_driver_nodes: Vec<String>,
    pub paths: Vec<ControlPath>,
}

impl ControlSolution {
    pub fn from_chromosome(
        chromosome: &Chromosome,
        index: &GraphIndex,
        reachability: &Reachability,
    ) -> Self {
        let drivers = chromosome.driver_nodes();
        let paths = index
            .targets()
            .iter()
            .zip(&chromosome.genes)
            .enumerate()
            .map(|(position, (&target, &driver))| ControlPath {
                target: index.node(target).to_string(),
                driver: index.node(driver).to_string(),
                path_length: reachability
                    .projection()
                    .shortest_path_length(position, driver),
            })
            .collect();

        Self {
            fitness: chromosome.fitness,
            driver_nodes: drivers.iter().map(|&n| index.node(n).to_string()).collect(),
            preferred_driver_nodes: drivers
                .iter()
                .filter(|&&n| index.is_preferred(n))
                .map(|&n| index.node(n).to_string())
                .collect(),
            paths,
        }
    }
}
