use super::chromosome::Chromosome;
use crate::engines::network::Reachability;
use crate::error::{NetControlError, Result};
use serde::{Deserialize, Serialize};

/// Chromosomes of the current generation plus one best/average fitness entry
/// per generation seen so far (the initial population included)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Population {
    pub chromosomes: Vec<Chromosome>,
    pub historic_best_fitness: Vec<f64>,
    pub historic_average_fitness: Vec<f64>,
}

impl Population {
    pub fn len(&self) -> usize {
        self.chromosomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chromosomes.is_empty()
    }

    /// Population indices sorted by fitness, best first. Ties keep population
    /// order.
    pub fn ranked_indices(&self) -> Vec<usize> {
        let mut ranked: Vec<usize> = (0..self.chromosomes.len()).collect();
        ranked.sort_by(|&a, &b| {
            self.chromosomes[b]
                .fitness
                .total_cmp(&self.chromosomes[a].fitness)
        });
        ranked
    }

    /// Best chromosome of the current generation (first one on ties)
    pub fn best(&self) -> Option<&Chromosome> {
        self.ranked_indices()
            .first()
            .map(|&index| &self.chromosomes[index])
    }

    pub fn best_fitness(&self) -> f64 {
        self.best().map(|c| c.fitness).unwrap_or(f64::NEG_INFINITY)
    }

    pub fn average_fitness(&self) -> f64 {
        if self.chromosomes.is_empty() {
            return 0.0;
        }
        self.chromosomes.iter().map(|c| c.fitness).sum::<f64>() / self.chromosomes.len() as f64
    }

    /// Best fitness reached by any generation so far
    pub fn best_historic_fitness(&self) -> f64 {
        self.historic_best_fitness
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Append the current generation to the fitness history
    pub fn record_history(&mut self) {
        let best = self.best_fitness();
        let average = self.average_fitness();
        self.historic_best_fitness.push(best);
        self.historic_average_fitness.push(average);
    }

    /// Distinct chromosomes sharing the best fitness of the current
    /// generation, in rank order
    pub fn best_chromosomes(&self) -> Vec<&Chromosome> {
        let best = self.best_fitness();
        let mut result: Vec<&Chromosome> = Vec::new();
        for index in self.ranked_indices() {
            let chromosome = &self.chromosomes[index];
            if chromosome.fitness < best {
                break;
            }
            if !result.iter().any(|c| c.genes == chromosome.genes) {
                result.push(chromosome);
            }
        }
        result
    }

    /// Check a persisted population before resuming from it, and refresh the
    /// cached evaluations
    pub fn validate(&mut self, reachability: &Reachability, is_preferred: &[bool]) -> Result<()> {
        for (position, chromosome) in self.chromosomes.iter_mut().enumerate() {
            if !chromosome.is_feasible(reachability) {
                return Err(NetControlError::CorruptCheckpoint(format!(
                    "chromosome {} assigns a driver that cannot reach its target",
                    position
                )));
            }
            chromosome.evaluate(is_preferred);
        }
        if self.historic_best_fitness.len() != self.historic_average_fitness.len() {
            return Err(NetControlError::CorruptCheckpoint(
                "fitness histories have different lengths".to_string(),
            ));
        }
        Ok(())
    }
}
