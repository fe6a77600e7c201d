use super::traits::ConfigSection;
use crate::error::NetControlError;
use serde::{Deserialize, Serialize};

/// Genetic algorithm parameters, fixed for the lifetime of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameters {
    pub population_size: usize,
    pub maximum_iterations: usize,
    pub maximum_iterations_without_improvement: usize,
    pub maximum_path_length: usize,
    pub percentage_elite: f64,
    pub percentage_random: f64,
    pub probability_mutation: f64,
    pub random_genes_per_chromosome: usize,
    pub random_seed: u64,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            population_size: 80,
            maximum_iterations: 10000,
            maximum_iterations_without_improvement: 1000,
            maximum_path_length: 5,
            percentage_elite: 0.25,
            percentage_random: 0.25,
            probability_mutation: 0.001,
            random_genes_per_chromosome: 25,
            random_seed: 1,
        }
    }
}

impl Parameters {
    /// Chromosomes copied unchanged into the next generation. Always at least
    /// one, so the best fitness never decreases.
    pub fn elite_count(&self) -> usize {
        let count = (self.percentage_elite * self.population_size as f64).round() as usize;
        count.max(1).min(self.population_size)
    }

    /// Freshly drawn chromosomes per generation
    pub fn random_count(&self) -> usize {
        let count = (self.percentage_random * self.population_size as f64).round() as usize;
        count.min(self.population_size - self.elite_count())
    }

    /// Chromosomes produced by crossover per generation
    pub fn crossover_count(&self) -> usize {
        self.population_size - self.elite_count() - self.random_count()
    }
}

fn check_fraction(name: &str, value: f64) -> Result<(), NetControlError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(NetControlError::Configuration(format!(
            "{} must be between 0 and 1, got {}",
            name, value
        )));
    }
    Ok(())
}

impl ConfigSection for Parameters {
    fn section_name() -> &'static str {
        "parameters"
    }

    fn validate(&self) -> Result<(), NetControlError> {
        if self.population_size == 0 {
            return Err(NetControlError::Configuration(
                "Population size must be positive".to_string(),
            ));
        }
        if self.maximum_iterations == 0 {
            return Err(NetControlError::Configuration(
                "Maximum iterations must be positive".to_string(),
            ));
        }
        if self.maximum_iterations_without_improvement == 0 {
            return Err(NetControlError::Configuration(
                "Maximum iterations without improvement must be positive".to_string(),
            ));
        }
        if self.maximum_path_length == 0 {
            return Err(NetControlError::Configuration(
                "Maximum path length must be positive".to_string(),
            ));
        }
        check_fraction("Percentage elite", self.percentage_elite)?;
        check_fraction("Percentage random", self.percentage_random)?;
        check_fraction("Probability of mutation", self.probability_mutation)?;
        if self.percentage_elite + self.percentage_random > 1.0 {
            return Err(NetControlError::Configuration(
                "Percentage elite and percentage random must add up to at most 1".to_string(),
            ));
        }
        Ok(())
    }
}
