use crate::config::Parameters;
use crate::engines::generation::{
    chromosome::Chromosome,
    operators::{crossover, mutate, random_genes, randomize_genes, rank_selection},
    population::Population,
};
use crate::engines::network::{GraphIndex, Reachability};
use rand::Rng;
use rayon::prelude::*;

/// Builds populations and steps them one generation at a time.
///
/// The engine holds no state between calls: the next population depends only
/// on the previous one, the parameters and the position of the random stream
/// passed in. All random draws happen sequentially before the new
/// chromosomes are evaluated in parallel, so results do not depend on thread
/// scheduling.
pub struct GeneticEngine<'a> {
    reachability: &'a Reachability,
    is_preferred: &'a [bool],
    parameters: &'a Parameters,
}

impl<'a> GeneticEngine<'a> {
    pub fn new(
        reachability: &'a Reachability,
        index: &'a GraphIndex,
        parameters: &'a Parameters,
    ) -> Self {
        Self {
            reachability,
            is_preferred: index.preferred_flags(),
            parameters,
        }
    }

    /// Genes of a new random chromosome, with the extra random redraws
    fn random_chromosome_genes<R: Rng>(&self, rng: &mut R) -> Vec<usize> {
        let mut genes = random_genes(self.reachability, rng);
        randomize_genes(
            &mut genes,
            self.parameters.random_genes_per_chromosome,
            self.reachability,
            rng,
        );
        genes
    }

    fn evaluate_all(&self, genes: Vec<Vec<usize>>) -> Vec<Chromosome> {
        genes
            .into_par_iter()
            .map(|genes| Chromosome::from_genes(genes, self.is_preferred))
            .collect()
    }

    pub fn random_chromosome<R: Rng>(&self, rng: &mut R) -> Chromosome {
        Chromosome::from_genes(self.random_chromosome_genes(rng), self.is_preferred)
    }

    /// Initial population of `population_size` random chromosomes, with its
    /// fitness recorded as the first history entry
    pub fn initial_population<R: Rng>(&self, rng: &mut R) -> Population {
        let genes: Vec<Vec<usize>> = (0..self.parameters.population_size)
            .map(|_| self.random_chromosome_genes(rng))
            .collect();

        let mut population = Population {
            chromosomes: self.evaluate_all(genes),
            historic_best_fitness: Vec::new(),
            historic_average_fitness: Vec::new(),
        };
        population.record_history();
        population
    }

    /// Produce the next generation: elites, then fresh random chromosomes,
    /// then mutated crossover children
    pub fn next_generation<R: Rng>(&self, previous: &Population, rng: &mut R) -> Population {
        let ranked = previous.ranked_indices();
        let elite_count = self.parameters.elite_count().min(ranked.len());
        let random_count = self.parameters.random_count();
        let crossover_count = self.parameters.population_size - elite_count - random_count;

        let mut chromosomes: Vec<Chromosome> = ranked
            .iter()
            .take(elite_count)
            .map(|&index| previous.chromosomes[index].clone())
            .collect();

        let mut offspring: Vec<Vec<usize>> = Vec::with_capacity(random_count + crossover_count);
        for _ in 0..random_count {
            offspring.push(self.random_chromosome_genes(rng));
        }

        if ranked.is_empty() {
            // Nothing to breed from
            for _ in 0..crossover_count {
                offspring.push(self.random_chromosome_genes(rng));
            }
        } else {
            for _ in 0..crossover_count {
                let parent1 = &previous.chromosomes[rank_selection(&ranked, rng)];
                let parent2 = &previous.chromosomes[rank_selection(&ranked, rng)];
                let mut child = crossover(&parent1.genes, &parent2.genes, rng);
                mutate(
                    &mut child,
                    self.parameters.probability_mutation,
                    self.reachability,
                    rng,
                );
                offspring.push(child);
            }
        }

        chromosomes.extend(self.evaluate_all(offspring));

        let mut next = Population {
            chromosomes,
            historic_best_fitness: previous.historic_best_fitness.clone(),
            historic_average_fitness: previous.historic_average_fitness.clone(),
        };
        next.record_history();

        log::debug!(
            "Generation step: {} elite, {} random, {} crossover, best {:.4}",
            elite_count,
            random_count,
            crossover_count,
            next.best_fitness()
        );

        next
    }
}
