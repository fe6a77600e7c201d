use crate::engines::network::Reachability;
use rand::Rng;

/// Uniform draw from the reachability set of one target
pub fn random_ancestor<R: Rng>(reachability: &Reachability, target: usize, rng: &mut R) -> usize {
    let ancestors = reachability.ancestors(target);
    ancestors[rng.gen_range(0..ancestors.len())]
}

/// Generate random genes: one uniform draw per target
pub fn random_genes<R: Rng>(reachability: &Reachability, rng: &mut R) -> Vec<usize> {
    (0..reachability.target_count())
        .map(|target| random_ancestor(reachability, target, rng))
        .collect()
}

/// Redraw `count` randomly chosen genes (the same gene may be picked twice)
pub fn randomize_genes<R: Rng>(
    genes: &mut [usize],
    count: usize,
    reachability: &Reachability,
    rng: &mut R,
) {
    if genes.is_empty() {
        return;
    }
    for _ in 0..count {
        let target = rng.gen_range(0..genes.len());
        genes[target] = random_ancestor(reachability, target, rng);
    }
}

/// Rank-weighted roulette selection.
///
/// `ranked` holds population indices sorted best first; rank `r` of `n`
/// is picked with weight `n - r`.
pub fn rank_selection<R: Rng>(ranked: &[usize], rng: &mut R) -> usize {
    let n = ranked.len() as u64;
    let total = n * (n + 1) / 2;
    let mut spin = rng.gen_range(0..total);

    for (rank, &index) in ranked.iter().enumerate() {
        let weight = n - rank as u64;
        if spin < weight {
            return index;
        }
        spin -= weight;
    }

    // Unreachable while weights sum to `total`
    ranked[ranked.len() - 1]
}

/// Uniform crossover: each gene comes from either parent with equal odds
pub fn crossover<R: Rng>(parent1: &[usize], parent2: &[usize], rng: &mut R) -> Vec<usize> {
    parent1
        .iter()
        .zip(parent2)
        .map(|(&a, &b)| if rng.gen_bool(0.5) { a } else { b })
        .collect()
}

/// Mutation: redraw each gene from its reachability set with probability
/// `mutation_rate`
pub fn mutate<R: Rng>(
    genes: &mut [usize],
    mutation_rate: f64,
    reachability: &Reachability,
    rng: &mut R,
) {
    for (target, gene) in genes.iter_mut().enumerate() {
        if rng.gen::<f64>() < mutation_rate {
            *gene = random_ancestor(reachability, target, rng);
        }
    }
}
