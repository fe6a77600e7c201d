use netcontrol::config::Parameters;
use netcontrol::engines::generation::operators::{crossover, mutate};
use netcontrol::engines::generation::{Chromosome, GeneticEngine, Population};
use netcontrol::engines::network::{GraphIndex, Reachability, ReachabilityMethod};
use netcontrol::types::{Edge, Graph};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Hub `H` reaches every target in one step; each target also has a private
/// source `S<i>`, and `P` reaches the first half of the targets in two steps
fn hub_graph(targets: usize) -> Graph {
    let mut edges = Vec::new();
    let mut target_nodes = Vec::new();
    for i in 0..targets {
        let target = format!("T{}", i);
        edges.push(Edge::new("H", target.clone()));
        edges.push(Edge::new(format!("S{}", i), target.clone()));
        if i < targets / 2 {
            edges.push(Edge::new("P", format!("S{}", i)));
        }
        target_nodes.push(target);
    }
    Graph::from_edges(edges, target_nodes, vec!["H".to_string()]).unwrap()
}

fn parameters() -> Parameters {
    Parameters {
        population_size: 40,
        maximum_iterations: 100,
        maximum_iterations_without_improvement: 100,
        maximum_path_length: 2,
        percentage_elite: 0.2,
        percentage_random: 0.2,
        probability_mutation: 0.05,
        random_genes_per_chromosome: 3,
        random_seed: 7,
    }
}

struct Fixture {
    index: GraphIndex,
    reachability: Reachability,
    parameters: Parameters,
}

fn fixture(targets: usize) -> Fixture {
    let graph = hub_graph(targets);
    let parameters = parameters();
    let index = GraphIndex::build(&graph).unwrap();
    let reachability = Reachability::compute(
        &graph,
        &index,
        parameters.maximum_path_length,
        ReachabilityMethod::Frontier,
    )
    .unwrap();
    Fixture {
        index,
        reachability,
        parameters,
    }
}

fn evolve(f: &Fixture, seed: u64, generations: usize) -> Population {
    let engine = GeneticEngine::new(&f.reachability, &f.index, &f.parameters);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut population = engine.initial_population(&mut rng);
    for _ in 0..generations {
        population = engine.next_generation(&population, &mut rng);
    }
    population
}

#[test]
fn test_every_chromosome_stays_feasible() {
    let f = fixture(8);
    let engine = GeneticEngine::new(&f.reachability, &f.index, &f.parameters);
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    let mut population = engine.initial_population(&mut rng);
    for _ in 0..30 {
        assert_eq!(population.len(), f.parameters.population_size);
        for chromosome in &population.chromosomes {
            assert!(chromosome.is_feasible(&f.reachability));
        }
        population = engine.next_generation(&population, &mut rng);
    }
}

#[test]
fn test_same_seed_reproduces_run() {
    let f = fixture(8);
    let first = evolve(&f, 99, 25);
    let second = evolve(&f, 99, 25);

    assert_eq!(first, second);
    assert_eq!(first.historic_best_fitness.len(), 26);
}

#[test]
fn test_different_seeds_diverge() {
    let f = fixture(8);
    let first = evolve(&f, 1, 3);
    let second = evolve(&f, 2, 3);
    assert_ne!(first.chromosomes, second.chromosomes);
}

#[test]
fn test_best_fitness_never_decreases() {
    let f = fixture(10);
    let population = evolve(&f, 5, 40);

    for pair in population.historic_best_fitness.windows(2) {
        assert!(pair[1] >= pair[0], "best fitness dropped: {:?}", pair);
    }
    assert_eq!(
        population.historic_best_fitness.len(),
        population.historic_average_fitness.len()
    );
}

#[test]
fn test_elite_survives_one_generation() {
    let f = fixture(10);
    let engine = GeneticEngine::new(&f.reachability, &f.index, &f.parameters);
    let mut rng = ChaCha8Rng::seed_from_u64(12);

    let mut population = engine.initial_population(&mut rng);
    for _ in 0..10 {
        let best = population.best().unwrap().clone();
        let next = engine.next_generation(&population, &mut rng);
        assert!(next.best_fitness() >= best.fitness);
        // Elites lead the next generation unchanged
        assert_eq!(next.chromosomes[0], best);
        population = next;
    }
}

#[test]
fn test_converges_to_single_hub_driver() {
    let f = fixture(6);
    let population = evolve(&f, 3, 100);
    let best = population.best().unwrap();
    let hub = f.index.index_of("H").unwrap();

    assert_eq!(best.driver_count, 1);
    assert!(best.genes.iter().all(|&g| g == hub));
    assert_eq!(best.preferred_count, 6);
}

#[test]
fn test_population_sizes_per_section() {
    let mut p = parameters();
    p.population_size = 10;
    p.percentage_elite = 0.25;
    p.percentage_random = 0.25;
    assert_eq!(p.elite_count(), 3);
    assert_eq!(p.random_count(), 3);
    assert_eq!(p.crossover_count(), 4);

    p.percentage_elite = 0.0;
    p.percentage_random = 1.0;
    assert_eq!(p.elite_count(), 1);
    assert_eq!(p.random_count(), 9);
    assert_eq!(p.crossover_count(), 0);

    p.population_size = 1;
    assert_eq!(p.elite_count(), 1);
    assert_eq!(p.random_count(), 0);
}

#[test]
fn test_crossover_respects_single_valued_targets() {
    // T1 reachable from X or Y, T2 only from Z
    let graph = Graph::from_edges(
        vec![
            Edge::new("X", "T1"),
            Edge::new("Y", "T1"),
            Edge::new("Z", "T2"),
        ],
        vec!["T1".to_string(), "T2".to_string()],
        vec![],
    )
    .unwrap();
    let index = GraphIndex::build(&graph).unwrap();
    let reachability =
        Reachability::compute(&graph, &index, 1, ReachabilityMethod::Frontier).unwrap();

    let x = index.index_of("X").unwrap();
    let y = index.index_of("Y").unwrap();
    let z = index.index_of("Z").unwrap();
    let parent1 = vec![x, z];
    let parent2 = vec![y, z];

    let mut rng = ChaCha8Rng::seed_from_u64(4);
    for _ in 0..200 {
        let mut child = crossover(&parent1, &parent2, &mut rng);
        mutate(&mut child, 0.5, &reachability, &mut rng);
        assert!(child[0] == x || child[0] == y);
        assert_eq!(child[1], z);
    }
}

#[test]
fn test_chromosome_exposes_counts() {
    let f = fixture(4);
    let hub = f.index.index_of("H").unwrap();
    let s0 = f.index.index_of("S0").unwrap();

    let chromosome = Chromosome::from_genes(vec![s0, hub, hub, hub], f.index.preferred_flags());
    assert_eq!(chromosome.driver_count, 2);
    assert_eq!(chromosome.preferred_count, 3);
    assert_eq!(chromosome.driver_nodes(), {
        let mut d = vec![hub, s0];
        d.sort();
        d
    });
    assert!(chromosome.is_feasible(&f.reachability));

    // S0 cannot reach T1
    let infeasible = Chromosome::from_genes(vec![hub, s0, hub, hub], f.index.preferred_flags());
    assert!(!infeasible.is_feasible(&f.reachability));
}

#[test]
fn test_persisted_population_is_validated() {
    let f = fixture(4);
    let mut population = evolve(&f, 8, 2);
    assert!(population
        .validate(&f.reachability, f.index.preferred_flags())
        .is_ok());

    let s0 = f.index.index_of("S0").unwrap();
    population.chromosomes[0].genes[1] = s0;
    let err = population
        .validate(&f.reachability, f.index.preferred_flags())
        .unwrap_err();
    assert!(err.is_configuration());
}
