use netcontrol::engines::network::{GraphIndex, Reachability, ReachabilityMethod};
use netcontrol::types::{Edge, Graph};
use netcontrol::NetControlError;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn chain_graph() -> Graph {
    // A -> B -> C, D -> C
    Graph::from_edges(
        vec![Edge::new("A", "B"), Edge::new("B", "C"), Edge::new("D", "C")],
        names(&["C"]),
        names(&["A"]),
    )
    .unwrap()
}

fn ancestors_of(graph: &Graph, length: usize, method: ReachabilityMethod) -> Vec<Vec<String>> {
    let index = GraphIndex::build(graph).unwrap();
    let reachability = Reachability::compute(graph, &index, length, method).unwrap();
    (0..reachability.target_count())
        .map(|t| {
            reachability
                .ancestors(t)
                .iter()
                .map(|&n| index.node(n).to_string())
                .collect()
        })
        .collect()
}

#[test]
fn test_two_hop_reachability() {
    let graph = chain_graph();
    assert_eq!(graph.nodes, names(&["A", "B", "C", "D"]));

    // One-hop ancestors first, then the two-hop one
    let ancestors = ancestors_of(&graph, 2, ReachabilityMethod::Frontier);
    assert_eq!(ancestors, vec![names(&["B", "D", "A"])]);
}

#[test]
fn test_path_length_bound_excludes_longer_paths() {
    let graph = chain_graph();
    let ancestors = ancestors_of(&graph, 1, ReachabilityMethod::Frontier);
    assert_eq!(ancestors, vec![names(&["B", "D"])]);
}

#[test]
fn test_target_is_not_its_own_ancestor_without_cycle() {
    let graph = chain_graph();
    let ancestors = ancestors_of(&graph, 5, ReachabilityMethod::Frontier);
    assert!(!ancestors[0].contains(&"C".to_string()));
}

#[test]
fn test_cycle_within_bound_makes_target_its_own_ancestor() {
    let graph = Graph::from_edges(
        vec![Edge::new("A", "B"), Edge::new("B", "A")],
        names(&["A"]),
        vec![],
    )
    .unwrap();

    assert_eq!(
        ancestors_of(&graph, 1, ReachabilityMethod::Frontier),
        vec![names(&["B"])]
    );
    assert_eq!(
        ancestors_of(&graph, 2, ReachabilityMethod::Frontier),
        vec![names(&["B", "A"])]
    );
}

#[test]
fn test_self_loop() {
    let graph = Graph::from_edges(
        vec![Edge::new("A", "A"), Edge::new("B", "A")],
        names(&["A"]),
        vec![],
    )
    .unwrap();
    assert_eq!(
        ancestors_of(&graph, 1, ReachabilityMethod::MatrixPowers),
        vec![names(&["A", "B"])]
    );
}

#[test]
fn test_unreachable_target_is_rejected() {
    let graph = Graph::from_edges(vec![Edge::new("A", "B")], names(&["A"]), vec![]).unwrap();
    let index = GraphIndex::build(&graph).unwrap();
    let result = Reachability::compute(&graph, &index, 3, ReachabilityMethod::Frontier);

    match result {
        Err(NetControlError::UnreachableTarget { target, maximum_path_length }) => {
            assert_eq!(target, "A");
            assert_eq!(maximum_path_length, 3);
        }
        other => panic!("expected UnreachableTarget, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_shortest_path_lengths_from_projection() {
    let graph = chain_graph();
    let index = GraphIndex::build(&graph).unwrap();
    let reachability =
        Reachability::compute(&graph, &index, 3, ReachabilityMethod::Frontier).unwrap();
    let projection = reachability.projection();

    let a = index.index_of("A").unwrap();
    let b = index.index_of("B").unwrap();
    let d = index.index_of("D").unwrap();
    let c = index.index_of("C").unwrap();

    assert_eq!(projection.hop_count(), 4);
    assert_eq!(projection.row(0, 0), &[c]);
    assert_eq!(projection.shortest_path_length(0, b), Some(1));
    assert_eq!(projection.shortest_path_length(0, d), Some(1));
    assert_eq!(projection.shortest_path_length(0, a), Some(2));
    assert_eq!(projection.shortest_path_length(0, c), None);
    assert!(projection.row(3, 0).is_empty());
}

#[test]
fn test_frontier_and_matrix_powers_agree() {
    let mut rng = ChaCha8Rng::seed_from_u64(2024);

    for _ in 0..10 {
        let n = 25;
        let nodes: Vec<String> = (0..n).map(|i| format!("n{}", i)).collect();
        let edges: Vec<Edge> = (0..60)
            .map(|_| {
                let source = rng.gen_range(0..n);
                let target = rng.gen_range(0..n);
                Edge::new(nodes[source].clone(), nodes[target].clone())
            })
            .collect();
        // Every target gets at least one incoming edge
        let mut edges = edges;
        let targets: Vec<String> = (0..5).map(|i| nodes[i * 5].clone()).collect();
        for target in &targets {
            edges.push(Edge::new(nodes[n - 1].clone(), target.clone()));
        }
        let graph = Graph::new(nodes.clone(), edges, targets, vec![]).unwrap();
        let index = GraphIndex::build(&graph).unwrap();

        for length in 1..=4 {
            let frontier =
                Reachability::compute(&graph, &index, length, ReachabilityMethod::Frontier)
                    .unwrap();
            let matrix =
                Reachability::compute(&graph, &index, length, ReachabilityMethod::MatrixPowers)
                    .unwrap();

            assert_eq!(frontier.projection(), matrix.projection());
            for t in 0..frontier.target_count() {
                assert_eq!(frontier.ancestors(t), matrix.ancestors(t));
            }
        }
    }
}

#[test]
fn test_ancestor_names_keyed_by_target() {
    let graph = chain_graph();
    let index = GraphIndex::build(&graph).unwrap();
    let reachability =
        Reachability::compute(&graph, &index, 2, ReachabilityMethod::Frontier).unwrap();
    let by_name = reachability.ancestor_names(&index);
    assert_eq!(by_name["C"], names(&["B", "D", "A"]));
}

#[test]
fn test_graph_index_is_deterministic() {
    let graph = chain_graph();
    let first = GraphIndex::build(&graph).unwrap();
    let second = GraphIndex::build(&graph).unwrap();

    for node in &graph.nodes {
        assert_eq!(first.index_of(node), second.index_of(node));
    }
    assert_eq!(first.index_of("A"), Some(0));
    assert_eq!(first.index_of("D"), Some(3));
    assert_eq!(first.node(2), "C");
    assert_eq!(first.targets(), &[2]);
    assert!(first.is_preferred(0));
    assert!(!first.is_preferred(1));
}

#[test]
fn test_duplicate_nodes_are_rejected() {
    let result = Graph::new(
        names(&["A", "B", "A"]),
        vec![Edge::new("A", "B")],
        names(&["B"]),
        vec![],
    );
    assert!(matches!(result, Err(NetControlError::DuplicateNode(node)) if node == "A"));
}

#[test]
fn test_unknown_references_are_rejected() {
    let edge = Graph::new(
        names(&["A", "B"]),
        vec![Edge::new("A", "X")],
        names(&["B"]),
        vec![],
    );
    assert!(matches!(edge, Err(NetControlError::UnknownNode { node, .. }) if node == "X"));

    let target = Graph::new(
        names(&["A", "B"]),
        vec![Edge::new("A", "B")],
        names(&["Z"]),
        vec![],
    );
    assert!(matches!(target, Err(NetControlError::UnknownNode { node, .. }) if node == "Z"));

    let preferred = Graph::new(
        names(&["A", "B"]),
        vec![Edge::new("A", "B")],
        names(&["B"]),
        names(&["Q"]),
    );
    assert!(preferred.unwrap_err().is_configuration());
}

#[test]
fn test_empty_targets_are_rejected() {
    let result = Graph::new(names(&["A", "B"]), vec![Edge::new("A", "B")], vec![], vec![]);
    assert!(matches!(result, Err(NetControlError::EmptyTargets)));
}

#[test]
fn test_from_edges_drops_unknown_targets() {
    let graph = Graph::from_edges(
        vec![Edge::new("A", "B")],
        names(&["B", "Missing", "B"]),
        names(&["Missing", "A"]),
    )
    .unwrap();
    assert_eq!(graph.target_nodes, names(&["B"]));
    assert_eq!(graph.preferred_nodes, names(&["A"]));
}
