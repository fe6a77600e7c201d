use super::index::GraphIndex;
use super::matrix::BoolMatrix;
use crate::error::{NetControlError, Result};
use crate::types::Graph;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How the per-hop reachability is computed. Both methods yield identical
/// results; the frontier expansion is linear in the graph size per hop while
/// matrix powers are cubic in the node count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReachabilityMethod {
    #[default]
    Frontier,
    MatrixPowers,
}

/// Reachability of the target nodes split by exact walk length.
///
/// `row(k, t)` holds, ascending, every node with a walk of exactly `k` steps
/// to target `t`: the support of row `t` of `C·A^k`. Hop 0 is the target
/// itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetProjection {
    hops: Vec<Vec<Vec<usize>>>,
}

impl TargetProjection {
    /// Number of stored hops, including hop 0
    pub fn hop_count(&self) -> usize {
        self.hops.len()
    }

    pub fn row(&self, hop: usize, target: usize) -> &[usize] {
        &self.hops[hop][target]
    }

    pub fn reaches(&self, hop: usize, target: usize, node: usize) -> bool {
        self.hops
            .get(hop)
            .map(|rows| rows[target].binary_search(&node).is_ok())
            .unwrap_or(false)
    }

    /// Length of the shortest walk (at least one step) from `node` to `target`
    pub fn shortest_path_length(&self, target: usize, node: usize) -> Option<usize> {
        (1..self.hops.len()).find(|&hop| self.reaches(hop, target, node))
    }
}

/// For every target node (by position in the target list), the nodes that
/// reach it with a walk of 1 to `maximum_path_length` steps.
#[derive(Debug, Clone)]
pub struct Reachability {
    maximum_path_length: usize,
    ancestors: Vec<Vec<usize>>,
    sorted_ancestors: Vec<Vec<usize>>,
    projection: TargetProjection,
}

impl Reachability {
    /// Precompute reachability for the targets of `graph`.
    ///
    /// Fails with `UnreachableTarget` if some target has no ancestor within
    /// the bound, since no chromosome could then be built.
    pub fn compute(
        graph: &Graph,
        index: &GraphIndex,
        maximum_path_length: usize,
        method: ReachabilityMethod,
    ) -> Result<Self> {
        let edges = index.edge_pairs(&graph.edges)?;
        let hops = match method {
            ReachabilityMethod::Frontier => {
                frontier_hops(index.len(), &edges, index.targets(), maximum_path_length)
            }
            ReachabilityMethod::MatrixPowers => {
                matrix_hops(index.len(), &edges, index.targets(), maximum_path_length)
            }
        };
        let projection = TargetProjection { hops };

        let mut ancestors = Vec::with_capacity(index.target_count());
        let mut seen = vec![false; index.len()];
        for (t, &target) in index.targets().iter().enumerate() {
            let mut list = Vec::new();
            for hop in 1..projection.hop_count() {
                for &node in projection.row(hop, t) {
                    if !seen[node] {
                        seen[node] = true;
                        list.push(node);
                    }
                }
            }
            for &node in &list {
                seen[node] = false;
            }
            if list.is_empty() {
                return Err(NetControlError::UnreachableTarget {
                    target: index.node(target).to_string(),
                    maximum_path_length,
                });
            }
            ancestors.push(list);
        }

        let sorted_ancestors = ancestors
            .iter()
            .map(|list| {
                let mut sorted = list.clone();
                sorted.sort_unstable();
                sorted
            })
            .collect();

        Ok(Self {
            maximum_path_length,
            ancestors,
            sorted_ancestors,
            projection,
        })
    }

    pub fn maximum_path_length(&self) -> usize {
        self.maximum_path_length
    }

    pub fn target_count(&self) -> usize {
        self.ancestors.len()
    }

    /// Ancestors of the target at position `target`, ordered by the hop at
    /// which they first reach it, then by node index
    pub fn ancestors(&self, target: usize) -> &[usize] {
        &self.ancestors[target]
    }

    pub fn contains(&self, target: usize, node: usize) -> bool {
        self.sorted_ancestors
            .get(target)
            .map(|sorted| sorted.binary_search(&node).is_ok())
            .unwrap_or(false)
    }

    pub fn projection(&self) -> &TargetProjection {
        &self.projection
    }

    /// Ancestor sets keyed by target identifier
    pub fn ancestor_names(&self, index: &GraphIndex) -> BTreeMap<String, Vec<String>> {
        index
            .targets()
            .iter()
            .zip(&self.ancestors)
            .map(|(&target, list)| {
                (
                    index.node(target).to_string(),
                    list.iter().map(|&node| index.node(node).to_string()).collect(),
                )
            })
            .collect()
    }
}

/// Exact-length walk layers by repeated predecessor expansion
fn frontier_hops(
    n: usize,
    edges: &[(usize, usize)],
    targets: &[usize],
    maximum_path_length: usize,
) -> Vec<Vec<Vec<usize>>> {
    let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
    for &(source, target) in edges {
        predecessors[target].push(source);
    }
    for list in &mut predecessors {
        list.sort_unstable();
        list.dedup();
    }

    let mut hops: Vec<Vec<Vec<usize>>> = Vec::with_capacity(maximum_path_length + 1);
    hops.push(targets.iter().map(|&t| vec![t]).collect());

    let mut in_layer = vec![false; n];
    for hop in 1..=maximum_path_length {
        let rows = hops[hop - 1]
            .iter()
            .map(|previous| {
                let mut layer = Vec::new();
                for &node in previous {
                    for &pred in &predecessors[node] {
                        if !in_layer[pred] {
                            in_layer[pred] = true;
                            layer.push(pred);
                        }
                    }
                }
                for &node in &layer {
                    in_layer[node] = false;
                }
                layer.sort_unstable();
                layer
            })
            .collect();
        hops.push(rows);
    }
    hops
}

/// Exact-length walk layers as the row supports of `C·A^k`
fn matrix_hops(
    n: usize,
    edges: &[(usize, usize)],
    targets: &[usize],
    maximum_path_length: usize,
) -> Vec<Vec<Vec<usize>>> {
    let a = BoolMatrix::adjacency(n, edges);
    let c = BoolMatrix::selector(n, targets);
    a.powers(maximum_path_length)
        .iter()
        .map(|power| {
            let ca = c.multiply(power);
            (0..ca.rows()).map(|row| ca.row_support(row)).collect()
        })
        .collect()
}
