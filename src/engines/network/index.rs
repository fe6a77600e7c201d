use crate::error::{NetControlError, Result};
use crate::types::{Edge, Graph};
use std::collections::HashMap;

/// Dense integer index over the nodes of a graph.
///
/// Indices follow the order of `Graph::nodes`, so the same node list always
/// yields the same indices. Chromosome genes and matrix rows/columns are
/// addressed through this index.
#[derive(Debug, Clone)]
pub struct GraphIndex {
    nodes: Vec<String>,
    index: HashMap<String, usize>,
    is_preferred: Vec<bool>,
    targets: Vec<usize>,
}

impl GraphIndex {
    /// Index the graph, rejecting duplicate nodes and dangling references
    pub fn build(graph: &Graph) -> Result<Self> {
        let mut index = HashMap::with_capacity(graph.nodes.len());
        for (i, node) in graph.nodes.iter().enumerate() {
            if index.insert(node.clone(), i).is_some() {
                return Err(NetControlError::DuplicateNode(node.clone()));
            }
        }

        for edge in &graph.edges {
            for node in [&edge.source_node, &edge.target_node] {
                if !index.contains_key(node) {
                    return Err(NetControlError::UnknownNode {
                        node: node.clone(),
                        context: format!("edge {} -> {}", edge.source_node, edge.target_node),
                    });
                }
            }
        }

        if graph.target_nodes.is_empty() {
            return Err(NetControlError::EmptyTargets);
        }

        let mut targets = Vec::with_capacity(graph.target_nodes.len());
        let mut is_target = vec![false; graph.nodes.len()];
        for node in &graph.target_nodes {
            let i = *index.get(node).ok_or_else(|| NetControlError::UnknownNode {
                node: node.clone(),
                context: "target nodes".to_string(),
            })?;
            if is_target[i] {
                return Err(NetControlError::DuplicateNode(node.clone()));
            }
            is_target[i] = true;
            targets.push(i);
        }

        let mut is_preferred = vec![false; graph.nodes.len()];
        for node in &graph.preferred_nodes {
            let i = *index.get(node).ok_or_else(|| NetControlError::UnknownNode {
                node: node.clone(),
                context: "preferred nodes".to_string(),
            })?;
            is_preferred[i] = true;
        }

        Ok(Self {
            nodes: graph.nodes.clone(),
            index,
            is_preferred,
            targets,
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn index_of(&self, node: &str) -> Option<usize> {
        self.index.get(node).copied()
    }

    pub fn node(&self, index: usize) -> &str {
        &self.nodes[index]
    }

    pub fn is_preferred(&self, index: usize) -> bool {
        self.is_preferred[index]
    }

    /// Preferred flag per node index
    pub fn preferred_flags(&self) -> &[bool] {
        &self.is_preferred
    }

    /// Node index of every target, in the order targets were declared
    pub fn targets(&self) -> &[usize] {
        &self.targets
    }

    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    /// Map edges to `(source, target)` index pairs
    pub fn edge_pairs(&self, edges: &[Edge]) -> Result<Vec<(usize, usize)>> {
        edges
            .iter()
            .map(|edge| {
                let lookup = |node: &String| {
                    self.index_of(node).ok_or_else(|| NetControlError::UnknownNode {
                        node: node.clone(),
                        context: format!("edge {} -> {}", edge.source_node, edge.target_node),
                    })
                };
                Ok((lookup(&edge.source_node)?, lookup(&edge.target_node)?))
            })
            .collect()
    }
}
