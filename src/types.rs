use crate::engines::network::GraphIndex;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Directed edge `source_node -> target_node`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub source_node: String,
    pub target_node: String,
}

impl Edge {
    pub fn new(source_node: impl Into<String>, target_node: impl Into<String>) -> Self {
        Self {
            source_node: source_node.into(),
            target_node: target_node.into(),
        }
    }
}

/// Network submitted with a run.
///
/// `nodes` fixes the node ordering, and with it every index used by the
/// chromosomes of the run. Target and preferred nodes must appear in `nodes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<String>,
    pub edges: Vec<Edge>,
    pub target_nodes: Vec<String>,
    pub preferred_nodes: Vec<String>,
}

impl Graph {
    /// Build a graph and check that it is well formed
    pub fn new(
        nodes: Vec<String>,
        edges: Vec<Edge>,
        target_nodes: Vec<String>,
        preferred_nodes: Vec<String>,
    ) -> Result<Self> {
        let graph = Self {
            nodes,
            edges,
            target_nodes,
            preferred_nodes,
        };
        graph.validate()?;
        Ok(graph)
    }

    /// Build a graph whose node list is every edge endpoint, in order of first
    /// appearance. Targets and preferred nodes that do not appear in any edge
    /// are dropped.
    pub fn from_edges(
        edges: Vec<Edge>,
        target_nodes: Vec<String>,
        preferred_nodes: Vec<String>,
    ) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut nodes = Vec::new();
        for edge in &edges {
            for node in [&edge.source_node, &edge.target_node] {
                if seen.insert(node.as_str()) {
                    nodes.push(node.clone());
                }
            }
        }

        let keep = |list: Vec<String>| -> Vec<String> {
            let mut kept = HashSet::new();
            list.into_iter()
                .filter(|node| seen.contains(node.as_str()) && kept.insert(node.clone()))
                .collect()
        };
        let target_nodes = keep(target_nodes);
        let preferred_nodes = keep(preferred_nodes);

        Self::new(nodes, edges, target_nodes, preferred_nodes)
    }

    pub fn validate(&self) -> Result<()> {
        GraphIndex::build(self).map(|_| ())
    }
}

/// One contiguous period during which a run was being processed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateTimePeriod {
    pub date_time_started: DateTime<Utc>,
    pub date_time_ended: Option<DateTime<Utc>>,
}

impl DateTimePeriod {
    pub fn open(date_time_started: DateTime<Utc>) -> Self {
        Self {
            date_time_started,
            date_time_ended: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.date_time_ended.is_none()
    }
}
