//! Closed tours through every node.

use super::{EdgeId, Graph, NodeId};
use crate::error::Result;

/// A Hamiltonian cycle, stored as the order in which nodes are visited.
///
/// The closing edge from the last node back to the first is implicit.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tour {
    nodes: Vec<NodeId>,
}

impl Tour {
    /// Walks a set of selected edges into a tour.
    ///
    /// Returns `None` unless the edges form one cycle through all nodes of
    /// `graph` (every node has degree exactly 2 and the walk closes only
    /// after visiting every node).
    pub fn from_edges(graph: &Graph, selected: &[EdgeId]) -> Option<Self> {
        let n = graph.num_nodes();
        if n < 3 || selected.len() != n {
            return None;
        }

        let mut adjacent: Vec<Vec<NodeId>> = vec![Vec::with_capacity(2); n];
        for &id in selected {
            let e = graph.edge(id);
            adjacent[e.u].push(e.v);
            adjacent[e.v].push(e.u);
        }
        if adjacent.iter().any(|a| a.len() != 2) {
            return None;
        }

        let mut nodes = Vec::with_capacity(n);
        let mut prev = 0;
        let mut current = 0;
        loop {
            nodes.push(current);
            let a = &adjacent[current];
            let next = if a[0] != prev || nodes.len() == 1 { a[0] } else { a[1] };
            prev = current;
            current = next;
            if current == 0 || nodes.len() > n {
                break;
            }
        }

        (nodes.len() == n).then_some(Self { nodes })
    }

    /// Visiting order.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Number of nodes (and edges) on the tour.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tour visits no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Consecutive node pairs, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        let n = self.nodes.len();
        (0..n).map(move |i| (self.nodes[i], self.nodes[(i + 1) % n]))
    }

    /// Tour edges as `(min, max)` pairs, sorted.
    pub fn edge_pairs(&self) -> Vec<(NodeId, NodeId)> {
        let mut pairs: Vec<(NodeId, NodeId)> =
            self.edges().map(|(a, b)| (a.min(b), a.max(b))).collect();
        pairs.sort_unstable();
        pairs
    }

    /// Sum of edge weights.
    pub fn length(&self, graph: &Graph) -> Result<f64> {
        self.edges()
            .map(|(a, b)| graph.weight(a, b))
            .sum::<Result<f64>>()
    }

    /// Largest edge weight on the tour.
    pub fn bottleneck(&self, graph: &Graph) -> Result<f64> {
        self.edges()
            .map(|(a, b)| graph.weight(a, b))
            .try_fold(0.0_f64, |acc, w| w.map(|w| acc.max(w)))
    }

    /// Whether this tour visits every node of `graph` exactly once using
    /// only edges of `graph`.
    pub fn is_hamiltonian_in(&self, graph: &Graph) -> bool {
        if self.nodes.len() != graph.num_nodes() || self.nodes.len() < 3 {
            return false;
        }
        let mut seen = vec![false; graph.num_nodes()];
        for &n in &self.nodes {
            if n >= seen.len() || seen[n] {
                return false;
            }
            seen[n] = true;
        }
        self.edges().all(|(a, b)| graph.edge_between(a, b).is_some())
    }
}
