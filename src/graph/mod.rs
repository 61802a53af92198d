//! Weighted undirected graphs.
//!
//! Nodes are dense indices `0..num_nodes`. Every edge carries a strictly
//! positive, finite weight and is stored once; lookups accept either
//! orientation. A [`Graph`] is immutable once constructed: thresholded
//! subgraphs are new values.

mod tour;

pub use tour::Tour;

use crate::error::{Error, Result};
use rand::Rng;
use std::collections::HashMap;

/// Node identifier.
pub type NodeId = usize;

/// Index of an edge inside its [`Graph`].
pub type EdgeId = usize;

/// An undirected weighted edge.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
    /// First endpoint (the smaller node id).
    pub u: NodeId,
    /// Second endpoint (the larger node id).
    pub v: NodeId,
    /// Edge weight, strictly positive.
    pub weight: f64,
}

impl Edge {
    /// Returns the endpoint opposite to `node`.
    pub fn other(&self, node: NodeId) -> NodeId {
        if self.u == node {
            self.v
        } else {
            self.u
        }
    }

    /// Whether `node` is one of the endpoints.
    pub fn touches(&self, node: NodeId) -> bool {
        self.u == node || self.v == node
    }
}

/// An immutable weighted undirected graph.
///
/// # Examples
///
/// ```
/// use u_lazycut::graph::Graph;
///
/// let g = Graph::new(3, [(0, 1, 1.0), (1, 2, 2.0), (2, 0, 3.0)]).unwrap();
/// assert_eq!(g.num_edges(), 3);
/// assert!(g.is_complete());
/// assert_eq!(g.edge_between(2, 1), g.edge_between(1, 2));
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "GraphData", into = "GraphData"))]
pub struct Graph {
    num_nodes: usize,
    edges: Vec<Edge>,
    adjacency: Vec<Vec<EdgeId>>,
    index: HashMap<(NodeId, NodeId), EdgeId>,
}

impl Graph {
    /// Builds a graph on `num_nodes` nodes from `(u, v, weight)` triples.
    ///
    /// Fails with [`Error::InvalidGraph`] on out-of-range endpoints,
    /// self-loops, duplicate edges (in either orientation) and weights that
    /// are not strictly positive and finite.
    pub fn new<I>(num_nodes: usize, edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = (NodeId, NodeId, f64)>,
    {
        let mut graph = Self {
            num_nodes,
            edges: Vec::new(),
            adjacency: vec![Vec::new(); num_nodes],
            index: HashMap::new(),
        };

        for (a, b, weight) in edges {
            if a >= num_nodes || b >= num_nodes {
                return Err(Error::InvalidGraph(format!(
                    "edge {{{a}, {b}}} references a node outside 0..{num_nodes}"
                )));
            }
            if a == b {
                return Err(Error::InvalidGraph(format!("self-loop on node {a}")));
            }
            if !(weight.is_finite() && weight > 0.0) {
                return Err(Error::InvalidGraph(format!(
                    "edge {{{a}, {b}}} has non-positive weight {weight}"
                )));
            }
            let key = normalize(a, b);
            if graph.index.contains_key(&key) {
                return Err(Error::InvalidGraph(format!("duplicate edge {{{a}, {b}}}")));
            }

            let id = graph.edges.len();
            graph.edges.push(Edge {
                u: key.0,
                v: key.1,
                weight,
            });
            graph.index.insert(key, id);
            graph.adjacency[key.0].push(id);
            graph.adjacency[key.1].push(id);
        }

        Ok(graph)
    }

    /// Builds the complete graph on `num_nodes` nodes, weighting `{u, v}`
    /// (with `u < v`) by `weight(u, v)`.
    pub fn complete<F>(num_nodes: usize, mut weight: F) -> Result<Self>
    where
        F: FnMut(NodeId, NodeId) -> f64,
    {
        let mut triples = Vec::with_capacity(num_nodes * num_nodes.saturating_sub(1) / 2);
        for u in 0..num_nodes {
            for v in (u + 1)..num_nodes {
                triples.push((u, v, weight(u, v)));
            }
        }
        Self::new(num_nodes, triples)
    }

    /// Random complete graph with integral weights drawn from
    /// `min_weight..=max_weight`.
    pub fn random_complete<R: Rng>(
        num_nodes: usize,
        min_weight: u32,
        max_weight: u32,
        rng: &mut R,
    ) -> Result<Self> {
        if min_weight == 0 || min_weight > max_weight {
            return Err(Error::InvalidGraph(format!(
                "weight range {min_weight}..={max_weight} must be non-empty and positive"
            )));
        }
        Self::complete(num_nodes, |_, _| {
            f64::from(rng.random_range(min_weight..=max_weight))
        })
    }

    /// Number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Number of edges.
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// All edges, indexed by [`EdgeId`].
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// The edge with the given id.
    ///
    /// # Panics
    /// Panics if `id` is out of range.
    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id]
    }

    /// Looks up edge `{u, v}` in either orientation.
    pub fn edge_between(&self, u: NodeId, v: NodeId) -> Option<EdgeId> {
        self.index.get(&normalize(u, v)).copied()
    }

    /// Weight of edge `{u, v}`.
    pub fn weight(&self, u: NodeId, v: NodeId) -> Result<f64> {
        self.edge_between(u, v)
            .map(|id| self.edges[id].weight)
            .ok_or(Error::UnknownEdge { u, v })
    }

    /// Ids of all edges touching `node`, in insertion order.
    pub fn incident_edges(&self, node: NodeId) -> &[EdgeId] {
        &self.adjacency[node]
    }

    /// Number of edges touching `node`.
    pub fn degree(&self, node: NodeId) -> usize {
        self.adjacency[node].len()
    }

    /// Neighbours of `node`, in incident-edge order.
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.adjacency[node]
            .iter()
            .map(move |&id| self.edges[id].other(node))
    }

    /// Whether every pair of distinct nodes is connected.
    pub fn is_complete(&self) -> bool {
        self.edges.len() == self.num_nodes * self.num_nodes.saturating_sub(1) / 2
    }

    /// Sorted distinct edge weights.
    pub fn distinct_weights(&self) -> Vec<f64> {
        let mut weights: Vec<f64> = self.edges.iter().map(|e| e.weight).collect();
        weights.sort_by(f64::total_cmp);
        weights.dedup();
        weights
    }

    /// Subgraph on the same node set keeping only edges with
    /// `weight <= threshold`.
    pub fn with_max_weight(&self, threshold: f64) -> Self {
        let mut sub = Self {
            num_nodes: self.num_nodes,
            edges: Vec::new(),
            adjacency: vec![Vec::new(); self.num_nodes],
            index: HashMap::new(),
        };
        for edge in self.edges.iter().filter(|e| e.weight <= threshold) {
            let id = sub.edges.len();
            sub.edges.push(*edge);
            sub.index.insert((edge.u, edge.v), id);
            sub.adjacency[edge.u].push(id);
            sub.adjacency[edge.v].push(id);
        }
        sub
    }

    /// Edges with exactly one endpoint in `nodes`.
    ///
    /// Each boundary edge is reported once, ordered by the inside endpoint
    /// as listed in `nodes`.
    pub fn boundary_edges(&self, nodes: &[NodeId]) -> Vec<EdgeId> {
        let mut inside = vec![false; self.num_nodes];
        for &n in nodes {
            inside[n] = true;
        }
        let mut boundary = Vec::new();
        for &n in nodes {
            for &id in &self.adjacency[n] {
                if !inside[self.edges[id].other(n)] {
                    boundary.push(id);
                }
            }
        }
        boundary
    }
}

fn normalize(u: NodeId, v: NodeId) -> (NodeId, NodeId) {
    if u <= v {
        (u, v)
    } else {
        (v, u)
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct GraphData {
    num_nodes: usize,
    edges: Vec<Edge>,
}

#[cfg(feature = "serde")]
impl TryFrom<GraphData> for Graph {
    type Error = Error;

    fn try_from(data: GraphData) -> Result<Self> {
        Graph::new(
            data.num_nodes,
            data.edges.into_iter().map(|e| (e.u, e.v, e.weight)),
        )
    }
}

#[cfg(feature = "serde")]
impl From<Graph> for GraphData {
    fn from(graph: Graph) -> Self {
        GraphData {
            num_nodes: graph.num_nodes,
            edges: graph.edges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn square() -> Graph {
        Graph::new(
            4,
            [
                (0, 1, 1.0),
                (1, 2, 1.0),
                (2, 3, 1.0),
                (3, 0, 1.0),
                (0, 2, 5.0),
                (1, 3, 5.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_lookup_either_orientation() {
        let g = square();
        assert_eq!(g.edge_between(3, 0), g.edge_between(0, 3));
        assert!(g.edge_between(0, 3).is_some());
        let e = g.edge(g.edge_between(3, 0).unwrap());
        assert_eq!((e.u, e.v), (0, 3));
        assert_eq!(g.weight(2, 0).unwrap(), 5.0);
    }

    #[test]
    fn test_unknown_edge_weight() {
        let g = Graph::new(3, [(0, 1, 1.0)]).unwrap();
        assert_eq!(g.weight(1, 2), Err(Error::UnknownEdge { u: 1, v: 2 }));
    }

    #[test]
    fn test_rejects_invalid_edges() {
        assert!(Graph::new(2, [(0, 1, 0.0)]).is_err());
        assert!(Graph::new(2, [(0, 1, -1.0)]).is_err());
        assert!(Graph::new(2, [(0, 1, f64::NAN)]).is_err());
        assert!(Graph::new(2, [(0, 0, 1.0)]).is_err());
        assert!(Graph::new(2, [(0, 2, 1.0)]).is_err());
        assert!(Graph::new(2, [(0, 1, 1.0), (1, 0, 2.0)]).is_err());
    }

    #[test]
    fn test_complete() {
        let g = Graph::complete(5, |u, v| (u + v) as f64 + 1.0).unwrap();
        assert_eq!(g.num_edges(), 10);
        assert!(g.is_complete());
        for n in 0..5 {
            assert_eq!(g.degree(n), 4);
        }
        assert!(!square().with_max_weight(1.0).is_complete());
    }

    #[test]
    fn test_distinct_weights_sorted() {
        let g = Graph::new(3, [(0, 1, 3.0), (1, 2, 1.0), (0, 2, 3.0)]).unwrap();
        assert_eq!(g.distinct_weights(), vec![1.0, 3.0]);
    }

    #[test]
    fn test_with_max_weight_keeps_nodes() {
        let g = square().with_max_weight(1.0);
        assert_eq!(g.num_nodes(), 4);
        assert_eq!(g.num_edges(), 4);
        assert!(g.edge_between(0, 2).is_none());
        assert!(g.edge_between(1, 0).is_some());
    }

    #[test]
    fn test_boundary_edges() {
        let g = square();
        let mut boundary: Vec<(NodeId, NodeId)> = g
            .boundary_edges(&[0, 1])
            .into_iter()
            .map(|id| (g.edge(id).u, g.edge(id).v))
            .collect();
        boundary.sort();
        assert_eq!(boundary, vec![(0, 2), (0, 3), (1, 2), (1, 3)]);
        assert!(g.boundary_edges(&[0, 1, 2, 3]).is_empty());
    }

    #[test]
    fn test_neighbors() {
        let g = square();
        let mut n: Vec<NodeId> = g.neighbors(0).collect();
        n.sort();
        assert_eq!(n, vec![1, 2, 3]);
    }

    #[test]
    fn test_random_complete() {
        let mut rng = StdRng::seed_from_u64(7);
        let g = Graph::random_complete(6, 1, 9, &mut rng).unwrap();
        assert!(g.is_complete());
        assert!(g.edges().iter().all(|e| (1.0..=9.0).contains(&e.weight)));
        assert!(Graph::random_complete(3, 0, 5, &mut rng).is_err());
    }
}
