//! Structural-violation detection on induced subgraphs.

use super::registry::InducedSubgraph;
use crate::graph::{Graph, NodeId};
use std::collections::VecDeque;

/// Result of inspecting an induced subgraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// One component spanning every node, with the required degrees.
    Feasible,
    /// Every connected component, isolated nodes included.
    Violation { components: Vec<Vec<NodeId>> },
}

/// Classifies induced subgraphs as globally feasible or violating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detector {
    required_degree: Option<usize>,
}

impl Detector {
    /// Connectivity plus an exact degree on every node.
    pub fn new(required_degree: Option<usize>) -> Self {
        Self { required_degree }
    }

    /// Cycle formulations: connected, every node of degree 2.
    pub fn cycle() -> Self {
        Self::new(Some(2))
    }

    /// Relaxed formulations: connectivity of the support only.
    pub fn connectivity() -> Self {
        Self::new(None)
    }

    /// Inspects `induced` against the node set of `graph`.
    pub fn check(&self, graph: &Graph, induced: &InducedSubgraph) -> Verdict {
        let components = connected_components(
            graph.num_nodes(),
            induced.edges().iter().map(|e| (e.u, e.v)),
        );

        let spanning = components.len() == 1 && components[0].len() == graph.num_nodes();
        let degrees_ok = self
            .required_degree
            .is_none_or(|d| (0..graph.num_nodes()).all(|n| induced.degree(n) == d));

        if spanning && degrees_ok {
            Verdict::Feasible
        } else {
            Verdict::Violation { components }
        }
    }
}

/// Connected components of the graph on `0..num_nodes` with the given
/// edges.
///
/// Components are ordered by their smallest node and list their nodes in
/// ascending order. Isolated nodes form singleton components.
pub fn connected_components<I>(num_nodes: usize, edges: I) -> Vec<Vec<NodeId>>
where
    I: IntoIterator<Item = (NodeId, NodeId)>,
{
    let mut adjacent: Vec<Vec<NodeId>> = vec![Vec::new(); num_nodes];
    for (u, v) in edges {
        adjacent[u].push(v);
        adjacent[v].push(u);
    }

    let mut seen = vec![false; num_nodes];
    let mut components = Vec::new();
    let mut queue = VecDeque::new();
    for root in 0..num_nodes {
        if seen[root] {
            continue;
        }
        seen[root] = true;
        queue.push_back(root);
        let mut component = Vec::new();
        while let Some(n) = queue.pop_front() {
            component.push(n);
            for &m in &adjacent[n] {
                if !seen[m] {
                    seen[m] = true;
                    queue.push_back(m);
                }
            }
        }
        component.sort_unstable();
        components.push(component);
    }
    components
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::{Assignment, Engine, Oracle};
    use crate::refine::registry::{EdgeRegistry, EdgeVarKind, BOOLEAN_SELECTION};

    fn induced(g: &Graph, selected: &[(NodeId, NodeId)]) -> InducedSubgraph {
        let mut oracle = Oracle::new(Engine::Sat);
        let reg = EdgeRegistry::new(g, &mut oracle, EdgeVarKind::Boolean).unwrap();
        let mut values = vec![0.0; g.num_edges()];
        for &(a, b) in selected {
            values[reg.variable_for(a, b).unwrap().index()] = 1.0;
        }
        reg.current_subgraph(&Assignment::new(values), BOOLEAN_SELECTION)
    }

    #[test]
    fn test_components_with_isolated_nodes() {
        let comps = connected_components(6, [(0, 2), (2, 4), (3, 5)]);
        assert_eq!(comps, vec![vec![0, 2, 4], vec![1], vec![3, 5]]);
    }

    #[test]
    fn test_hamiltonian_cycle_is_feasible() {
        let g = Graph::complete(4, |_, _| 1.0).unwrap();
        let sub = induced(&g, &[(0, 1), (1, 2), (2, 3), (3, 0)]);
        assert_eq!(Detector::cycle().check(&g, &sub), Verdict::Feasible);
    }

    #[test]
    fn test_two_triangles_violate() {
        let g = Graph::complete(6, |_, _| 1.0).unwrap();
        let sub = induced(&g, &[(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3)]);
        assert_eq!(
            Detector::cycle().check(&g, &sub),
            Verdict::Violation {
                components: vec![vec![0, 1, 2], vec![3, 4, 5]]
            }
        );
    }

    #[test]
    fn test_degree_checked_only_when_required() {
        // spanning path: connected, but endpoints have degree 1
        let g = Graph::complete(4, |_, _| 1.0).unwrap();
        let sub = induced(&g, &[(0, 1), (1, 2), (2, 3)]);
        assert!(matches!(
            Detector::cycle().check(&g, &sub),
            Verdict::Violation { components } if components.len() == 1
        ));
        assert_eq!(Detector::connectivity().check(&g, &sub), Verdict::Feasible);
    }

    #[test]
    fn test_empty_selection() {
        let g = Graph::complete(3, |_, _| 1.0).unwrap();
        let sub = induced(&g, &[]);
        match Detector::connectivity().check(&g, &sub) {
            Verdict::Violation { components } => assert_eq!(components.len(), 3),
            Verdict::Feasible => panic!("empty selection cannot span"),
        }
    }
}
