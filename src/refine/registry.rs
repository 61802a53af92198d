//! Edge decision variables.

use crate::error::{Error, Result};
use crate::graph::{EdgeId, Graph, NodeId, Tour};
use crate::oracle::{Assignment, Oracle, VarId};

/// Selection threshold for boolean edge variables.
pub const BOOLEAN_SELECTION: f64 = 1.0;

/// Selection threshold for "edge used at all" in a relaxed solution.
pub const FRACTIONAL_SELECTION: f64 = 0.01;

const SELECTION_SLACK: f64 = 1e-6;

/// Domain of the per-edge variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeVarKind {
    /// Selected or not.
    Boolean,
    /// Fraction of the edge used, in `[0, 1]`.
    Fractional,
}

/// One decision variable per edge of a graph.
///
/// Variables are created in [`EdgeId`] order when the registry is built
/// and never change afterwards. Lookups accept either orientation.
#[derive(Debug, Clone)]
pub struct EdgeRegistry<'g> {
    graph: &'g Graph,
    vars: Vec<VarId>,
    kind: EdgeVarKind,
}

impl<'g> EdgeRegistry<'g> {
    /// Creates one variable per edge of `graph` in `oracle`.
    pub fn new(graph: &'g Graph, oracle: &mut Oracle, kind: EdgeVarKind) -> Result<Self> {
        let vars = (0..graph.num_edges())
            .map(|_| match kind {
                EdgeVarKind::Boolean => Ok(oracle.new_boolean_variable()),
                EdgeVarKind::Fractional => oracle.new_continuous_variable(0.0, 1.0),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { graph, vars, kind })
    }

    /// The graph the variables belong to.
    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    /// Domain of the edge variables.
    pub fn kind(&self) -> EdgeVarKind {
        self.kind
    }

    /// Variable of edge `{u, v}`, in either orientation.
    pub fn variable_for(&self, u: NodeId, v: NodeId) -> Result<VarId> {
        self.graph
            .edge_between(u, v)
            .map(|id| self.vars[id])
            .ok_or(Error::UnknownEdge { u, v })
    }

    /// Variable of edge `id`.
    pub fn variable(&self, id: EdgeId) -> VarId {
        self.vars[id]
    }

    /// `(edge, variable)` pairs in edge order.
    pub fn variables(&self) -> impl Iterator<Item = (EdgeId, VarId)> + '_ {
        self.vars.iter().copied().enumerate()
    }

    /// Variables of the edges touching `node`, in incident-edge order.
    pub fn incident_variables(&self, node: NodeId) -> Vec<VarId> {
        self.graph
            .incident_edges(node)
            .iter()
            .map(|&id| self.vars[id])
            .collect()
    }

    /// `(edge, variable)` pairs of the edges with exactly one endpoint in
    /// `nodes`.
    pub fn boundary_variables(&self, nodes: &[NodeId]) -> Vec<(EdgeId, VarId)> {
        self.graph
            .boundary_edges(nodes)
            .into_iter()
            .map(|id| (id, self.vars[id]))
            .collect()
    }

    /// `(variable, weight)` terms of the total edge weight.
    pub fn weight_terms(&self) -> Vec<(VarId, f64)> {
        self.graph
            .edges()
            .iter()
            .zip(&self.vars)
            .map(|(e, &v)| (v, e.weight))
            .collect()
    }

    /// Edges whose value in `assignment` reaches `threshold`.
    pub fn current_subgraph(&self, assignment: &Assignment, threshold: f64) -> InducedSubgraph {
        let mut degree = vec![0; self.graph.num_nodes()];
        let mut edges = Vec::new();
        for (id, &var) in self.vars.iter().enumerate() {
            let value = assignment.value(var);
            if value >= threshold - SELECTION_SLACK {
                let e = self.graph.edge(id);
                degree[e.u] += 1;
                degree[e.v] += 1;
                edges.push(SelectedEdge {
                    id,
                    u: e.u,
                    v: e.v,
                    value,
                });
            }
        }
        InducedSubgraph { degree, edges }
    }

    /// Assignment selecting exactly the edges of `tour`, sized for a model
    /// with `num_vars` variables (extra variables are zero).
    pub fn tour_assignment(&self, tour: &Tour, num_vars: usize) -> Result<Assignment> {
        let mut values = vec![0.0; num_vars];
        for (a, b) in tour.edges() {
            values[self.variable_for(a, b)?.index()] = 1.0;
        }
        Ok(Assignment::new(values))
    }
}

/// An edge of an [`InducedSubgraph`] with its variable value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectedEdge {
    pub id: EdgeId,
    pub u: NodeId,
    pub v: NodeId,
    pub value: f64,
}

/// The selected edges of one assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct InducedSubgraph {
    degree: Vec<usize>,
    edges: Vec<SelectedEdge>,
}

impl InducedSubgraph {
    /// Number of nodes of the underlying graph.
    pub fn num_nodes(&self) -> usize {
        self.degree.len()
    }

    /// Selected edges in edge order.
    pub fn edges(&self) -> &[SelectedEdge] {
        &self.edges
    }

    /// Ids of the selected edges.
    pub fn edge_ids(&self) -> Vec<EdgeId> {
        self.edges.iter().map(|e| e.id).collect()
    }

    /// Number of selected edges touching `node`.
    pub fn degree(&self, node: NodeId) -> usize {
        self.degree[node]
    }

    /// Number of selected edges.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether no edge is selected.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::Engine;

    fn triangle_plus_pendant() -> Graph {
        Graph::new(4, [(0, 1, 1.0), (1, 2, 1.0), (2, 0, 1.0), (2, 3, 2.0)]).unwrap()
    }

    #[test]
    fn test_variable_for_either_orientation() {
        let g = triangle_plus_pendant();
        let mut oracle = Oracle::new(Engine::Sat);
        let reg = EdgeRegistry::new(&g, &mut oracle, EdgeVarKind::Boolean).unwrap();
        assert_eq!(oracle.model().num_vars(), 4);
        assert_eq!(reg.variable_for(3, 2).unwrap(), reg.variable_for(2, 3).unwrap());
        assert_eq!(reg.variable_for(0, 3), Err(Error::UnknownEdge { u: 0, v: 3 }));
    }

    #[test]
    fn test_incident_variables_order() {
        let g = triangle_plus_pendant();
        let mut oracle = Oracle::new(Engine::Sat);
        let reg = EdgeRegistry::new(&g, &mut oracle, EdgeVarKind::Boolean).unwrap();
        let expected: Vec<VarId> = g.incident_edges(2).iter().map(|&id| reg.variable(id)).collect();
        assert_eq!(reg.incident_variables(2), expected);
        assert_eq!(reg.incident_variables(3).len(), 1);
    }

    #[test]
    fn test_fractional_variables() {
        let g = triangle_plus_pendant();
        let mut oracle = Oracle::new(Engine::Lp);
        let reg = EdgeRegistry::new(&g, &mut oracle, EdgeVarKind::Fractional).unwrap();
        assert_eq!(reg.kind(), EdgeVarKind::Fractional);
        assert!(oracle
            .model()
            .domains()
            .iter()
            .all(|d| d.bounds() == (0.0, 1.0) && !d.is_boolean()));
    }

    #[test]
    fn test_current_subgraph_threshold() {
        let g = triangle_plus_pendant();
        let mut oracle = Oracle::new(Engine::Lp);
        let reg = EdgeRegistry::new(&g, &mut oracle, EdgeVarKind::Fractional).unwrap();
        let mut values = vec![0.0; 4];
        values[reg.variable_for(0, 1).unwrap().index()] = 1.0;
        values[reg.variable_for(1, 2).unwrap().index()] = 0.5;
        values[reg.variable_for(2, 3).unwrap().index()] = 0.005;
        let a = Assignment::new(values);

        let relaxed = reg.current_subgraph(&a, FRACTIONAL_SELECTION);
        assert_eq!(relaxed.len(), 2);
        assert_eq!(relaxed.degree(1), 2);
        assert_eq!(relaxed.degree(3), 0);

        let strict = reg.current_subgraph(&a, BOOLEAN_SELECTION);
        assert_eq!(strict.edge_ids(), vec![g.edge_between(0, 1).unwrap()]);
    }

    #[test]
    fn test_boundary_variables() {
        let g = triangle_plus_pendant();
        let mut oracle = Oracle::new(Engine::Sat);
        let reg = EdgeRegistry::new(&g, &mut oracle, EdgeVarKind::Boolean).unwrap();
        let boundary = reg.boundary_variables(&[0, 1, 2]);
        assert_eq!(boundary.len(), 1);
        assert_eq!(boundary[0].1, reg.variable_for(2, 3).unwrap());
    }
}
