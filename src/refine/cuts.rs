//! Subtour-elimination cut generation.
//!
//! Every proper node subset `S` of a Hamiltonian cycle is crossed by at
//! least two tour edges: `Σ_{e ∈ δ(S)} x_e >= 2`. A connected component
//! of a violating solution has no selected boundary edge at all, so the
//! cut over its boundary excludes that solution while keeping every true
//! tour.
//!
//! # References
//!
//! Dantzig, Fulkerson & Johnson (1954), "Solution of a Large-Scale
//! Traveling-Salesman Problem"

use super::registry::EdgeRegistry;
use crate::error::Result;
use crate::graph::{EdgeId, NodeId};
use crate::oracle::{Assignment, Literal, Oracle, Relation, FEASIBILITY_TOLERANCE};

/// How a cut was handed to the oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutForm {
    /// At most `k` of the negated boundary literals are true.
    Cardinality { k: usize },
    /// Sum of boundary variables at least 2.
    Linear,
}

/// A subtour-elimination cut added to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cut {
    /// Node set whose boundary the cut constrains.
    pub component: Vec<NodeId>,
    /// Edges with exactly one endpoint in `component`.
    pub boundary: Vec<EdgeId>,
    /// Encoding used.
    pub form: CutForm,
}

impl Cut {
    /// Total value of the boundary edges under `assignment`.
    pub fn crossing(&self, registry: &EdgeRegistry<'_>, assignment: &Assignment) -> f64 {
        self.boundary
            .iter()
            .map(|&id| assignment.value(registry.variable(id)))
            .sum()
    }

    /// Whether `assignment` crosses the boundary at least twice.
    pub fn is_satisfied_by(&self, registry: &EdgeRegistry<'_>, assignment: &Assignment) -> bool {
        self.crossing(registry, assignment) >= 2.0 - FEASIBILITY_TOLERANCE
    }
}

/// Turns the components of a violating solution into cuts.
///
/// Implementations add exactly one cut per component `C` with
/// `2 <= |C| < |V|` to `oracle` and return what they added.
pub trait CutPolicy {
    /// Short policy name used in log output.
    fn name(&self) -> &'static str;

    /// Adds cuts for `components` and returns them.
    fn separate(
        &self,
        registry: &EdgeRegistry<'_>,
        components: &[Vec<NodeId>],
        oracle: &mut Oracle,
    ) -> Result<Vec<Cut>>;

    /// Whether an intermediate assignment is worth reporting when the
    /// budget runs out.
    fn keeps_partial_solutions(&self) -> bool;
}

/// Cardinality cuts over negated boundary literals, for boolean engines.
///
/// "At least two of the `b` boundary edges are selected" is the same as
/// "at most `b - 2` of them are unselected". A component with fewer than
/// two boundary edges cannot be left by any tour; it gets the linear form
/// instead, which no assignment satisfies.
#[derive(Debug, Clone, Copy, Default)]
pub struct CardinalityCuts;

impl CutPolicy for CardinalityCuts {
    fn name(&self) -> &'static str {
        "cardinality"
    }

    fn separate(
        &self,
        registry: &EdgeRegistry<'_>,
        components: &[Vec<NodeId>],
        oracle: &mut Oracle,
    ) -> Result<Vec<Cut>> {
        let mut cuts = Vec::new();
        for component in violating(components, registry.graph().num_nodes()) {
            let boundary = registry.boundary_variables(component);
            let form = if boundary.len() >= 2 {
                let k = boundary.len() - 2;
                oracle.add_cardinality_at_most(
                    boundary.iter().map(|&(_, v)| Literal::negative(v)).collect(),
                    k,
                )?;
                CutForm::Cardinality { k }
            } else {
                oracle.add_linear_constraint(
                    boundary.iter().map(|&(_, v)| (v, 1.0)).collect(),
                    Relation::Ge,
                    2.0,
                )?;
                CutForm::Linear
            };
            cuts.push(Cut {
                component: component.clone(),
                boundary: boundary.into_iter().map(|(id, _)| id).collect(),
                form,
            });
        }
        Ok(cuts)
    }

    fn keeps_partial_solutions(&self) -> bool {
        false
    }
}

/// Linear subtour-elimination inequalities, for LP engines.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubtourInequalities;

impl CutPolicy for SubtourInequalities {
    fn name(&self) -> &'static str {
        "subtour"
    }

    fn separate(
        &self,
        registry: &EdgeRegistry<'_>,
        components: &[Vec<NodeId>],
        oracle: &mut Oracle,
    ) -> Result<Vec<Cut>> {
        let mut cuts = Vec::new();
        for component in violating(components, registry.graph().num_nodes()) {
            let boundary = registry.boundary_variables(component);
            oracle.add_linear_constraint(
                boundary.iter().map(|&(_, v)| (v, 1.0)).collect(),
                Relation::Ge,
                2.0,
            )?;
            cuts.push(Cut {
                component: component.clone(),
                boundary: boundary.into_iter().map(|(id, _)| id).collect(),
                form: CutForm::Linear,
            });
        }
        Ok(cuts)
    }

    fn keeps_partial_solutions(&self) -> bool {
        true
    }
}

/// Components that can be cut: at least two nodes, not the whole graph.
fn violating(
    components: &[Vec<NodeId>],
    num_nodes: usize,
) -> impl Iterator<Item = &Vec<NodeId>> + '_ {
    components
        .iter()
        .filter(move |c| c.len() >= 2 && c.len() < num_nodes)
}
