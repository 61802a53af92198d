//! Hamiltonian-cycle search over the refinement loop.

use super::config::HamiltonianConfig;
use crate::deadline::Deadline;
use crate::error::{Error, Result};
use crate::graph::{Graph, Tour};
use crate::oracle::{Direction, Literal, Oracle, Relation};
use crate::refine::{
    CardinalityCuts, Detector, EdgeRegistry, EdgeVarKind, RefineOutcome, RefineRunner,
    RefineStep, BOOLEAN_SELECTION,
};
use log::info;
use std::time::Duration;

/// How a Hamiltonian-cycle search ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HamiltonianOutcome {
    /// A cycle through every node.
    Cycle(Tour),
    /// The graph has no Hamiltonian cycle.
    NoCycle,
    /// The budget ran out before either was proven.
    TimedOut,
}

impl HamiltonianOutcome {
    /// The cycle, if one was found.
    pub fn tour(&self) -> Option<&Tour> {
        match self {
            HamiltonianOutcome::Cycle(tour) => Some(tour),
            _ => None,
        }
    }
}

/// Result of a Hamiltonian-cycle search.
#[derive(Debug, Clone)]
pub struct HamiltonianResult {
    pub outcome: HamiltonianOutcome,

    /// Number of oracle calls.
    pub iterations: usize,

    /// Number of subtour cuts added.
    pub cuts_added: usize,

    /// Every refinement step, in order.
    pub history: Vec<RefineStep>,

    pub elapsed: Duration,
}

/// Decides whether a graph has a Hamiltonian cycle.
///
/// Each node gets "exactly two incident edges selected" as a pair of
/// cardinality constraints; connectivity is added lazily with
/// [`CardinalityCuts`]. With
/// [`minimize_weight`](HamiltonianConfig::minimize_weight) the oracle also
/// minimizes total edge weight, so the first connected answer is a
/// lightest cycle.
///
/// # Examples
///
/// ```
/// use u_lazycut::graph::Graph;
/// use u_lazycut::hamiltonian::{HamiltonianConfig, HamiltonianSolver};
///
/// // unit square with two heavy diagonals
/// let g = Graph::new(4, [
///     (0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0), (3, 0, 1.0),
///     (0, 2, 5.0), (1, 3, 5.0),
/// ]).unwrap();
/// let result = HamiltonianSolver::solve(&g, &HamiltonianConfig::default()).unwrap();
/// let tour = result.outcome.tour().unwrap();
/// assert_eq!(tour.len(), 4);
/// ```
pub struct HamiltonianSolver;

impl HamiltonianSolver {
    /// Searches with a fresh deadline from `config.time_limit`.
    pub fn solve(graph: &Graph, config: &HamiltonianConfig) -> Result<HamiltonianResult> {
        Self::solve_until(graph, config, &Deadline::new(config.time_limit))
    }

    /// Searches against an externally owned deadline.
    pub fn solve_until(
        graph: &Graph,
        config: &HamiltonianConfig,
        deadline: &Deadline,
    ) -> Result<HamiltonianResult> {
        config.validate()?;

        if graph.num_nodes() < 3 {
            return Ok(HamiltonianResult {
                outcome: HamiltonianOutcome::NoCycle,
                iterations: 0,
                cuts_added: 0,
                history: Vec::new(),
                elapsed: Duration::ZERO,
            });
        }

        let mut oracle = Oracle::new(config.engine);
        let registry = EdgeRegistry::new(graph, &mut oracle, EdgeVarKind::Boolean)?;
        add_degree_constraints(&mut oracle, &registry)?;
        if config.minimize_weight {
            oracle.set_objective(registry.weight_terms(), Direction::Minimize)?;
        }

        let refined = RefineRunner::run_until(
            &mut oracle,
            &registry,
            &Detector::cycle(),
            &CardinalityCuts,
            &config.refine_config(),
            deadline,
        )?;

        let outcome = match &refined.outcome {
            RefineOutcome::Optimal { assignment, .. } | RefineOutcome::Feasible(assignment) => {
                let selected = registry
                    .current_subgraph(assignment, BOOLEAN_SELECTION)
                    .edge_ids();
                let tour = Tour::from_edges(graph, &selected).ok_or_else(|| {
                    Error::Model("accepted assignment does not form a tour".into())
                })?;
                HamiltonianOutcome::Cycle(tour)
            }
            RefineOutcome::Infeasible => HamiltonianOutcome::NoCycle,
            RefineOutcome::TimedOut { .. } => HamiltonianOutcome::TimedOut,
        };

        info!(
            "hamiltonian search on {} nodes / {} edges: {} after {} iterations",
            graph.num_nodes(),
            graph.num_edges(),
            match &outcome {
                HamiltonianOutcome::Cycle(_) => "cycle",
                HamiltonianOutcome::NoCycle => "no cycle",
                HamiltonianOutcome::TimedOut => "timed out",
            },
            refined.iterations
        );

        Ok(HamiltonianResult {
            outcome,
            iterations: refined.iterations,
            cuts_added: refined.cuts_added(),
            history: refined.history,
            elapsed: refined.elapsed,
        })
    }
}

/// Exactly two selected edges per node: at most two selected, and at most
/// `degree - 2` unselected. A node of degree below two can never reach two.
fn add_degree_constraints(oracle: &mut Oracle, registry: &EdgeRegistry<'_>) -> Result<()> {
    for node in 0..registry.graph().num_nodes() {
        let vars = registry.incident_variables(node);
        if vars.len() < 2 {
            oracle.add_linear_constraint(
                vars.iter().map(|&v| (v, 1.0)).collect(),
                Relation::Ge,
                2.0,
            )?;
            continue;
        }
        let slack = vars.len() - 2;
        oracle.add_cardinality_at_most(vars.iter().map(|&v| Literal::positive(v)).collect(), 2)?;
        oracle.add_cardinality_at_most(
            vars.iter().map(|&v| Literal::negative(v)).collect(),
            slack,
        )?;
    }
    Ok(())
}
