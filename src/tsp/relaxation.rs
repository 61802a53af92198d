//! Subtour relaxation of the symmetric TSP.

use super::config::TspConfig;
use crate::error::{Error, Result};
use crate::graph::{Graph, NodeId, Tour};
use crate::oracle::{Assignment, Direction, Engine, Oracle, Relation};
use crate::refine::{
    Detector, EdgeRegistry, EdgeVarKind, RefineOutcome, RefineResult, RefineRunner, RefineStep,
    SubtourInequalities, FRACTIONAL_SELECTION,
};
use log::info;

const INTEGRALITY_TOLERANCE: f64 = 1e-6;

/// Final status of a relaxation solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TspStatus {
    /// Optimal over the degree and subtour constraints.
    Optimal,
    /// No assignment satisfies the constraints.
    Infeasible,
    /// The budget ran out; accessors report the last assignment seen.
    TimedOut,
}

/// An edge carrying a positive value in the current solution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FractionalEdge {
    pub u: NodeId,
    pub v: NodeId,
    pub x: f64,
}

/// The TSP relaxation on a complete graph.
///
/// Minimizes total weight subject to "every node has degree 2", with
/// connectivity imposed lazily through subtour-elimination inequalities.
/// With [`Engine::Lp`] the optimum is a lower bound on the tour length;
/// with [`Engine::Mip`] it is the length of an optimal tour.
///
/// # Examples
///
/// ```
/// use u_lazycut::graph::Graph;
/// use u_lazycut::tsp::{TspConfig, TspRelaxation, TspStatus};
///
/// let g = Graph::complete(5, |u, v| (u as f64 - v as f64).abs()).unwrap();
/// let mut tsp = TspRelaxation::new(&g, &TspConfig::default()).unwrap();
/// assert_eq!(tsp.solve().unwrap(), TspStatus::Optimal);
/// // the tour 0-1-2-3-4 costs 8
/// assert!(tsp.lower_bound().unwrap() <= 8.0 + 1e-6);
/// ```
#[derive(Debug)]
pub struct TspRelaxation<'g> {
    graph: &'g Graph,
    config: TspConfig,
    oracle: Oracle,
    registry: EdgeRegistry<'g>,
    result: Option<RefineResult>,
}

impl<'g> TspRelaxation<'g> {
    /// Builds the degree-constrained model on `graph`.
    ///
    /// Fails with [`Error::InvalidGraph`] unless `graph` is complete on at
    /// least three nodes.
    pub fn new(graph: &'g Graph, config: &TspConfig) -> Result<Self> {
        config.validate()?;
        if graph.num_nodes() < 3 {
            return Err(Error::InvalidGraph(format!(
                "a tour needs at least 3 nodes, got {}",
                graph.num_nodes()
            )));
        }
        if !graph.is_complete() {
            return Err(Error::InvalidGraph(format!(
                "expected a complete graph on {} nodes, found {} edges",
                graph.num_nodes(),
                graph.num_edges()
            )));
        }

        let kind = match config.engine {
            Engine::Lp => EdgeVarKind::Fractional,
            _ => EdgeVarKind::Boolean,
        };
        let mut oracle = Oracle::new(config.engine);
        let registry = EdgeRegistry::new(graph, &mut oracle, kind)?;
        for node in 0..graph.num_nodes() {
            oracle.add_linear_constraint(
                registry
                    .incident_variables(node)
                    .into_iter()
                    .map(|v| (v, 1.0))
                    .collect(),
                Relation::Eq,
                2.0,
            )?;
        }
        oracle.set_objective(registry.weight_terms(), Direction::Minimize)?;

        Ok(Self {
            graph,
            config: config.clone(),
            oracle,
            registry,
            result: None,
        })
    }

    /// Runs the refinement loop. Cuts from earlier calls are kept.
    pub fn solve(&mut self) -> Result<TspStatus> {
        let result = RefineRunner::run(
            &mut self.oracle,
            &self.registry,
            &Detector::connectivity(),
            &SubtourInequalities,
            &self.config.refine_config(),
        )?;
        let status = match result.outcome {
            RefineOutcome::Optimal { .. } | RefineOutcome::Feasible(_) => TspStatus::Optimal,
            RefineOutcome::Infeasible => TspStatus::Infeasible,
            RefineOutcome::TimedOut { .. } => TspStatus::TimedOut,
        };
        info!(
            "tsp relaxation ({}) on {} nodes: {:?}, bound {:?}, {} cuts",
            self.oracle.engine_name(),
            self.graph.num_nodes(),
            status,
            self.oracle.bound_estimate(),
            result.cuts_added()
        );
        self.result = Some(result);
        Ok(status)
    }

    /// Best proven lower bound on the tour length.
    pub fn lower_bound(&self) -> Option<f64> {
        self.oracle.bound_estimate()
    }

    /// Objective value of the final solution, when optimal.
    pub fn objective(&self) -> Option<f64> {
        match self.result.as_ref().map(|r| &r.outcome) {
            Some(RefineOutcome::Optimal { objective, .. }) => Some(*objective),
            _ => None,
        }
    }

    /// Edges with value at least 0.01 in the final (or, after a timeout,
    /// the last) assignment.
    pub fn solution(&self) -> Vec<FractionalEdge> {
        let Some(assignment) = self.final_assignment() else {
            return Vec::new();
        };
        self.registry
            .current_subgraph(assignment, FRACTIONAL_SELECTION)
            .edges()
            .iter()
            .map(|e| FractionalEdge {
                u: e.u,
                v: e.v,
                x: e.value,
            })
            .collect()
    }

    /// The tour, when the solution is optimal and integral.
    pub fn tour(&self) -> Option<Tour> {
        let result = self.result.as_ref()?;
        let assignment = result.outcome.assignment()?;
        let support = self.registry.current_subgraph(assignment, FRACTIONAL_SELECTION);
        if support
            .edges()
            .iter()
            .any(|e| (e.value - 1.0).abs() > INTEGRALITY_TOLERANCE)
        {
            return None;
        }
        Tour::from_edges(self.graph, &support.edge_ids())
    }

    /// Oracle calls made by the last [`solve`](Self::solve).
    pub fn iterations(&self) -> usize {
        self.result.as_ref().map_or(0, |r| r.iterations)
    }

    /// Subtour cuts added by the last [`solve`](Self::solve).
    pub fn cuts_added(&self) -> usize {
        self.result.as_ref().map_or(0, |r| r.cuts_added())
    }

    /// Refinement steps of the last [`solve`](Self::solve).
    pub fn history(&self) -> &[RefineStep] {
        self.result
            .as_ref()
            .map_or(&[][..], |r| r.history.as_slice())
    }

    /// The underlying oracle and its accumulated model.
    pub fn oracle(&self) -> &Oracle {
        &self.oracle
    }

    fn final_assignment(&self) -> Option<&Assignment> {
        let result = self.result.as_ref()?;
        match &result.outcome {
            RefineOutcome::TimedOut { best, .. } => best.as_ref(),
            outcome => outcome.assignment(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Unit triangles {0,1,2} and {3,4,5}, every cross edge of weight 10.
    fn two_clusters() -> Graph {
        Graph::complete(6, |u, v| if (u < 3) == (v < 3) { 1.0 } else { 10.0 }).unwrap()
    }

    #[test]
    fn test_two_clusters_lp() {
        let g = two_clusters();
        let mut tsp = TspRelaxation::new(&g, &TspConfig::default()).unwrap();
        assert_eq!(tsp.solve().unwrap(), TspStatus::Optimal);
        assert!((tsp.objective().unwrap() - 24.0).abs() < 1e-6);
        assert!((tsp.lower_bound().unwrap() - 24.0).abs() < 1e-6);
        assert_eq!(tsp.iterations(), 2);
        assert_eq!(tsp.cuts_added(), 2);
        assert_eq!(
            tsp.history()[0].components,
            vec![vec![0, 1, 2], vec![3, 4, 5]]
        );
    }

    #[test]
    fn test_two_clusters_mip_tour() {
        let g = two_clusters();
        let config = TspConfig::default().with_engine(Engine::Mip);
        let mut tsp = TspRelaxation::new(&g, &config).unwrap();
        assert_eq!(tsp.solve().unwrap(), TspStatus::Optimal);
        let tour = tsp.tour().expect("integral optimum");
        assert!((tour.length(&g).unwrap() - 24.0).abs() < 1e-6);
        assert_eq!(tsp.solution().len(), 6);
    }

    #[test]
    fn test_solution_degrees() {
        let g = Graph::complete(7, |u, v| ((u * 7 + v * 3) % 11 + 1) as f64).unwrap();
        let mut tsp = TspRelaxation::new(&g, &TspConfig::default()).unwrap();
        assert_eq!(tsp.solve().unwrap(), TspStatus::Optimal);
        let mut degree = vec![0.0; 7];
        for e in tsp.solution() {
            assert!(e.x >= FRACTIONAL_SELECTION - 1e-9);
            degree[e.u] += e.x;
            degree[e.v] += e.x;
        }
        for d in degree {
            assert!((d - 2.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_rejects_incomplete_graph() {
        let g = Graph::new(4, [(0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0), (3, 0, 1.0)]).unwrap();
        assert!(matches!(
            TspRelaxation::new(&g, &TspConfig::default()),
            Err(Error::InvalidGraph(_))
        ));
        let tiny = Graph::complete(2, |_, _| 1.0).unwrap();
        assert!(matches!(
            TspRelaxation::new(&tiny, &TspConfig::default()),
            Err(Error::InvalidGraph(_))
        ));
    }

    #[test]
    fn test_iteration_budget_reports_partial() {
        let g = two_clusters();
        let config = TspConfig::default().with_max_iterations(1);
        let mut tsp = TspRelaxation::new(&g, &config).unwrap();
        assert_eq!(tsp.solve().unwrap(), TspStatus::TimedOut);
        assert!(tsp.objective().is_none());
        assert_eq!(tsp.solution().len(), 6);
        assert!((tsp.lower_bound().unwrap() - 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_unsolved_accessors() {
        let g = two_clusters();
        let tsp = TspRelaxation::new(&g, &TspConfig::default()).unwrap();
        assert!(tsp.solution().is_empty());
        assert!(tsp.tour().is_none());
        assert_eq!(tsp.iterations(), 0);
        assert!(tsp.lower_bound().is_none());
    }
}
