//! Lazy-refinement execution loop.
//!
//! [`RefineRunner`] drives an explicit state machine:
//! Solving → Checking → (Refining → Solving)* → Done.

use super::config::RefineConfig;
use super::cuts::{Cut, CutPolicy};
use super::detector::{Detector, Verdict};
use super::registry::EdgeRegistry;
use crate::deadline::Deadline;
use crate::error::{Error, Result};
use crate::graph::NodeId;
use crate::oracle::{Assignment, Oracle, SolveOutcome};
use log::{debug, info};
use std::time::Duration;

/// Terminal result of a refinement run.
#[derive(Debug, Clone, PartialEq)]
pub enum RefineOutcome {
    /// Globally feasible assignment, proven optimal by the oracle.
    Optimal {
        assignment: Assignment,
        objective: f64,
    },
    /// Globally feasible assignment of a feasibility model.
    Feasible(Assignment),
    /// The model admits no assignment.
    Infeasible,
    /// The time or iteration budget ran out.
    TimedOut {
        /// Latest violating assignment, for policies that keep partial
        /// solutions.
        best: Option<Assignment>,
        /// Best objective bound reported by the oracle.
        bound: Option<f64>,
    },
}

impl RefineOutcome {
    /// The globally feasible assignment, if the run found one.
    pub fn assignment(&self) -> Option<&Assignment> {
        match self {
            RefineOutcome::Optimal { assignment, .. } | RefineOutcome::Feasible(assignment) => {
                Some(assignment)
            }
            RefineOutcome::Infeasible | RefineOutcome::TimedOut { .. } => None,
        }
    }
}

/// One Refining transition.
#[derive(Debug, Clone)]
pub struct RefineStep {
    /// Oracle call (1-based) whose assignment was refined.
    pub iteration: usize,
    /// The violating assignment.
    pub assignment: Assignment,
    /// Components of its induced subgraph.
    pub components: Vec<Vec<NodeId>>,
    /// Cuts added in response.
    pub cuts: Vec<Cut>,
    /// Model size before the cuts were added.
    pub constraints_before: usize,
    /// Model size after the cuts were added.
    pub constraints_after: usize,
}

/// Result of a refinement run.
#[derive(Debug, Clone)]
pub struct RefineResult {
    /// How the run ended.
    pub outcome: RefineOutcome,
    /// Number of oracle calls.
    pub iterations: usize,
    /// Every Refining transition, in order.
    pub history: Vec<RefineStep>,
    /// Wall-clock time spent.
    pub elapsed: Duration,
}

impl RefineResult {
    /// Total number of cuts added.
    pub fn cuts_added(&self) -> usize {
        self.history.iter().map(|s| s.cuts.len()).sum()
    }
}

enum State {
    Solving,
    Checking {
        assignment: Assignment,
        objective: Option<f64>,
    },
    Refining {
        assignment: Assignment,
        components: Vec<Vec<NodeId>>,
    },
    Done(RefineOutcome),
}

/// Executes the lazy-refinement loop.
///
/// The oracle must already hold the base model (edge variables from
/// `registry`, degree constraints, objective). Cuts are only ever added.
///
/// # Usage
///
/// ```ignore
/// let mut oracle = Oracle::new(Engine::Sat);
/// let registry = EdgeRegistry::new(&graph, &mut oracle, EdgeVarKind::Boolean)?;
/// // ... degree constraints ...
/// let result = RefineRunner::run(
///     &mut oracle, &registry, &Detector::cycle(), &CardinalityCuts, &RefineConfig::default(),
/// )?;
/// ```
pub struct RefineRunner;

impl RefineRunner {
    /// Runs the loop with a fresh deadline from `config.time_limit`.
    pub fn run(
        oracle: &mut Oracle,
        registry: &EdgeRegistry<'_>,
        detector: &Detector,
        policy: &dyn CutPolicy,
        config: &RefineConfig,
    ) -> Result<RefineResult> {
        let deadline = Deadline::new(config.time_limit);
        Self::run_until(oracle, registry, detector, policy, config, &deadline)
    }

    /// Runs the loop against an externally owned deadline;
    /// `config.time_limit` is ignored.
    pub fn run_until(
        oracle: &mut Oracle,
        registry: &EdgeRegistry<'_>,
        detector: &Detector,
        policy: &dyn CutPolicy,
        config: &RefineConfig,
        deadline: &Deadline,
    ) -> Result<RefineResult> {
        config.validate()?;

        let started = Deadline::unlimited();
        let graph = registry.graph();
        let mut iterations = 0usize;
        let mut history: Vec<RefineStep> = Vec::new();
        let mut state = State::Solving;

        let outcome = loop {
            state = match state {
                State::Solving => {
                    let partial = || {
                        history
                            .last()
                            .filter(|_| policy.keeps_partial_solutions())
                            .map(|s| s.assignment.clone())
                    };
                    if config.max_iterations > 0 && iterations >= config.max_iterations {
                        State::Done(RefineOutcome::TimedOut {
                            best: partial(),
                            bound: oracle.bound_estimate(),
                        })
                    } else {
                        let remaining = deadline.remaining();
                        iterations += 1;
                        match oracle.solve(remaining)? {
                            SolveOutcome::Infeasible => State::Done(RefineOutcome::Infeasible),
                            SolveOutcome::TimedOut => State::Done(RefineOutcome::TimedOut {
                                best: partial(),
                                bound: oracle.bound_estimate(),
                            }),
                            SolveOutcome::Optimal {
                                assignment,
                                objective,
                            } => State::Checking {
                                assignment,
                                objective: Some(objective),
                            },
                            SolveOutcome::Feasible(assignment) => State::Checking {
                                assignment,
                                objective: None,
                            },
                        }
                    }
                }

                State::Checking {
                    assignment,
                    objective,
                } => {
                    let induced =
                        registry.current_subgraph(&assignment, config.selection_threshold);
                    match detector.check(graph, &induced) {
                        Verdict::Feasible => State::Done(match objective {
                            Some(objective) => RefineOutcome::Optimal {
                                assignment,
                                objective,
                            },
                            None => RefineOutcome::Feasible(assignment),
                        }),
                        Verdict::Violation { components } => State::Refining {
                            assignment,
                            components,
                        },
                    }
                }

                State::Refining {
                    assignment,
                    components,
                } => {
                    let constraints_before = oracle.model().constraint_count();
                    let cuts = policy.separate(registry, &components, oracle)?;
                    if cuts.is_empty() {
                        return Err(Error::Model(format!(
                            "violation with {} component(s) produced no {} cut",
                            components.len(),
                            policy.name()
                        )));
                    }
                    let constraints_after = oracle.model().constraint_count();

                    debug!(
                        "iteration {iterations}: {} components, {} {} cuts, remaining budget {:?}",
                        components.len(),
                        cuts.len(),
                        policy.name(),
                        deadline.remaining(),
                    );

                    history.push(RefineStep {
                        iteration: iterations,
                        assignment,
                        components,
                        cuts,
                        constraints_before,
                        constraints_after,
                    });
                    State::Solving
                }

                State::Done(outcome) => break outcome,
            };
        };

        let result = RefineResult {
            outcome,
            iterations,
            history,
            elapsed: started.elapsed(),
        };

        info!(
            "refinement ({} / {}) finished after {} iterations, {} cuts: {}",
            oracle.engine_name(),
            policy.name(),
            result.iterations,
            result.cuts_added(),
            match &result.outcome {
                RefineOutcome::Optimal { .. } => "optimal",
                RefineOutcome::Feasible(_) => "feasible",
                RefineOutcome::Infeasible => "infeasible",
                RefineOutcome::TimedOut { .. } => "timed out",
            }
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use crate::oracle::{Engine, Literal};
    use crate::refine::cuts::{CardinalityCuts, SubtourInequalities};
    use crate::refine::registry::EdgeVarKind;

    fn degree_two(oracle: &mut Oracle, registry: &EdgeRegistry<'_>) {
        for n in 0..registry.graph().num_nodes() {
            let vars = registry.incident_variables(n);
            let k = vars.len() - 2;
            oracle
                .add_cardinality_at_most(vars.iter().map(|&v| Literal::positive(v)).collect(), 2)
                .unwrap();
            oracle
                .add_cardinality_at_most(vars.iter().map(|&v| Literal::negative(v)).collect(), k)
                .unwrap();
        }
    }

    #[test]
    fn test_sat_loop_finds_cycle() {
        let g = Graph::complete(7, |_, _| 1.0).unwrap();
        let mut oracle = Oracle::new(Engine::Sat);
        let reg = EdgeRegistry::new(&g, &mut oracle, EdgeVarKind::Boolean).unwrap();
        degree_two(&mut oracle, &reg);

        let result = RefineRunner::run(
            &mut oracle,
            &reg,
            &Detector::cycle(),
            &CardinalityCuts,
            &RefineConfig::default(),
        )
        .unwrap();

        let assignment = result.outcome.assignment().expect("K7 is Hamiltonian");
        assert!(matches!(result.outcome, RefineOutcome::Feasible(_)));
        assert_eq!(reg.current_subgraph(assignment, 1.0).len(), 7);
        assert_eq!(result.iterations, result.history.len() + 1);
    }

    #[test]
    fn test_history_is_monotone() {
        let g = Graph::complete(8, |_, _| 1.0).unwrap();
        let mut oracle = Oracle::new(Engine::Sat);
        let reg = EdgeRegistry::new(&g, &mut oracle, EdgeVarKind::Boolean).unwrap();
        degree_two(&mut oracle, &reg);
        let base = oracle.model().constraint_count();

        let result = RefineRunner::run(
            &mut oracle,
            &reg,
            &Detector::cycle(),
            &CardinalityCuts,
            &RefineConfig::default(),
        )
        .unwrap();

        let mut expected_before = base;
        for step in &result.history {
            assert_eq!(step.constraints_before, expected_before);
            assert_eq!(step.constraints_after, step.constraints_before + step.cuts.len());
            for cut in &step.cuts {
                assert!(!cut.is_satisfied_by(&reg, &step.assignment));
            }
            expected_before = step.constraints_after;
        }
        assert_eq!(oracle.model().constraint_count(), expected_before);
    }

    /// Outer 5-cycle, inner pentagram, five spokes. Every 2-factor is a
    /// pair of 5-cycles and no Hamiltonian cycle exists.
    fn petersen() -> Graph {
        let outer = (0..5).map(|i| (i, (i + 1) % 5, 1.0));
        let spokes = (0..5).map(|i| (i, i + 5, 1.0));
        let inner = (0..5).map(|i| (5 + i, 5 + (i + 2) % 5, 1.0));
        Graph::new(10, outer.chain(spokes).chain(inner)).unwrap()
    }

    #[test]
    fn test_sat_budget_after_refining_reports_no_assignment() {
        let g = petersen();
        let mut oracle = Oracle::new(Engine::Sat);
        let reg = EdgeRegistry::new(&g, &mut oracle, EdgeVarKind::Boolean).unwrap();
        degree_two(&mut oracle, &reg);

        let config = RefineConfig::default().with_max_iterations(2);
        let result =
            RefineRunner::run(&mut oracle, &reg, &Detector::cycle(), &CardinalityCuts, &config)
                .unwrap();

        assert_eq!(
            result.outcome,
            RefineOutcome::TimedOut {
                best: None,
                bound: None
            }
        );
        assert_eq!(result.iterations, 2);
        assert_eq!(result.history.len(), 2);
        for step in &result.history {
            assert_eq!(step.components.len(), 2);
            assert!(step.components.iter().all(|c| c.len() == 5));
        }
    }

    #[test]
    fn test_zero_budget_times_out_without_solution() {
        let g = Graph::complete(5, |_, _| 1.0).unwrap();
        let mut oracle = Oracle::new(Engine::Sat);
        let reg = EdgeRegistry::new(&g, &mut oracle, EdgeVarKind::Boolean).unwrap();
        degree_two(&mut oracle, &reg);

        let config = RefineConfig::default().with_time_limit(Duration::ZERO);
        let result =
            RefineRunner::run(&mut oracle, &reg, &Detector::cycle(), &CardinalityCuts, &config)
                .unwrap();
        assert_eq!(
            result.outcome,
            RefineOutcome::TimedOut {
                best: None,
                bound: None
            }
        );
    }

    #[test]
    fn test_iteration_limit_keeps_partial_for_lp() {
        // two far-apart triangles: the first LP solution is two subtours
        let g = Graph::complete(6, |u, v| if (u < 3) == (v < 3) { 1.0 } else { 10.0 }).unwrap();
        let mut oracle = Oracle::new(Engine::Lp);
        let reg = EdgeRegistry::new(&g, &mut oracle, EdgeVarKind::Fractional).unwrap();
        for n in 0..6 {
            let terms = reg.incident_variables(n).into_iter().map(|v| (v, 1.0)).collect();
            oracle
                .add_linear_constraint(terms, crate::oracle::Relation::Eq, 2.0)
                .unwrap();
        }
        oracle
            .set_objective(reg.weight_terms(), crate::oracle::Direction::Minimize)
            .unwrap();

        let config = RefineConfig::default()
            .with_selection_threshold(crate::refine::FRACTIONAL_SELECTION)
            .with_max_iterations(1);
        let result = RefineRunner::run(
            &mut oracle,
            &reg,
            &Detector::connectivity(),
            &SubtourInequalities,
            &config,
        )
        .unwrap();

        match result.outcome {
            RefineOutcome::TimedOut { best, bound } => {
                assert!(best.is_some());
                assert!((bound.unwrap() - 6.0).abs() < 1e-6);
            }
            other => panic!("expected budget exhaustion, got {other:?}"),
        }
        assert_eq!(result.history.len(), 1);
        assert_eq!(result.history[0].components.len(), 2);
    }

    #[test]
    fn test_infeasible_model() {
        // star with four leaves: no node set admits degree two everywhere
        let g = Graph::new(5, [(0, 1, 1.0), (0, 2, 1.0), (0, 3, 1.0), (0, 4, 1.0)]).unwrap();
        let mut oracle = Oracle::new(Engine::Sat);
        let reg = EdgeRegistry::new(&g, &mut oracle, EdgeVarKind::Boolean).unwrap();
        // leaves need two incident edges but have one
        for n in 0..5 {
            let terms = reg.incident_variables(n).into_iter().map(|v| (v, 1.0)).collect();
            oracle
                .add_linear_constraint(terms, crate::oracle::Relation::Eq, 2.0)
                .unwrap();
        }
        let result = RefineRunner::run(
            &mut oracle,
            &reg,
            &Detector::cycle(),
            &CardinalityCuts,
            &RefineConfig::default(),
        )
        .unwrap();
        assert_eq!(result.outcome, RefineOutcome::Infeasible);
        assert_eq!(result.iterations, 1);
    }
}
