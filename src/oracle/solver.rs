//! Oracle adapter and backend interface.

use super::lp::LpBackend;
use super::model::{Constraint, Direction, Model, Objective, Relation};
use super::sat::SatBackend;
use super::variables::{Literal, VarDomain, VarId};
use crate::error::{Error, Result};
use log::{debug, warn};
use std::time::{Duration, Instant};

/// Read-only snapshot of variable values produced by a solve.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    values: Vec<f64>,
}

impl Assignment {
    /// Wraps one value per variable, in [`VarId`] order.
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Value of `var`.
    ///
    /// # Panics
    /// Panics if `var` does not belong to the model that produced this
    /// assignment.
    pub fn value(&self, var: VarId) -> f64 {
        self.values[var.index()]
    }

    /// All values in [`VarId`] order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of variables covered.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the assignment covers no variables.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Result of a single oracle call.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
    /// Proven optimal assignment with its objective value.
    Optimal {
        assignment: Assignment,
        objective: f64,
    },
    /// Assignment satisfying every constraint, optimality not claimed.
    Feasible(Assignment),
    /// No assignment satisfies the constraints.
    Infeasible,
    /// The time budget ran out before the oracle finished.
    TimedOut,
}

impl SolveOutcome {
    /// The assignment, if one was found.
    pub fn assignment(&self) -> Option<&Assignment> {
        match self {
            SolveOutcome::Optimal { assignment, .. } | SolveOutcome::Feasible(assignment) => {
                Some(assignment)
            }
            SolveOutcome::Infeasible | SolveOutcome::TimedOut => None,
        }
    }

    /// Whether an assignment was found.
    pub fn is_solution_found(&self) -> bool {
        self.assignment().is_some()
    }
}

/// A combinatorial engine that can solve a [`Model`].
///
/// Backends are stateless translators: every call receives the full
/// model. Implementations wrap an external solver crate.
pub trait Backend: Send {
    /// Short engine name used in log output.
    fn name(&self) -> &'static str;

    /// Solves `model`, giving up once `time_limit` has elapsed if the
    /// engine supports interruption.
    fn solve(&self, model: &Model, time_limit: Option<Duration>) -> Result<SolveOutcome>;
}

/// Available backend engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    /// CDCL SAT solver (splr). Boolean variables, feasibility only.
    Sat,
    /// Simplex LP solver (microlp); boolean variables relaxed to `[0, 1]`.
    Lp,
    /// Branch-and-bound MIP solver (microlp); boolean variables are binary.
    Mip,
}

impl Engine {
    /// Creates the backend implementing this engine.
    pub fn backend(self) -> Box<dyn Backend> {
        match self {
            Engine::Sat => Box::new(SatBackend::new()),
            Engine::Lp => Box::new(LpBackend::relaxation()),
            Engine::Mip => Box::new(LpBackend::integral()),
        }
    }

    /// Whether assignments of boolean variables are always integral.
    pub fn is_integral(self) -> bool {
        !matches!(self, Engine::Lp)
    }
}

/// Passive constraint store in front of a [`Backend`].
///
/// The oracle owns the [`Model`]; callers grow it through the methods
/// below and call [`solve`](Oracle::solve) as often as needed. Nothing is
/// ever removed from the model except the objective.
///
/// # Examples
///
/// ```
/// use u_lazycut::oracle::{Engine, Literal, Oracle, Relation, SolveOutcome};
///
/// let mut oracle = Oracle::new(Engine::Sat);
/// let x = oracle.new_boolean_variable();
/// let y = oracle.new_boolean_variable();
/// oracle
///     .add_linear_constraint(vec![(x, 1.0), (y, 1.0)], Relation::Eq, 1.0)
///     .unwrap();
/// oracle
///     .add_cardinality_at_most(vec![Literal::positive(x)], 0)
///     .unwrap();
///
/// let outcome = oracle.solve(None).unwrap();
/// let assignment = outcome.assignment().unwrap();
/// assert_eq!(assignment.value(x), 0.0);
/// assert_eq!(assignment.value(y), 1.0);
/// ```
pub struct Oracle {
    model: Model,
    backend: Box<dyn Backend>,
    bound: Option<f64>,
    solves: usize,
}

impl std::fmt::Debug for Oracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Oracle")
            .field("backend", &self.backend.name())
            .field("num_vars", &self.model.num_vars())
            .field("num_constraints", &self.model.constraint_count())
            .field("bound", &self.bound)
            .finish()
    }
}

impl Oracle {
    /// Creates an oracle with an empty model for `engine`.
    pub fn new(engine: Engine) -> Self {
        Self::with_backend(engine.backend())
    }

    /// Creates an oracle over a custom backend.
    pub fn with_backend(backend: Box<dyn Backend>) -> Self {
        Self {
            model: Model::new(),
            backend,
            bound: None,
            solves: 0,
        }
    }

    /// Adds a boolean variable.
    pub fn new_boolean_variable(&mut self) -> VarId {
        self.model.add_var(VarDomain::Boolean)
    }

    /// Adds a continuous variable in `[lb, ub]`.
    pub fn new_continuous_variable(&mut self, lb: f64, ub: f64) -> Result<VarId> {
        if lb.is_nan() || ub.is_nan() || lb > ub {
            return Err(Error::Model(format!("empty variable domain [{lb}, {ub}]")));
        }
        Ok(self.model.add_var(VarDomain::Continuous { lb, ub }))
    }

    /// Adds `Σ coeff · var <relation> bound`.
    pub fn add_linear_constraint(
        &mut self,
        terms: Vec<(VarId, f64)>,
        relation: Relation,
        bound: f64,
    ) -> Result<()> {
        self.model.add_constraint(Constraint::Linear {
            terms,
            relation,
            bound,
        })
    }

    /// Adds "at most `k` of `literals` are true".
    pub fn add_cardinality_at_most(&mut self, literals: Vec<Literal>, k: usize) -> Result<()> {
        self.model.add_constraint(Constraint::AtMost { literals, k })
    }

    /// Sets the objective, replacing any previous one.
    pub fn set_objective(&mut self, terms: Vec<(VarId, f64)>, direction: Direction) -> Result<()> {
        self.model.set_objective(Objective { terms, direction })
    }

    /// Drops the objective.
    pub fn clear_objective(&mut self) {
        self.model.clear_objective();
    }

    /// Runs the backend on the current model.
    ///
    /// A `time_limit` of zero reports [`SolveOutcome::TimedOut`] without
    /// calling the backend.
    pub fn solve(&mut self, time_limit: Option<Duration>) -> Result<SolveOutcome> {
        if time_limit.is_some_and(|t| t.is_zero()) {
            return Ok(SolveOutcome::TimedOut);
        }

        let start = Instant::now();
        let outcome = self.backend.solve(&self.model, time_limit)?;
        self.solves += 1;

        debug!(
            "{} solve #{} ({} vars, {} constraints) finished in {:?}: {}",
            self.backend.name(),
            self.solves,
            self.model.num_vars(),
            self.model.constraint_count(),
            start.elapsed(),
            describe(&outcome),
        );

        match &outcome {
            SolveOutcome::Optimal { objective, .. } => self.bound = Some(*objective),
            SolveOutcome::TimedOut => {
                warn!("{} ran out of time", self.backend.name());
            }
            SolveOutcome::Feasible(_) | SolveOutcome::Infeasible => {}
        }

        Ok(outcome)
    }

    /// Best known objective bound: the objective of the last optimal
    /// solve. `None` for feasibility models or before the first solve.
    pub fn bound_estimate(&self) -> Option<f64> {
        self.bound
    }

    /// The model accumulated so far.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Name of the backend engine.
    pub fn engine_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Number of completed backend calls.
    pub fn solve_count(&self) -> usize {
        self.solves
    }
}

fn describe(outcome: &SolveOutcome) -> String {
    match outcome {
        SolveOutcome::Optimal { objective, .. } => format!("optimal, objective {objective}"),
        SolveOutcome::Feasible(_) => "feasible".into(),
        SolveOutcome::Infeasible => "infeasible".into(),
        SolveOutcome::TimedOut => "timed out".into(),
    }
}
