//! SAT backend on top of splr.
//!
//! Boolean models are translated to CNF on every call. Cardinality
//! constraints use the sequential counter encoding; linear constraints are
//! accepted when every coefficient is one, which makes them cardinality
//! constraints in disguise.
//!
//! # References
//!
//! Sinz (2005), "Towards an Optimal CNF Encoding of Boolean Cardinality
//! Constraints"

use super::model::{merge_terms, Constraint, Model, Relation};
use super::solver::{Assignment, Backend, SolveOutcome};
use super::variables::Literal;
use crate::error::{Error, Result};
use splr::{Certificate, Config, SolveIF, Solver, SolverError};
use std::sync::Mutex;
use std::time::Duration;

/// splr is not re-entrant across threads; calls are serialized.
static SPLR: Mutex<()> = Mutex::new(());

/// Feasibility-only SAT engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct SatBackend;

impl SatBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Backend for SatBackend {
    fn name(&self) -> &'static str {
        "splr"
    }

    fn solve(&self, model: &Model, time_limit: Option<Duration>) -> Result<SolveOutcome> {
        if model.objective().is_some_and(|o| !o.terms.is_empty()) {
            return Err(Error::Model(
                "the SAT engine solves feasibility models only".into(),
            ));
        }
        if let Some(i) = model.domains().iter().position(|d| !d.is_boolean()) {
            return Err(Error::Model(format!(
                "the SAT engine cannot represent continuous variable x{i}"
            )));
        }

        let num_vars = model.num_vars();
        let mut cnf = CnfBuilder::new(num_vars);
        for constraint in model.constraints() {
            cnf.add(constraint)?;
        }

        if cnf.unsatisfiable {
            return Ok(SolveOutcome::Infeasible);
        }
        if cnf.clauses.is_empty() {
            return Ok(SolveOutcome::Feasible(Assignment::new(vec![0.0; num_vars])));
        }

        let config = Config {
            c_timeout: splr_timeout(time_limit),
            ..Config::default()
        };
        let result = {
            let _guard = SPLR.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            match Solver::try_from((config, cnf.clauses.as_slice())) {
                Ok(mut solver) => solver.solve(),
                Err(Ok(certificate)) => Ok(certificate),
                Err(Err(SolverError::EmptyClause)) => Ok(Certificate::UNSAT),
                Err(Err(e)) => Err(e),
            }
        };

        outcome_from(result, num_vars)
    }
}

/// splr compares its budget in whole seconds, so partial seconds round up.
fn splr_timeout(time_limit: Option<Duration>) -> f64 {
    match time_limit {
        Some(limit) => limit.as_secs_f64().ceil().max(1.0),
        None => Config::default().c_timeout,
    }
}

/// Maps a splr result onto the model variables `1..=num_vars`; auxiliary
/// encoding variables are dropped.
fn outcome_from(
    result: std::result::Result<Certificate, SolverError>,
    num_vars: usize,
) -> Result<SolveOutcome> {
    match result {
        Ok(Certificate::SAT(literals)) => {
            let mut values = vec![0.0; num_vars];
            for lit in literals {
                let var = lit.unsigned_abs() as usize;
                if lit > 0 && var <= num_vars {
                    values[var - 1] = 1.0;
                }
            }
            Ok(SolveOutcome::Feasible(Assignment::new(values)))
        }
        Ok(Certificate::UNSAT) => Ok(SolveOutcome::Infeasible),
        Err(SolverError::TimeOut) => Ok(SolveOutcome::TimedOut),
        Err(e) => Err(Error::Model(format!("splr: {e:?}"))),
    }
}

/// Incremental CNF construction with auxiliary variables numbered after
/// the model variables.
struct CnfBuilder {
    clauses: Vec<Vec<i32>>,
    next_var: i32,
    unsatisfiable: bool,
}

impl CnfBuilder {
    fn new(num_vars: usize) -> Self {
        Self {
            clauses: Vec::new(),
            next_var: num_vars as i32 + 1,
            unsatisfiable: false,
        }
    }

    fn fresh(&mut self) -> i32 {
        let v = self.next_var;
        self.next_var += 1;
        v
    }

    fn add(&mut self, constraint: &Constraint) -> Result<()> {
        match constraint {
            Constraint::AtMost { literals, k } => {
                let lits: Vec<i32> = literals.iter().map(dimacs).collect();
                self.at_most(&lits, *k);
            }
            Constraint::Linear {
                terms,
                relation,
                bound,
            } => {
                let merged = merge_terms(terms.iter().copied());
                if let Some(&(v, c)) = merged.iter().find(|&&(_, c)| c != 1.0) {
                    return Err(Error::Model(format!(
                        "the SAT engine needs unit coefficients, got {c} on x{}",
                        v.index()
                    )));
                }
                let lits: Vec<i32> = merged
                    .iter()
                    .map(|&(v, _)| dimacs(&Literal::positive(v)))
                    .collect();
                match relation {
                    Relation::Le => self.at_most_signed(&lits, bound.floor()),
                    Relation::Ge => self.at_least(&lits, bound.ceil()),
                    Relation::Eq => {
                        if bound.fract() != 0.0 {
                            self.unsatisfiable = true;
                        } else {
                            self.at_most_signed(&lits, *bound);
                            self.at_least(&lits, *bound);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn at_most_signed(&mut self, lits: &[i32], k: f64) {
        if k < 0.0 {
            self.unsatisfiable = true;
        } else {
            self.at_most(lits, k as usize);
        }
    }

    fn at_least(&mut self, lits: &[i32], k: f64) {
        if k <= 0.0 {
            return;
        }
        let k = k as usize;
        if k > lits.len() {
            self.unsatisfiable = true;
            return;
        }
        let negated: Vec<i32> = lits.iter().map(|l| -l).collect();
        self.at_most(&negated, lits.len() - k);
    }

    /// Sequential counter: `s[i][j]` holds when at least `j + 1` of the
    /// first `i + 1` literals are true.
    fn at_most(&mut self, lits: &[i32], k: usize) {
        let n = lits.len();
        if k >= n {
            return;
        }
        if k == 0 {
            for &l in lits {
                self.clauses.push(vec![-l]);
            }
            return;
        }

        let s: Vec<Vec<i32>> = (0..n - 1)
            .map(|_| (0..k).map(|_| self.fresh()).collect())
            .collect();

        self.clauses.push(vec![-lits[0], s[0][0]]);
        for j in 1..k {
            self.clauses.push(vec![-s[0][j]]);
        }
        for i in 1..n - 1 {
            self.clauses.push(vec![-lits[i], s[i][0]]);
            self.clauses.push(vec![-s[i - 1][0], s[i][0]]);
            for j in 1..k {
                self.clauses.push(vec![-lits[i], -s[i - 1][j - 1], s[i][j]]);
                self.clauses.push(vec![-s[i - 1][j], s[i][j]]);
            }
            self.clauses.push(vec![-lits[i], -s[i - 1][k - 1]]);
        }
        self.clauses.push(vec![-lits[n - 1], -s[n - 2][k - 1]]);
    }
}

fn dimacs(lit: &Literal) -> i32 {
    let v = lit.var.index() as i32 + 1;
    if lit.negated {
        -v
    } else {
        v
    }
}
