//! LP and MIP backend on top of microlp.

use super::model::{Direction, Model, Relation};
use super::solver::{Assignment, Backend, SolveOutcome};
use super::variables::VarDomain;
use crate::error::{Error, Result};
use microlp::{ComparisonOp, OptimizationDirection, Problem};
use std::time::Duration;

/// Linear-programming engine.
///
/// In relaxation mode every variable is continuous; in integral mode
/// boolean variables are binary and microlp runs branch-and-bound.
/// Feasibility models are solved with an all-zero objective.
#[derive(Debug, Clone, Copy)]
pub struct LpBackend {
    integral: bool,
}

impl LpBackend {
    /// Continuous relaxation of every boolean variable.
    pub fn relaxation() -> Self {
        Self { integral: false }
    }

    /// Binary boolean variables.
    pub fn integral() -> Self {
        Self { integral: true }
    }
}

impl Backend for LpBackend {
    fn name(&self) -> &'static str {
        if self.integral {
            "microlp-mip"
        } else {
            "microlp-lp"
        }
    }

    fn solve(&self, model: &Model, _time_limit: Option<Duration>) -> Result<SolveOutcome> {
        let mut coefficients = vec![0.0; model.num_vars()];
        let direction = match model.objective() {
            Some(objective) => {
                for &(v, c) in &objective.terms {
                    coefficients[v.index()] += c;
                }
                objective.direction
            }
            None => Direction::Minimize,
        };

        if model.num_vars() == 0 {
            let trivially_ok = model.constraints().iter().all(|c| {
                let (_, relation, bound) = c.linear_form();
                relation.holds(0.0, bound, 0.0)
            });
            return Ok(if trivially_ok {
                SolveOutcome::Optimal {
                    assignment: Assignment::new(Vec::new()),
                    objective: 0.0,
                }
            } else {
                SolveOutcome::Infeasible
            });
        }

        let mut problem = Problem::new(match direction {
            Direction::Minimize => OptimizationDirection::Minimize,
            Direction::Maximize => OptimizationDirection::Maximize,
        });

        let vars: Vec<microlp::Variable> = model
            .domains()
            .iter()
            .zip(&coefficients)
            .map(|(domain, &c)| match *domain {
                VarDomain::Boolean if self.integral => problem.add_binary_var(c),
                VarDomain::Boolean => problem.add_var(c, (0.0, 1.0)),
                VarDomain::Continuous { lb, ub } => problem.add_var(c, (lb, ub)),
            })
            .collect();

        for constraint in model.constraints() {
            let (terms, relation, bound) = constraint.linear_form();
            if terms.is_empty() {
                // 0 <relation> bound
                if !relation.holds(0.0, bound, 0.0) {
                    return Ok(SolveOutcome::Infeasible);
                }
                continue;
            }
            let expr: Vec<(microlp::Variable, f64)> = terms
                .iter()
                .map(|&(v, c)| (vars[v.index()], c))
                .collect();
            let op = match relation {
                Relation::Le => ComparisonOp::Le,
                Relation::Eq => ComparisonOp::Eq,
                Relation::Ge => ComparisonOp::Ge,
            };
            problem.add_constraint(expr, op, bound);
        }

        match problem.solve() {
            Ok(solution) => {
                let values = model
                    .domains()
                    .iter()
                    .zip(&vars)
                    .map(|(domain, &var)| {
                        let x = solution[var];
                        if self.integral && domain.is_boolean() {
                            x.round()
                        } else {
                            x
                        }
                    })
                    .collect();
                Ok(SolveOutcome::Optimal {
                    assignment: Assignment::new(values),
                    objective: solution.objective(),
                })
            }
            Err(microlp::Error::Infeasible) => Ok(SolveOutcome::Infeasible),
            Err(microlp::Error::Unbounded) => {
                Err(Error::Model("objective is unbounded".into()))
            }
            Err(e) => Err(Error::Model(format!("microlp: {e}"))),
        }
    }
}
