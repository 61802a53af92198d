//! Oracle model definition.

use super::solver::Assignment;
use super::variables::{Literal, VarDomain, VarId};
use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// Absolute tolerance used when checking constraints against an assignment.
pub const FEASIBILITY_TOLERANCE: f64 = 1e-6;

/// Relation between the left-hand side and the bound of a linear constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// `lhs <= bound`
    Le,
    /// `lhs == bound`
    Eq,
    /// `lhs >= bound`
    Ge,
}

impl Relation {
    /// Whether `lhs <relation> bound` holds up to `tolerance`.
    pub fn holds(self, lhs: f64, bound: f64, tolerance: f64) -> bool {
        match self {
            Relation::Le => lhs <= bound + tolerance,
            Relation::Eq => (lhs - bound).abs() <= tolerance,
            Relation::Ge => lhs >= bound - tolerance,
        }
    }
}

/// Optimization direction of an objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Minimize,
    Maximize,
}

/// A constraint in the oracle model.
///
/// The model never interprets constraints beyond validating variable
/// references; semantics are the backend's business.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// `Σ coeff · var <relation> bound`.
    Linear {
        /// (variable, coefficient) pairs. Repeated variables are summed.
        terms: Vec<(VarId, f64)>,
        /// Relation to the bound.
        relation: Relation,
        /// Right-hand side.
        bound: f64,
    },

    /// At most `k` of the literals are true.
    AtMost {
        /// Literals over boolean variables.
        literals: Vec<Literal>,
        /// Maximum number of true literals.
        k: usize,
    },
}

impl Constraint {
    /// Linear form `Σ coeff · var <relation> bound` of the constraint.
    ///
    /// Repeated variables are merged and zero coefficients dropped. An
    /// at-most constraint over literals becomes
    /// `Σ x_pos - Σ x_neg <= k - |neg|`.
    pub fn linear_form(&self) -> (Vec<(VarId, f64)>, Relation, f64) {
        match self {
            Constraint::Linear {
                terms,
                relation,
                bound,
            } => (merge_terms(terms.iter().copied()), *relation, *bound),
            Constraint::AtMost { literals, k } => {
                let negated = literals.iter().filter(|l| l.negated).count();
                let terms = merge_terms(
                    literals
                        .iter()
                        .map(|l| (l.var, if l.negated { -1.0 } else { 1.0 })),
                );
                (terms, Relation::Le, *k as f64 - negated as f64)
            }
        }
    }

    /// Whether `assignment` satisfies the constraint.
    ///
    /// Both forms are checked as the linear inequality a backend enforces,
    /// so relaxed assignments are judged the same way as integral ones.
    pub fn is_satisfied_by(&self, assignment: &Assignment) -> bool {
        match self {
            Constraint::Linear {
                terms,
                relation,
                bound,
            } => {
                let lhs: f64 = terms
                    .iter()
                    .map(|&(v, c)| c * assignment.value(v))
                    .sum();
                relation.holds(lhs, *bound, FEASIBILITY_TOLERANCE)
            }
            Constraint::AtMost { literals, k } => {
                let lhs: f64 = literals.iter().map(|l| l.value(assignment)).sum();
                Relation::Le.holds(lhs, *k as f64, FEASIBILITY_TOLERANCE)
            }
        }
    }

    fn variables(&self) -> Box<dyn Iterator<Item = VarId> + '_> {
        match self {
            Constraint::Linear { terms, .. } => Box::new(terms.iter().map(|&(v, _)| v)),
            Constraint::AtMost { literals, .. } => Box::new(literals.iter().map(|l| l.var)),
        }
    }
}

/// Objective function.
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    /// (variable, coefficient) pairs.
    pub terms: Vec<(VarId, f64)>,
    /// Whether to minimize or maximize.
    pub direction: Direction,
}

impl Objective {
    /// Objective value under `assignment`.
    pub fn evaluate(&self, assignment: &Assignment) -> f64 {
        self.terms
            .iter()
            .map(|&(v, c)| c * assignment.value(v))
            .sum()
    }
}

/// The growing constraint system held by an [`Oracle`](super::Oracle).
///
/// Variables and constraints can only be added. The objective can be
/// replaced or cleared.
///
/// # Examples
///
/// ```
/// use u_lazycut::oracle::{Constraint, Literal, Model, Relation, VarDomain};
///
/// let mut model = Model::new();
/// let x = model.add_var(VarDomain::Boolean);
/// let y = model.add_var(VarDomain::Boolean);
/// model
///     .add_constraint(Constraint::AtMost {
///         literals: vec![Literal::positive(x), Literal::positive(y)],
///         k: 1,
///     })
///     .unwrap();
/// model
///     .add_constraint(Constraint::Linear {
///         terms: vec![(x, 1.0), (y, 1.0)],
///         relation: Relation::Ge,
///         bound: 1.0,
///     })
///     .unwrap();
/// assert_eq!(model.num_vars(), 2);
/// assert_eq!(model.constraint_count(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Model {
    domains: Vec<VarDomain>,
    constraints: Vec<Constraint>,
    objective: Option<Objective>,
}

impl Model {
    /// Creates an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a variable and returns its handle.
    pub fn add_var(&mut self, domain: VarDomain) -> VarId {
        let id = VarId(self.domains.len());
        self.domains.push(domain);
        id
    }

    /// Adds a constraint after checking its variable references and
    /// numeric data.
    pub fn add_constraint(&mut self, constraint: Constraint) -> Result<()> {
        self.check_constraint(&constraint)?;
        self.constraints.push(constraint);
        Ok(())
    }

    /// Sets the objective, replacing any previous one.
    pub fn set_objective(&mut self, objective: Objective) -> Result<()> {
        for &(v, c) in &objective.terms {
            self.check_var(v)?;
            if !c.is_finite() {
                return Err(Error::Model(format!("objective coefficient {c} of x{}", v.0)));
            }
        }
        self.objective = Some(objective);
        Ok(())
    }

    /// Removes the objective, turning the model into a feasibility model.
    pub fn clear_objective(&mut self) {
        self.objective = None;
    }

    /// Variable domains, indexed by [`VarId::index`].
    pub fn domains(&self) -> &[VarDomain] {
        &self.domains
    }

    /// Domain of `var`.
    pub fn domain(&self, var: VarId) -> Option<&VarDomain> {
        self.domains.get(var.0)
    }

    /// Constraints in insertion order.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Active objective, if any.
    pub fn objective(&self) -> Option<&Objective> {
        self.objective.as_ref()
    }

    /// Number of variables.
    pub fn num_vars(&self) -> usize {
        self.domains.len()
    }

    /// Number of constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Whether `assignment` satisfies every constraint and domain.
    pub fn is_satisfied_by(&self, assignment: &Assignment) -> bool {
        if assignment.len() != self.domains.len() {
            return false;
        }
        let domains_ok = self.domains.iter().enumerate().all(|(i, d)| {
            let (lb, ub) = d.bounds();
            let x = assignment.value(VarId(i));
            x >= lb - FEASIBILITY_TOLERANCE && x <= ub + FEASIBILITY_TOLERANCE
        });
        domains_ok && self.constraints.iter().all(|c| c.is_satisfied_by(assignment))
    }

    fn check_var(&self, var: VarId) -> Result<()> {
        if var.0 < self.domains.len() {
            Ok(())
        } else {
            Err(Error::Model(format!("undefined variable x{}", var.0)))
        }
    }

    fn check_constraint(&self, constraint: &Constraint) -> Result<()> {
        for var in constraint.variables() {
            self.check_var(var)?;
        }
        match constraint {
            Constraint::Linear { terms, bound, .. } => {
                if !bound.is_finite() {
                    return Err(Error::Model(format!("constraint bound {bound}")));
                }
                if let Some(&(v, c)) = terms.iter().find(|(_, c)| !c.is_finite()) {
                    return Err(Error::Model(format!("coefficient {c} of x{}", v.0)));
                }
            }
            Constraint::AtMost { literals, .. } => {
                if let Some(l) = literals.iter().find(|l| !self.domains[l.var.0].is_boolean()) {
                    return Err(Error::Model(format!(
                        "literal over non-boolean variable x{}",
                        l.var.0
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Sums coefficients of repeated variables and drops zero terms, keeping
/// the result ordered by variable.
pub(crate) fn merge_terms(terms: impl IntoIterator<Item = (VarId, f64)>) -> Vec<(VarId, f64)> {
    let mut merged: BTreeMap<VarId, f64> = BTreeMap::new();
    for (v, c) in terms {
        *merged.entry(v).or_insert(0.0) += c;
    }
    merged.into_iter().filter(|&(_, c)| c != 0.0).collect()
}
