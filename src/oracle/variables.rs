//! Oracle variable types.

use super::solver::Assignment;
use std::ops::Not;

/// Handle of a decision variable inside a [`Model`](super::Model).
///
/// Handles are dense indices in creation order and are only meaningful
/// for the model that created them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub(crate) usize);

impl VarId {
    /// Position of the variable in creation order.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Domain of a decision variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VarDomain {
    /// 0/1 variable. LP engines relax it to `[0, 1]`.
    Boolean,
    /// Real variable in `[lb, ub]`.
    Continuous {
        /// Lower bound.
        lb: f64,
        /// Upper bound.
        ub: f64,
    },
}

impl VarDomain {
    /// Whether the variable is boolean.
    pub fn is_boolean(&self) -> bool {
        matches!(self, VarDomain::Boolean)
    }

    /// Lower and upper bound of the domain.
    pub fn bounds(&self) -> (f64, f64) {
        match *self {
            VarDomain::Boolean => (0.0, 1.0),
            VarDomain::Continuous { lb, ub } => (lb, ub),
        }
    }
}

/// A boolean variable or its negation.
///
/// # Examples
///
/// ```
/// use u_lazycut::oracle::{Literal, Oracle, Engine};
///
/// let mut oracle = Oracle::new(Engine::Sat);
/// let x = oracle.new_boolean_variable();
/// let lit = Literal::positive(x);
/// assert!((!lit).negated);
/// assert_eq!(!!lit, lit);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Literal {
    /// The underlying variable.
    pub var: VarId,
    /// `true` for `¬var`.
    pub negated: bool,
}

impl Literal {
    /// The literal `var`.
    pub fn positive(var: VarId) -> Self {
        Self {
            var,
            negated: false,
        }
    }

    /// The literal `¬var`.
    pub fn negative(var: VarId) -> Self {
        Self { var, negated: true }
    }

    /// Value of the literal under `assignment`, reading the variable as
    /// true when its value is at least one half.
    pub fn is_true(&self, assignment: &Assignment) -> bool {
        (assignment.value(self.var) >= 0.5) != self.negated
    }

    /// Contribution of the literal to a linear sum: `x` or `1 - x`.
    pub fn value(&self, assignment: &Assignment) -> f64 {
        let x = assignment.value(self.var);
        if self.negated {
            1.0 - x
        } else {
            x
        }
    }
}

impl From<VarId> for Literal {
    fn from(var: VarId) -> Self {
        Literal::positive(var)
    }
}

impl Not for Literal {
    type Output = Literal;

    fn not(self) -> Literal {
        Literal {
            var: self.var,
            negated: !self.negated,
        }
    }
}
