//! Solver oracles.
//!
//! A uniform front end over external combinatorial engines. Callers build
//! a model through an [`Oracle`] (variables, linear and cardinality
//! constraints, an optional objective), call [`Oracle::solve`] and read
//! back an [`Assignment`]. The oracle never interprets the constraints it
//! stores.
//!
//! # Key Components
//!
//! - **Variables**: [`VarId`], [`VarDomain`], [`Literal`]
//! - **Model**: [`Model`], [`Constraint`], [`Objective`]: growing
//!   constraint store
//! - **Adapter**: [`Oracle`]: model plus backend, with bound tracking
//! - **Backends**: [`Backend`] trait; [`Engine`] selects one of
//!   - `Sat`: splr CDCL solver (boolean feasibility)
//!   - `Lp`: microlp simplex over the continuous relaxation
//!   - `Mip`: microlp branch-and-bound with binary variables
//!
//! Backends cannot be interrupted mid-call. Time budgets are enforced by
//! the caller between calls; a zero budget reports
//! [`SolveOutcome::TimedOut`] immediately.

mod lp;
mod model;
mod sat;
mod solver;
mod variables;

pub use lp::LpBackend;
pub use model::{Constraint, Direction, Model, Objective, Relation, FEASIBILITY_TOLERANCE};
pub use sat::SatBackend;
pub use solver::{Assignment, Backend, Engine, Oracle, SolveOutcome};
pub use variables::{Literal, VarDomain, VarId};
