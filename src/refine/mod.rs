//! Lazy constraint refinement.
//!
//! Solves a model that carries only local (degree) constraints, inspects
//! the returned assignment for a global structural violation (more than
//! one connected component) and adds a cut per offending component until
//! the assignment is globally feasible, the model becomes infeasible or
//! the budget runs out. Exponentially many subtour constraints are never
//! written down up front; only those a solution actually violates are.
//!
//! The pieces:
//!
//! - [`EdgeRegistry`]: one oracle variable per graph edge
//! - [`Detector`]: connectivity (and degree) check of an induced subgraph
//! - [`CutPolicy`]: [`CardinalityCuts`] for boolean engines,
//!   [`SubtourInequalities`] for LP engines
//! - [`RefineRunner`]: the Solving → Checking → Refining loop
//!
//! # References
//!
//! - Dantzig, Fulkerson & Johnson (1954), "Solution of a Large-Scale
//!   Traveling-Salesman Problem"
//! - Padberg & Rinaldi (1991), "A Branch-and-Cut Algorithm for the
//!   Resolution of Large-Scale Symmetric Traveling Salesman Problems"

mod config;
mod cuts;
mod detector;
mod registry;
mod runner;

pub use config::RefineConfig;
pub use cuts::{CardinalityCuts, Cut, CutForm, CutPolicy, SubtourInequalities};
pub use detector::{connected_components, Detector, Verdict};
pub use registry::{
    EdgeRegistry, EdgeVarKind, InducedSubgraph, SelectedEdge, BOOLEAN_SELECTION,
    FRACTIONAL_SELECTION,
};
pub use runner::{RefineOutcome, RefineResult, RefineRunner, RefineStep};
