//! Lazy constraint generation for graph tour problems.
//!
//! Global constraints such as "the selected edges form one connected
//! cycle" are exponentially large when written down in full. This crate
//! solves with only the local constraints, inspects each returned
//! assignment for a structural violation, and adds just the cuts that
//! assignment violates, repeating until the assignment is globally
//! feasible.
//!
//! - **Hamiltonian cycle**: boolean edge variables on a SAT (or MIP)
//!   engine, degree-2 cardinality constraints, lazy subtour cuts.
//! - **Bottleneck TSP**: binary (or sequential) search over edge-weight
//!   thresholds, each probe a Hamiltonian-cycle query.
//! - **TSP relaxation**: fractional edge variables on an LP engine,
//!   degree equalities, lazy subtour-elimination inequalities, giving a
//!   lower bound on the optimal tour (or the tour itself on a MIP engine).
//!
//! # Architecture
//!
//! The [`oracle`] module hides the solver engine behind a growing
//! [`Model`](oracle::Model) and a [`Backend`](oracle::Backend) trait.
//! [`refine`] holds the engine-independent loop: edge variable registry,
//! violation detector, cut policies and the driver. The problem modules
//! ([`hamiltonian`], [`bottleneck`], [`tsp`]) only build base models and
//! interpret outcomes.
//!
//! # Example
//!
//! ```
//! use u_lazycut::bottleneck::{BottleneckConfig, BottleneckSolver};
//! use u_lazycut::graph::Graph;
//!
//! let g = Graph::complete(6, |u, v| ((u * 5 + v * 3) % 7 + 1) as f64).unwrap();
//! let result = BottleneckSolver::optimize(&g, &BottleneckConfig::default()).unwrap();
//! assert!(result.tour.is_some());
//! ```

pub mod bottleneck;
mod deadline;
pub mod error;
pub mod graph;
pub mod hamiltonian;
pub mod oracle;
pub mod refine;
pub mod tsp;

pub use deadline::Deadline;
pub use error::{Error, Result};
