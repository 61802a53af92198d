//! Hamiltonian cycle by lazy subtour elimination.
//!
//! A boolean variable per edge, two selected edges per node, and cuts
//! that force every proper node subset to be left at least twice. The
//! first assignment that forms a single cycle is the answer; an
//! infeasible model proves no cycle exists.

mod config;
mod runner;

pub use config::HamiltonianConfig;
pub use runner::{HamiltonianOutcome, HamiltonianResult, HamiltonianSolver};
