//! Bottleneck traveling salesman.
//!
//! Minimizes the heaviest edge of a Hamiltonian cycle by searching over
//! edge-weight thresholds, each probe being a Hamiltonian-cycle query on
//! the edges no heavier than the threshold. All probes share one
//! wall-clock budget.
//!
//! # References
//!
//! - Gilmore & Gomory (1964), "Sequencing a One State-Variable Machine"
//! - Parker & Rardin (1984), "Guaranteed Performance Heuristics for the
//!   Bottleneck Traveling Salesman Problem"

mod config;
mod runner;

pub use config::{BottleneckConfig, SearchStrategy};
pub use runner::{BottleneckResult, BottleneckSolver, Probe};
