//! Crate error type.

use crate::graph::NodeId;
use thiserror::Error;

/// Errors raised while building or solving a model.
///
/// `Infeasible` and `TimedOut` are not errors: they are reported as
/// regular outcomes by the oracle and the refinement driver.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// An edge was referenced that is not part of the graph.
    #[error("unknown edge {{{u}, {v}}}")]
    UnknownEdge { u: NodeId, v: NodeId },

    /// The oracle rejected a variable or constraint, or failed internally.
    #[error("model error: {0}")]
    Model(String),

    /// The input graph violates an assumption of the formulation.
    #[error("invalid graph: {0}")]
    InvalidGraph(String),

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
