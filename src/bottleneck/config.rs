//! Bottleneck search configuration.

use crate::error::{Error, Result};
use crate::hamiltonian::HamiltonianConfig;
use crate::oracle::Engine;
use std::time::Duration;

/// Order in which edge-weight thresholds are probed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchStrategy {
    /// Bisect the sorted distinct weights.
    #[default]
    BinarySearch,
    /// Try thresholds from the smallest weight upward; the first feasible
    /// one is optimal.
    SequentialUp,
    /// Start from the full graph and repeatedly demand a tour strictly
    /// below the current tour's bottleneck.
    SequentialDown,
}

/// Configuration for [`BottleneckSolver`](super::BottleneckSolver).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use u_lazycut::bottleneck::{BottleneckConfig, SearchStrategy};
///
/// let config = BottleneckConfig::default()
///     .with_strategy(SearchStrategy::SequentialDown)
///     .with_time_limit(Duration::from_secs(60));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct BottleneckConfig {
    pub strategy: SearchStrategy,

    /// Engine for the Hamiltonian probes.
    pub engine: Engine,

    /// Wall-clock budget shared by every probe. `None` = no limit.
    pub time_limit: Option<Duration>,

    /// Oracle-call limit per probe. 0 = no limit.
    pub max_iterations: usize,
}

impl Default for BottleneckConfig {
    fn default() -> Self {
        Self {
            strategy: SearchStrategy::BinarySearch,
            engine: Engine::Sat,
            time_limit: None,
            max_iterations: 0,
        }
    }
}

impl BottleneckConfig {
    pub fn with_strategy(mut self, strategy: SearchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_engine(mut self, engine: Engine) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        self.probe_config().validate().map_err(|e| match e {
            Error::InvalidConfig(msg) => Error::InvalidConfig(format!("bottleneck probe: {msg}")),
            other => other,
        })
    }

    /// Per-probe configuration. The time limit is enforced through the
    /// shared deadline instead.
    pub(crate) fn probe_config(&self) -> HamiltonianConfig {
        HamiltonianConfig::default()
            .with_engine(self.engine)
            .with_max_iterations(self.max_iterations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let config = BottleneckConfig::default();
        assert_eq!(config.strategy, SearchStrategy::BinarySearch);
        assert_eq!(config.engine, Engine::Sat);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_relaxed_engine_rejected() {
        let err = BottleneckConfig::default()
            .with_engine(Engine::Lp)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("bottleneck probe"));
    }
}
