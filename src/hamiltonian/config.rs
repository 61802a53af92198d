//! Hamiltonian-cycle solver configuration.

use crate::error::{Error, Result};
use crate::oracle::Engine;
use crate::refine::{RefineConfig, BOOLEAN_SELECTION};
use std::time::Duration;

/// Configuration for [`HamiltonianSolver`](super::HamiltonianSolver).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use u_lazycut::hamiltonian::HamiltonianConfig;
/// use u_lazycut::oracle::Engine;
///
/// let config = HamiltonianConfig::default()
///     .with_engine(Engine::Mip)
///     .with_time_limit(Duration::from_secs(5));
/// assert!(config.validate().is_ok());
/// assert!(HamiltonianConfig::default().with_engine(Engine::Lp).validate().is_err());
/// ```
#[derive(Debug, Clone)]
pub struct HamiltonianConfig {
    /// Boolean engine answering the feasibility queries.
    pub engine: Engine,

    /// Wall-clock budget. `None` = no limit.
    pub time_limit: Option<Duration>,

    /// Maximum number of oracle calls. 0 = no limit.
    pub max_iterations: usize,

    /// Return a cycle of least total weight instead of any cycle. Needs an
    /// engine with objective support (`Engine::Mip`).
    pub minimize_weight: bool,
}

impl Default for HamiltonianConfig {
    fn default() -> Self {
        Self {
            engine: Engine::Sat,
            time_limit: None,
            max_iterations: 0,
            minimize_weight: false,
        }
    }
}

impl HamiltonianConfig {
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

    pub fn with_minimize_weight(mut self, minimize: bool) -> Self {
        self.minimize_weight = minimize;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.engine.is_integral() {
            return Err(Error::InvalidConfig(format!(
                "hamiltonian cycles need an integral engine, got {:?}",
                self.engine
            )));
        }
        if self.minimize_weight && self.engine == Engine::Sat {
            return Err(Error::InvalidConfig(
                "minimize_weight needs an engine with objective support".into(),
            ));
        }
        Ok(())
    }

    pub(crate) fn refine_config(&self) -> RefineConfig {
        let config = RefineConfig::default()
            .with_max_iterations(self.max_iterations)
            .with_selection_threshold(BOOLEAN_SELECTION);
        match self.time_limit {
            Some(limit) => config.with_time_limit(limit),
            None => config,
        }
    }
}
