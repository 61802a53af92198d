//! TSP relaxation configuration.

use crate::error::{Error, Result};
use crate::oracle::Engine;
use crate::refine::{RefineConfig, FRACTIONAL_SELECTION};
use std::time::Duration;

/// Configuration for [`TspRelaxation`](super::TspRelaxation).
///
/// `Engine::Lp` (default) solves the subtour relaxation and yields a lower
/// bound; `Engine::Mip` keeps the edge variables binary and yields an
/// optimal tour.
#[derive(Debug, Clone)]
pub struct TspConfig {
    pub engine: Engine,

    /// Wall-clock budget. `None` = no limit.
    pub time_limit: Option<Duration>,

    /// Maximum number of oracle calls. 0 = no limit.
    pub max_iterations: usize,
}

impl Default for TspConfig {
    fn default() -> Self {
        Self {
            engine: Engine::Lp,
            time_limit: None,
            max_iterations: 0,
        }
    }
}

impl TspConfig {
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
        if self.engine == Engine::Sat {
            return Err(Error::InvalidConfig(
                "the TSP objective needs an LP or MIP engine".into(),
            ));
        }
        Ok(())
    }

    pub(crate) fn refine_config(&self) -> RefineConfig {
        let config = RefineConfig::default()
            .with_max_iterations(self.max_iterations)
            .with_selection_threshold(FRACTIONAL_SELECTION);
        match self.time_limit {
            Some(limit) => config.with_time_limit(limit),
            None => config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engines() {
        assert!(TspConfig::default().validate().is_ok());
        assert!(TspConfig::default().with_engine(Engine::Mip).validate().is_ok());
        assert!(TspConfig::default().with_engine(Engine::Sat).validate().is_err());
    }
}
