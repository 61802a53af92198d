//! Refinement loop configuration.

use super::registry::BOOLEAN_SELECTION;
use crate::error::{Error, Result};
use std::time::Duration;

/// Configuration for the lazy-refinement driver.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use u_lazycut::refine::{RefineConfig, FRACTIONAL_SELECTION};
///
/// let config = RefineConfig::default()
///     .with_time_limit(Duration::from_secs(30))
///     .with_max_iterations(500)
///     .with_selection_threshold(FRACTIONAL_SELECTION);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct RefineConfig {
    /// Wall-clock budget for the whole loop. `None` = no limit.
    pub time_limit: Option<Duration>,

    /// Maximum number of oracle calls. 0 = no limit.
    pub max_iterations: usize,

    /// Minimum variable value for an edge to count as selected.
    pub selection_threshold: f64,
}

impl Default for RefineConfig {
    fn default() -> Self {
        Self {
            time_limit: None,
            max_iterations: 0,
            selection_threshold: BOOLEAN_SELECTION,
        }
    }
}

impl RefineConfig {
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_selection_threshold(mut self, threshold: f64) -> Self {
        self.selection_threshold = threshold;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if !(self.selection_threshold > 0.0 && self.selection_threshold <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "selection_threshold must be in (0, 1], got {}",
                self.selection_threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RefineConfig::default();
        assert!(config.time_limit.is_none());
        assert_eq!(config.max_iterations, 0);
        assert_eq!(config.selection_threshold, 1.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_threshold() {
        assert!(RefineConfig::default()
            .with_selection_threshold(0.0)
            .validate()
            .is_err());
        assert!(RefineConfig::default()
            .with_selection_threshold(1.5)
            .validate()
            .is_err());
        assert!(RefineConfig::default()
            .with_selection_threshold(f64::NAN)
            .validate()
            .is_err());
    }
}
