use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use goap_core::Action;

/// Multiplier applied to a parallelizable action's cost when `prefer_parallel` is set.
pub const PARALLEL_DISCOUNT: f64 = 0.9;

/// Search limits and tuning knobs.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlannerConfig {
    /// Hard cap on node expansions.
    pub max_iterations: usize,

    /// Nodes at this depth are never expanded.
    pub max_plan_length: usize,

    /// Scales the heuristic; values above 1 trade optimality for speed.
    pub heuristic_weight: f64,

    /// Discount parallelizable actions by [`PARALLEL_DISCOUNT`].
    pub prefer_parallel: bool,

    /// Wall-clock budget, checked once per expansion.
    pub timeout_ms: u64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            max_plan_length: 20,
            heuristic_weight: 1.0,
            prefer_parallel: true,
            timeout_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("heuristic_weight must be a finite number >= 1, got {0}")]
    HeuristicWeight(f64),

    #[error("max_iterations must be at least 1")]
    ZeroIterations,

    #[error("max_plan_length must be at least 1")]
    ZeroPlanLength,
}

impl PlannerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.heuristic_weight.is_finite() || self.heuristic_weight < 1.0 {
            return Err(ConfigError::HeuristicWeight(self.heuristic_weight));
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        if self.max_plan_length == 0 {
            return Err(ConfigError::ZeroPlanLength);
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Cost the search charges for `action`.
    pub fn effective_cost(&self, action: &Action) -> f64 {
        if self.prefer_parallel && action.parallelizable {
            action.cost * PARALLEL_DISCOUNT
        } else {
            action.cost
        }
    }
}
