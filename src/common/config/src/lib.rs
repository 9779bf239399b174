//! Configuration management for Sift.
//!
//! Configuration is always handed to the optimizer explicitly; there is no
//! process-wide configuration state.

use std::path::Path;

use common_error::{SiftResult, ensure};
use serde::{Deserialize, Serialize};

/// Top-level Sift configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiftConfig {
    /// Optimizer configuration.
    pub optimizer: OptimizerConfig,
}

impl SiftConfig {
    /// Parse a configuration from a JSON string and validate it.
    pub fn from_json_str(json: &str) -> SiftResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file and validate it.
    pub fn from_json_file(path: impl AsRef<Path>) -> SiftResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Check that every section holds usable values.
    pub fn validate(&self) -> SiftResult<()> {
        self.optimizer.validate()
    }
}

/// Configuration for the iterative optimizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Maximum number of whole-plan passes before the run is reported as non-converging.
    pub max_iterations: usize,
    /// Maximum number of consecutive replacements at a single node within one pass.
    pub max_node_rewrites: usize,
    /// Record a before/after trace of every rule firing.
    pub enable_trace: bool,
    /// Validate the input plan before optimizing it.
    pub validate_plans: bool,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            max_node_rewrites: 1000,
            enable_trace: false,
            validate_plans: true,
        }
    }
}

impl OptimizerConfig {
    /// Set the maximum number of passes.
    #[must_use]
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Set the maximum number of replacements at one node.
    #[must_use]
    pub fn with_max_node_rewrites(mut self, max: usize) -> Self {
        self.max_node_rewrites = max;
        self
    }

    /// Enable or disable tracing.
    #[must_use]
    pub fn with_trace(mut self, enable: bool) -> Self {
        self.enable_trace = enable;
        self
    }

    /// Enable or disable input plan validation.
    #[must_use]
    pub fn with_validation(mut self, enable: bool) -> Self {
        self.validate_plans = enable;
        self
    }

    /// Reject caps that would stop the optimizer before it can do any work.
    pub fn validate(&self) -> SiftResult<()> {
        ensure!(
            self.max_iterations > 0,
            InvalidParameter: "optimizer.max_iterations must be at least 1"
        );
        ensure!(
            self.max_node_rewrites > 0,
            InvalidParameter: "optimizer.max_node_rewrites must be at least 1"
        );
        Ok(())
    }
}
