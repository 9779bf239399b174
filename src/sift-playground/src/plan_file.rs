//! Plans stored as JSON.
//!
//! A plan file holds a serialized [`LogicalPlan`] and, optionally, the
//! configuration to optimize it with:
//!
//! ```json
//! { "plan": { "root": { ... } }, "config": { "optimizer": { "max_iterations": 10 } } }
//! ```

use std::path::Path;

use common_config::SiftConfig;
use common_error::SiftResult;
use serde::{Deserialize, Serialize};
use sift_core::SymbolAllocator;
use sift_logical::{LogicalPlan, PlanBuilder};

/// A plan together with the configuration to optimize it with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanFile {
    /// The plan to optimize.
    pub plan: LogicalPlan,
    /// Configuration overrides; defaults apply when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<SiftConfig>,
}

impl PlanFile {
    /// Wrap a plan with no configuration.
    pub fn new(plan: LogicalPlan) -> Self {
        Self { plan, config: None }
    }

    /// Parse a plan file from JSON.
    pub fn from_json_str(json: &str) -> SiftResult<Self> {
        let file: Self = serde_json::from_str(json)?;
        if let Some(config) = &file.config {
            config.validate()?;
        }
        Ok(file)
    }

    /// Read and parse a plan file.
    pub fn from_json_file(path: impl AsRef<Path>) -> SiftResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> SiftResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The configuration to use, falling back to defaults.
    pub fn config(&self) -> SiftConfig {
        self.config.clone().unwrap_or_default()
    }

    /// Rebuild a symbol table holding every symbol the plan mentions.
    ///
    /// Fails if two different symbols share an id.
    pub fn symbols(&self) -> SiftResult<SymbolAllocator> {
        let mut builder = PlanBuilder::new();
        builder.adopt(self.plan.root())?;
        Ok(builder.into_symbols())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::find_scenario;

    #[test]
    fn test_round_trip_keeps_symbols() {
        let Some(scenario) = find_scenario("correlated") else {
            panic!("missing scenario");
        };
        let (plan, original) = scenario.build();

        let json = PlanFile::new(plan.clone()).to_json().unwrap();
        let file = PlanFile::from_json_str(&json).unwrap();
        assert_eq!(file.plan, plan);
        assert!(file.config.is_none());

        let symbols = file.symbols().unwrap();
        for name in ["a", "b", "s1", "s2", "in_result"] {
            assert_eq!(symbols.lookup(name), original.lookup(name));
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let Some(scenario) = find_scenario("single-reference") else {
            panic!("missing scenario");
        };
        let (plan, _) = scenario.build();
        let mut value = serde_json::to_value(PlanFile::new(plan)).unwrap();
        value["config"] = serde_json::json!({ "optimizer": { "max_iterations": 0 } });

        let result = PlanFile::from_json_str(&value.to_string());
        assert!(result.is_err());
    }
}
