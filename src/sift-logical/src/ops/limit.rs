//! Limit operator.

use serde::{Deserialize, Serialize};

use super::PlanNode;

/// Limit operator - keeps at most `count` rows of its source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitNode {
    /// Source operator.
    pub source: Box<PlanNode>,
    /// Maximum number of rows.
    pub count: u64,
}

impl LimitNode {
    /// Create a new limit.
    pub fn new(source: PlanNode, count: u64) -> Self {
        Self {
            source: Box::new(source),
            count,
        }
    }
}
