//! Filter operator for predicate-based filtering.

use serde::{Deserialize, Serialize};

use crate::expr::Expr;

use super::PlanNode;

/// Filter operator - predicate-based row filtering.
///
/// Output symbols are those of the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterNode {
    /// Source operator.
    pub source: Box<PlanNode>,
    /// Filter predicate (must evaluate to bool).
    pub predicate: Expr,
}

impl FilterNode {
    /// Create a new filter operation.
    pub fn new(source: PlanNode, predicate: Expr) -> Self {
        Self {
            source: Box::new(source),
            predicate,
        }
    }
}
