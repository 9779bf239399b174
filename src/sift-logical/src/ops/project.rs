//! Project operator: column selection and computation.

use serde::{Deserialize, Serialize};

use crate::assignments::Assignments;

use super::PlanNode;

/// Project operator.
///
/// Outputs exactly the assignment symbols, in assignment order. Never changes
/// cardinality, so a Project with no assignments still yields one (empty) row
/// per source row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectNode {
    /// Source operator.
    pub source: Box<PlanNode>,
    /// Output assignments.
    pub assignments: Assignments,
}

impl ProjectNode {
    /// Create a new projection.
    pub fn new(source: PlanNode, assignments: Assignments) -> Self {
        Self {
            source: Box::new(source),
            assignments,
        }
    }

    /// Projection passing every source symbol through unchanged.
    pub fn identity(source: PlanNode) -> Self {
        let assignments = Assignments::identity(&source.output_symbols());
        Self::new(source, assignments)
    }

    /// Check whether this projection reproduces its source's schema exactly.
    pub fn is_identity_over_source(&self) -> bool {
        self.assignments.is_identity() && self.assignments.outputs() == self.source.output_symbols()
    }
}
