//! Drop unused columns from literal rows.

use common_error::SiftResult;
use sift_logical::{NodeKind, PlanNode};

use super::rule::{Rule, RuleContext, RuleOutcome};
use crate::pattern::{Captures, Pattern};

/// Remove Values columns the parent does not require.
///
/// Rows keep their count, so a Values node can end up with rows of zero
/// columns.
///
/// # Termination
///
/// The column list only shrinks.
pub struct PruneValuesColumns {
    pattern: Pattern,
}

impl PruneValuesColumns {
    /// Create the rule.
    pub fn new() -> Self {
        Self {
            pattern: Pattern::typed(NodeKind::Values),
        }
    }
}

impl Default for PruneValuesColumns {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for PruneValuesColumns {
    fn name(&self) -> &'static str {
        "PruneValuesColumns"
    }

    fn description(&self) -> &'static str {
        "Remove literal columns that are never used"
    }

    fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    fn apply(
        &self,
        node: &PlanNode,
        _captures: &Captures<'_>,
        ctx: &mut RuleContext<'_>,
    ) -> SiftResult<RuleOutcome> {
        let PlanNode::Values(values) = node else {
            return Ok(RuleOutcome::Unchanged);
        };
        if ctx.required.is_none() {
            return Ok(RuleOutcome::Unchanged);
        }

        let pruned = values.retain_columns(|symbol| ctx.is_required(symbol));
        if pruned.output_symbols.len() == values.output_symbols.len() {
            return Ok(RuleOutcome::Unchanged);
        }

        Ok(RuleOutcome::Replace(PlanNode::Values(pruned)))
    }
}
