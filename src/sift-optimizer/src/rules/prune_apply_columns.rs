//! Drop Apply assignments the parent does not need.

use common_error::SiftResult;
use sift_logical::{ApplyNode, NodeKind, PlanNode};

use super::rule::{Rule, RuleContext, RuleOutcome};
use crate::pattern::{Captures, Pattern};

/// Remove Apply assignments whose outputs the parent does not require.
///
/// Input symbols pass through untouched; narrowing them is the job of the
/// rules that fire on the input itself.
///
/// # Termination
///
/// The assignment list only shrinks and never below the required outputs.
pub struct PruneApplyColumns {
    pattern: Pattern,
}

impl PruneApplyColumns {
    /// Create the rule.
    pub fn new() -> Self {
        Self {
            pattern: Pattern::typed(NodeKind::Apply),
        }
    }
}

impl Default for PruneApplyColumns {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for PruneApplyColumns {
    fn name(&self) -> &'static str {
        "PruneApplyColumns"
    }

    fn description(&self) -> &'static str {
        "Remove Apply assignments whose outputs are never used"
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
        let PlanNode::Apply(apply) = node else {
            return Ok(RuleOutcome::Unchanged);
        };
        if ctx.required.is_none() {
            return Ok(RuleOutcome::Unchanged);
        }

        let assignments: Vec<_> = apply
            .assignments
            .iter()
            .filter(|(symbol, _)| ctx.is_required(symbol))
            .cloned()
            .collect();
        if assignments.len() == apply.assignments.len() {
            return Ok(RuleOutcome::Unchanged);
        }

        Ok(RuleOutcome::Replace(PlanNode::Apply(ApplyNode {
            assignments,
            ..apply.clone()
        })))
    }
}
