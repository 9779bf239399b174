//! Drop correlation symbols the subquery does not use.

use common_error::SiftResult;
use sift_logical::{ApplyNode, NodeKind, PlanNode};

use super::rule::{Rule, RuleContext, RuleOutcome};
use crate::pattern::{Captures, Pattern};

/// Remove Apply correlation symbols that are not free in the subquery.
///
/// # Termination
///
/// The correlation list only shrinks; once every entry is read by the
/// subquery the rule no longer applies.
pub struct PruneApplyCorrelation {
    pattern: Pattern,
}

impl PruneApplyCorrelation {
    /// Create the rule.
    pub fn new() -> Self {
        Self {
            pattern: Pattern::typed(NodeKind::Apply).matching("correlated", |node| {
                matches!(node, PlanNode::Apply(apply) if !apply.correlation.is_empty())
            }),
        }
    }
}

impl Default for PruneApplyCorrelation {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for PruneApplyCorrelation {
    fn name(&self) -> &'static str {
        "PruneApplyCorrelation"
    }

    fn description(&self) -> &'static str {
        "Remove correlation symbols the subquery never references"
    }

    fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    fn apply(
        &self,
        node: &PlanNode,
        _captures: &Captures<'_>,
        _ctx: &mut RuleContext<'_>,
    ) -> SiftResult<RuleOutcome> {
        let PlanNode::Apply(apply) = node else {
            return Ok(RuleOutcome::Unchanged);
        };

        let free = apply.subquery.free_symbols();
        let correlation: Vec<_> = apply
            .correlation
            .iter()
            .filter(|&symbol| free.contains(symbol))
            .cloned()
            .collect();
        if correlation.len() == apply.correlation.len() {
            return Ok(RuleOutcome::Unchanged);
        }

        Ok(RuleOutcome::Replace(PlanNode::Apply(ApplyNode {
            correlation,
            ..apply.clone()
        })))
    }
}
