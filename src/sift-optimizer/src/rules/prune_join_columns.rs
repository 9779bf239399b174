//! Narrow the symbols a join exposes.

use common_error::SiftResult;
use sift_core::Symbol;
use sift_logical::{JoinNode, NodeKind, PlanNode};

use super::rule::{Rule, RuleContext, RuleOutcome};
use crate::pattern::{Captures, Pattern};

/// Restrict a Join's left and right output lists to the required symbols.
///
/// Symbols read only by the join condition stay available to the join
/// itself; they just stop being exposed.
///
/// # Termination
///
/// Both output lists only shrink.
pub struct PruneJoinColumns {
    pattern: Pattern,
}

impl PruneJoinColumns {
    /// Create the rule.
    pub fn new() -> Self {
        Self {
            pattern: Pattern::typed(NodeKind::Join),
        }
    }
}

impl Default for PruneJoinColumns {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for PruneJoinColumns {
    fn name(&self) -> &'static str {
        "PruneJoinColumns"
    }

    fn description(&self) -> &'static str {
        "Stop exposing join columns that are never used"
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
        let PlanNode::Join(join) = node else {
            return Ok(RuleOutcome::Unchanged);
        };
        if ctx.required.is_none() {
            return Ok(RuleOutcome::Unchanged);
        }

        let narrow = |symbols: &[Symbol]| -> Vec<_> {
            symbols
                .iter()
                .filter(|symbol| ctx.is_required(symbol))
                .cloned()
                .collect()
        };
        let left_output_symbols = narrow(&join.left_output_symbols);
        let right_output_symbols = narrow(&join.right_output_symbols);
        if left_output_symbols.len() == join.left_output_symbols.len()
            && right_output_symbols.len() == join.right_output_symbols.len()
        {
            return Ok(RuleOutcome::Unchanged);
        }

        Ok(RuleOutcome::Replace(PlanNode::Join(JoinNode {
            left_output_symbols,
            right_output_symbols,
            ..join.clone()
        })))
    }
}

#[cfg(test)]
mod tests {
    use sift_logical::{EquiJoinClause, JoinKind};

    use super::*;
    use crate::testing::{assert_that, join, values};

    #[test]
    fn test_join_outputs_narrowed() {
        assert_that(PruneJoinColumns::new())
            .on(|p| {
                let a = p.symbol("a");
                let b = p.symbol("b");
                let c = p.symbol("c");
                let d = p.symbol("d");
                p.join(
                    JoinKind::Inner,
                    p.values(&[&a, &b]),
                    p.values(&[&c, &d]),
                    vec![EquiJoinClause::new(&a, &c)],
                    None,
                )
            })
            .with_required(&["b", "d"])
            .matches(
                join(
                    JoinKind::Inner,
                    &[("a", "c")],
                    values(&["a", "b"]),
                    values(&["c", "d"]),
                )
                .with_outputs(&["b", "d"]),
            );
    }

    #[test]
    fn test_join_all_required() {
        assert_that(PruneJoinColumns::new())
            .on(|p| {
                let a = p.symbol("a");
                let c = p.symbol("c");
                p.join(
                    JoinKind::Left,
                    p.values(&[&a]),
                    p.values(&[&c]),
                    vec![EquiJoinClause::new(&a, &c)],
                    None,
                )
            })
            .does_not_fire();
    }
}
