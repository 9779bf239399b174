//! Drop unused columns from table scans.

use common_error::SiftResult;
use sift_logical::{NodeKind, PlanNode};

use super::rule::{Rule, RuleContext, RuleOutcome};
use crate::pattern::{Captures, Pattern};

/// Remove TableScan columns the parent does not require.
///
/// # Termination
///
/// The column bindings only shrink.
pub struct PruneTableScanColumns {
    pattern: Pattern,
}

impl PruneTableScanColumns {
    /// Create the rule.
    pub fn new() -> Self {
        Self {
            pattern: Pattern::typed(NodeKind::TableScan),
        }
    }
}

impl Default for PruneTableScanColumns {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for PruneTableScanColumns {
    fn name(&self) -> &'static str {
        "PruneTableScanColumns"
    }

    fn description(&self) -> &'static str {
        "Stop reading table columns that are never used"
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
        let PlanNode::TableScan(scan) = node else {
            return Ok(RuleOutcome::Unchanged);
        };
        if ctx.required.is_none() {
            return Ok(RuleOutcome::Unchanged);
        }

        let pruned = scan.retain_columns(|symbol| ctx.is_required(symbol));
        if pruned.columns.len() == scan.columns.len() {
            return Ok(RuleOutcome::Unchanged);
        }

        Ok(RuleOutcome::Replace(PlanNode::TableScan(pruned)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{assert_that, table_scan};

    #[test]
    fn test_unused_columns_removed() {
        assert_that(PruneTableScanColumns::new())
            .on(|p| {
                let id = p.symbol("id");
                let name = p.symbol("name");
                let city = p.symbol("city");
                p.table_scan("people", &[&id, &name, &city])
            })
            .with_required(&["city", "id"])
            .matches(table_scan("people", &["id", "city"]));
    }

    #[test]
    fn test_all_required() {
        assert_that(PruneTableScanColumns::new())
            .on(|p| {
                let id = p.symbol("id");
                p.table_scan("people", &[&id])
            })
            .does_not_fire();
    }
}
