//! Drop projection assignments the parent does not need.

use common_error::SiftResult;
use sift_logical::{NodeKind, PlanNode, ProjectNode};

use super::rule::{Rule, RuleContext, RuleOutcome};
use crate::pattern::{Captures, Pattern};

/// Remove Project assignments whose outputs the parent does not require.
///
/// # Termination
///
/// The assignment list only shrinks and never below the required outputs.
pub struct PruneProjectColumns {
    pattern: Pattern,
}

impl PruneProjectColumns {
    /// Create the rule.
    pub fn new() -> Self {
        Self {
            pattern: Pattern::typed(NodeKind::Project),
        }
    }
}

impl Default for PruneProjectColumns {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for PruneProjectColumns {
    fn name(&self) -> &'static str {
        "PruneProjectColumns"
    }

    fn description(&self) -> &'static str {
        "Remove projection assignments whose outputs are never used"
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
        let PlanNode::Project(project) = node else {
            return Ok(RuleOutcome::Unchanged);
        };
        if ctx.required.is_none() {
            return Ok(RuleOutcome::Unchanged);
        }

        let assignments = project.assignments.filter(|symbol| ctx.is_required(symbol));
        if assignments.len() == project.assignments.len() {
            return Ok(RuleOutcome::Unchanged);
        }

        Ok(RuleOutcome::Replace(PlanNode::Project(ProjectNode {
            source: project.source.clone(),
            assignments,
        })))
    }
}

#[cfg(test)]
mod tests {
    use sift_logical::Assignments;
    use sift_logical::expr::{lit, sym};

    use super::*;
    use crate::testing::{assert_that, expression, project, values};

    #[test]
    fn test_unused_assignment_removed() {
        assert_that(PruneProjectColumns::new())
            .on(|p| {
                let a = p.symbol("a");
                let b = p.symbol("b");
                let x = p.symbol("x");
                let assignments = Assignments::from_pairs([
                    (a.clone(), sym(&a)),
                    (x, sym(&b).add(lit(1i64))),
                ])
                .unwrap();
                p.project(assignments, p.values(&[&a, &b]))
            })
            .with_required(&["a"])
            .matches(project(&[("a", expression("a"))], values(&["a", "b"])));
    }

    #[test]
    fn test_all_required() {
        assert_that(PruneProjectColumns::new())
            .on(|p| {
                let a = p.symbol("a");
                p.identity_project(&[&a], p.values(&[&a]))
            })
            .does_not_fire();
    }
}
