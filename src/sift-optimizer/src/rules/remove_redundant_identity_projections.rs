//! Remove projections that reproduce their source unchanged.

use common_error::{SiftError, SiftResult};
use sift_logical::{NodeKind, PlanNode};

use super::rule::{Rule, RuleContext, RuleOutcome};
use crate::pattern::{Captures, Pattern};

/// Replace a Project whose assignments are identities producing exactly its
/// source's outputs, in the same order, by the source itself.
///
/// # Termination
///
/// Every firing removes one node.
pub struct RemoveRedundantIdentityProjections {
    pattern: Pattern,
}

impl RemoveRedundantIdentityProjections {
    /// Create the rule.
    pub fn new() -> Self {
        Self {
            pattern: Pattern::typed(NodeKind::Project)
                .matching("identity over source", |node| {
                    matches!(node, PlanNode::Project(project) if project.is_identity_over_source())
                })
                .with_child(0, Pattern::any().capture_as("source")),
        }
    }
}

impl Default for RemoveRedundantIdentityProjections {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for RemoveRedundantIdentityProjections {
    fn name(&self) -> &'static str {
        "RemoveRedundantIdentityProjections"
    }

    fn description(&self) -> &'static str {
        "Remove projections that pass their source through unchanged"
    }

    fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    fn apply(
        &self,
        _node: &PlanNode,
        captures: &Captures<'_>,
        ctx: &mut RuleContext<'_>,
    ) -> SiftResult<RuleOutcome> {
        let source = captures
            .get("source")
            .ok_or_else(|| SiftError::rule_failed(ctx.rule_name, "source was not captured"))?;
        Ok(RuleOutcome::Replace(source.clone()))
    }
}

#[cfg(test)]
mod tests {
    use sift_logical::Assignments;
    use sift_logical::expr::{lit, sym};

    use super::*;
    use crate::testing::{assert_that, values};

    #[test]
    fn test_identity_removed() {
        assert_that(RemoveRedundantIdentityProjections::new())
            .on(|p| {
                let a = p.symbol("a");
                let b = p.symbol("b");
                p.identity_project(&[&a, &b], p.values(&[&a, &b]))
            })
            .matches(values(&["a", "b"]));
    }

    #[test]
    fn test_zero_column_identity_removed() {
        assert_that(RemoveRedundantIdentityProjections::new())
            .on(|p| p.identity_project(&[], p.values(&[])))
            .matches(values(&[]));
    }

    #[test]
    fn test_narrowing_projection_kept() {
        assert_that(RemoveRedundantIdentityProjections::new())
            .on(|p| {
                let a = p.symbol("a");
                let b = p.symbol("b");
                p.identity_project(&[&a], p.values(&[&a, &b]))
            })
            .does_not_fire();
    }

    #[test]
    fn test_reordering_projection_kept() {
        assert_that(RemoveRedundantIdentityProjections::new())
            .on(|p| {
                let a = p.symbol("a");
                let b = p.symbol("b");
                p.identity_project(&[&b, &a], p.values(&[&a, &b]))
            })
            .does_not_fire();
    }

    #[test]
    fn test_computing_projection_kept() {
        assert_that(RemoveRedundantIdentityProjections::new())
            .on(|p| {
                let a = p.symbol("a");
                let assignments = Assignments::from_pairs([(a.clone(), sym(&a).add(lit(1i64)))])
                    .unwrap();
                p.project(assignments, p.values(&[&a]))
            })
            .does_not_fire();
    }
}
