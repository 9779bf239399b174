//! Prune subquery columns an Apply never reads.

use common_error::{SiftResult, plan_err};
use sift_core::SymbolSet;
use sift_logical::{ApplyNode, Assignments, NodeKind, PlanNode, ProjectNode};

use super::rule::{Rule, RuleContext, RuleOutcome};
use crate::pattern::{Captures, Pattern};

/// Restrict an Apply's subquery to the columns its assignments reference.
///
/// Given `Apply(input, subquery)` whose assignments read only the subquery
/// symbols `R`, rewrites the subquery to an identity projection of `R` (in
/// subquery output order) over the original subquery. When `R` is empty the
/// projection has no columns; it still yields one row per subquery row, so
/// `EXISTS`-style semantics are kept. Input, correlation and assignments are
/// carried over unchanged.
///
/// # Termination
///
/// Fires only while the subquery produces a symbol outside `R`; afterwards the
/// subquery outputs are exactly `R` and the rule no longer applies.
///
/// # Errors
///
/// Returns [`common_error::SiftError::InvalidPlan`] when an assignment reads a
/// symbol that neither the input nor the subquery produces.
///
/// # Example
///
/// ```text
/// Apply[in_result := a IN s1]          Apply[in_result := a IN s1]
/// ├─ Values[a]                   =>    ├─ Values[a]
/// └─ Values[s1, s2]                    └─ Project[s1 := s1]
///                                         └─ Values[s1, s2]
/// ```
pub struct PruneApplySourceColumns {
    pattern: Pattern,
}

impl PruneApplySourceColumns {
    /// Create the rule.
    pub fn new() -> Self {
        Self {
            pattern: Pattern::typed(NodeKind::Apply),
        }
    }
}

impl Default for PruneApplySourceColumns {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for PruneApplySourceColumns {
    fn name(&self) -> &'static str {
        "PruneApplySourceColumns"
    }

    fn description(&self) -> &'static str {
        "Restrict an Apply subquery to the columns its assignments reference"
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

        let subquery_outputs = apply.subquery.output_symbols();
        let mut scope: SymbolSet = apply.input.output_symbols().into_iter().collect();
        scope.extend(subquery_outputs.iter().cloned());
        if let Some(unresolved) = apply.assignment_symbols().difference(&scope).next() {
            plan_err!("Apply assignment reads {unresolved} which neither input nor subquery produces");
        }

        let referenced = apply.referenced_subquery_symbols();
        if subquery_outputs.iter().all(|symbol| referenced.contains(symbol)) {
            return Ok(RuleOutcome::Unchanged);
        }

        let kept = subquery_outputs
            .iter()
            .filter(|&symbol| referenced.contains(symbol));
        let subquery = ProjectNode::new((*apply.subquery).clone(), Assignments::identity(kept));

        Ok(RuleOutcome::Replace(PlanNode::Apply(ApplyNode {
            subquery: Box::new(PlanNode::Project(subquery)),
            ..apply.clone()
        })))
    }
}

#[cfg(test)]
mod tests {
    use sift_logical::SetExpression;

    use super::*;
    use crate::testing::{apply, assert_that, expression, project, set_expression, values};

    #[test]
    fn test_not_all_subquery_symbols_referenced() {
        assert_that(PruneApplySourceColumns::new())
            .on(|p| {
                let a = p.symbol("a");
                let subquery_symbol_1 = p.symbol("subquery_symbol_1");
                let subquery_symbol_2 = p.symbol("subquery_symbol_2");
                let in_result = p.symbol("in_result");
                p.apply(
                    vec![(in_result, SetExpression::in_(&a, &subquery_symbol_1))],
                    vec![],
                    p.values(&[&a]),
                    p.values(&[&subquery_symbol_1, &subquery_symbol_2]),
                )
            })
            .matches(apply(
                &[],
                &[("in_result", set_expression("a IN subquery_symbol_1"))],
                values(&["a"]),
                project(
                    &[("subquery_symbol_1", expression("subquery_symbol_1"))],
                    values(&["subquery_symbol_1", "subquery_symbol_2"]),
                ),
            ));
    }

    #[test]
    fn test_all_subquery_symbols_referenced() {
        assert_that(PruneApplySourceColumns::new())
            .on(|p| {
                let a = p.symbol("a");
                let subquery_symbol_1 = p.symbol("subquery_symbol_1");
                let subquery_symbol_2 = p.symbol("subquery_symbol_2");
                let in_result_1 = p.symbol("in_result_1");
                let in_result_2 = p.symbol("in_result_2");
                p.apply(
                    vec![
                        (in_result_1, SetExpression::in_(&a, &subquery_symbol_1)),
                        (in_result_2, SetExpression::in_(&a, &subquery_symbol_2)),
                    ],
                    vec![],
                    p.values(&[&a]),
                    p.values(&[&subquery_symbol_1, &subquery_symbol_2]),
                )
            })
            .does_not_fire();
    }

    #[test]
    fn test_no_subquery_symbols_referenced() {
        assert_that(PruneApplySourceColumns::new())
            .on(|p| {
                let a = p.symbol("a");
                let subquery_symbol = p.symbol("subquery_symbol");
                let in_result = p.symbol("in_result");
                p.apply(
                    vec![(in_result, SetExpression::in_(&a, &a))],
                    vec![],
                    p.values(&[&a]),
                    p.values(&[&subquery_symbol]),
                )
            })
            .matches(apply(
                &[],
                &[("in_result", set_expression("a IN a"))],
                values(&["a"]),
                project(&[], values(&["subquery_symbol"])),
            ));
    }

    #[test]
    fn test_empty_subquery_schema_does_not_fire() {
        assert_that(PruneApplySourceColumns::new())
            .on(|p| {
                let a = p.symbol("a");
                let exists = p.symbol("exists");
                p.apply(
                    vec![(exists, SetExpression::Exists)],
                    vec![],
                    p.values(&[&a]),
                    p.values(&[]),
                )
            })
            .does_not_fire();
    }

    #[test]
    fn test_unresolved_assignment_symbol_fails() {
        let mut application = assert_that(PruneApplySourceColumns::new()).on(|p| {
            let a = p.symbol("a");
            let s1 = p.symbol("s1");
            let s2 = p.symbol("s2");
            let stray = p.symbol("stray");
            let r = p.symbol("r");
            p.apply(
                vec![(r, SetExpression::in_(&a, &stray))],
                vec![],
                p.values(&[&a]),
                p.values(&[&s1, &s2]),
            )
        });

        let err = application.outcome().unwrap_err();
        assert!(matches!(
            err,
            common_error::SiftError::InvalidPlan(ref message) if message.contains("stray")
        ));
    }

    #[test]
    fn test_keeps_subquery_order_and_correlation() {
        assert_that(PruneApplySourceColumns::new())
            .on(|p| {
                let a = p.symbol("a");
                let s1 = p.symbol("s1");
                let s2 = p.symbol("s2");
                let s3 = p.symbol("s3");
                let r1 = p.symbol("r1");
                let r2 = p.symbol("r2");
                p.apply(
                    vec![
                        (r1, SetExpression::in_(&a, &s3)),
                        (r2, SetExpression::in_(&a, &s1)),
                    ],
                    vec![a.clone()],
                    p.values(&[&a]),
                    p.values(&[&s1, &s2, &s3]),
                )
            })
            .matches(apply(
                &["a"],
                &[
                    ("r1", set_expression("a IN s3")),
                    ("r2", set_expression("a IN s1")),
                ],
                values(&["a"]),
                project(
                    &[("s1", expression("s1")), ("s3", expression("s3"))],
                    values(&["s1", "s2", "s3"]),
                ),
            ));
    }
}
