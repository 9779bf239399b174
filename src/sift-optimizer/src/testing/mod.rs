//! Test support: a name-based plan matching DSL and a single-rule harness.
//!
//! Used by the rule tests in this crate and available to downstream crates
//! that write their own rules.

mod plan_match;
mod rule_tester;

pub use plan_match::{
    ExpressionMatcher, PlanMatchPattern, SetExpressionMatcher, any, any_tree, apply, expression,
    filter, join, limit, project, set_expression, table_scan, values,
};
pub use rule_tester::{RuleApplication, RuleAssert, assert_that};
