//! Single-rule test harness.
//!
//! ```rust
//! use sift_logical::SetExpression;
//! use sift_optimizer::rules::PruneApplySourceColumns;
//! use sift_optimizer::testing::assert_that;
//!
//! assert_that(PruneApplySourceColumns::new())
//!     .on(|p| {
//!         let a = p.symbol("a");
//!         let s = p.symbol("s");
//!         let r = p.symbol("r");
//!         p.apply(
//!             vec![(r, SetExpression::in_(&a, &s))],
//!             vec![],
//!             p.values(&[&a]),
//!             p.values(&[&s]),
//!         )
//!     })
//!     .does_not_fire();
//! ```

use common_error::SiftResult;
use sift_core::{SymbolAllocator, SymbolSet};
use sift_logical::{PlanBuilder, PlanNode};

use super::PlanMatchPattern;
use crate::rules::{Rule, RuleContext, RuleOutcome};

/// Start a rule assertion.
pub fn assert_that<R: Rule>(rule: R) -> RuleAssert<R> {
    RuleAssert { rule }
}

/// A rule waiting for the plan to apply it to.
pub struct RuleAssert<R> {
    rule: R,
}

impl<R: Rule> RuleAssert<R> {
    /// Build the plan the rule is applied to.
    pub fn on<F>(self, build: F) -> RuleApplication<R>
    where
        F: FnOnce(&mut PlanBuilder) -> PlanNode,
    {
        let mut builder = PlanBuilder::new();
        let plan = build(&mut builder);
        RuleApplication {
            rule: self.rule,
            plan,
            symbols: builder.into_symbols(),
            required: None,
        }
    }
}

/// A rule applied once to the root of a plan.
pub struct RuleApplication<R> {
    rule: R,
    plan: PlanNode,
    symbols: SymbolAllocator,
    required: Option<SymbolSet>,
}

impl<R: Rule> RuleApplication<R> {
    /// Pretend the parent of the root only needs the named symbols.
    ///
    /// Without this the parent needs every root output.
    ///
    /// # Panics
    ///
    /// Panics if a name was never allocated while building the plan.
    #[must_use]
    pub fn with_required(mut self, names: &[&str]) -> Self {
        let required = names
            .iter()
            .map(|name| match self.symbols.lookup(name) {
                Some(symbol) => symbol.clone(),
                None => panic!("symbol '{name}' was not allocated by the plan builder"),
            })
            .collect();
        self.required = Some(required);
        self
    }

    /// Apply the rule to the root, if its pattern matches.
    pub fn outcome(&mut self) -> SiftResult<RuleOutcome> {
        let Some(captures) = self.rule.pattern().matches(&self.plan) else {
            return Ok(RuleOutcome::Unchanged);
        };

        let required = self
            .required
            .clone()
            .unwrap_or_else(|| self.plan.output_symbols().into_iter().collect());
        let mut ctx = RuleContext::new(&mut self.symbols, self.rule.name()).with_required(&required);
        self.rule.apply(&self.plan, &captures, &mut ctx)
    }

    /// Assert the rule fires and its result matches `expected`.
    ///
    /// Returns the rewritten node for further inspection.
    ///
    /// # Panics
    ///
    /// Panics if the rule errors, does not fire, drops a required symbol, or
    /// produces a plan of a different shape.
    pub fn matches(mut self, expected: PlanMatchPattern) -> PlanNode {
        let name = self.rule.name();
        let before = self.plan.explain();
        let rewritten = match self.outcome() {
            Ok(RuleOutcome::Replace(node)) => node,
            Ok(RuleOutcome::Unchanged) => {
                panic!("rule {name} did not fire on:\n{before}")
            }
            Err(err) => panic!("rule {name} failed: {err}"),
        };

        let required = self
            .required
            .unwrap_or_else(|| self.plan.output_symbols().into_iter().collect());
        let produced: SymbolSet = rewritten.output_symbols().into_iter().collect();
        assert!(
            required.is_subset(&produced),
            "rule {name} dropped required symbols {:?}:\n{}",
            required.difference(&produced).collect::<Vec<_>>(),
            rewritten.explain()
        );

        assert!(
            expected.matches(&rewritten),
            "rule {name} produced a plan that does not match.\nExpected:\n{expected}\nActual:\n{}",
            rewritten.explain()
        );
        rewritten
    }

    /// Assert the rule leaves the plan alone.
    ///
    /// # Panics
    ///
    /// Panics if the rule errors or fires.
    pub fn does_not_fire(mut self) {
        let name = self.rule.name();
        match self.outcome() {
            Ok(RuleOutcome::Unchanged) => {}
            Ok(RuleOutcome::Replace(node)) => panic!(
                "rule {name} fired unexpectedly on:\n{}\nproducing:\n{}",
                self.plan.explain(),
                node.explain()
            ),
            Err(err) => panic!("rule {name} failed: {err}"),
        }
    }
}
