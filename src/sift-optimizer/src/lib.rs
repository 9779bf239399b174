//! Rule-based optimizer for Sift logical plans.
//!
//! The optimizer repeatedly matches [`Rule`]s against plan nodes, top-down,
//! telling each rule which symbols the parent actually needs. The shipped rule
//! family prunes columns nobody reads, including the subquery columns of
//! correlated `Apply` nodes.
//!
//! # Example
//!
//! ```rust
//! use sift_logical::{PlanBuilder, SetExpression};
//!
//! let mut p = PlanBuilder::new();
//! let a = p.symbol("a");
//! let s1 = p.symbol("s1");
//! let s2 = p.symbol("s2");
//! let in_result = p.symbol("in_result");
//! let root = p.apply(
//!     vec![(in_result, SetExpression::in_(&a, &s1))],
//!     vec![],
//!     p.values(&[&a]),
//!     p.values(&[&s1, &s2]),
//! );
//! let (plan, mut symbols) = p.build(root);
//!
//! let result = sift_optimizer::optimize(plan, &mut symbols).unwrap();
//! println!("{}", result.plan.explain());
//! ```

pub mod pattern;
pub mod rules;
pub mod testing;

pub use pattern::{Captures, Pattern};
pub use rules::{
    IterativeOptimizer, OptimizedPlan, Rule, RuleContext, RuleOutcome, RuleTrace, pruning_rules,
};

use common_error::SiftResult;
use sift_core::SymbolAllocator;
use sift_logical::LogicalPlan;

/// Optimize a logical plan using the default optimizer.
pub fn optimize(plan: LogicalPlan, symbols: &mut SymbolAllocator) -> SiftResult<OptimizedPlan> {
    let optimizer = IterativeOptimizer::default();
    optimizer.optimize(plan, symbols)
}

#[cfg(test)]
#[ctor::ctor]
fn init() {
    // Enable RUST_LOG logging configuration for test
    let _ = env_logger::try_init();
}
