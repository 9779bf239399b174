//! Optimization rule trait and framework.
//!
//! This module defines the core abstraction for rewrite rules and the
//! result types the optimizer reports.

use common_error::SiftResult;
use sift_core::{Symbol, SymbolAllocator, SymbolSet};
use sift_logical::{LogicalPlan, PlanNode};

use crate::pattern::{Captures, Pattern};

/// A single local rewrite: pattern plus transformation.
///
/// # Contract
///
/// A rule receives a node that matched its [`Rule::pattern`] and either leaves
/// it alone or returns a replacement that:
///
/// 1. produces every symbol the parent requires ([`RuleContext::required`]),
///    each bound to the same values for the same rows,
/// 2. preserves the number of rows,
/// 3. only references symbols that are in scope.
///
/// A rule must not fire again on its own output, or the optimizer reports
/// non-convergence.
pub trait Rule: Send + Sync {
    /// Get the name of this rule.
    fn name(&self) -> &'static str;

    /// Get a description of what this rule does.
    fn description(&self) -> &'static str {
        "No description available"
    }

    /// The shape of node this rule applies to.
    fn pattern(&self) -> &Pattern;

    /// Rewrite a node that matched [`Rule::pattern`].
    fn apply(
        &self,
        node: &PlanNode,
        captures: &Captures<'_>,
        ctx: &mut RuleContext<'_>,
    ) -> SiftResult<RuleOutcome>;
}

/// The result of applying a rule to one node.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleOutcome {
    /// The rule does not apply.
    Unchanged,
    /// Replace the matched node with this one.
    Replace(PlanNode),
}

impl RuleOutcome {
    /// Check whether the rule fired.
    pub const fn is_replace(&self) -> bool {
        matches!(self, Self::Replace(_))
    }
}

/// Services available to a rule while it rewrites a node.
pub struct RuleContext<'a> {
    /// Symbol table of the current run, for rules that mint new symbols.
    pub symbols: &'a mut SymbolAllocator,
    /// Symbols the parent needs from the matched node; `None` means all of them.
    pub required: Option<&'a SymbolSet>,
    /// Name of the rule being applied.
    pub rule_name: &'static str,
}

impl<'a> RuleContext<'a> {
    /// Create a context for `rule_name` with no demand information.
    pub fn new(symbols: &'a mut SymbolAllocator, rule_name: &'static str) -> Self {
        Self {
            symbols,
            required: None,
            rule_name,
        }
    }

    /// Attach the parent's demand.
    #[must_use]
    pub fn with_required(mut self, required: &'a SymbolSet) -> Self {
        self.required = Some(required);
        self
    }

    /// Check whether the parent needs `symbol`.
    pub fn is_required(&self, symbol: &Symbol) -> bool {
        self.required.is_none_or(|required| required.contains(symbol))
    }
}

/// A trace entry for a single rule application.
#[derive(Debug, Clone)]
pub struct RuleTrace {
    /// The name of the rule that was applied.
    pub rule_name: String,
    /// Pass in which the rule fired.
    pub iteration: usize,
    /// The rewritten subtree before the rule was applied (as explain string).
    pub before: String,
    /// The rewritten subtree after the rule was applied (as explain string).
    pub after: String,
}

impl RuleTrace {
    /// Create a new trace entry.
    pub fn new(
        rule_name: impl Into<String>,
        iteration: usize,
        before: impl Into<String>,
        after: impl Into<String>,
    ) -> Self {
        Self {
            rule_name: rule_name.into(),
            iteration,
            before: before.into(),
            after: after.into(),
        }
    }
}

/// The result of optimization with optional trace information.
#[derive(Debug, Clone)]
pub struct OptimizedPlan {
    /// The final optimized plan.
    pub plan: LogicalPlan,
    /// Number of passes performed, including the final pass that changed nothing.
    pub iterations: usize,
    /// Number of rule firings.
    pub rules_applied: usize,
    /// Detailed trace of rule applications (if tracing was enabled).
    pub trace: Vec<RuleTrace>,
}

impl OptimizedPlan {
    /// Create a new optimized plan result.
    pub fn new(plan: LogicalPlan) -> Self {
        Self {
            plan,
            iterations: 0,
            rules_applied: 0,
            trace: Vec::new(),
        }
    }

    /// Format the trace as a human-readable string.
    pub fn format_trace(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "Optimization completed in {} iterations, {} rules applied\n",
            self.iterations, self.rules_applied
        ));

        if self.trace.is_empty() {
            output.push_str("  (no trace available)\n");
        } else {
            for (i, entry) in self.trace.iter().enumerate() {
                output.push_str(&format!(
                    "\n--- Rule {} applied in iteration {}: {} ---\n",
                    i + 1,
                    entry.iteration,
                    entry.rule_name
                ));
                output.push_str("Before:\n");
                output.push_str(&entry.before);
                output.push_str("After:\n");
                output.push_str(&entry.after);
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use sift_logical::PlanBuilder;

    use super::*;

    #[test]
    fn test_rule_context_demand() {
        let mut p = PlanBuilder::new();
        let a = p.symbol("a");
        let b = p.symbol("b");
        let mut symbols = p.into_symbols();

        let required: SymbolSet = [a.clone()].into_iter().collect();
        let ctx = RuleContext::new(&mut symbols, "Test").with_required(&required);
        assert!(ctx.is_required(&a));
        assert!(!ctx.is_required(&b));

        let ctx = RuleContext::new(&mut symbols, "Test");
        assert!(ctx.is_required(&b));
    }

    #[test]
    fn test_rule_trace() {
        let trace = RuleTrace::new("TestRule", 2, "before\n", "after\n");
        assert_eq!(trace.rule_name, "TestRule");
        assert_eq!(trace.iteration, 2);
    }

    #[test]
    fn test_format_trace() {
        let mut p = PlanBuilder::new();
        let a = p.symbol("a");
        let mut result = OptimizedPlan::new(LogicalPlan::new(p.values(&[&a])));
        assert!(result.format_trace().contains("(no trace available)"));

        result.iterations = 2;
        result.rules_applied = 1;
        result
            .trace
            .push(RuleTrace::new("PruneValuesColumns", 1, "Values[a, b]\n", "Values[a]\n"));

        let formatted = result.format_trace();
        assert!(formatted.starts_with("Optimization completed in 2 iterations, 1 rules applied"));
        assert!(formatted.contains("--- Rule 1 applied in iteration 1: PruneValuesColumns ---"));
        assert!(formatted.contains("Before:\nValues[a, b]\nAfter:\nValues[a]\n"));
    }
}
