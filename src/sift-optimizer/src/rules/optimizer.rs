//! The iterative optimizer that applies rules to logical plans.
//!
//! The optimizer walks the plan top-down, pushing each node's demand (the
//! symbols its parent needs) to the rules and then to its children. Passes
//! repeat until one makes no replacement or the iteration cap is reached.

use common_config::OptimizerConfig;
use common_display::TreeNode;
use common_error::{SiftError, SiftResult};
use log::{debug, trace, warn};
use sift_core::{Symbol, SymbolAllocator, SymbolSet};
use sift_logical::validation::ensure_valid;
use sift_logical::{LogicalPlan, PlanNode};

use super::rule::{OptimizedPlan, Rule, RuleContext, RuleOutcome, RuleTrace};

/// Bookkeeping for one optimization run.
#[derive(Default)]
struct RunState {
    iteration: usize,
    rules_applied: usize,
    trace: Vec<RuleTrace>,
    last_fired: Option<(&'static str, String)>,
}

/// The iterative rewrite engine.
///
/// # Rewrite Order
///
/// At every node the rules are tried in registration order; the first one
/// returning a replacement wins and the replacement is matched again until no
/// rule fires. Only then does the optimizer descend into the children, each
/// with the demand the (rewritten) node places on it.
///
/// # Termination
///
/// - At most `max_node_rewrites` consecutive replacements at one node per pass
/// - At most `max_iterations` passes over the whole plan
///
/// Breaching either cap is reported as [`SiftError::NonConvergence`], never
/// silently truncated.
pub struct IterativeOptimizer {
    /// The rules to apply (in order).
    rules: Vec<Box<dyn Rule>>,
    /// Configuration.
    config: OptimizerConfig,
}

impl IterativeOptimizer {
    /// Create a new optimizer with the given rules.
    pub fn new(rules: Vec<Box<dyn Rule>>) -> Self {
        Self {
            rules,
            config: OptimizerConfig::default(),
        }
    }

    /// Create a new optimizer with custom config.
    pub fn with_config(rules: Vec<Box<dyn Rule>>, config: OptimizerConfig) -> Self {
        Self { rules, config }
    }

    /// Add a rule to the optimizer.
    pub fn add_rule<R: Rule + 'static>(&mut self, rule: R) {
        self.rules.push(Box::new(rule));
    }

    /// Names of the registered rules, in order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// The configuration in use.
    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Optimize a logical plan.
    ///
    /// Applies rules in fixed-point iteration until a pass changes nothing.
    /// The returned plan produces exactly the same root symbols as the input.
    pub fn optimize(
        &self,
        plan: LogicalPlan,
        symbols: &mut SymbolAllocator,
    ) -> SiftResult<OptimizedPlan> {
        self.prepare(&plan, symbols)?;

        let expected = plan.output_symbols();
        let required: SymbolSet = expected.iter().cloned().collect();
        let mut root = plan.into_root();
        let mut state = RunState::default();

        debug!(
            "Optimizing plan with {} nodes using {} rules",
            root.node_count(),
            self.rules.len()
        );

        loop {
            if state.iteration >= self.config.max_iterations {
                let (rule, node) = state.last_fired.unwrap_or(("<none>", root.label()));
                warn!(
                    "Optimizer exceeded {} iterations, last rule fired was '{}'",
                    self.config.max_iterations, rule
                );
                return Err(SiftError::non_convergence(rule, node, state.iteration));
            }

            state.iteration += 1;
            let before = state.rules_applied;
            root = self.rewrite(root, &required, symbols, &mut state)?;
            let replacements = state.rules_applied - before;

            debug!(
                "Iteration {} made {} replacements",
                state.iteration, replacements
            );
            if replacements == 0 {
                debug!(
                    "No changes in iteration {}, reached fixpoint",
                    state.iteration
                );
                break;
            }
        }

        Self::finish(root, &expected, state)
    }

    /// Optimize with a single pass (no fixpoint iteration).
    pub fn optimize_once(
        &self,
        plan: LogicalPlan,
        symbols: &mut SymbolAllocator,
    ) -> SiftResult<OptimizedPlan> {
        self.prepare(&plan, symbols)?;

        let expected = plan.output_symbols();
        let required: SymbolSet = expected.iter().cloned().collect();
        let mut state = RunState {
            iteration: 1,
            ..RunState::default()
        };
        let root = self.rewrite(plan.into_root(), &required, symbols, &mut state)?;

        Self::finish(root, &expected, state)
    }

    fn prepare(&self, plan: &LogicalPlan, symbols: &SymbolAllocator) -> SiftResult<()> {
        self.config.validate()?;
        if self.config.validate_plans {
            ensure_valid(plan, Some(symbols))?;
        }
        Ok(())
    }

    fn finish(
        root: PlanNode,
        expected: &[Symbol],
        state: RunState,
    ) -> SiftResult<OptimizedPlan> {
        let actual = root.output_symbols();
        if actual != expected {
            return Err(SiftError::internal(format!(
                "optimized plan produces {actual:?}, expected {expected:?}"
            )));
        }

        Ok(OptimizedPlan {
            plan: LogicalPlan::new(root),
            iterations: state.iteration,
            rules_applied: state.rules_applied,
            trace: state.trace,
        })
    }

    /// Rewrite `node` until no rule fires, then rewrite its children.
    fn rewrite(
        &self,
        node: PlanNode,
        required: &SymbolSet,
        symbols: &mut SymbolAllocator,
        state: &mut RunState,
    ) -> SiftResult<PlanNode> {
        let mut node = node;
        let mut rewrites = 0;

        while let Some((rule, replacement)) = self.apply_first(&node, required, symbols)? {
            rewrites += 1;
            if rewrites > self.config.max_node_rewrites {
                warn!(
                    "Rule '{}' keeps rewriting {} after {} replacements",
                    rule.name(),
                    node.kind(),
                    self.config.max_node_rewrites
                );
                return Err(SiftError::non_convergence(
                    rule.name(),
                    node.label(),
                    state.iteration,
                ));
            }

            let produced: SymbolSet = replacement.output_symbols().into_iter().collect();
            if let Some(missing) = required.difference(&produced).next() {
                return Err(SiftError::rule_failed(
                    rule.name(),
                    format!(
                        "replacement for {} no longer produces required symbol {missing:?}",
                        node.label()
                    ),
                ));
            }

            debug!(
                "Rule '{}' rewrote {} in iteration {}",
                rule.name(),
                node.kind(),
                state.iteration
            );
            if self.config.enable_trace {
                state.trace.push(RuleTrace::new(
                    rule.name(),
                    state.iteration,
                    node.explain(),
                    replacement.explain(),
                ));
            }
            state.rules_applied += 1;
            state.last_fired = Some((rule.name(), replacement.label()));
            node = replacement;
        }

        let demands: Vec<SymbolSet> = (0..node.child_count())
            .map(|index| node.required_child_symbols(index, required))
            .collect();
        let (shell, children) = node.take_children();

        let mut rewritten = Vec::with_capacity(children.len());
        for (child, demand) in children.into_iter().zip(&demands) {
            rewritten.push(self.rewrite(child, demand, symbols, state)?);
        }
        shell.with_children(rewritten)
    }

    /// Apply the first rule that fires on `node`.
    fn apply_first(
        &self,
        node: &PlanNode,
        required: &SymbolSet,
        symbols: &mut SymbolAllocator,
    ) -> SiftResult<Option<(&dyn Rule, PlanNode)>> {
        for rule in &self.rules {
            let Some(captures) = rule.pattern().matches(node) else {
                continue;
            };

            let mut ctx = RuleContext::new(symbols, rule.name()).with_required(required);
            match rule.apply(node, &captures, &mut ctx)? {
                RuleOutcome::Replace(replacement) if replacement == *node => {
                    trace!(
                        "Rule '{}' returned {} unchanged, ignoring",
                        rule.name(),
                        node.kind()
                    );
                }
                RuleOutcome::Replace(replacement) => {
                    return Ok(Some((rule.as_ref(), replacement)));
                }
                RuleOutcome::Unchanged => {
                    trace!("Rule '{}' did not fire on {}", rule.name(), node.kind());
                }
            }
        }
        Ok(None)
    }
}

impl Default for IterativeOptimizer {
    fn default() -> Self {
        Self::new(super::pruning_rules())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::LazyLock;

    use sift_core::Symbol;
    use sift_logical::{Assignments, LimitNode, NodeKind, PlanBuilder, ProjectNode};

    use super::*;
    use crate::pattern::{Captures, Pattern};

    /// Raises every limit by one, forever.
    struct BumpLimit;

    static LIMIT: LazyLock<Pattern> = LazyLock::new(|| Pattern::typed(NodeKind::Limit));
    static PROJECT: LazyLock<Pattern> = LazyLock::new(|| Pattern::typed(NodeKind::Project));

    impl Rule for BumpLimit {
        fn name(&self) -> &'static str {
            "BumpLimit"
        }

        fn pattern(&self) -> &Pattern {
            &LIMIT
        }

        fn apply(
            &self,
            node: &PlanNode,
            _captures: &Captures<'_>,
            _ctx: &mut RuleContext<'_>,
        ) -> SiftResult<RuleOutcome> {
            let PlanNode::Limit(limit) = node else {
                return Ok(RuleOutcome::Unchanged);
            };
            Ok(RuleOutcome::Replace(PlanNode::Limit(LimitNode::new(
                (*limit.source).clone(),
                limit.count + 1,
            ))))
        }
    }

    /// Replaces every projection by an empty one, breaking its contract.
    struct DropEverything;

    impl Rule for DropEverything {
        fn name(&self) -> &'static str {
            "DropEverything"
        }

        fn pattern(&self) -> &Pattern {
            &PROJECT
        }

        fn apply(
            &self,
            node: &PlanNode,
            _captures: &Captures<'_>,
            _ctx: &mut RuleContext<'_>,
        ) -> SiftResult<RuleOutcome> {
            let PlanNode::Project(project) = node else {
                return Ok(RuleOutcome::Unchanged);
            };
            Ok(RuleOutcome::Replace(PlanNode::Project(ProjectNode::new(
                (*project.source).clone(),
                Assignments::new(),
            ))))
        }
    }

    fn sample() -> (LogicalPlan, SymbolAllocator, Vec<Symbol>) {
        let mut p = PlanBuilder::new();
        let a = p.symbol("a");
        let b = p.symbol("b");
        let root = p.identity_project(&[&a], p.values(&[&a, &b]));
        let (plan, symbols) = p.build(root);
        (plan, symbols, vec![a, b])
    }

    #[test]
    fn test_optimizer_fixpoint() {
        let (plan, mut symbols, _) = sample();
        let optimizer = IterativeOptimizer::new(vec![]);

        let result = optimizer.optimize(plan.clone(), &mut symbols).unwrap();
        assert_eq!(result.iterations, 1);
        assert_eq!(result.rules_applied, 0);
        assert_eq!(result.plan, plan);
    }

    #[test]
    fn test_optimizer_prunes_values() {
        let (plan, mut symbols, syms) = sample();
        let config = OptimizerConfig::default().with_trace(true);
        let optimizer = IterativeOptimizer::with_config(crate::pruning_rules(), config);

        let result = optimizer.optimize(plan, &mut symbols).unwrap();
        assert_eq!(result.plan.output_symbols(), vec![syms[0].clone()]);
        assert_eq!(result.plan.root().explain(), "Values[a]\n");
        assert_eq!(result.rules_applied, 2);
        assert_eq!(result.iterations, 3);
        assert_eq!(result.trace[0].rule_name, "PruneValuesColumns");
        assert_eq!(result.trace[1].rule_name, "RemoveRedundantIdentityProjections");
    }

    #[test]
    fn test_node_rewrite_cap() {
        let mut p = PlanBuilder::new();
        let a = p.symbol("a");
        let root = p.limit(1, p.values(&[&a]));
        let (plan, mut symbols) = p.build(root);

        let config = OptimizerConfig::default().with_max_node_rewrites(10);
        let optimizer = IterativeOptimizer::with_config(vec![Box::new(BumpLimit)], config);

        let err = optimizer.optimize(plan, &mut symbols).unwrap_err();
        assert!(matches!(
            err,
            SiftError::NonConvergence { ref rule, ref node, .. }
                if rule == "BumpLimit" && node == "Limit[11]"
        ));
    }

    #[test]
    fn test_contract_violation_is_reported() {
        let (plan, mut symbols, _) = sample();
        let optimizer = IterativeOptimizer::new(vec![Box::new(DropEverything)]);

        let err = optimizer.optimize(plan, &mut symbols).unwrap_err();
        assert!(matches!(
            err,
            SiftError::RuleFailed { ref rule, .. } if rule == "DropEverything"
        ));
    }

    #[test]
    fn test_invalid_input_rejected() {
        let mut p = PlanBuilder::new();
        let a = p.symbol("a");
        let b = p.symbol("b");
        let root = p.identity_project(&[&b], p.values(&[&a]));
        let (plan, mut symbols) = p.build(root);

        let err = IterativeOptimizer::default()
            .optimize(plan.clone(), &mut symbols)
            .unwrap_err();
        assert!(matches!(err, SiftError::InvalidPlan(_)));

        let config = OptimizerConfig::default().with_max_iterations(0);
        let err = IterativeOptimizer::with_config(vec![], config)
            .optimize(plan, &mut symbols)
            .unwrap_err();
        assert!(matches!(err, SiftError::InvalidParameter(_)));
    }

    #[test]
    fn test_optimize_once() {
        let (plan, mut symbols, _) = sample();
        let optimizer = IterativeOptimizer::default();

        // One pass narrows the Values; removing the projection needs another
        let once = optimizer.optimize_once(plan, &mut symbols).unwrap();
        assert_eq!(once.iterations, 1);
        assert_eq!(once.rules_applied, 1);
        assert_eq!(
            once.plan.root().explain(),
            "Project[a := a]\n└─ Values[a]\n"
        );
    }
}
