//! Logical plan structure and the plan builder.

use common_error::SiftResult;
use serde::{Deserialize, Serialize};
use sift_core::{DataType, Symbol, SymbolAllocator};

use crate::assignments::Assignments;
use crate::expr::Expr;
use crate::ops::{
    ApplyNode, EquiJoinClause, FilterNode, JoinKind, JoinNode, LimitNode, PlanNode, ProjectNode,
    SetExpression, TableScanNode, ValuesNode,
};

/// A logical plan: a tree of plan nodes with a single root.
///
/// # Plan Invariants
///
/// 1. **Scope consistency**: every symbol a node references is produced by one
///    of its children, or is a correlation symbol visible from an enclosing Apply.
/// 2. **Unique outputs**: no node produces the same symbol twice.
/// 3. **Closed**: the root references no free symbols.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicalPlan {
    /// The root operator of the plan.
    pub root: PlanNode,
}

impl LogicalPlan {
    /// Create a new logical plan with the given root operator.
    pub fn new(root: PlanNode) -> Self {
        Self { root }
    }

    /// Get a reference to the root operator.
    pub fn root(&self) -> &PlanNode {
        &self.root
    }

    /// Consume the plan, returning its root operator.
    pub fn into_root(self) -> PlanNode {
        self.root
    }

    /// The ordered schema of the plan.
    pub fn output_symbols(&self) -> Vec<Symbol> {
        self.root.output_symbols()
    }

    /// Generate a tree-formatted explanation of the plan.
    pub fn explain(&self) -> String {
        let mut output = String::new();
        output.push_str("Logical Plan:\n");
        output.push_str(&self.root.explain());
        output
    }

    /// Count the number of operators in the plan.
    pub fn operator_count(&self) -> usize {
        self.root.node_count()
    }

    /// Get the maximum depth of the plan tree.
    pub fn depth(&self) -> usize {
        fn max_depth(node: &PlanNode) -> usize {
            1 + node
                .children()
                .into_iter()
                .map(max_depth)
                .max()
                .unwrap_or(0)
        }
        max_depth(&self.root)
    }

    /// Check if the plan contains an operator satisfying `predicate`.
    pub fn contains_node<F>(&self, predicate: F) -> bool
    where
        F: Fn(&PlanNode) -> bool,
    {
        self.root.contains(&predicate)
    }
}

impl From<PlanNode> for LogicalPlan {
    fn from(root: PlanNode) -> Self {
        Self::new(root)
    }
}

impl std::fmt::Display for LogicalPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.root.explain())
    }
}

/// Builder for plan nodes that owns the symbol table they draw from.
///
/// Nodes are built bottom-up: create symbols, build leaves, then wrap them.
///
/// # Example
///
/// ```rust
/// use sift_logical::{PlanBuilder, SetExpression};
///
/// let mut p = PlanBuilder::new();
/// let a = p.symbol("a");
/// let s1 = p.symbol("s1");
/// let s2 = p.symbol("s2");
/// let in_result = p.symbol("in_result");
///
/// let plan = p.apply(
///     vec![(in_result, SetExpression::in_(&a, &s1))],
///     vec![],
///     p.values(&[&a]),
///     p.values(&[&s1, &s2]),
/// );
/// assert_eq!(plan.output_symbols().len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct PlanBuilder {
    symbols: SymbolAllocator,
}

impl PlanBuilder {
    /// Create a builder with an empty symbol table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder continuing from an existing symbol table.
    pub fn with_symbols(symbols: SymbolAllocator) -> Self {
        Self { symbols }
    }

    /// The symbol named `name`, allocating an `Int64` symbol on first use.
    pub fn symbol(&mut self, name: &str) -> Symbol {
        self.symbols.symbol(name)
    }

    /// A fresh symbol of the given type.
    pub fn symbol_with_type(&mut self, name: &str, data_type: DataType) -> Symbol {
        self.symbols.new_symbol(name, data_type)
    }

    /// Values node with the given columns and no rows.
    pub fn values(&self, symbols: &[&Symbol]) -> PlanNode {
        PlanNode::Values(ValuesNode::empty(
            symbols.iter().map(|s| (*s).clone()).collect(),
        ))
    }

    /// Values node with the given columns and literal rows.
    pub fn values_with_rows(&self, symbols: &[&Symbol], rows: Vec<Vec<Expr>>) -> PlanNode {
        PlanNode::Values(ValuesNode::new(
            symbols.iter().map(|s| (*s).clone()).collect(),
            rows,
        ))
    }

    /// Table scan binding each symbol to the connector column of the same name.
    pub fn table_scan(&self, table: &str, symbols: &[&Symbol]) -> PlanNode {
        PlanNode::TableScan(TableScanNode::new(
            table,
            symbols
                .iter()
                .map(|s| ((*s).clone(), s.name().to_string()))
                .collect(),
        ))
    }

    /// Projection over `source`.
    pub fn project(&self, assignments: Assignments, source: PlanNode) -> PlanNode {
        PlanNode::Project(ProjectNode::new(source, assignments))
    }

    /// Identity projection of `symbols` over `source`.
    pub fn identity_project(&self, symbols: &[&Symbol], source: PlanNode) -> PlanNode {
        PlanNode::Project(ProjectNode::new(
            source,
            Assignments::identity(symbols.iter().copied()),
        ))
    }

    /// Filter over `source`.
    pub fn filter(&self, predicate: Expr, source: PlanNode) -> PlanNode {
        PlanNode::Filter(FilterNode::new(source, predicate))
    }

    /// Limit over `source`.
    pub fn limit(&self, count: u64, source: PlanNode) -> PlanNode {
        PlanNode::Limit(LimitNode::new(source, count))
    }

    /// Apply evaluating `subquery` per row of `input`.
    pub fn apply(
        &self,
        assignments: Vec<(Symbol, SetExpression)>,
        correlation: Vec<Symbol>,
        input: PlanNode,
        subquery: PlanNode,
    ) -> PlanNode {
        PlanNode::Apply(ApplyNode::new(input, subquery, correlation, assignments))
    }

    /// Join exposing every symbol of both sources.
    pub fn join(
        &self,
        kind: JoinKind,
        left: PlanNode,
        right: PlanNode,
        criteria: Vec<EquiJoinClause>,
        filter: Option<Expr>,
    ) -> PlanNode {
        PlanNode::Join(JoinNode::new(kind, left, right, criteria, filter))
    }

    /// The symbol table built so far.
    pub fn symbols(&self) -> &SymbolAllocator {
        &self.symbols
    }

    /// Mutable access to the symbol table.
    pub fn symbols_mut(&mut self) -> &mut SymbolAllocator {
        &mut self.symbols
    }

    /// Consume the builder, returning its symbol table.
    pub fn into_symbols(self) -> SymbolAllocator {
        self.symbols
    }

    /// Wrap `root` into a plan, returning it with the symbol table.
    pub fn build(self, root: PlanNode) -> (LogicalPlan, SymbolAllocator) {
        (LogicalPlan::new(root), self.symbols)
    }

    /// Register every symbol `plan` mentions into this builder's table.
    ///
    /// Used for deserialized plans whose symbols were not allocated here.
    pub fn adopt(&mut self, plan: &PlanNode) -> SiftResult<()> {
        let mut mentioned = plan.free_symbols();
        collect_mentioned(plan, &mut mentioned);
        for symbol in &mentioned {
            if !self.symbols.contains(symbol) {
                self.symbols.register(symbol)?;
            }
        }
        Ok(())
    }
}

fn collect_mentioned(node: &PlanNode, out: &mut sift_core::SymbolSet) {
    out.extend(node.output_symbols());
    out.extend(node.referenced_symbols());
    if let PlanNode::Apply(apply) = node {
        out.extend(apply.correlation.iter().cloned());
    }
    for child in node.children() {
        collect_mentioned(child, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{lit, sym};

    #[test]
    fn test_builder_plan_shape() {
        let mut p = PlanBuilder::new();
        let a = p.symbol("a");
        let b = p.symbol("b");

        let root = p.limit(
            10,
            p.filter(sym(&a).gt(lit(18i64)), p.table_scan("people", &[&a, &b])),
        );
        let (plan, symbols) = p.build(root);

        assert_eq!(plan.operator_count(), 3);
        assert_eq!(plan.depth(), 3);
        assert_eq!(plan.output_symbols(), vec![a, b]);
        assert_eq!(symbols.len(), 2);
        assert!(plan.contains_node(|node| matches!(node, PlanNode::TableScan(_))));
        assert!(!plan.contains_node(|node| matches!(node, PlanNode::Apply(_))));
    }

    #[test]
    fn test_plan_serde_round_trip() {
        let mut p = PlanBuilder::new();
        let a = p.symbol("a");
        let s = p.symbol("s");
        let r = p.symbol("r");

        let root = p.apply(
            vec![(r, SetExpression::in_(&a, &s))],
            vec![a.clone()],
            p.values_with_rows(&[&a], vec![vec![lit(1i64)], vec![lit(2i64)]]),
            p.values(&[&s]),
        );
        let plan = LogicalPlan::new(root);

        let json = serde_json::to_string(&plan).unwrap();
        let decoded: LogicalPlan = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, plan);
    }

    #[test]
    fn test_adopt_registers_symbols() {
        let mut source = PlanBuilder::new();
        let a = source.symbol("a");
        let b = source.symbol("b");
        let root = source.values(&[&a, &b]);

        let mut p = PlanBuilder::new();
        p.adopt(&root).unwrap();
        assert!(p.symbols().contains(&a));
        assert!(p.symbols().contains(&b));
        assert_eq!(p.symbols().len(), 2);
    }
}
