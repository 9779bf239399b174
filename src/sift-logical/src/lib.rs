//! Logical plan layer for Sift.
//!
//! `sift-logical` provides the plan node model the optimizer rewrites:
//!
//! - **Expressions**: scalar expressions over symbols ([`expr`])
//! - **Plan nodes**: the closed operator set ([`ops`]), including `Apply` for
//!   correlated subqueries
//! - **Logical plan**: a tree with a single root, built with [`PlanBuilder`]
//! - **Validation**: structural and semantic checks ([`validation`])
//!
//! # Example
//!
//! ```rust
//! use sift_logical::PlanBuilder;
//! use sift_logical::expr::{lit, sym};
//!
//! let mut p = PlanBuilder::new();
//! let a = p.symbol("a");
//! let b = p.symbol("b");
//! let root = p.limit(10, p.filter(sym(&a).gt(lit(18i64)), p.table_scan("people", &[&a, &b])));
//!
//! println!("{}", root.explain());
//! ```

mod assignments;
mod explain;
pub mod expr;
pub mod ops;
mod plan;
pub mod validation;

// Re-export commonly used types
pub use assignments::Assignments;
pub use expr::{BinaryOp, Expr};
pub use ops::{
    ApplyNode, EquiJoinClause, FilterNode, JoinKind, JoinNode, LimitNode, NodeKind, PlanNode,
    ProjectNode, Quantifier, SetExpression, TableScanNode, ValuesNode,
};
pub use plan::{LogicalPlan, PlanBuilder};
