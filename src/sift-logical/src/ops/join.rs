//! Join operator.

use serde::{Deserialize, Serialize};
use sift_core::{Symbol, SymbolSet};

use crate::expr::Expr;

use super::PlanNode;

/// Join type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinKind {
    /// Inner join.
    Inner,
    /// Left outer join.
    Left,
    /// Right outer join.
    Right,
    /// Full outer join.
    Full,
}

impl std::fmt::Display for JoinKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inner => write!(f, "INNER"),
            Self::Left => write!(f, "LEFT"),
            Self::Right => write!(f, "RIGHT"),
            Self::Full => write!(f, "FULL"),
        }
    }
}

/// One `left = right` equality of a join condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquiJoinClause {
    /// Symbol from the left source.
    pub left: Symbol,
    /// Symbol from the right source.
    pub right: Symbol,
}

impl EquiJoinClause {
    /// Create an equality clause.
    pub fn new(left: &Symbol, right: &Symbol) -> Self {
        Self {
            left: left.clone(),
            right: right.clone(),
        }
    }
}

impl std::fmt::Display for EquiJoinClause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.left, self.right)
    }
}

/// Join operator.
///
/// Unlike pass-through operators, a join lists the symbols it exposes from
/// each side explicitly, so its schema can shrink without touching its sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinNode {
    /// Join type.
    pub kind: JoinKind,
    /// Left source.
    pub left: Box<PlanNode>,
    /// Right source.
    pub right: Box<PlanNode>,
    /// Equality conditions.
    pub criteria: Vec<EquiJoinClause>,
    /// Additional non-equi join condition.
    pub filter: Option<Expr>,
    /// Symbols exposed from the left source.
    pub left_output_symbols: Vec<Symbol>,
    /// Symbols exposed from the right source.
    pub right_output_symbols: Vec<Symbol>,
}

impl JoinNode {
    /// Create a join exposing every symbol of both sources.
    pub fn new(
        kind: JoinKind,
        left: PlanNode,
        right: PlanNode,
        criteria: Vec<EquiJoinClause>,
        filter: Option<Expr>,
    ) -> Self {
        let left_output_symbols = left.output_symbols();
        let right_output_symbols = right.output_symbols();
        Self {
            kind,
            left: Box::new(left),
            right: Box::new(right),
            criteria,
            filter,
            left_output_symbols,
            right_output_symbols,
        }
    }

    /// Left outputs followed by right outputs.
    pub fn output_symbols(&self) -> Vec<Symbol> {
        self.left_output_symbols
            .iter()
            .chain(&self.right_output_symbols)
            .cloned()
            .collect()
    }

    /// Symbols read by the join condition.
    pub fn condition_symbols(&self) -> SymbolSet {
        let mut referenced: SymbolSet = self
            .criteria
            .iter()
            .flat_map(|clause| [clause.left.clone(), clause.right.clone()])
            .collect();
        if let Some(filter) = &self.filter {
            filter.collect_symbols(&mut referenced);
        }
        referenced
    }
}
