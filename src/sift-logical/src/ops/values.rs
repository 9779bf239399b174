//! Values operator: literal rows.

use serde::{Deserialize, Serialize};
use sift_core::{Symbol, SymbolSet};

use crate::expr::Expr;

/// Values operator - a constant relation of literal rows.
///
/// Every row holds one expression per output symbol. A Values node with zero
/// columns still produces its rows, so pruning columns never changes cardinality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuesNode {
    /// Output symbols, one per column.
    pub output_symbols: Vec<Symbol>,
    /// Literal rows.
    pub rows: Vec<Vec<Expr>>,
}

impl ValuesNode {
    /// Create a values node from columns and rows.
    pub fn new(output_symbols: Vec<Symbol>, rows: Vec<Vec<Expr>>) -> Self {
        Self {
            output_symbols,
            rows,
        }
    }

    /// Create a values node with the given columns and no rows.
    pub fn empty(output_symbols: Vec<Symbol>) -> Self {
        Self::new(output_symbols, Vec::new())
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Symbols referenced by the row expressions (correlated references only).
    pub fn referenced_symbols(&self) -> SymbolSet {
        let mut referenced = SymbolSet::new();
        for row in &self.rows {
            for expr in row {
                expr.collect_symbols(&mut referenced);
            }
        }
        referenced
    }

    /// Keep only the columns whose symbol satisfies `keep`; rows keep their count.
    #[must_use]
    pub fn retain_columns(&self, keep: impl Fn(&Symbol) -> bool) -> Self {
        let kept: Vec<usize> = self
            .output_symbols
            .iter()
            .enumerate()
            .filter(|(_, symbol)| keep(symbol))
            .map(|(i, _)| i)
            .collect();

        Self {
            output_symbols: kept.iter().map(|&i| self.output_symbols[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| kept.iter().filter_map(|&i| row.get(i).cloned()).collect())
                .collect(),
        }
    }
}
