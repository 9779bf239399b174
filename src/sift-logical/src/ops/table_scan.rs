//! Table scan operator: an opaque connector leaf.

use serde::{Deserialize, Serialize};
use sift_core::Symbol;

/// Table scan operator.
///
/// The optimizer treats the scan as an opaque leaf produced by a connector;
/// it only knows which symbol is bound to which connector column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableScanNode {
    /// Fully qualified table name.
    pub table: String,
    /// Output symbol to connector column bindings, in output order.
    pub columns: Vec<(Symbol, String)>,
}

impl TableScanNode {
    /// Create a scan of `table` with the given column bindings.
    pub fn new(table: impl Into<String>, columns: Vec<(Symbol, String)>) -> Self {
        Self {
            table: table.into(),
            columns,
        }
    }

    /// Output symbols in order.
    pub fn output_symbols(&self) -> Vec<Symbol> {
        self.columns.iter().map(|(symbol, _)| symbol.clone()).collect()
    }

    /// Keep only the columns whose symbol satisfies `keep`.
    #[must_use]
    pub fn retain_columns(&self, keep: impl Fn(&Symbol) -> bool) -> Self {
        Self {
            table: self.table.clone(),
            columns: self
                .columns
                .iter()
                .filter(|(symbol, _)| keep(symbol))
                .cloned()
                .collect(),
        }
    }
}
