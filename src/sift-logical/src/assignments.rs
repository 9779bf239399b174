//! Ordered symbol-to-expression assignments of a Project node.

use common_error::{SiftResult, ensure};
use serde::{Deserialize, Serialize};
use sift_core::{Symbol, SymbolSet};

use crate::expr::Expr;

/// An ordered mapping from output symbol to the expression that computes it.
///
/// Output symbols are unique. Order is significant: it defines the column
/// order of the owning node's schema.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Assignments {
    entries: Vec<(Symbol, Expr)>,
}

impl Assignments {
    /// Create empty assignments (a zero-column projection).
    pub fn new() -> Self {
        Self::default()
    }

    /// Build assignments from pairs, rejecting duplicate output symbols.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Symbol, Expr)>) -> SiftResult<Self> {
        let mut assignments = Self::new();
        for (symbol, expr) in pairs {
            assignments = assignments.with(symbol, expr)?;
        }
        Ok(assignments)
    }

    /// Assignments mapping each symbol to itself.
    ///
    /// Duplicate input symbols are kept once.
    pub fn identity<'a>(symbols: impl IntoIterator<Item = &'a Symbol>) -> Self {
        let mut entries: Vec<(Symbol, Expr)> = Vec::new();
        for symbol in symbols {
            if !entries.iter().any(|(existing, _)| existing == symbol) {
                entries.push((symbol.clone(), Expr::Symbol(symbol.clone())));
            }
        }
        Self { entries }
    }

    /// Return these assignments extended with one more entry.
    pub fn with(mut self, symbol: Symbol, expr: Expr) -> SiftResult<Self> {
        ensure!(
            self.get(&symbol).is_none(),
            SymbolError: "symbol {symbol:?} is assigned more than once"
        );
        self.entries.push((symbol, expr));
        Ok(self)
    }

    /// The expression assigned to `symbol`, if any.
    pub fn get(&self, symbol: &Symbol) -> Option<&Expr> {
        self.entries
            .iter()
            .find(|(output, _)| output == symbol)
            .map(|(_, expr)| expr)
    }

    /// Output symbols in order.
    pub fn outputs(&self) -> Vec<Symbol> {
        self.entries.iter().map(|(symbol, _)| symbol.clone()).collect()
    }

    /// Iterate over `(output, expression)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &Expr)> {
        self.entries.iter().map(|(symbol, expr)| (symbol, expr))
    }

    /// Number of assignments.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no assignments.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check whether every assignment maps a symbol to itself.
    pub fn is_identity(&self) -> bool {
        self.entries
            .iter()
            .all(|(symbol, expr)| expr.as_symbol() == Some(symbol))
    }

    /// Keep only the assignments whose output satisfies `keep`, preserving order.
    #[must_use]
    pub fn filter(&self, keep: impl Fn(&Symbol) -> bool) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .filter(|(symbol, _)| keep(symbol))
                .cloned()
                .collect(),
        }
    }

    /// Symbols read by the assigned expressions.
    pub fn referenced_symbols(&self) -> SymbolSet {
        let mut referenced = SymbolSet::new();
        for (_, expr) in &self.entries {
            expr.collect_symbols(&mut referenced);
        }
        referenced
    }

    /// Output symbols that appear more than once (possible only for deserialized input).
    pub fn duplicate_outputs(&self) -> Vec<Symbol> {
        let mut seen = SymbolSet::new();
        let mut duplicates = Vec::new();
        for (symbol, _) in &self.entries {
            if !seen.insert(symbol.clone()) && !duplicates.contains(symbol) {
                duplicates.push(symbol.clone());
            }
        }
        duplicates
    }
}

impl std::fmt::Display for Assignments {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<_> = self
            .entries
            .iter()
            .map(|(symbol, expr)| format!("{symbol} := {expr}"))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}
