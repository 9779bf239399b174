//! Apply operator: correlated subquery evaluation.

use serde::{Deserialize, Serialize};
use sift_core::{Symbol, SymbolSet};

use crate::expr::BinaryOp;

use super::PlanNode;

/// Quantifier of a quantified comparison (`a > ALL (subquery)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quantifier {
    /// Comparison must hold for every subquery row.
    All,
    /// Comparison must hold for at least one subquery row.
    Any,
}

impl std::fmt::Display for Quantifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "ALL"),
            Self::Any => write!(f, "ANY"),
        }
    }
}

/// A scalar derived from evaluating the subquery for one input row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetExpression {
    /// `value IN (subquery producing reference)`.
    In {
        /// Symbol compared against the subquery, usually from the input side.
        value: Symbol,
        /// Symbol whose values form the set, usually a subquery output.
        reference: Symbol,
    },
    /// `value <op> ALL|ANY (subquery producing reference)`.
    QuantifiedComparison {
        /// Comparison operator.
        op: BinaryOp,
        /// Quantifier.
        quantifier: Quantifier,
        /// Symbol compared against the subquery.
        value: Symbol,
        /// Symbol whose values are compared.
        reference: Symbol,
    },
    /// `EXISTS (subquery)`; reads no subquery column.
    Exists,
}

impl SetExpression {
    /// Create an `IN` expression.
    pub fn in_(value: &Symbol, reference: &Symbol) -> Self {
        Self::In {
            value: value.clone(),
            reference: reference.clone(),
        }
    }

    /// Create a quantified comparison.
    pub fn quantified(
        op: BinaryOp,
        quantifier: Quantifier,
        value: &Symbol,
        reference: &Symbol,
    ) -> Self {
        Self::QuantifiedComparison {
            op,
            quantifier,
            value: value.clone(),
            reference: reference.clone(),
        }
    }

    /// Every symbol this expression reads, regardless of which side produces it.
    pub fn symbols(&self) -> Vec<Symbol> {
        match self {
            Self::In { value, reference } | Self::QuantifiedComparison { value, reference, .. } => {
                vec![value.clone(), reference.clone()]
            }
            Self::Exists => Vec::new(),
        }
    }
}

impl std::fmt::Display for SetExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::In { value, reference } => write!(f, "{value} IN {reference}"),
            Self::QuantifiedComparison {
                op,
                quantifier,
                value,
                reference,
            } => write!(f, "{value} {op} {quantifier} {reference}"),
            Self::Exists => write!(f, "EXISTS"),
        }
    }
}

/// Apply operator.
///
/// For each row of `input`, evaluates `subquery` with the `correlation`
/// symbols bound to that row's values and exposes one column per assignment.
/// Outputs are the input symbols followed by the assignment symbols.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplyNode {
    /// Outer relation.
    pub input: Box<PlanNode>,
    /// Inner relation, evaluated per input row.
    pub subquery: Box<PlanNode>,
    /// Input symbols visible inside the subquery.
    pub correlation: Vec<Symbol>,
    /// Output symbol to set expression, in output order.
    pub assignments: Vec<(Symbol, SetExpression)>,
}

impl ApplyNode {
    /// Create a new apply.
    pub fn new(
        input: PlanNode,
        subquery: PlanNode,
        correlation: Vec<Symbol>,
        assignments: Vec<(Symbol, SetExpression)>,
    ) -> Self {
        Self {
            input: Box::new(input),
            subquery: Box::new(subquery),
            correlation,
            assignments,
        }
    }

    /// Input symbols followed by assignment output symbols.
    pub fn output_symbols(&self) -> Vec<Symbol> {
        let mut outputs = self.input.output_symbols();
        outputs.extend(self.assignment_outputs());
        outputs
    }

    /// Output symbols of the assignments, in order.
    pub fn assignment_outputs(&self) -> Vec<Symbol> {
        self.assignments
            .iter()
            .map(|(symbol, _)| symbol.clone())
            .collect()
    }

    /// Union of every symbol read by any assignment.
    pub fn assignment_symbols(&self) -> SymbolSet {
        self.assignments
            .iter()
            .flat_map(|(_, expression)| expression.symbols())
            .collect()
    }

    /// The subquery outputs actually read by the assignments.
    ///
    /// A symbol counts once however many assignments read it; symbols that
    /// only the input produces contribute nothing.
    pub fn referenced_subquery_symbols(&self) -> SymbolSet {
        let subquery_outputs: SymbolSet = self.subquery.output_symbols().into_iter().collect();
        self.assignment_symbols()
            .into_iter()
            .filter(|symbol| subquery_outputs.contains(symbol))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use sift_core::SymbolAllocator;

    use super::*;
    use crate::ops::ValuesNode;

    #[test]
    fn test_referenced_subquery_symbols() {
        let mut symbols = SymbolAllocator::new();
        let a = symbols.symbol("a");
        let s1 = symbols.symbol("s1");
        let s2 = symbols.symbol("s2");
        let r1 = symbols.symbol("r1");
        let r2 = symbols.symbol("r2");
        let r3 = symbols.symbol("r3");

        let apply = ApplyNode::new(
            PlanNode::Values(ValuesNode::empty(vec![a.clone()])),
            PlanNode::Values(ValuesNode::empty(vec![s1.clone(), s2.clone()])),
            vec![],
            vec![
                (r1.clone(), SetExpression::in_(&a, &s1)),
                (r2.clone(), SetExpression::in_(&a, &s1)),
                (r3.clone(), SetExpression::in_(&a, &a)),
            ],
        );

        let referenced: Vec<_> = apply.referenced_subquery_symbols().into_iter().collect();
        assert_eq!(referenced, vec![s1]);
        assert_eq!(apply.output_symbols(), vec![a, r1, r2, r3]);
    }

    #[test]
    fn test_set_expression_display() {
        let mut symbols = SymbolAllocator::new();
        let a = symbols.symbol("a");
        let s = symbols.symbol("s");

        assert_eq!(SetExpression::in_(&a, &s).to_string(), "a IN s");
        assert_eq!(
            SetExpression::quantified(BinaryOp::Gt, Quantifier::All, &a, &s).to_string(),
            "a > ALL s"
        );
        assert!(SetExpression::Exists.symbols().is_empty());
    }
}
