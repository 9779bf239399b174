//! Structural validation for logical plans.
//!
//! This module validates the structure of logical plans:
//! - Scope consistency (every referenced symbol is in scope)
//! - Apply correlation and assignment contracts
//! - Duplicate-free schemas and well-formed Values rows
//! - Join output lists and criteria

use sift_core::{Symbol, SymbolAllocator, SymbolSet};

use crate::{LogicalPlan, PlanNode};

/// A structural validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuralValidationError {
    /// A node references a symbol that is neither produced by a child nor a visible correlation symbol.
    UnresolvedSymbol {
        /// The operator name.
        operator: String,
        /// The unresolved symbol.
        symbol: String,
    },

    /// An Apply correlation symbol is not produced by the Apply input.
    CorrelationNotInInput {
        /// The correlation symbol.
        symbol: String,
    },

    /// An Apply assignment reads a symbol produced by neither input nor subquery.
    UnresolvedAssignmentSymbol {
        /// The assignment output.
        output: String,
        /// The unresolved symbol.
        symbol: String,
    },

    /// A symbol produced on one side of an Apply is also produced elsewhere in its scope.
    ApplyScopeConflict {
        /// The shared symbol.
        symbol: String,
        /// Where the second producer sits.
        conflict: &'static str,
    },

    /// A node produces the same symbol twice.
    DuplicateOutput {
        /// The operator name.
        operator: String,
        /// The duplicated symbol.
        symbol: String,
    },

    /// A Values row does not have one expression per column.
    RowWidthMismatch {
        /// Row index.
        row: usize,
        /// Number of columns.
        expected: usize,
        /// Number of expressions in the row.
        actual: usize,
    },

    /// A Join exposes a symbol its source does not produce.
    InvalidJoinOutput {
        /// Which side (`left` or `right`).
        side: &'static str,
        /// The offending symbol.
        symbol: String,
    },

    /// A join criterion reads a symbol from the wrong side.
    InvalidJoinCriteria {
        /// The offending clause.
        clause: String,
    },

    /// A symbol is not known to the symbol table of this run.
    UnknownSymbol {
        /// The unknown symbol.
        symbol: String,
    },
}

impl std::fmt::Display for StructuralValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnresolvedSymbol { operator, symbol } => {
                write!(f, "{operator} references symbol {symbol} which is not in scope")
            }
            Self::CorrelationNotInInput { symbol } => {
                write!(f, "correlation symbol {symbol} is not produced by the Apply input")
            }
            Self::UnresolvedAssignmentSymbol { output, symbol } => write!(
                f,
                "Apply assignment {output} reads {symbol} which neither input nor subquery produces"
            ),
            Self::ApplyScopeConflict { symbol, conflict } => {
                write!(f, "Apply symbol {symbol} is also produced by the {conflict}")
            }
            Self::DuplicateOutput { operator, symbol } => {
                write!(f, "{operator} produces symbol {symbol} more than once")
            }
            Self::RowWidthMismatch {
                row,
                expected,
                actual,
            } => write!(
                f,
                "Values row {row} has {actual} expressions, expected {expected}"
            ),
            Self::InvalidJoinOutput { side, symbol } => {
                write!(f, "Join exposes {symbol} which its {side} source does not produce")
            }
            Self::InvalidJoinCriteria { clause } => {
                write!(f, "Join criterion {clause} does not compare left to right")
            }
            Self::UnknownSymbol { symbol } => {
                write!(f, "symbol {symbol} is not registered in the symbol table")
            }
        }
    }
}

impl std::error::Error for StructuralValidationError {}

/// Structural validator for logical plans.
pub struct StructuralValidator;

impl StructuralValidator {
    /// Validate the structural integrity of a logical plan.
    ///
    /// When `symbols` is given, every symbol the plan mentions must also be
    /// registered there. Returns `Ok(())` if the plan is valid, or a list of errors.
    pub fn validate(
        plan: &LogicalPlan,
        symbols: Option<&SymbolAllocator>,
    ) -> Result<(), Vec<StructuralValidationError>> {
        let mut errors = Vec::new();

        Self::validate_node(plan.root(), &SymbolSet::new(), symbols, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Recursively validate a node and its children.
    ///
    /// `outer` holds the correlation symbols visible from enclosing Apply nodes.
    fn validate_node(
        node: &PlanNode,
        outer: &SymbolSet,
        symbols: Option<&SymbolAllocator>,
        errors: &mut Vec<StructuralValidationError>,
    ) {
        let operator = node.kind().name();

        Self::validate_unique_outputs(operator, &node.output_symbols(), errors);

        if let Some(symbols) = symbols {
            for symbol in node.output_symbols() {
                if !symbols.contains(&symbol) {
                    errors.push(StructuralValidationError::UnknownSymbol {
                        symbol: format!("{symbol:?}"),
                    });
                }
            }
        }

        let mut scope = outer.clone();
        for child in node.children() {
            scope.extend(child.output_symbols());
        }

        match node {
            PlanNode::Values(values) => {
                let width = values.output_symbols.len();
                for (row, exprs) in values.rows.iter().enumerate() {
                    if exprs.len() != width {
                        errors.push(StructuralValidationError::RowWidthMismatch {
                            row,
                            expected: width,
                            actual: exprs.len(),
                        });
                    }
                }
                Self::validate_scope(operator, &values.referenced_symbols(), &scope, errors);
            }
            PlanNode::Apply(apply) => {
                let input_outputs: SymbolSet = apply.input.output_symbols().into_iter().collect();
                for symbol in &apply.correlation {
                    if !input_outputs.contains(symbol) {
                        errors.push(StructuralValidationError::CorrelationNotInInput {
                            symbol: symbol.to_string(),
                        });
                    }
                }

                let subquery_outputs: SymbolSet =
                    apply.subquery.output_symbols().into_iter().collect();
                for symbol in input_outputs.intersection(&subquery_outputs) {
                    errors.push(StructuralValidationError::ApplyScopeConflict {
                        symbol: symbol.to_string(),
                        conflict: "subquery and the input",
                    });
                }
                for (output, _) in &apply.assignments {
                    if subquery_outputs.contains(output) {
                        errors.push(StructuralValidationError::ApplyScopeConflict {
                            symbol: output.to_string(),
                            conflict: "subquery and an assignment",
                        });
                    }
                }

                let mut produced = input_outputs;
                produced.extend(subquery_outputs);
                for (output, expression) in &apply.assignments {
                    for symbol in expression.symbols() {
                        if !produced.contains(&symbol) {
                            errors.push(StructuralValidationError::UnresolvedAssignmentSymbol {
                                output: output.to_string(),
                                symbol: symbol.to_string(),
                            });
                        }
                    }
                }
            }
            PlanNode::Join(join) => {
                Self::validate_join_side("left", &join.left_output_symbols, &join.left, errors);
                Self::validate_join_side("right", &join.right_output_symbols, &join.right, errors);

                let left: SymbolSet = join.left.output_symbols().into_iter().collect();
                let right: SymbolSet = join.right.output_symbols().into_iter().collect();
                for clause in &join.criteria {
                    if !left.contains(&clause.left) || !right.contains(&clause.right) {
                        errors.push(StructuralValidationError::InvalidJoinCriteria {
                            clause: clause.to_string(),
                        });
                    }
                }
                if let Some(filter) = &join.filter {
                    Self::validate_scope(operator, &filter.symbols(), &scope, errors);
                }
            }
            _ => Self::validate_scope(operator, &node.referenced_symbols(), &scope, errors),
        }

        // Only an Apply subquery sees the correlation symbols.
        match node {
            PlanNode::Apply(apply) => {
                Self::validate_node(&apply.input, outer, symbols, errors);
                let mut inner = outer.clone();
                inner.extend(apply.correlation.iter().cloned());
                Self::validate_node(&apply.subquery, &inner, symbols, errors);
            }
            _ => {
                for child in node.children() {
                    Self::validate_node(child, outer, symbols, errors);
                }
            }
        }
    }

    fn validate_scope(
        operator: &str,
        referenced: &SymbolSet,
        scope: &SymbolSet,
        errors: &mut Vec<StructuralValidationError>,
    ) {
        for symbol in referenced.difference(scope) {
            errors.push(StructuralValidationError::UnresolvedSymbol {
                operator: operator.to_string(),
                symbol: symbol.to_string(),
            });
        }
    }

    fn validate_unique_outputs(
        operator: &str,
        outputs: &[Symbol],
        errors: &mut Vec<StructuralValidationError>,
    ) {
        let mut seen = SymbolSet::new();
        for symbol in outputs {
            if !seen.insert(symbol.clone()) {
                errors.push(StructuralValidationError::DuplicateOutput {
                    operator: operator.to_string(),
                    symbol: symbol.to_string(),
                });
            }
        }
    }

    fn validate_join_side(
        side: &'static str,
        exposed: &[Symbol],
        source: &PlanNode,
        errors: &mut Vec<StructuralValidationError>,
    ) {
        let produced: SymbolSet = source.output_symbols().into_iter().collect();
        for symbol in exposed {
            if !produced.contains(symbol) {
                errors.push(StructuralValidationError::InvalidJoinOutput {
                    side,
                    symbol: symbol.to_string(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{lit, sym};
    use crate::ops::{EquiJoinClause, JoinKind, SetExpression};
    use crate::PlanBuilder;

    #[test]
    fn test_valid_correlated_plan() {
        let mut p = PlanBuilder::new();
        let a = p.symbol("a");
        let s = p.symbol("s");
        let r = p.symbol("r");

        // Subquery filter reads the correlated symbol a
        let root = p.apply(
            vec![(r, SetExpression::in_(&a, &s))],
            vec![a.clone()],
            p.values(&[&a]),
            p.filter(sym(&s).eq(sym(&a)), p.values(&[&s])),
        );
        let (plan, symbols) = p.build(root);

        assert!(StructuralValidator::validate(&plan, Some(&symbols)).is_ok());
    }

    #[test]
    fn test_correlation_not_in_input() {
        let mut p = PlanBuilder::new();
        let a = p.symbol("a");
        let b = p.symbol("b");
        let s = p.symbol("s");
        let r = p.symbol("r");

        let root = p.apply(
            vec![(r, SetExpression::in_(&a, &s))],
            vec![b.clone()],
            p.values(&[&a]),
            p.values(&[&s]),
        );
        let plan = LogicalPlan::new(root);

        let errors = StructuralValidator::validate(&plan, None).unwrap_err();
        assert_eq!(
            errors,
            vec![StructuralValidationError::CorrelationNotInInput {
                symbol: "b".to_string()
            }]
        );
    }

    #[test]
    fn test_unresolved_symbols() {
        let mut p = PlanBuilder::new();
        let a = p.symbol("a");
        let b = p.symbol("b");
        let s = p.symbol("s");
        let r = p.symbol("r");

        // Filter outside any Apply cannot see b
        let filter = p.filter(sym(&b).gt(lit(0i64)), p.values(&[&a]));
        let errors = StructuralValidator::validate(&LogicalPlan::new(filter), None).unwrap_err();
        assert!(matches!(
            &errors[0],
            StructuralValidationError::UnresolvedSymbol { operator, symbol }
                if operator == "Filter" && symbol == "b"
        ));

        let apply = p.apply(
            vec![(r, SetExpression::in_(&b, &s))],
            vec![],
            p.values(&[&a]),
            p.values(&[&s]),
        );
        let errors = StructuralValidator::validate(&LogicalPlan::new(apply), None).unwrap_err();
        assert!(matches!(
            &errors[0],
            StructuralValidationError::UnresolvedAssignmentSymbol { symbol, .. } if symbol == "b"
        ));
    }

    #[test]
    fn test_assignment_output_produced_by_subquery() {
        let mut p = PlanBuilder::new();
        let a = p.symbol("a");
        let s = p.symbol("s");

        let root = p.apply(
            vec![(s.clone(), SetExpression::in_(&a, &s))],
            vec![],
            p.values(&[&a]),
            p.values(&[&s]),
        );
        let errors = StructuralValidator::validate(&LogicalPlan::new(root), None).unwrap_err();
        assert_eq!(
            errors,
            vec![StructuralValidationError::ApplyScopeConflict {
                symbol: "s".to_string(),
                conflict: "subquery and an assignment",
            }]
        );
    }

    #[test]
    fn test_input_and_subquery_share_a_symbol() {
        let mut p = PlanBuilder::new();
        let a = p.symbol("a");
        let s = p.symbol("s");
        let r = p.symbol("r");

        let root = p.apply(
            vec![(r, SetExpression::in_(&a, &a))],
            vec![],
            p.values(&[&a]),
            p.values(&[&a, &s]),
        );
        let errors = StructuralValidator::validate(&LogicalPlan::new(root), None).unwrap_err();
        assert_eq!(
            errors,
            vec![StructuralValidationError::ApplyScopeConflict {
                symbol: "a".to_string(),
                conflict: "subquery and the input",
            }]
        );
        assert_eq!(
            errors[0].to_string(),
            "Apply symbol a is also produced by the subquery and the input"
        );
    }

    #[test]
    fn test_duplicate_outputs_and_row_width() {
        let mut p = PlanBuilder::new();
        let a = p.symbol("a");
        let b = p.symbol("b");

        let values = p.values_with_rows(&[&a, &a, &b], vec![vec![lit(1i64), lit(2i64)]]);
        let errors = StructuralValidator::validate(&LogicalPlan::new(values), None).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| matches!(
            e,
            StructuralValidationError::DuplicateOutput { symbol, .. } if symbol == "a"
        )));
        assert!(errors.contains(&StructuralValidationError::RowWidthMismatch {
            row: 0,
            expected: 3,
            actual: 2,
        }));
    }

    #[test]
    fn test_join_validation() {
        let mut p = PlanBuilder::new();
        let a = p.symbol("a");
        let b = p.symbol("b");

        let valid = p.join(
            JoinKind::Inner,
            p.values(&[&a]),
            p.values(&[&b]),
            vec![EquiJoinClause::new(&a, &b)],
            None,
        );
        assert!(StructuralValidator::validate(&LogicalPlan::new(valid), None).is_ok());

        let swapped = p.join(
            JoinKind::Inner,
            p.values(&[&a]),
            p.values(&[&b]),
            vec![EquiJoinClause::new(&b, &a)],
            None,
        );
        let errors = StructuralValidator::validate(&LogicalPlan::new(swapped), None).unwrap_err();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_unknown_symbol() {
        let mut p = PlanBuilder::new();
        let a = p.symbol("a");
        let plan = LogicalPlan::new(p.values(&[&a]));

        let empty = SymbolAllocator::new();
        let errors = StructuralValidator::validate(&plan, Some(&empty)).unwrap_err();
        assert_eq!(
            errors,
            vec![StructuralValidationError::UnknownSymbol {
                symbol: "a#0".to_string()
            }]
        );
    }
}
