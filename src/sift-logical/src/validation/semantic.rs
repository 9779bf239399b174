//! Semantic validation for logical plans.
//!
//! This module type-checks the expressions carried by plan nodes.

use sift_core::DataType;

use crate::expr::Expr;
use crate::ops::SetExpression;
use crate::{LogicalPlan, PlanNode};

/// A semantic validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemanticValidationError {
    /// Operand types do not fit the operator.
    TypeMismatch {
        /// Description of the type mismatch.
        message: String,
    },

    /// A predicate does not evaluate to a boolean.
    NonBooleanPredicate {
        /// The operator owning the predicate.
        operator: String,
        /// The predicate expression.
        predicate: String,
    },

    /// A quantified comparison uses a non-comparison operator.
    InvalidQuantifiedComparison {
        /// The offending set expression.
        expression: String,
    },
}

impl std::fmt::Display for SemanticValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TypeMismatch { message } => write!(f, "Type mismatch: {message}"),
            Self::NonBooleanPredicate {
                operator,
                predicate,
            } => write!(f, "{operator} predicate {predicate} is not boolean"),
            Self::InvalidQuantifiedComparison { expression } => {
                write!(f, "{expression} is not a comparison")
            }
        }
    }
}

impl std::error::Error for SemanticValidationError {}

/// Semantic validator for logical plans.
pub struct SemanticValidator;

impl SemanticValidator {
    /// Validate the semantics of a logical plan.
    pub fn validate(plan: &LogicalPlan) -> Result<(), Vec<SemanticValidationError>> {
        let mut errors = Vec::new();
        Self::validate_node(plan.root(), &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_node(node: &PlanNode, errors: &mut Vec<SemanticValidationError>) {
        match node {
            PlanNode::Filter(filter) => {
                Self::validate_predicate("Filter", &filter.predicate, errors);
            }
            PlanNode::Join(join) => {
                if let Some(filter) = &join.filter {
                    Self::validate_predicate("Join", filter, errors);
                }
            }
            PlanNode::Project(project) => {
                for (_, expr) in project.assignments.iter() {
                    Self::validate_expr(expr, errors);
                }
            }
            PlanNode::Values(values) => {
                for expr in values.rows.iter().flatten() {
                    Self::validate_expr(expr, errors);
                }
            }
            PlanNode::Apply(apply) => {
                for (_, expression) in &apply.assignments {
                    if let SetExpression::QuantifiedComparison { op, .. } = expression {
                        if !op.is_comparison() {
                            errors.push(SemanticValidationError::InvalidQuantifiedComparison {
                                expression: expression.to_string(),
                            });
                        }
                    }
                }
            }
            PlanNode::TableScan(_) | PlanNode::Limit(_) => {}
        }

        for child in node.children() {
            Self::validate_node(child, errors);
        }
    }

    fn validate_predicate(
        operator: &str,
        predicate: &Expr,
        errors: &mut Vec<SemanticValidationError>,
    ) {
        match predicate.data_type() {
            // Null covers opaque calls and NULL literals
            Some(DataType::Bool | DataType::Null) => {}
            Some(_) => errors.push(SemanticValidationError::NonBooleanPredicate {
                operator: operator.to_string(),
                predicate: predicate.to_string(),
            }),
            None => Self::validate_expr(predicate, errors),
        }
    }

    fn validate_expr(expr: &Expr, errors: &mut Vec<SemanticValidationError>) {
        if expr.data_type().is_none() {
            errors.push(SemanticValidationError::TypeMismatch {
                message: format!("cannot type {expr}"),
            });
        }
    }
}
