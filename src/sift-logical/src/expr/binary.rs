//! Binary operators for scalar expressions.

use serde::{Deserialize, Serialize};
use sift_core::DataType;

/// Binary operators for scalar expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    // Arithmetic operators
    /// Addition (+)
    Add,
    /// Subtraction (-)
    Subtract,
    /// Multiplication (*)
    Multiply,
    /// Division (/)
    Divide,

    // Comparison operators
    /// Equality (=)
    Eq,
    /// Inequality (<>)
    NotEq,
    /// Less than (<)
    Lt,
    /// Less than or equal (<=)
    LtEq,
    /// Greater than (>)
    Gt,
    /// Greater than or equal (>=)
    GtEq,

    // Logical operators
    /// Logical AND
    And,
    /// Logical OR
    Or,
}

impl BinaryOp {
    /// Check if this is an arithmetic operator.
    pub const fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            Self::Add | Self::Subtract | Self::Multiply | Self::Divide
        )
    }

    /// Check if this is a comparison operator.
    pub const fn is_comparison(&self) -> bool {
        matches!(
            self,
            Self::Eq | Self::NotEq | Self::Lt | Self::LtEq | Self::Gt | Self::GtEq
        )
    }

    /// Check if this is a logical operator.
    pub const fn is_logical(&self) -> bool {
        matches!(self, Self::And | Self::Or)
    }

    /// Get the result type of this operator given input types.
    ///
    /// Returns `None` if the operation is not valid for the given types.
    pub fn result_type(&self, left: &DataType, right: &DataType) -> Option<DataType> {
        match self {
            Self::Add | Self::Subtract | Self::Multiply | Self::Divide => match (left, right) {
                (DataType::Int64, DataType::Int64) => Some(DataType::Int64),
                (DataType::Float64, DataType::Float64)
                | (DataType::Int64, DataType::Float64)
                | (DataType::Float64, DataType::Int64) => Some(DataType::Float64),
                (DataType::Null, t) | (t, DataType::Null) if t.is_numeric() => Some(t.clone()),
                _ => None,
            },
            Self::Eq | Self::NotEq | Self::Lt | Self::LtEq | Self::Gt | Self::GtEq => {
                if left.can_coerce_to(right) || right.can_coerce_to(left) {
                    Some(DataType::Bool)
                } else {
                    None
                }
            }
            Self::And | Self::Or => {
                let is_boolish = |t: &DataType| matches!(t, DataType::Bool | DataType::Null);
                (is_boolish(left) && is_boolish(right)).then_some(DataType::Bool)
            }
        }
    }

    /// SQL symbol of the operator.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Eq => "=",
            Self::NotEq => "<>",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
