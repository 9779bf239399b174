//! Data type definitions for symbols and literals.

use serde::{Deserialize, Serialize};

/// Value type carried by a symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DataType {
    /// Null type (unknown or absent).
    Null,
    /// Boolean type.
    Bool,
    /// 64-bit signed integer.
    #[default]
    Int64,
    /// 64-bit floating point.
    Float64,
    /// UTF-8 string.
    String,
    /// Date (days since epoch).
    Date,
    /// Array of elements with specified type.
    Array(Box<Self>),
}

impl DataType {
    /// Check if this type is numeric.
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Int64 | Self::Float64)
    }

    /// Get the display name for this type.
    pub fn display_name(&self) -> String {
        match self {
            Self::Null => "Null".to_string(),
            Self::Bool => "Bool".to_string(),
            Self::Int64 => "Int64".to_string(),
            Self::Float64 => "Float64".to_string(),
            Self::String => "String".to_string(),
            Self::Date => "Date".to_string(),
            Self::Array(inner) => format!("Array<{}>", inner.display_name()),
        }
    }

    /// Check if a value of this type can stand in for `target` without a cast.
    pub fn can_coerce_to(&self, target: &Self) -> bool {
        if self == target {
            return true;
        }

        match (self, target) {
            (Self::Null, _) | (Self::Int64, Self::Float64) => true,
            (Self::Array(a), Self::Array(b)) => a.can_coerce_to(b),
            _ => false,
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_coercion() {
        assert!(DataType::Int64.can_coerce_to(&DataType::Float64));
        assert!(DataType::Null.can_coerce_to(&DataType::String));
        assert!(!DataType::String.can_coerce_to(&DataType::Int64));
        assert!(
            DataType::Array(Box::new(DataType::Int64))
                .can_coerce_to(&DataType::Array(Box::new(DataType::Float64)))
        );
    }

    #[test]
    fn test_display_name() {
        assert_eq!(DataType::default().display_name(), "Int64");
        assert_eq!(
            DataType::Array(Box::new(DataType::Bool)).display_name(),
            "Array<Bool>"
        );
    }
}
