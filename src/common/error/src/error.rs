//! Core error types for Sift.

use thiserror::Error;

/// Result type alias using `SiftError`.
pub type SiftResult<T> = std::result::Result<T, SiftError>;

/// Core error type for Sift operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SiftError {
    /// The input plan violates a structural contract (unknown symbol, bad correlation, ...).
    #[error("InvalidPlan: {0}")]
    InvalidPlan(String),

    /// Symbol table misuse (unknown id, duplicate output, ...).
    #[error("SymbolError: {0}")]
    SymbolError(String),

    /// The rule set did not reach a fixpoint within the iteration cap.
    #[error("NonConvergence: rule '{rule}' still firing on {node} after {iterations} iterations")]
    NonConvergence {
        /// Name of the last rule that fired.
        rule: String,
        /// Description of the node the rule fired on.
        node: String,
        /// Number of iterations performed before giving up.
        iterations: usize,
    },

    /// A rule broke its contract (dropped a required symbol, changed the root schema, ...).
    #[error("RuleFailed: rule '{rule}': {message}")]
    RuleFailed {
        /// Name of the offending rule.
        rule: String,
        /// What went wrong.
        message: String,
    },

    /// Invalid parameter provided.
    #[error("InvalidParameter: {0}")]
    InvalidParameter(String),

    /// Internal error (bug in Sift).
    #[error("InternalError: {0}")]
    InternalError(String),

    /// IO error.
    #[error("IoError: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("SerdeJsonError: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl SiftError {
    /// Create a new `InvalidPlan` error.
    pub fn invalid_plan<S: Into<String>>(msg: S) -> Self {
        Self::InvalidPlan(msg.into())
    }

    /// Create a new `SymbolError`.
    pub fn symbol<S: Into<String>>(msg: S) -> Self {
        Self::SymbolError(msg.into())
    }

    /// Create a new `NonConvergence` error.
    pub fn non_convergence(
        rule: impl Into<String>,
        node: impl Into<String>,
        iterations: usize,
    ) -> Self {
        Self::NonConvergence {
            rule: rule.into(),
            node: node.into(),
            iterations,
        }
    }

    /// Create a new `RuleFailed` error.
    pub fn rule_failed(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RuleFailed {
            rule: rule.into(),
            message: message.into(),
        }
    }

    /// Create a new `InvalidParameter` error.
    pub fn invalid_parameter<S: Into<String>>(msg: S) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Create a new `InternalError`.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::InternalError(msg.into())
    }

    /// Whether this error signals a defect in the optimizer itself rather than in its input.
    pub const fn is_engine_fault(&self) -> bool {
        matches!(
            self,
            Self::NonConvergence { .. } | Self::RuleFailed { .. } | Self::InternalError(_)
        )
    }
}

/// Ensure a condition holds, returning an `InvalidPlan` error if not.
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $msg:expr) => {
        if !$cond {
            return Err($crate::SiftError::InvalidPlan($msg.to_string()));
        }
    };
    ($cond:expr, $variant:ident: $($msg:tt)*) => {
        if !$cond {
            return Err($crate::SiftError::$variant(format!($($msg)*)));
        }
    };
}

/// Return early with an `InvalidPlan` error.
#[macro_export]
macro_rules! plan_err {
    ($($arg:tt)*) => {
        return Err($crate::SiftError::InvalidPlan(format!($($arg)*)))
    };
}
