//! Validation layer for Sift logical plans.
//!
//! The optimizer validates its input before rewriting; a plan that fails
//! validation is rejected as [`common_error::SiftError::InvalidPlan`].
//!
//! ## Structural Validation
//!
//! - Scope consistency, including correlation scope inside Apply subqueries
//! - Apply correlation and assignment contracts
//! - Duplicate-free schemas, Values row widths, Join output lists
//!
//! ## Semantic Validation
//!
//! - Expression type checking
//! - Boolean predicates, comparison operators in quantified comparisons
//!
//! # Example
//!
//! ```rust
//! use sift_logical::PlanBuilder;
//! use sift_logical::expr::{lit, sym};
//! use sift_logical::validation::validate_plan;
//!
//! let mut p = PlanBuilder::new();
//! let a = p.symbol("a");
//! let root = p.filter(sym(&a).gt(lit(18i64)), p.values(&[&a]));
//! let (plan, symbols) = p.build(root);
//!
//! assert!(validate_plan(&plan, Some(&symbols)).is_ok());
//! ```

mod semantic;
mod structural;

pub use semantic::{SemanticValidationError, SemanticValidator};
pub use structural::{StructuralValidationError, StructuralValidator};

use common_error::{SiftResult, plan_err};
use sift_core::SymbolAllocator;

use crate::LogicalPlan;

/// A validation error that can occur during plan validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Structural validation error.
    Structural(StructuralValidationError),
    /// Semantic validation error.
    Semantic(SemanticValidationError),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Structural(e) => write!(f, "Structural error: {e}"),
            Self::Semantic(e) => write!(f, "Semantic error: {e}"),
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<StructuralValidationError> for ValidationError {
    fn from(e: StructuralValidationError) -> Self {
        Self::Structural(e)
    }
}

impl From<SemanticValidationError> for ValidationError {
    fn from(e: SemanticValidationError) -> Self {
        Self::Semantic(e)
    }
}

/// Combined plan validator that runs both structural and semantic validation.
#[derive(Debug, Default)]
pub struct PlanValidator {
    /// Skip semantic validation (for plans with untyped symbols).
    skip_semantic: bool,
}

impl PlanValidator {
    /// Create a new plan validator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip semantic validation.
    #[must_use]
    pub const fn skip_semantic(mut self) -> Self {
        self.skip_semantic = true;
        self
    }

    /// Validate a logical plan.
    ///
    /// Returns `Ok(())` if the plan is valid, or a list of validation errors.
    pub fn validate(
        &self,
        plan: &LogicalPlan,
        symbols: Option<&SymbolAllocator>,
    ) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(structural_errors) = StructuralValidator::validate(plan, symbols) {
            errors.extend(
                structural_errors
                    .into_iter()
                    .map(ValidationError::Structural),
            );
        }

        if !self.skip_semantic {
            if let Err(semantic_errors) = SemanticValidator::validate(plan) {
                errors.extend(semantic_errors.into_iter().map(ValidationError::Semantic));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Convenience function to validate a plan with default settings.
pub fn validate_plan(
    plan: &LogicalPlan,
    symbols: Option<&SymbolAllocator>,
) -> Result<(), Vec<ValidationError>> {
    PlanValidator::new().validate(plan, symbols)
}

/// Validate a plan, folding every failure into a single `InvalidPlan` error.
pub fn ensure_valid(plan: &LogicalPlan, symbols: Option<&SymbolAllocator>) -> SiftResult<()> {
    if let Err(errors) = validate_plan(plan, symbols) {
        let messages: Vec<_> = errors.iter().map(ToString::to_string).collect();
        plan_err!("{}", messages.join("; "));
    }
    Ok(())
}
