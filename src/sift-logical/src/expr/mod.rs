//! Scalar expressions used in plan node payloads.

mod binary;
mod expr;

pub use binary::BinaryOp;
pub use expr::{Expr, lit, sym};
