//! Core data model for the Sift optimizer.
//!
//! This crate provides the leaf types every other crate builds on:
//! - `Symbol`, `SymbolSet` and `SymbolAllocator` (the symbol table)
//! - `DataType` and `Value` for the type system

pub mod symbol;
pub mod types;

// Re-export commonly used types
pub use symbol::{Symbol, SymbolAllocator, SymbolId, SymbolSet};
pub use types::{DataType, Value};
