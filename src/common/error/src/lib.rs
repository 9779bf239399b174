//! Error types and result aliases for Sift.
//!
//! Every fallible operation in the optimizer returns [`SiftResult`]. Faults are
//! never swallowed: a malformed input plan or a rule set that fails to converge
//! aborts the whole planning step.

mod error;

pub use error::{SiftError, SiftResult};
