//! Sift - rule-based logical plan optimizer
//!
//! Sift rewrites relational logical plans into cheaper, semantically equivalent
//! plans by applying local rewrite rules until a fixpoint is reached.

#![forbid(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

// Re-export member crates
pub use common_config as config;
pub use common_error as error;
pub use sift_core as core;
pub use sift_logical as logical;
pub use sift_optimizer as optimizer;

/// Sift version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
