//! Display utilities for Sift.
//!
//! Provides tree rendering for plans and small string helpers used by explain output.

mod tree;

pub use tree::{DisplayTree, TreeNode};

/// Truncate a string to `max_len` characters, marking the cut with `...`.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// Indent a multi-line string.
pub fn indent(s: &str, prefix: &str) -> String {
    s.lines()
        .map(|line| format!("{prefix}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}
