//! Optimization rules for Sift logical plans.
//!
//! This module provides the rule framework, the iterative driver and the
//! column pruning rule family.
//!
//! # Pruning Rules
//!
//! Registered in this order by [`pruning_rules`]:
//!
//! 1. [`PruneApplySourceColumns`]: restrict an Apply subquery to the columns its assignments read
//! 2. [`PruneApplyCorrelation`]: drop correlation symbols the subquery never reads
//! 3. [`PruneApplyColumns`]: drop Apply assignments nobody needs
//! 4. [`PruneProjectColumns`]: drop projection assignments nobody needs
//! 5. [`PruneJoinColumns`]: stop exposing unused join columns
//! 6. [`PruneValuesColumns`]: drop unused literal columns
//! 7. [`PruneTableScanColumns`]: drop unused scan columns
//! 8. [`RemoveRedundantIdentityProjections`]: remove projections that change nothing
//!
//! # Rewrite Safety
//!
//! A rewrite is legal only if the replacement produces every symbol the parent
//! requires, with the same values and the same number of rows.

mod optimizer;
mod prune_apply_columns;
mod prune_apply_correlation;
mod prune_apply_source_columns;
mod prune_join_columns;
mod prune_project_columns;
mod prune_table_scan_columns;
mod prune_values_columns;
mod remove_redundant_identity_projections;
mod rule;

pub use optimizer::IterativeOptimizer;
pub use prune_apply_columns::PruneApplyColumns;
pub use prune_apply_correlation::PruneApplyCorrelation;
pub use prune_apply_source_columns::PruneApplySourceColumns;
pub use prune_join_columns::PruneJoinColumns;
pub use prune_project_columns::PruneProjectColumns;
pub use prune_table_scan_columns::PruneTableScanColumns;
pub use prune_values_columns::PruneValuesColumns;
pub use remove_redundant_identity_projections::RemoveRedundantIdentityProjections;
pub use rule::{OptimizedPlan, Rule, RuleContext, RuleOutcome, RuleTrace};

/// The column pruning rule family, in registration order.
pub fn pruning_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(PruneApplySourceColumns::new()),
        Box::new(PruneApplyCorrelation::new()),
        Box::new(PruneApplyColumns::new()),
        Box::new(PruneProjectColumns::new()),
        Box::new(PruneJoinColumns::new()),
        Box::new(PruneValuesColumns::new()),
        Box::new(PruneTableScanColumns::new()),
        Box::new(RemoveRedundantIdentityProjections::new()),
    ]
}
