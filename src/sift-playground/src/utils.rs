//! Printing helpers for the playground.

use sift_logical::LogicalPlan;
use sift_optimizer::OptimizedPlan;

/// Print a section header.
pub fn print_header(title: &str) {
    println!();
    println!("{}", "=".repeat(60));
    println!("  {}", title);
    println!("{}", "=".repeat(60));
}

/// Print a divider line.
pub fn print_divider() {
    println!("{}", "-".repeat(60));
}

/// Print a plan under a title.
pub fn print_plan(title: &str, plan: &LogicalPlan) {
    println!("{title} ({} operators):", plan.operator_count());
    print!("{}", plan.root().explain());
}

/// Print an optimization result, with the rewrite trace when one was recorded.
pub fn print_optimized(result: &OptimizedPlan, show_trace: bool) {
    print_plan("Optimized", &result.plan);
    print_divider();
    if show_trace {
        print!("{}", result.format_trace());
    } else {
        println!(
            "{} iterations, {} rules applied",
            result.iterations, result.rules_applied
        );
    }
}
