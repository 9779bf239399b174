//! Sift Playground - Experiments and Examples
//!
//! This crate provides an executable for experimenting with the Sift
//! optimizer on built-in scenarios and on plans stored as JSON.
//!
//! # Available Binaries
//!
//! - **`plan-runner`**: Optimizes a scenario or a plan file and prints the result
//!
//! # Usage
//!
//! ```bash
//! # List the built-in scenarios
//! cargo run --package sift-playground --bin plan-runner -- list
//!
//! # Optimize one of them, showing every rewrite
//! cargo run --package sift-playground --bin plan-runner -- scenario single-reference --trace
//!
//! # Optimize a JSON plan file
//! cargo run --package sift-playground --bin plan-runner -- file plan.json
//! ```

pub mod plan_file;
pub mod scenarios;
pub mod utils;

pub use plan_file::PlanFile;
pub use scenarios::{SCENARIOS, Scenario, find_scenario};
pub use utils::{print_divider, print_header, print_optimized, print_plan};
