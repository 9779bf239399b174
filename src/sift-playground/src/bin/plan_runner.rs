//! Plan Runner - optimizer playground
//!
//! Runs the Sift optimizer on a built-in scenario or a JSON plan file and
//! prints the plan before and after.
//!
//! # Usage
//!
//! ```bash
//! cargo run --package sift-playground --bin plan-runner -- --help
//! ```

use clap::{Parser, Subcommand};
use log::{LevelFilter, info};

use common_config::SiftConfig;
use common_error::{SiftError, SiftResult};
use sift_core::SymbolAllocator;
use sift_logical::LogicalPlan;
use sift_optimizer::{IterativeOptimizer, pruning_rules};

use sift_playground::{
    PlanFile, SCENARIOS, find_scenario, print_divider, print_header, print_optimized, print_plan,
};

/// Plan Runner CLI.
#[derive(Parser, Debug)]
#[command(name = "plan-runner")]
#[command(about = "Optimize logical plans with the Sift pruning rules")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Print every rule application
    #[arg(short, long, global = true)]
    trace: bool,

    /// Override the iteration cap
    #[arg(short, long, global = true)]
    max_iterations: Option<usize>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the built-in scenarios
    List,

    /// Optimize a built-in scenario
    Scenario {
        /// Scenario name (see `list`)
        name: String,
    },

    /// Optimize a JSON plan file
    File {
        /// Path to the plan file
        path: std::path::PathBuf,
    },

    /// Print a built-in scenario as a JSON plan file
    Export {
        /// Scenario name (see `list`)
        name: String,
    },

    /// Optimize every built-in scenario
    Demo,
}

fn main() -> SiftResult<()> {
    let args = Args::parse();

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    match &args.command {
        Commands::List => {
            print_header("Scenarios");
            for scenario in SCENARIOS {
                println!("{:18} {}", scenario.name, scenario.description);
            }
        }
        Commands::Scenario { name } => {
            let (plan, mut symbols) = scenario_plan(name)?;
            run(&args, plan, &mut symbols, SiftConfig::default())?;
        }
        Commands::File { path } => {
            let file = PlanFile::from_json_file(path)?;
            let mut symbols = file.symbols()?;
            info!("Loaded plan from {}", path.display());
            run(&args, file.plan.clone(), &mut symbols, file.config())?;
        }
        Commands::Export { name } => {
            let (plan, _) = scenario_plan(name)?;
            println!("{}", PlanFile::new(plan).to_json()?);
        }
        Commands::Demo => {
            for scenario in SCENARIOS {
                let (plan, mut symbols) = scenario.build();
                print_header(&format!("{}: {}", scenario.name, scenario.description));
                run(&args, plan, &mut symbols, SiftConfig::default())?;
            }
        }
    }

    Ok(())
}

fn scenario_plan(name: &str) -> SiftResult<(LogicalPlan, SymbolAllocator)> {
    let scenario = find_scenario(name).ok_or_else(|| {
        let known: Vec<_> = SCENARIOS.iter().map(|scenario| scenario.name).collect();
        SiftError::invalid_parameter(format!(
            "unknown scenario '{name}', expected one of: {}",
            known.join(", ")
        ))
    })?;
    Ok(scenario.build())
}

fn run(
    args: &Args,
    plan: LogicalPlan,
    symbols: &mut SymbolAllocator,
    config: SiftConfig,
) -> SiftResult<()> {
    let mut optimizer_config = config.optimizer.with_trace(args.trace);
    if let Some(max) = args.max_iterations {
        optimizer_config = optimizer_config.with_max_iterations(max);
    }

    print_plan("Input", &plan);
    print_divider();

    let optimizer = IterativeOptimizer::with_config(pruning_rules(), optimizer_config);
    let result = optimizer.optimize(plan, symbols)?;
    print_optimized(&result, args.trace);
    Ok(())
}
