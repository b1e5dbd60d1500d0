//! Polyhouse Planner - command line entry point
//!
//! Reads a planning request from a JSON file, optionally layers stored user
//! defaults (TOML or JSON) and a recalculation command, and writes the
//! placement result as JSON.

use clap::{Parser, ValueEnum};
use polyhouse_planner::core::config::ConfigOverrides;
use polyhouse_planner::core::error::Result;
use polyhouse_planner::planning::{InMemoryPlanStore, PlanOutcome, PlanRequest, Planner, Recalculate};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Command {
    Maximize,
    UniformOrientation,
    IgnoreRestrictions,
}

/// Plan greenhouse structures on a land parcel
#[derive(Parser, Debug)]
#[command(name = "polyhouse-planner")]
#[command(about = "Plan polyhouse placement on a land parcel and print the result as JSON")]
struct Args {
    /// Planning request (JSON)
    request: PathBuf,

    /// Stored user defaults (.toml or .json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the result here instead of stdout
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Re-plan with a recalculation command
    #[arg(long, value_enum)]
    recalculate: Option<Command>,

    /// Re-plan with a different minimum module count per structure
    #[arg(long, conflicts_with = "recalculate")]
    min_modules: Option<u32>,

    /// Print only a one-line summary
    #[arg(long)]
    summary: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "polyhouse_planner=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let request = PlanRequest::from_json(&std::fs::read_to_string(&args.request)?)?;
    let stored = args
        .config
        .as_deref()
        .map(ConfigOverrides::load_file)
        .transpose()?;

    let command = match (args.recalculate, args.min_modules) {
        (Some(Command::Maximize), _) => Some(Recalculate::Maximize),
        (Some(Command::UniformOrientation), _) => Some(Recalculate::UniformOrientation),
        (Some(Command::IgnoreRestrictions), _) => Some(Recalculate::IgnoreRestrictions),
        (None, Some(n)) => Some(Recalculate::AdjustMinModules(n)),
        (None, None) => None,
    };

    let planner = Planner::new(Arc::new(InMemoryPlanStore::default()));
    let outcome = match command {
        Some(command) => planner.recalculate(&request, stored.as_ref(), command)?,
        None => planner.plan(&request, stored.as_ref())?,
    };

    if args.summary {
        print_summary(&outcome);
        return Ok(());
    }

    let json = serde_json::to_string_pretty(outcome.result.as_ref())?;
    match args.output {
        Some(path) => {
            std::fs::write(&path, json)?;
            tracing::info!(path = %path.display(), plan = %outcome.id, "Result written");
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn print_summary(outcome: &PlanOutcome) {
    let meta = &outcome.result.metadata;
    println!(
        "{}: {} structures, {:.0} m² outer / {:.0} m² inner, {:.1}% utilization, {} ms",
        outcome.id,
        meta.count,
        meta.total_outer_area,
        meta.total_inner_area,
        meta.utilization_percentage,
        meta.computation_time_ms
    );
    for warning in &outcome.result.warnings {
        println!("  warning: {warning}");
    }
    for error in &outcome.result.errors {
        println!("  error: {error}");
    }
}
