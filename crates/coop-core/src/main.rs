//! Cooperation Evolution Simulator
//!
//! Runs the built-in scenarios and prints how each civilization fared.

use clap::Parser;
use coop_core::output::write_results;
use coop_core::{Downsample, RunResult, Scenario, SimConfig, SimError};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// How often the progress line is printed, in generations
const PROGRESS_INTERVAL: u32 = 10;

/// Command line arguments for the simulator
#[derive(Parser, Debug)]
#[command(name = "coop_sim")]
#[command(about = "Cooperation evolution under compound stress")]
struct Args {
    /// Random seed for reproducibility
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Scenario to run, or "all"
    #[arg(long, default_value = "all")]
    scenario: String,

    /// Override each scenario's generation count
    #[arg(long)]
    generations: Option<u32>,

    /// Tuning file (defaults to tuning.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write results as JSON to this path
    #[arg(long)]
    output: Option<PathBuf>,

    /// List scenarios and exit
    #[arg(long)]
    list: bool,

    /// Enable debug logging
    #[arg(long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: Could not install log subscriber: {}", e);
    }

    match simulate(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn simulate(args: &Args) -> Result<(), SimError> {
    let catalog = Scenario::catalog();

    if args.list {
        for scenario in &catalog {
            println!("{:<24} {:>3} gens  {}", scenario.name, scenario.generations, scenario.title);
        }
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => SimConfig::from_file(path)?,
        None => SimConfig::load_or_default(None),
    };

    // Seeds follow catalog position so a single scenario reproduces its "all" run
    let selected: Vec<(usize, &Scenario)> = if args.scenario == "all" {
        catalog.iter().enumerate().collect()
    } else {
        let index = catalog
            .iter()
            .position(|s| s.name == args.scenario)
            .ok_or_else(|| SimError::InvalidScenario(args.scenario.clone()))?;
        vec![(index, &catalog[index])]
    };

    println!("Cooperation Evolution Simulator");
    println!("===============================");
    println!("Seed: {}", args.seed);
    println!("Scenarios: {}", selected.len());
    println!();

    let mut results: Vec<RunResult> = Vec::with_capacity(selected.len());
    for (index, scenario) in selected {
        println!("{}", scenario.title);
        let mut rng = SmallRng::seed_from_u64(args.seed.wrapping_add(index as u64));

        let result = scenario.run(&config, args.generations, &mut rng, |m| {
            if m.generation % PROGRESS_INTERVAL == 0 {
                println!(
                    "  gen {:>3}: humans {:>3} ais {:>3} | coop {:.2} trust {:.2} coherence {:.2} | taught {} awakened {}",
                    m.generation,
                    m.humans,
                    m.ais,
                    m.cooperation_ratio,
                    m.mean_trust,
                    m.mean_coherence,
                    m.taught,
                    m.awakened
                );
            }
        })?;

        println!("  {}", result.summary_line());
        println!();
        results.push(result);
    }

    println!("Summary");
    println!("-------");
    let survived = results.iter().filter(|r| !r.is_collapsed()).count();
    for result in &results {
        println!("{}", result.summary_line());
    }
    println!("{}/{} scenarios survived", survived, results.len());

    if let Some(path) = &args.output {
        write_results(path, &results, Downsample::default())?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}
