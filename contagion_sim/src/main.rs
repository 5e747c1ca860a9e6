//! Contagion scenario CLI
//!
//! Host loop for the epidemic automaton: picks parameters, calls `step()`
//! until the run ends, and reports the outcome.

use anyhow::{bail, Context, Result};
use clap::Parser;
use contagion_core::{EpidemicParams, ExecutionMode};
use contagion_sim::{ScenarioId, ScenarioResult, ScenarioRunner};
use std::path::{Path, PathBuf};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Contagion epidemic simulation CLI
#[derive(Parser, Debug)]
#[command(name = "contagion-sim")]
#[command(about = "Run deterministic epidemic scenarios on a toroidal lattice", long_about = None)]
struct Args {
    /// Master seed for determinism (0 = random from time)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Scenario to run (baseline, no_transmission, full_transmission,
    /// strict_quarantine, no_quarantine, multi_seed, all)
    #[arg(short = 'S', long, default_value = "baseline")]
    scenario: String,

    /// Number of consecutive seeds to run
    #[arg(long, default_value = "1")]
    seeds: usize,

    /// Maximum number of ticks (simulated days)
    #[arg(short, long, default_value = "200")]
    ticks: u64,

    /// Keep stepping after the epidemic has burned out
    #[arg(long)]
    no_early_stop: bool,

    /// JSON file with parameters (missing fields take defaults)
    #[arg(long)]
    params: Option<PathBuf>,

    /// Grid width override
    #[arg(long)]
    width: Option<usize>,

    /// Grid height override
    #[arg(long)]
    height: Option<usize>,

    /// Neighborhood radius override
    #[arg(long)]
    radius: Option<u32>,

    /// Encounters per day override
    #[arg(long)]
    encounters: Option<u32>,

    /// Transmission rate override
    #[arg(long)]
    transmission_rate: Option<f64>,

    /// Evaluate each phase in parallel
    #[arg(long)]
    parallel: bool,

    /// Print the final grid
    #[arg(long)]
    render: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,
}

impl Args {
    /// Whether any parameter source other than the preset was given.
    fn has_overrides(&self) -> bool {
        self.params.is_some()
            || self.width.is_some()
            || self.height.is_some()
            || self.radius.is_some()
            || self.encounters.is_some()
            || self.transmission_rate.is_some()
    }

    /// Resolves the parameters for one scenario: file (or preset), then flags.
    fn resolve_params(&self, scenario: ScenarioId, file: Option<&EpidemicParams>) -> EpidemicParams {
        let mut params = file.cloned().unwrap_or_else(|| scenario.params());

        if let Some(width) = self.width {
            params.width = width;
        }
        if let Some(height) = self.height {
            params.height = height;
        }
        if let Some(radius) = self.radius {
            params.radius = radius;
        }
        if let Some(encounters) = self.encounters {
            params.encounters = encounters;
        }
        if let Some(rate) = self.transmission_rate {
            params.transmission_rate = rate;
        }
        params
    }
}

fn load_params(path: &Path) -> Result<EpidemicParams> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading parameters from {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("parsing parameters from {}", path.display()))
}

fn report_json(results: &[ScenarioResult], failed: usize) -> Result<()> {
    let summary = serde_json::json!({
        "total": results.len(),
        "passed": results.len() - failed,
        "failed": failed,
        "results": results.iter().map(|r| {
            serde_json::json!({
                "scenario": r.scenario.name(),
                "seed": r.seed,
                "passed": r.passed,
                "ticks": r.ticks_run,
                "settled": r.settled,
                "attack_rate": r.attack_rate(),
                "peak_infectious": r.peak_infectious,
                "peak_tick": r.peak_tick,
                "final": r.final_census,
                "failure_reason": r.failure_reason,
            })
        }).collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting tracing subscriber")?;

    let scenarios: Vec<ScenarioId> = if args.scenario == "all" {
        ScenarioId::all()
    } else {
        match args.scenario.parse() {
            Ok(scenario) => vec![scenario],
            Err(e) => bail!(
                "{}; available: baseline, no_transmission, full_transmission, \
                 strict_quarantine, no_quarantine, multi_seed, all",
                e
            ),
        }
    };

    if args.has_overrides() && scenarios.len() > 1 {
        bail!("parameter overrides only apply to a single scenario, not 'all'");
    }

    let file_params = args.params.as_deref().map(load_params).transpose()?;

    let base_seed = if args.seed == 0 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .context("system clock before UNIX epoch")?
            .as_nanos() as u64
    } else {
        args.seed
    };

    let mode = if args.parallel {
        ExecutionMode::Parallel
    } else {
        ExecutionMode::Sequential
    };

    if !args.json {
        info!("Contagion simulator v{}", env!("CARGO_PKG_VERSION"));
    }

    let mut results: Vec<ScenarioResult> = Vec::new();
    let mut failed = 0;

    for seed_offset in 0..args.seeds {
        let seed = base_seed.wrapping_add(seed_offset as u64);
        let runner = ScenarioRunner::new(seed)
            .with_ticks(args.ticks)
            .with_execution(mode)
            .with_stop_when_settled(!args.no_early_stop);

        for scenario in &scenarios {
            let params = args.resolve_params(*scenario, file_params.as_ref());
            let result = runner
                .run_params(*scenario, params)
                .with_context(|| format!("invalid parameters for {}", scenario))?;

            if !args.json {
                if result.passed {
                    info!(
                        "✓ {} (seed={}) PASSED after {} ticks | {} | attack rate {:.1}%",
                        scenario,
                        seed,
                        result.ticks_run,
                        result.final_census,
                        result.attack_rate() * 100.0
                    );
                } else {
                    error!(
                        "✗ {} (seed={}) FAILED: {}",
                        scenario,
                        seed,
                        result.failure_reason.as_deref().unwrap_or("unknown")
                    );
                }
            }

            if args.render {
                eprintln!("{}", result.snapshot);
            }

            if !result.passed {
                failed += 1;
            }
            results.push(result);
        }
    }

    if args.json {
        report_json(&results, failed)?;
    } else if failed == 0 {
        info!("All {} scenario runs passed", results.len());
    } else {
        error!("{}/{} scenario runs failed", failed, results.len());
    }

    // Exit with proper code for CI
    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}
