//! Scenario runner - drives a simulation for a bounded number of ticks and
//! checks the scenario invariant after every step.

use crate::scenarios::ScenarioId;

use contagion_core::{Census, ConfigError, EpidemicParams, ExecutionMode, Simulation, Snapshot};
use tracing::{debug, info, warn};

/// Results from running a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Scenario that was run
    pub scenario: ScenarioId,

    /// Seed used
    pub seed: u64,

    /// Whether the scenario invariant held for the whole run
    pub passed: bool,

    /// Total ticks executed
    pub ticks_run: u64,

    /// Whether the epidemic burned out before the tick limit
    pub settled: bool,

    /// Census after the last tick
    pub final_census: Census,

    /// Largest number of simultaneously infectious cells
    pub peak_infectious: usize,

    /// Tick at which the peak was first reached
    pub peak_tick: u64,

    /// Census per tick, starting with the seeded state at tick 0
    pub curve: Vec<Census>,

    /// Final per-cell states
    pub snapshot: Snapshot,

    /// Failure message if any
    pub failure_reason: Option<String>,
}

impl ScenarioResult {
    /// Fraction of the population ever infected.
    pub fn attack_rate(&self) -> f64 {
        self.final_census.attack_rate()
    }
}

/// Runs scenarios.
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    /// Master seed
    seed: u64,

    /// Tick limit
    max_ticks: u64,

    /// Phase execution mode
    mode: ExecutionMode,

    /// End the run early once nothing infectious remains
    stop_when_settled: bool,
}

impl ScenarioRunner {
    /// Creates a new scenario runner.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            max_ticks: 200,
            mode: ExecutionMode::Sequential,
            stop_when_settled: true,
        }
    }

    /// Sets the tick limit.
    pub fn with_ticks(mut self, ticks: u64) -> Self {
        self.max_ticks = ticks;
        self
    }

    /// Sets the phase execution mode.
    pub fn with_execution(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Keeps stepping until the tick limit even after the epidemic ends.
    pub fn with_stop_when_settled(mut self, stop: bool) -> Self {
        self.stop_when_settled = stop;
        self
    }

    /// Runs a scenario with its preset parameters.
    pub fn run(&self, scenario: ScenarioId) -> Result<ScenarioResult, ConfigError> {
        self.run_params(scenario, scenario.params())
    }

    /// Runs a scenario's invariant against caller-supplied parameters.
    pub fn run_params(
        &self,
        scenario: ScenarioId,
        params: EpidemicParams,
    ) -> Result<ScenarioResult, ConfigError> {
        info!("Starting scenario: {} (seed={})", scenario.name(), self.seed);

        let mut sim = Simulation::new(params, self.seed)?.with_execution(self.mode);
        let cells = sim.lattice().len();
        let seeds = sim.seed_cells().to_vec();

        let initial = sim.census();
        let mut curve = vec![initial];
        let mut peak_infectious = initial.infectious();
        let mut peak_tick = 0;
        let mut failure_reason = scenario.check(&initial, &seeds, cells);

        while failure_reason.is_none() && sim.tick() < self.max_ticks {
            if self.stop_when_settled && sim.is_settled() {
                break;
            }

            let report = sim.step();
            curve.push(report.census);

            if report.census.infectious() > peak_infectious {
                peak_infectious = report.census.infectious();
                peak_tick = report.tick;
            }

            if report.tick % 25 == 0 {
                debug!(
                    "  t={} | {} | new={}",
                    report.tick, report.census, report.new_infections
                );
            }

            failure_reason = scenario.check(&report.census, &seeds, cells);
        }

        let final_census = sim.census();
        let settled = sim.is_settled();
        if failure_reason.is_none() {
            failure_reason = scenario.check_final(&final_census, settled, sim.tick());
        }

        let passed = failure_reason.is_none();
        if let Some(reason) = &failure_reason {
            warn!("{} failed at tick {}: {}", scenario.name(), sim.tick(), reason);
        }

        Ok(ScenarioResult {
            scenario,
            seed: self.seed,
            passed,
            ticks_run: sim.tick(),
            settled,
            final_census,
            peak_infectious,
            peak_tick,
            curve,
            snapshot: sim.snapshot(),
            failure_reason,
        })
    }
}
