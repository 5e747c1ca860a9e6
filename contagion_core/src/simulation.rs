//! Simulation - owns the parameters, lattice, scheduler and random source.
//!
//! The surface seen by a host is deliberately small: construct, `step()`,
//! and read-only queries (`snapshot()`, `census()`, ...). The host decides
//! how many ticks to run; state is consistent at every tick boundary.

use crate::census::Census;
use crate::cell::HealthState;
use crate::error::ConfigError;
use crate::lattice::{Coord, Lattice, Stencil};
use crate::params::{EpidemicParams, Seeding};
use crate::random::RandomSource;
use crate::scheduler::{ExecutionMode, Scheduler};
use serde::Serialize;
use tracing::{debug, info};

/// Outcome of one call to [`Simulation::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepReport {
    /// Tick count after this step
    pub tick: u64,
    /// Cells that became `Incubating` this tick
    pub new_infections: usize,
    /// Cells that changed state this tick
    pub transitions: usize,
    /// Population counts after commit
    pub census: Census,
}

/// Dense coordinate → state mapping at one tick boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    tick: u64,
    width: usize,
    height: usize,
    states: Vec<HealthState>,
}

impl Snapshot {
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// State at a coordinate, or `None` if it lies off the grid.
    pub fn state(&self, coord: Coord) -> Option<HealthState> {
        if coord.x < self.width && coord.y < self.height {
            self.states.get(coord.y * self.width + coord.x).copied()
        } else {
            None
        }
    }

    /// Row-major states.
    pub fn states(&self) -> &[HealthState] {
        &self.states
    }

    /// Every `(coordinate, state)` pair in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, HealthState)> + '_ {
        let width = self.width;
        self.states
            .iter()
            .enumerate()
            .map(move |(i, s)| (Coord::new(i % width, i / width), *s))
    }

    pub fn census(&self) -> Census {
        Census::from_states(self.states.iter().copied())
    }
}

impl std::fmt::Display for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.states.chunks(self.width) {
            let line: String = row.iter().map(|s| s.glyph()).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// A running epidemic.
#[derive(Debug, Clone)]
pub struct Simulation {
    params: EpidemicParams,
    lattice: Lattice,
    scheduler: Scheduler,
    random: RandomSource,
    seed_cells: Vec<Coord>,
    tick: u64,
}

impl Simulation {
    /// Validates `params`, builds the lattice and seeds the outbreak.
    ///
    /// Every run with the same `params` and `seed` is bit-identical.
    pub fn new(params: EpidemicParams, seed: u64) -> Result<Self, ConfigError> {
        params.validate()?;

        let mut random = RandomSource::new(seed);
        let mut lattice = Lattice::new(params.width, params.height);

        let seed_cells = match &params.seeding {
            Seeding::Center => vec![Coord::new(params.width / 2, params.height / 2)],
            Seeding::At(coords) => coords.clone(),
            Seeding::Random { count } => random
                .sample(lattice.len(), *count)
                .into_iter()
                .map(|i| lattice.coord_of(i))
                .collect(),
        };

        for coord in &seed_cells {
            let index = lattice.index_of(*coord);
            lattice.cell_at_mut(index).seed_infection();
        }

        let stencil = Stencil::von_neumann(params.radius, params.width, params.height);
        info!(
            width = params.width,
            height = params.height,
            radius = params.radius,
            neighborhood = stencil.len(),
            seeds = seed_cells.len(),
            seed,
            "simulation constructed"
        );

        Ok(Self {
            scheduler: Scheduler::new(stencil, ExecutionMode::default()),
            params,
            lattice,
            random,
            seed_cells,
            tick: 0,
        })
    }

    /// Selects sequential or parallel phase execution.
    pub fn with_execution(mut self, mode: ExecutionMode) -> Self {
        self.scheduler.set_mode(mode);
        self
    }

    /// Advances the whole lattice by one day.
    pub fn step(&mut self) -> StepReport {
        let streams = self.random.streams(self.tick);
        let pending = self.scheduler.decide(&self.lattice, &self.params, streams);
        let commit = self.scheduler.commit(&mut self.lattice, pending);
        self.tick += 1;

        let census = self.census();
        debug!(
            tick = self.tick,
            new_infections = commit.new_infections,
            transitions = commit.transitions,
            %census,
            "step"
        );

        StepReport {
            tick: self.tick,
            new_infections: commit.new_infections,
            transitions: commit.transitions,
            census,
        }
    }

    /// Per-cell states at the current tick boundary.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.tick,
            width: self.lattice.width(),
            height: self.lattice.height(),
            states: self.lattice.states(),
        }
    }

    pub fn census(&self) -> Census {
        Census::from_states(self.lattice.cells().iter().map(|c| c.state()))
    }

    /// Ticks completed so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn params(&self) -> &EpidemicParams {
        &self.params
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    /// Master seed of the run.
    pub fn seed(&self) -> u64 {
        self.random.seed()
    }

    /// Coordinates infected at construction.
    pub fn seed_cells(&self) -> &[Coord] {
        &self.seed_cells
    }

    /// True when no infectious cell remains, so no further state change is
    /// possible. The core never stops on its own.
    pub fn is_settled(&self) -> bool {
        self.lattice.cells().iter().all(|c| !c.state().is_infectious())
    }
}
