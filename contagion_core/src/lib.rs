//! Contagion Core - synchronous stochastic epidemic automaton
//!
//! A fixed toroidal lattice of cells, each running a small disease state
//! machine, advanced one simulated day per tick:
//!
//! ```text
//!   Healthy ──infection──► Incubating ──┬──► Symptomatic ──┬──► Recovered
//!                                       │                  └──► Dead
//!                                       └──► Quarantined ─────► Recovered
//! ```
//!
//! # Core Principle: Simultaneous Activation
//!
//! Each tick is split into a **decide** phase, where every cell reads the
//! lattice exactly as it stood at the start of the tick, and a **commit**
//! phase, where all buffered transitions are applied together. Nothing a
//! cell decides is visible to any other cell until the next tick.
//!
//! # Determinism
//!
//! All randomness derives from one 64-bit seed. Each acting cell draws from
//! its own per-tick stream, so a run is reproducible regardless of
//! evaluation order or thread count.
//!
//! # Usage
//!
//! ```
//! use contagion_core::{EpidemicParams, Simulation};
//!
//! let params = EpidemicParams {
//!     width: 20,
//!     height: 20,
//!     ..Default::default()
//! };
//!
//! let mut sim = Simulation::new(params, 42).unwrap();
//! for _ in 0..10 {
//!     sim.step();
//! }
//! assert_eq!(sim.snapshot().census().total(), 400);
//! ```

pub mod cell;
pub mod census;
pub mod error;
pub mod lattice;
pub mod params;
pub mod random;
pub mod scheduler;
pub mod simulation;

pub use cell::{Cell, HealthState};
pub use census::Census;
pub use error::ConfigError;
pub use lattice::{Coord, Lattice, Stencil};
pub use params::{EpidemicParams, Seeding};
pub use random::{RandomSource, Stream, StreamFactory};
pub use scheduler::{CommitReport, ExecutionMode, PendingTransitions, Phase, Scheduler};
pub use simulation::{Simulation, Snapshot, StepReport};
