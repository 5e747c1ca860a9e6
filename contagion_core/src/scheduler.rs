//! Two-phase synchronous scheduler.
//!
//! Every tick runs `Deciding → Committing`:
//!
//! ```text
//!   lattice (pre-tick, borrowed immutably)
//!        │
//!        ▼
//!   decide every cell ──► Vec<Decision> ──► merge ──► PendingTransitions
//!                                                         │
//!   lattice (borrowed mutably) ◄── commit every cell ◄────┘
//! ```
//!
//! The lattice is never written while any cell is deciding, so every read in
//! the decide phase observes the tick's starting state and iteration order
//! cannot bias the outcome.

use crate::cell::{DecideContext, Decision, HealthState};
use crate::lattice::{Coord, Lattice, Stencil};
use crate::params::EpidemicParams;
use crate::random::StreamFactory;
use serde::{Deserialize, Serialize};
use tracing::trace;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// How the per-cell work of each phase is executed.
///
/// Both modes produce identical results for the same seed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// One cell after another on the calling thread
    #[default]
    Sequential,
    /// Data-parallel over cells with rayon (falls back to sequential when
    /// the `parallel` feature is off)
    Parallel,
}

/// Scheduler phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting to evaluate decisions against the current lattice
    Deciding,
    /// Decisions are buffered and waiting to be applied
    Committing,
}

/// One cell's pending slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Slot {
    transition: Option<HealthState>,
    dwell: bool,
}

/// Intents produced by a decide phase, held apart from the live lattice.
///
/// Exists only between [`Scheduler::decide`] and [`Scheduler::commit`].
#[derive(Debug, Clone)]
pub struct PendingTransitions {
    width: usize,
    height: usize,
    slots: Vec<Slot>,
    infections: usize,
}

impl PendingTransitions {
    fn new(width: usize, height: usize, len: usize) -> Self {
        Self {
            width,
            height,
            slots: vec![Slot::default(); len],
            infections: 0,
        }
    }

    /// Pending transition for a coordinate.
    pub fn get(&self, coord: Coord) -> Option<HealthState> {
        if coord.x >= self.width || coord.y >= self.height {
            return None;
        }
        self.slots
            .get(coord.y * self.width + coord.x)
            .and_then(|slot| slot.transition)
    }

    /// Grid dimensions of the lattice this buffer was decided against.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Number of cells marked for infection this tick.
    pub fn infections(&self) -> usize {
        self.infections
    }

    /// Number of cells with any pending transition.
    pub fn transitions(&self) -> usize {
        self.slots.iter().filter(|s| s.transition.is_some()).count()
    }

    /// Folds one decision into the buffer.
    fn merge(&mut self, index: usize, decision: Decision) {
        for target in decision.infections {
            let slot = &mut self.slots[target];
            // Several infectors may reach the same cell; the write is idempotent
            if slot.transition.is_none() {
                self.infections += 1;
            }
            debug_assert!(matches!(
                slot.transition,
                None | Some(HealthState::Incubating)
            ));
            slot.transition = Some(HealthState::Incubating);
        }

        let own = &mut self.slots[index];
        if let Some(next) = decision.transition {
            // Only healthy cells are infection targets and they never self-transition
            debug_assert!(own.transition.is_none());
            own.transition = Some(next);
        }
        own.dwell = decision.dwell;
    }
}

/// Summary of one commit phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitReport {
    /// Cells that changed state
    pub transitions: usize,
    /// Cells that became `Incubating`
    pub new_infections: usize,
}

/// Drives the decide/commit cycle over a lattice.
#[derive(Debug, Clone)]
pub struct Scheduler {
    stencil: Stencil,
    mode: ExecutionMode,
    phase: Phase,
}

impl Scheduler {
    /// Creates a scheduler using a fixed neighborhood stencil.
    pub fn new(stencil: Stencil, mode: ExecutionMode) -> Self {
        Self {
            stencil,
            mode,
            phase: Phase::Deciding,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ExecutionMode) {
        self.mode = mode;
    }

    pub fn stencil(&self) -> &Stencil {
        &self.stencil
    }

    /// Decide phase: evaluates every cell against the unmodified lattice.
    ///
    /// Decisions are merged in cell index order, so the pending buffer does
    /// not depend on how the evaluation was scheduled.
    pub fn decide(
        &mut self,
        lattice: &Lattice,
        params: &EpidemicParams,
        streams: StreamFactory,
    ) -> PendingTransitions {
        debug_assert_eq!(self.phase, Phase::Deciding, "decide called twice without commit");

        let ctx = DecideContext {
            lattice,
            stencil: &self.stencil,
            params,
        };

        let decisions = match self.mode {
            ExecutionMode::Sequential => decide_sequential(&ctx, streams),
            ExecutionMode::Parallel => decide_parallel(&ctx, streams),
        };

        let mut pending = PendingTransitions::new(lattice.width(), lattice.height(), lattice.len());
        for (index, decision) in decisions.into_iter().enumerate() {
            pending.merge(index, decision);
        }

        trace!(
            tick = streams.tick(),
            infections = pending.infections(),
            transitions = pending.transitions(),
            "decide phase complete"
        );

        self.phase = Phase::Committing;
        pending
    }

    /// Commit phase: applies every pending slot and drops the buffer.
    ///
    /// # Panics
    ///
    /// Panics if `pending` was decided against a lattice of different
    /// dimensions.
    pub fn commit(&mut self, lattice: &mut Lattice, pending: PendingTransitions) -> CommitReport {
        debug_assert_eq!(self.phase, Phase::Committing, "commit called before decide");
        assert_eq!(
            pending.dimensions(),
            (lattice.width(), lattice.height()),
            "pending transitions belong to a different lattice"
        );

        let report = CommitReport {
            transitions: pending.transitions(),
            new_infections: pending.infections,
        };

        match self.mode {
            ExecutionMode::Sequential => {
                for (cell, slot) in lattice.cells_mut().iter_mut().zip(pending.slots.iter()) {
                    cell.commit(slot.transition, slot.dwell);
                }
            }
            ExecutionMode::Parallel => commit_parallel(lattice, &pending.slots),
        }

        self.phase = Phase::Deciding;
        report
    }
}

fn decide_one(ctx: &DecideContext<'_>, streams: StreamFactory, index: usize) -> Decision {
    let cell = ctx.lattice.cell_at(index);
    if !cell.state().is_infectious() {
        return Decision::default();
    }
    let mut rng = streams.for_cell(index);
    cell.decide(ctx, &mut rng)
}

fn decide_sequential(ctx: &DecideContext<'_>, streams: StreamFactory) -> Vec<Decision> {
    (0..ctx.lattice.len())
        .map(|index| decide_one(ctx, streams, index))
        .collect()
}

#[cfg(feature = "parallel")]
fn decide_parallel(ctx: &DecideContext<'_>, streams: StreamFactory) -> Vec<Decision> {
    (0..ctx.lattice.len())
        .into_par_iter()
        .map(|index| decide_one(ctx, streams, index))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn decide_parallel(ctx: &DecideContext<'_>, streams: StreamFactory) -> Vec<Decision> {
    decide_sequential(ctx, streams)
}

#[cfg(feature = "parallel")]
fn commit_parallel(lattice: &mut Lattice, slots: &[Slot]) {
    lattice
        .cells_mut()
        .par_iter_mut()
        .zip(slots.par_iter())
        .for_each(|(cell, slot)| cell.commit(slot.transition, slot.dwell));
}

#[cfg(not(feature = "parallel"))]
fn commit_parallel(lattice: &mut Lattice, slots: &[Slot]) {
    for (cell, slot) in lattice.cells_mut().iter_mut().zip(slots.iter()) {
        cell.commit(slot.transition, slot.dwell);
    }
}
