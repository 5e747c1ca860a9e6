//! Per-cell disease state machine.
//!
//! A tick is split in two:
//! - **Decide**: [`Cell::decide`] reads the pre-tick lattice and returns a
//!   [`Decision`] (neighbors to infect, own next state, or another day in
//!   the current state). It never mutates anything.
//! - **Commit**: [`Cell::commit`] applies the cell's own pending slot.
//!
//! Behavior per state is a single `match` on [`HealthState`].

use crate::lattice::{Coord, Lattice, Stencil};
use crate::params::EpidemicParams;
use crate::random::Stream;
use serde::{Deserialize, Serialize};

/// Disease state of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    /// Never exposed
    Healthy,
    /// Infected, asymptomatic, infectious
    Incubating,
    /// Visibly ill, infectious
    Symptomatic,
    /// Immune, terminal
    Recovered,
    /// Terminal
    Dead,
    /// Isolated, infectious at a reduced rate
    Quarantined,
}

impl HealthState {
    /// Every state, in declaration order.
    pub const ALL: [HealthState; 6] = [
        HealthState::Healthy,
        HealthState::Incubating,
        HealthState::Symptomatic,
        HealthState::Recovered,
        HealthState::Dead,
        HealthState::Quarantined,
    ];

    /// Returns the state name.
    pub fn name(&self) -> &'static str {
        match self {
            HealthState::Healthy => "healthy",
            HealthState::Incubating => "incubating",
            HealthState::Symptomatic => "symptomatic",
            HealthState::Recovered => "recovered",
            HealthState::Dead => "dead",
            HealthState::Quarantined => "quarantined",
        }
    }

    /// Single-character glyph for text hosts.
    pub fn glyph(&self) -> char {
        match self {
            HealthState::Healthy => '.',
            HealthState::Incubating => 'i',
            HealthState::Symptomatic => 'S',
            HealthState::Recovered => 'r',
            HealthState::Dead => 'x',
            HealthState::Quarantined => 'q',
        }
    }

    /// Recovered and Dead never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, HealthState::Recovered | HealthState::Dead)
    }

    /// States that carry the disease.
    pub fn is_infectious(&self) -> bool {
        matches!(
            self,
            HealthState::Incubating | HealthState::Symptomatic | HealthState::Quarantined
        )
    }
}

impl std::fmt::Display for HealthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Outcome of one cell's decide phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decision {
    /// Row-major indices of healthy neighbors this cell infected.
    pub infections: Vec<usize>,

    /// The cell's own next state, if it leaves its current one.
    pub transition: Option<HealthState>,

    /// The cell stays another day in its state; its duration counter
    /// advances at commit.
    pub dwell: bool,
}

impl Decision {
    fn dwell() -> Self {
        Self {
            dwell: true,
            ..Default::default()
        }
    }

    fn transition(next: HealthState) -> Self {
        Self {
            transition: Some(next),
            ..Default::default()
        }
    }

    fn with_infections(mut self, infections: Vec<usize>) -> Self {
        self.infections = infections;
        self
    }
}

/// Read-only inputs shared by every decide call in a tick.
#[derive(Debug, Clone, Copy)]
pub struct DecideContext<'a> {
    pub lattice: &'a Lattice,
    pub stencil: &'a Stencil,
    pub params: &'a EpidemicParams,
}

/// One lattice position and its disease state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    coord: Coord,
    state: HealthState,
    incubation_day: u32,
    symptom_day: u32,
}

impl Cell {
    /// Creates a healthy cell.
    pub fn new(coord: Coord) -> Self {
        Self {
            coord,
            state: HealthState::Healthy,
            incubation_day: 0,
            symptom_day: 0,
        }
    }

    pub fn coord(&self) -> Coord {
        self.coord
    }

    pub fn state(&self) -> HealthState {
        self.state
    }

    /// Days spent in `Incubating`.
    pub fn incubation_day(&self) -> u32 {
        self.incubation_day
    }

    /// Days spent in `Symptomatic` or `Quarantined`.
    pub fn symptom_day(&self) -> u32 {
        self.symptom_day
    }

    /// Marks this cell as an outbreak origin.
    pub(crate) fn seed_infection(&mut self) {
        self.state = HealthState::Incubating;
        self.incubation_day = 1;
    }

    /// Decide phase: computes this cell's intents from the pre-tick lattice.
    ///
    /// Healthy, Recovered and Dead cells return an empty decision without
    /// drawing from `rng`.
    pub fn decide(&self, ctx: &DecideContext<'_>, rng: &mut Stream) -> Decision {
        let params = ctx.params;

        match self.state {
            HealthState::Incubating => {
                let infections = self.transmit(ctx, rng, params.transmission_rate);

                let decision = if self.incubation_day == params.days_in_incubation {
                    if rng.chance(params.self_quarantine_rate) {
                        Decision::transition(HealthState::Quarantined)
                    } else {
                        Decision::transition(HealthState::Symptomatic)
                    }
                } else {
                    Decision::dwell()
                };

                decision.with_infections(infections)
            }
            HealthState::Symptomatic => {
                if self.symptom_day == params.days_with_symptoms {
                    if rng.chance(params.death_probability()) {
                        Decision::transition(HealthState::Dead)
                    } else {
                        Decision::transition(HealthState::Recovered)
                    }
                } else {
                    Decision::dwell()
                }
            }
            HealthState::Quarantined => {
                let infections =
                    self.transmit(ctx, rng, params.quarantine_transmission_rate());

                // symptom_day is not reset on entry; see DESIGN.md
                let decision = if self.symptom_day == params.days_with_symptoms {
                    Decision::transition(HealthState::Recovered)
                } else {
                    Decision::dwell()
                };

                decision.with_infections(infections)
            }
            HealthState::Healthy | HealthState::Recovered | HealthState::Dead => {
                Decision::default()
            }
        }
    }

    /// Samples up to `encounters` neighbors and infects the healthy ones
    /// with probability `probability` each.
    ///
    /// One Bernoulli draw is made per sampled neighbor whatever its state,
    /// so the draw sequence depends only on the sample size.
    fn transmit(&self, ctx: &DecideContext<'_>, rng: &mut Stream, probability: f64) -> Vec<usize> {
        let neighbors = ctx.lattice.neighbor_indices(self.coord, ctx.stencil);
        let picks = rng.sample(neighbors.len(), ctx.params.encounters as usize);

        let mut infected = Vec::new();
        for pick in picks {
            let target = neighbors[pick];
            let hit = rng.chance(probability);
            if hit && ctx.lattice.cell_at(target).state == HealthState::Healthy {
                infected.push(target);
            }
        }
        infected
    }

    /// Commit phase: applies this cell's pending slot.
    ///
    /// `dwell` advances the counter of the current state. A transition
    /// replaces the state and bumps the counter of the state entered.
    pub fn commit(&mut self, transition: Option<HealthState>, dwell: bool) {
        if dwell {
            match self.state {
                HealthState::Incubating => {
                    self.incubation_day = self.incubation_day.saturating_add(1);
                }
                HealthState::Symptomatic | HealthState::Quarantined => {
                    self.symptom_day = self.symptom_day.saturating_add(1);
                }
                _ => {}
            }
        }

        let Some(next) = transition else {
            return;
        };

        debug_assert!(
            !self.state.is_terminal(),
            "terminal cell {} received a transition to {}",
            self.coord,
            next
        );

        self.state = next;
        match next {
            HealthState::Incubating => {
                self.incubation_day = self.incubation_day.saturating_add(1);
            }
            HealthState::Symptomatic | HealthState::Quarantined => {
                self.symptom_day = self.symptom_day.saturating_add(1);
            }
            HealthState::Healthy | HealthState::Recovered | HealthState::Dead => {}
        }
    }
}
