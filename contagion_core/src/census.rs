//! Per-state population counts.

use crate::cell::HealthState;
use serde::{Deserialize, Serialize};

/// Number of cells in each state at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Census {
    pub healthy: usize,
    pub incubating: usize,
    pub symptomatic: usize,
    pub quarantined: usize,
    pub recovered: usize,
    pub dead: usize,
}

impl Census {
    /// Counts a sequence of states.
    pub fn from_states<I>(states: I) -> Self
    where
        I: IntoIterator<Item = HealthState>,
    {
        let mut census = Census::default();
        for state in states {
            *census.slot_mut(state) += 1;
        }
        census
    }

    fn slot_mut(&mut self, state: HealthState) -> &mut usize {
        match state {
            HealthState::Healthy => &mut self.healthy,
            HealthState::Incubating => &mut self.incubating,
            HealthState::Symptomatic => &mut self.symptomatic,
            HealthState::Quarantined => &mut self.quarantined,
            HealthState::Recovered => &mut self.recovered,
            HealthState::Dead => &mut self.dead,
        }
    }

    /// Count for one state.
    pub fn count(&self, state: HealthState) -> usize {
        match state {
            HealthState::Healthy => self.healthy,
            HealthState::Incubating => self.incubating,
            HealthState::Symptomatic => self.symptomatic,
            HealthState::Quarantined => self.quarantined,
            HealthState::Recovered => self.recovered,
            HealthState::Dead => self.dead,
        }
    }

    /// Total population.
    pub fn total(&self) -> usize {
        self.healthy
            + self.incubating
            + self.symptomatic
            + self.quarantined
            + self.recovered
            + self.dead
    }

    /// Cells currently carrying the disease.
    pub fn infectious(&self) -> usize {
        self.incubating + self.symptomatic + self.quarantined
    }

    /// Cells that have ever left `Healthy`.
    ///
    /// `Healthy` is never re-entered, so this is everyone else.
    pub fn ever_infected(&self) -> usize {
        self.total() - self.healthy
    }

    /// Fraction of the population ever infected.
    pub fn attack_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.ever_infected() as f64 / total as f64
        }
    }
}

impl std::fmt::Display for Census {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "H={} I={} S={} Q={} R={} D={}",
            self.healthy,
            self.incubating,
            self.symptomatic,
            self.quarantined,
            self.recovered,
            self.dead
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_states() {
        let census = Census::from_states([
            HealthState::Healthy,
            HealthState::Healthy,
            HealthState::Incubating,
            HealthState::Quarantined,
            HealthState::Dead,
        ]);

        assert_eq!(census.total(), 5);
        assert_eq!(census.count(HealthState::Healthy), 2);
        assert_eq!(census.infectious(), 2);
        assert_eq!(census.ever_infected(), 3);
        assert_relative_eq!(census.attack_rate(), 0.6);
    }

    #[test]
    fn test_empty_attack_rate() {
        assert_relative_eq!(Census::default().attack_rate(), 0.0);
    }

    #[test]
    fn test_count_matches_fields() {
        let states: Vec<HealthState> = HealthState::ALL
            .iter()
            .enumerate()
            .flat_map(|(i, s)| std::iter::repeat(*s).take(i + 1))
            .collect();
        let census = Census::from_states(states);

        for (i, state) in HealthState::ALL.iter().enumerate() {
            assert_eq!(census.count(*state), i + 1);
        }
        assert_eq!(census.total(), 21);
    }
}
