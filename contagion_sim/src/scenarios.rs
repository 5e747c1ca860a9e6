//! Named outbreak scenarios.
//!
//! Each scenario is a parameter preset plus an invariant that must hold for
//! every seed. The invariants are exact, so a failure always points at a
//! defect rather than an unlucky draw.

use contagion_core::{Census, Coord, EpidemicParams, Seeding};

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// EPI-001: default parameters, single center seed
    Baseline,

    /// EPI-002: transmission disabled
    NoTransmission,

    /// EPI-003: every encounter infects, whole grid reached
    FullTransmission,

    /// EPI-004: everyone self-quarantines and quarantine is airtight
    StrictQuarantine,

    /// EPI-005: nobody self-quarantines, hospitals are gone
    NoQuarantine,

    /// EPI-006: several random seeds at once
    MultiSeed,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::Baseline,
            ScenarioId::NoTransmission,
            ScenarioId::FullTransmission,
            ScenarioId::StrictQuarantine,
            ScenarioId::NoQuarantine,
            ScenarioId::MultiSeed,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::Baseline => "baseline",
            ScenarioId::NoTransmission => "no_transmission",
            ScenarioId::FullTransmission => "full_transmission",
            ScenarioId::StrictQuarantine => "strict_quarantine",
            ScenarioId::NoQuarantine => "no_quarantine",
            ScenarioId::MultiSeed => "multi_seed",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::Baseline => "50x50 torus, default parameters, one center seed",
            ScenarioId::NoTransmission => "Transmission rate 0, only the seed is ever infected",
            ScenarioId::FullTransmission => "Transmission rate 1 on orthogonal neighbors, attack rate 100%",
            ScenarioId::StrictQuarantine => "All cases quarantine at strictness 0, nobody dies",
            ScenarioId::NoQuarantine => "No self-quarantine and no hospital capacity",
            ScenarioId::MultiSeed => "Five random seed cells on a 40x40 torus",
        }
    }

    /// Returns the parameter preset.
    pub fn params(&self) -> EpidemicParams {
        match self {
            ScenarioId::Baseline => EpidemicParams::default(),
            ScenarioId::NoTransmission => EpidemicParams {
                transmission_rate: 0.0,
                ..Default::default()
            },
            ScenarioId::FullTransmission => EpidemicParams {
                width: 21,
                height: 21,
                radius: 1,
                encounters: 4,
                transmission_rate: 1.0,
                self_quarantine_rate: 0.0,
                ..Default::default()
            },
            ScenarioId::StrictQuarantine => EpidemicParams {
                self_quarantine_rate: 1.0,
                self_quarantine_strictness: 0.0,
                transmission_rate: 0.3,
                ..Default::default()
            },
            ScenarioId::NoQuarantine => EpidemicParams {
                self_quarantine_rate: 0.0,
                hospital_capacity: 0.0,
                fatality_rate: 0.3,
                ..Default::default()
            },
            ScenarioId::MultiSeed => EpidemicParams {
                width: 40,
                height: 40,
                seeding: Seeding::Random { count: 5 },
                ..Default::default()
            },
        }
    }

    /// Checks the scenario invariant against one census.
    ///
    /// Returns a failure reason, or `None` if the invariant holds.
    pub fn check(&self, census: &Census, seeds: &[Coord], cells: usize) -> Option<String> {
        if census.total() != cells {
            return Some(format!(
                "population changed: {} cells, census counts {}",
                cells,
                census.total()
            ));
        }

        match self {
            ScenarioId::Baseline => None,
            ScenarioId::NoTransmission => (census.ever_infected() != seeds.len()).then(|| {
                format!(
                    "{} cells infected with transmission disabled ({} seeds)",
                    census.ever_infected(),
                    seeds.len()
                )
            }),
            // Only meaningful once the run has finished; checked by the runner
            ScenarioId::FullTransmission => None,
            ScenarioId::StrictQuarantine => (census.dead > 0 || census.symptomatic > 0)
                .then(|| format!("quarantine bypassed: {}", census)),
            ScenarioId::NoQuarantine => {
                (census.quarantined > 0).then(|| format!("unexpected quarantine: {}", census))
            }
            ScenarioId::MultiSeed => (census.ever_infected() < seeds.len()).then(|| {
                format!("{} infected but {} seeds", census.ever_infected(), seeds.len())
            }),
        }
    }

    /// Checks the invariant that only applies to the final census.
    ///
    /// `ticks` is the number of ticks the run lasted. Full transmission can
    /// only be judged once the epidemic has burned out, so an unsettled run
    /// fails rather than passing on an incomplete outcome.
    pub fn check_final(&self, census: &Census, settled: bool, ticks: u64) -> Option<String> {
        match self {
            ScenarioId::FullTransmission if !settled => Some(format!(
                "did not settle within {} ticks (attack rate {:.1}%)",
                ticks,
                census.attack_rate() * 100.0
            )),
            ScenarioId::FullTransmission if census.healthy > 0 => Some(format!(
                "{} cells never infected under certain transmission",
                census.healthy
            )),
            _ => None,
        }
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "baseline" | "epi-001" => Ok(ScenarioId::Baseline),
            "no_transmission" | "notransmission" | "epi-002" => Ok(ScenarioId::NoTransmission),
            "full_transmission" | "fulltransmission" | "epi-003" => Ok(ScenarioId::FullTransmission),
            "strict_quarantine" | "strictquarantine" | "epi-004" => Ok(ScenarioId::StrictQuarantine),
            "no_quarantine" | "noquarantine" | "epi-005" => Ok(ScenarioId::NoQuarantine),
            "multi_seed" | "multiseed" | "epi-006" => Ok(ScenarioId::MultiSeed),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for scenario in ScenarioId::all() {
            assert_eq!(scenario.name().parse::<ScenarioId>(), Ok(scenario));
        }
        assert_eq!("EPI-003".parse::<ScenarioId>(), Ok(ScenarioId::FullTransmission));
        assert!("measles".parse::<ScenarioId>().is_err());
    }

    #[test]
    fn test_presets_are_valid() {
        for scenario in ScenarioId::all() {
            assert!(scenario.params().validate().is_ok(), "{} preset invalid", scenario);
        }
    }

    #[test]
    fn test_population_check() {
        let census = Census {
            healthy: 3,
            ..Default::default()
        };
        assert!(ScenarioId::Baseline.check(&census, &[], 4).is_some());
        assert!(ScenarioId::Baseline.check(&census, &[], 3).is_none());
    }

    #[test]
    fn test_no_transmission_check() {
        let seeds = [Coord::new(0, 0)];
        let ok = Census {
            healthy: 8,
            recovered: 1,
            ..Default::default()
        };
        let spread = Census {
            healthy: 7,
            incubating: 2,
            ..Default::default()
        };
        assert!(ScenarioId::NoTransmission.check(&ok, &seeds, 9).is_none());
        assert!(ScenarioId::NoTransmission.check(&spread, &seeds, 9).is_some());
    }

    #[test]
    fn test_full_transmission_final_check() {
        let done = Census {
            recovered: 9,
            ..Default::default()
        };
        let partial = Census {
            healthy: 2,
            incubating: 7,
            ..Default::default()
        };
        let stranded = Census {
            healthy: 2,
            recovered: 7,
            ..Default::default()
        };

        assert!(ScenarioId::FullTransmission.check_final(&done, true, 40).is_none());
        assert!(ScenarioId::FullTransmission.check_final(&partial, false, 3).is_some());
        assert!(ScenarioId::FullTransmission.check_final(&stranded, true, 40).is_some());
        assert!(ScenarioId::Baseline.check_final(&partial, false, 3).is_none());
    }
}
