//! Epidemiological parameters and outbreak seeding.

use crate::error::ConfigError;
use crate::lattice::Coord;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Where the outbreak starts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Seeding {
    /// The cell at `(width / 2, height / 2)`
    #[default]
    Center,
    /// An explicit list of distinct coordinates
    At(Vec<Coord>),
    /// `count` distinct cells drawn from the run's root random stream
    Random { count: usize },
}

/// Global parameters of a run. Constant once the simulation is built.
///
/// Integer parameters are unsigned, so negative durations, radius or
/// encounter counts cannot be expressed; probabilities are checked by
/// [`validate`](Self::validate).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EpidemicParams {
    /// Grid width in cells
    pub width: usize,

    /// Grid height in cells
    pub height: usize,

    /// Probability that one encounter infects a healthy neighbor
    pub transmission_rate: f64,

    /// Manhattan radius of the contact neighborhood
    pub radius: u32,

    /// Neighbors sampled per infectious cell per day
    pub encounters: u32,

    /// Value of `incubation_day` at which incubation ends
    pub days_in_incubation: u32,

    /// Value of `symptom_day` at which illness or quarantine ends
    pub days_with_symptoms: u32,

    /// Probability of death at the end of untreated illness
    pub fatality_rate: f64,

    /// Fraction of fatal outcomes averted by hospital care
    pub hospital_capacity: f64,

    /// Probability of entering quarantine instead of showing symptoms
    pub self_quarantine_rate: f64,

    /// Multiplier on the transmission rate while quarantined
    pub self_quarantine_strictness: f64,

    /// Initial outbreak placement
    pub seeding: Seeding,
}

impl Default for EpidemicParams {
    fn default() -> Self {
        Self {
            width: 50,
            height: 50,
            transmission_rate: 0.12,
            radius: 8,
            encounters: 4,
            days_in_incubation: 7,
            days_with_symptoms: 5,
            fatality_rate: 0.03,
            hospital_capacity: 0.5,
            self_quarantine_rate: 0.5,
            self_quarantine_strictness: 0.5,
            seeding: Seeding::Center,
        }
    }
}

impl EpidemicParams {
    /// Checks every parameter against its domain.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyGrid {
                width: self.width,
                height: self.height,
            });
        }
        let cells = self
            .width
            .checked_mul(self.height)
            .ok_or(ConfigError::GridTooLarge {
                width: self.width,
                height: self.height,
            })?;

        let rates = [
            ("transmission_rate", self.transmission_rate),
            ("fatality_rate", self.fatality_rate),
            ("hospital_capacity", self.hospital_capacity),
            ("self_quarantine_rate", self.self_quarantine_rate),
            ("self_quarantine_strictness", self.self_quarantine_strictness),
        ];
        for (name, value) in rates {
            if !(0.0..=1.0).contains(&value) {
                // NaN fails the range check too
                return Err(ConfigError::rate(name, value));
            }
        }

        self.validate_seeding(cells)
    }

    fn validate_seeding(&self, cells: usize) -> Result<(), ConfigError> {
        match &self.seeding {
            Seeding::Center => Ok(()),
            Seeding::At(coords) => {
                if coords.is_empty() {
                    return Err(ConfigError::NoSeeds);
                }
                let mut seen = HashSet::new();
                for c in coords {
                    if c.x >= self.width || c.y >= self.height {
                        return Err(ConfigError::SeedOutOfBounds {
                            x: c.x,
                            y: c.y,
                            width: self.width,
                            height: self.height,
                        });
                    }
                    if !seen.insert(*c) {
                        return Err(ConfigError::DuplicateSeed { x: c.x, y: c.y });
                    }
                }
                Ok(())
            }
            Seeding::Random { count } => {
                if *count == 0 || *count > cells {
                    return Err(ConfigError::SeedCount {
                        requested: *count,
                        available: cells,
                    });
                }
                Ok(())
            }
        }
    }

    /// Probability that a symptomatic cell dies when its illness ends.
    pub fn death_probability(&self) -> f64 {
        self.fatality_rate * (1.0 - self.hospital_capacity)
    }

    /// Per-encounter transmission probability for a quarantined cell.
    pub fn quarantine_transmission_rate(&self) -> f64 {
        self.self_quarantine_strictness * self.transmission_rate
    }

    /// Number of cells on the grid, or `None` if it does not fit a `usize`.
    pub fn cell_count(&self) -> Option<usize> {
        self.width.checked_mul(self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults_are_valid() {
        let params = EpidemicParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.cell_count(), Some(2500));
    }

    #[test]
    fn test_rejects_rates_out_of_range() {
        let params = EpidemicParams {
            transmission_rate: -0.1,
            ..Default::default()
        };
        assert_eq!(
            params.validate(),
            Err(ConfigError::rate("transmission_rate", -0.1))
        );

        let params = EpidemicParams {
            hospital_capacity: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ConfigError::RateOutOfRange { name: "hospital_capacity", .. })
        ));

        let params = EpidemicParams {
            self_quarantine_strictness: f64::NAN,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_accepts_rate_bounds() {
        let params = EpidemicParams {
            transmission_rate: 0.0,
            fatality_rate: 1.0,
            hospital_capacity: 0.0,
            self_quarantine_rate: 1.0,
            self_quarantine_strictness: 0.0,
            radius: 0,
            encounters: 0,
            days_in_incubation: 0,
            days_with_symptoms: 0,
            ..Default::default()
        };
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_rejects_empty_grid() {
        let params = EpidemicParams {
            width: 0,
            ..Default::default()
        };
        assert_eq!(
            params.validate(),
            Err(ConfigError::EmptyGrid { width: 0, height: 50 })
        );
    }

    #[test]
    fn test_rejects_grid_larger_than_address_space() {
        let params: EpidemicParams =
            serde_json::from_str(r#"{ "width": 4294967296, "height": 4294967296 }"#).unwrap();
        assert_eq!(params.cell_count(), None);
        assert_eq!(
            params.validate(),
            Err(ConfigError::GridTooLarge {
                width: 4_294_967_296,
                height: 4_294_967_296,
            })
        );

        let params = EpidemicParams {
            width: usize::MAX,
            height: 2,
            seeding: Seeding::Random { count: 1 },
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ConfigError::GridTooLarge { .. })
        ));
    }

    #[test]
    fn test_seeding_validation() {
        let base = EpidemicParams {
            width: 4,
            height: 3,
            ..Default::default()
        };

        let outside = EpidemicParams {
            seeding: Seeding::At(vec![Coord::new(4, 0)]),
            ..base.clone()
        };
        assert!(matches!(
            outside.validate(),
            Err(ConfigError::SeedOutOfBounds { x: 4, y: 0, .. })
        ));

        let twice = EpidemicParams {
            seeding: Seeding::At(vec![Coord::new(1, 1), Coord::new(1, 1)]),
            ..base.clone()
        };
        assert_eq!(
            twice.validate(),
            Err(ConfigError::DuplicateSeed { x: 1, y: 1 })
        );

        let none = EpidemicParams {
            seeding: Seeding::At(Vec::new()),
            ..base.clone()
        };
        assert_eq!(none.validate(), Err(ConfigError::NoSeeds));

        let too_many = EpidemicParams {
            seeding: Seeding::Random { count: 13 },
            ..base.clone()
        };
        assert!(too_many.validate().is_err());

        let all = EpidemicParams {
            seeding: Seeding::Random { count: 12 },
            ..base
        };
        assert!(all.validate().is_ok());
    }

    #[test]
    fn test_derived_probabilities() {
        let params = EpidemicParams {
            fatality_rate: 0.2,
            hospital_capacity: 0.25,
            transmission_rate: 0.4,
            self_quarantine_strictness: 0.5,
            ..Default::default()
        };
        assert_relative_eq!(params.death_probability(), 0.15, epsilon = 1e-12);
        assert_relative_eq!(params.quarantine_transmission_rate(), 0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let params: EpidemicParams =
            serde_json::from_str(r#"{ "width": 10, "transmission_rate": 0.3 }"#).unwrap();
        assert_eq!(params.width, 10);
        assert_eq!(params.height, 50);
        assert_relative_eq!(params.transmission_rate, 0.3);
        assert_eq!(params.seeding, Seeding::Center);

        let params: EpidemicParams =
            serde_json::from_str(r#"{ "seeding": { "random": { "count": 3 } } }"#).unwrap();
        assert_eq!(params.seeding, Seeding::Random { count: 3 });
    }

    #[test]
    fn test_negative_radius_is_unrepresentable() {
        let parsed: Result<EpidemicParams, _> = serde_json::from_str(r#"{ "radius": -1 }"#);
        assert!(parsed.is_err());
    }
}
