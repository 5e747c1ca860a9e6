//! Error types for simulation construction.

use thiserror::Error;

/// Errors raised when a parameter set cannot produce a valid simulation.
///
/// These are only ever returned from construction. A running simulation
/// has no error path: neighborhoods wrap and sampling caps to what exists.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A probability parameter is outside `[0, 1]` or not finite
    #[error("{name} must be within [0, 1], got {value}")]
    RateOutOfRange {
        /// Parameter name as it appears in the configuration record
        name: &'static str,
        /// Offending value
        value: f64,
    },

    /// Grid has a zero dimension
    #[error("grid dimensions must be at least 1x1, got {width}x{height}")]
    EmptyGrid { width: usize, height: usize },

    /// Cell count does not fit in memory addressing
    #[error("grid of {width}x{height} cells is too large")]
    GridTooLarge { width: usize, height: usize },

    /// A seed coordinate lies outside the grid
    #[error("seed cell ({x}, {y}) is outside the {width}x{height} grid")]
    SeedOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    /// The same seed coordinate was listed twice
    #[error("seed cell ({x}, {y}) listed more than once")]
    DuplicateSeed { x: usize, y: usize },

    /// Explicit seeding with no coordinates
    #[error("at least one seed cell is required")]
    NoSeeds,

    /// Random seeding asked for zero cells or more cells than exist
    #[error("cannot place {requested} random seeds on a grid of {available} cells")]
    SeedCount { requested: usize, available: usize },
}

impl ConfigError {
    /// Creates a rate error.
    pub fn rate(name: &'static str, value: f64) -> Self {
        Self::RateOutOfRange { name, value }
    }
}
