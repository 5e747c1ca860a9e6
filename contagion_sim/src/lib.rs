//! Contagion Deterministic Scenario Harness
//!
//! Runs the epidemic automaton under named parameter presets and checks an
//! exact invariant for each, over as many seeds as requested. Any failure is
//! reproducible from its seed alone.
//!
//! # Usage
//!
//! ```ignore
//! use contagion_sim::{ScenarioRunner, ScenarioId};
//!
//! let runner = ScenarioRunner::new(42).with_ticks(100);
//! let result = runner.run(ScenarioId::FullTransmission)?;
//! assert!(result.passed);
//! ```

mod runner;
pub mod scenarios;

pub use runner::{ScenarioResult, ScenarioRunner};
pub use scenarios::ScenarioId;
