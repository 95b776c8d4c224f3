//! Plain-data simulation settings and initial-condition sampling.
//!
//! Loading these from files or environments is left to the caller; this
//! module only defines the shapes and how conditions turn into states.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::dynamics::{BilliardState, MapSettings};
use crate::numerics::{self, RootMethod};

/// Settings for one simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Bounces to compute per orbit.
    pub iterations: usize,
    /// Whether to spread the orbits over a worker pool.
    #[serde(default)]
    pub parallel: bool,
    /// Worker count for the parallel path; zero sizes the pool
    /// automatically.
    #[serde(default = "default_threads")]
    pub threads: usize,
    /// Root-finding method.
    #[serde(default)]
    pub method: RootMethod,
    /// Root-search accuracy.
    #[serde(default = "default_accuracy")]
    pub accuracy: f64,
    /// Root-search iteration budget.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

fn default_threads() -> usize {
    2
}

fn default_accuracy() -> f64 {
    numerics::DEFAULT_ACCURACY
}

fn default_max_iterations() -> usize {
    numerics::DEFAULT_MAX_ITERATIONS
}

impl SimulationConfig {
    /// The map settings this configuration asks for.
    #[must_use]
    pub fn map_settings(&self) -> MapSettings {
        MapSettings {
            method: self.method,
            accuracy: self.accuracy,
            max_iterations: self.max_iterations,
            ..MapSettings::default()
        }
    }
}

/// One coordinate of an initial condition: either an exact value or a
/// value drawn uniformly from `[min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    /// An exact value.
    Fixed(f64),
    /// A uniform draw between two bounds.
    Uniform {
        /// Lower bound, inclusive.
        min: f64,
        /// Upper bound, exclusive.
        max: f64,
    },
}

impl ConditionValue {
    /// Resolves the value, drawing from `rng` when the value is a range.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match *self {
            Self::Fixed(value) => value,
            Self::Uniform { min, max } => min + (max - min) * rng.random::<f64>(),
        }
    }
}

/// A family of initial conditions: `instances` independent draws of the
/// boundary parameter and the incidence angle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InitialConditionSpec {
    /// Boundary parameter of the starting point.
    pub t: ConditionValue,
    /// Incidence angle of the starting direction.
    pub theta: ConditionValue,
    /// How many states to draw.
    #[serde(default = "default_instances")]
    pub instances: usize,
}

fn default_instances() -> usize {
    1
}

impl InitialConditionSpec {
    /// Draws the states this spec describes. Passing an identically seeded
    /// `rng` reproduces the same states.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<BilliardState> {
        (0..self.instances)
            .map(|_| BilliardState::new(self.t.sample(rng), self.theta.sample(rng)))
            .collect()
    }
}
