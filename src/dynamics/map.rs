use std::f64::consts::PI;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{DynamicsError, Result};
use crate::geometry::Boundary;
use crate::math::{Point2, Vector2};
use crate::numerics::{self, RootMethod, SolverSettings};

use super::state::BilliardState;

/// Tunables for the billiard map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSettings {
    /// Root-finding method used unless a call overrides it.
    pub method: RootMethod,
    /// Accuracy of the root search; also the half-width of the window in
    /// which an incidence angle counts as grazing.
    pub accuracy: f64,
    /// Iteration budget per root search.
    pub max_iterations: usize,
    /// Multiple of `accuracy` excluded around the current point when
    /// bracketing the next bounce, so the search cannot collapse onto the
    /// trivial root at the current point.
    pub bracket_factor: f64,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            method: RootMethod::default(),
            accuracy: numerics::DEFAULT_ACCURACY,
            max_iterations: numerics::DEFAULT_MAX_ITERATIONS,
            bracket_factor: 100.0,
        }
    }
}

/// The bounce-to-bounce map of a billiard table.
///
/// Built once per boundary; [`BilliardMap::compute`] advances one
/// incidence state to the next by locating the other intersection of the
/// outgoing ray with the boundary.
#[derive(Debug, Clone)]
pub struct BilliardMap {
    boundary: Arc<Boundary>,
    settings: MapSettings,
    period: f64,
}

impl BilliardMap {
    /// Creates the map for `boundary` with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error when the boundary is not periodic, empty,
    /// discontinuous or not closed.
    pub fn new(boundary: Arc<Boundary>) -> Result<Self> {
        Self::with_settings(boundary, MapSettings::default())
    }

    /// Creates the map with explicit settings.
    ///
    /// # Errors
    ///
    /// Returns an error when the boundary is not periodic, empty,
    /// discontinuous or not closed.
    pub fn with_settings(boundary: Arc<Boundary>, settings: MapSettings) -> Result<Self> {
        if !boundary.periodic() {
            return Err(DynamicsError::NonPeriodicBoundary.into());
        }
        boundary.validate_closed()?;
        let period = boundary.total_length();
        Ok(Self {
            boundary,
            settings,
            period,
        })
    }

    /// The boundary this map bounces on.
    #[must_use]
    pub fn boundary(&self) -> &Arc<Boundary> {
        &self.boundary
    }

    /// The configured settings.
    #[must_use]
    pub fn settings(&self) -> &MapSettings {
        &self.settings
    }

    /// The parameter period of the boundary.
    #[must_use]
    pub fn period(&self) -> f64 {
        self.period
    }

    /// Advances `state` by one bounce with the configured method.
    ///
    /// # Errors
    ///
    /// Returns an error when the next bounce cannot be bracketed or a
    /// boundary evaluation fails.
    pub fn compute(&self, state: BilliardState) -> Result<(BilliardState, Point2)> {
        self.compute_with(state, self.settings.method)
    }

    /// Advances `state` by one bounce with an explicit method.
    ///
    /// # Errors
    ///
    /// Returns an error when the next bounce cannot be bracketed or a
    /// boundary evaluation fails.
    pub fn compute_with(
        &self,
        state: BilliardState,
        method: RootMethod,
    ) -> Result<(BilliardState, Point2)> {
        let phi0 = state.position;
        let theta0 = state.angle;
        let acc = self.settings.accuracy;

        // grazing incidence degenerates to the identity on position and
        // snaps the angle to the exact degenerate value
        if theta0 > -acc && theta0 < acc {
            let point = self.boundary.position(phi0)?;
            return Ok((BilliardState::new(phi0, 0.0), point));
        }
        if theta0 > PI - acc && theta0 < PI + acc {
            let point = self.boundary.position(phi0)?;
            return Ok((BilliardState::new(phi0, PI), point));
        }

        let p0 = self.boundary.position(phi0)?;
        let t0 = self.boundary.tangent(phi0)?;
        // perpendicular to the ray leaving p0 at angle theta0 from the tangent
        let v = Vector2::new(
            -t0.x * theta0.sin() - t0.y * theta0.cos(),
            -t0.y * theta0.sin() + t0.x * theta0.cos(),
        );
        let objective = |phi: f64| -> Result<(f64, f64)> {
            let r = self.boundary.position(phi)? - p0;
            let tangent = self.boundary.tangent(phi)?;
            Ok((r.dot(&v), tangent.dot(&v)))
        };

        let margin = self.settings.bracket_factor * acc;
        let solver = SolverSettings {
            accuracy: acc,
            max_iterations: self.settings.max_iterations,
        };
        let phi1 = numerics::find_root(
            method,
            objective,
            phi0 + margin,
            phi0 + self.period - margin,
            &solver,
        )?;
        let phi1 = phi1.rem_euclid(self.period);

        let p1 = self.boundary.position(phi1)?;
        let t1 = self.boundary.tangent(phi1)?;
        let r = p1 - p0;
        let norm = r.norm() * t1.norm();
        let cos_angle = r.dot(&t1) / norm;
        // acos is ill-conditioned near 0 and pi; switch to asin of the
        // cross term there
        let theta1 = if cos_angle > 0.5 {
            ((r.x * t1.y - r.y * t1.x) / norm).asin()
        } else if cos_angle < -0.5 {
            PI - ((r.x * t1.y - r.y * t1.x) / norm).asin()
        } else {
            cos_angle.acos()
        };

        Ok((BilliardState::new(phi1, theta1), p1))
    }
}
