use serde::{Deserialize, Serialize};

use crate::math::Point2;

/// One incidence state of the billiard flow: where the particle hits the
/// boundary and at which angle it leaves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BilliardState {
    /// Global boundary parameter of the bounce point.
    pub position: f64,
    /// Angle between the outgoing ray and the boundary tangent, expected
    /// in `[0, pi]`.
    pub angle: f64,
}

impl BilliardState {
    /// Creates a state from a boundary parameter and an incidence angle.
    #[must_use]
    pub fn new(position: f64, angle: f64) -> Self {
        Self { position, angle }
    }
}

/// One row of an orbit's history table.
///
/// Rows are plain records so surrounding persistence layers can read and
/// write orbit tables without the kernel prescribing a file format.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BounceRecord {
    /// Boundary parameter of the bounce point.
    pub t: f64,
    /// Incidence angle at the bounce point.
    pub theta: f64,
    /// Cartesian x of the bounce point.
    pub x: f64,
    /// Cartesian y of the bounce point.
    pub y: f64,
}

impl BounceRecord {
    /// Builds the row for `state` bouncing at `point`.
    #[must_use]
    pub fn new(state: BilliardState, point: Point2) -> Self {
        Self {
            t: state.position,
            theta: state.angle,
            x: point.x,
            y: point.y,
        }
    }

    /// The incidence state stored in this row.
    #[must_use]
    pub fn state(&self) -> BilliardState {
        BilliardState::new(self.t, self.theta)
    }

    /// The Cartesian bounce point stored in this row.
    #[must_use]
    pub fn point(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }
}
