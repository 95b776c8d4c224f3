use std::f64::consts::TAU;

use crate::error::{GeometryError, Result};
use crate::math::{Point2, Vector2, TOLERANCE};

use super::{Curve, CurveDomain};

/// An axis-aligned elliptical arc parametrized by eccentric angle.
///
/// `P(t) = center + (semi_x * cos(t), semi_y * sin(t))` for `t` in
/// `[start_angle, end_angle]`. The parameter is the eccentric angle, not
/// arc length, so the tangent norm varies along the arc.
#[derive(Debug, Clone)]
pub struct EllipseArc {
    center: Point2,
    semi_x: f64,
    semi_y: f64,
    domain: CurveDomain,
}

impl EllipseArc {
    /// Creates an elliptical arc over `[start_angle, end_angle]`.
    ///
    /// # Errors
    ///
    /// Returns an error if either semi-axis is not positive or the angle
    /// range is reversed.
    pub fn new(
        center: Point2,
        semi_x: f64,
        semi_y: f64,
        start_angle: f64,
        end_angle: f64,
    ) -> Result<Self> {
        if semi_x < TOLERANCE || semi_y < TOLERANCE {
            return Err(
                GeometryError::Degenerate("ellipse semi-axes must be positive".into()).into(),
            );
        }
        let domain = CurveDomain::new(start_angle, end_angle)?;
        Ok(Self {
            center,
            semi_x,
            semi_y,
            domain,
        })
    }

    /// Creates a full ellipse starting at angle zero.
    ///
    /// # Errors
    ///
    /// Returns an error if either semi-axis is not positive.
    pub fn full(center: Point2, semi_x: f64, semi_y: f64) -> Result<Self> {
        Self::new(center, semi_x, semi_y, 0.0, TAU)
    }

    /// Returns the center point.
    #[must_use]
    pub fn center(&self) -> &Point2 {
        &self.center
    }

    /// Returns the semi-axis along x.
    #[must_use]
    pub fn semi_x(&self) -> f64 {
        self.semi_x
    }

    /// Returns the semi-axis along y.
    #[must_use]
    pub fn semi_y(&self) -> f64 {
        self.semi_y
    }
}

impl Curve for EllipseArc {
    fn position(&self, t: f64) -> Result<Point2> {
        self.domain.check("t", t)?;
        Ok(self.center + Vector2::new(self.semi_x * t.cos(), self.semi_y * t.sin()))
    }

    fn tangent(&self, t: f64) -> Result<Vector2> {
        self.domain.check("t", t)?;
        Ok(Vector2::new(-self.semi_x * t.sin(), self.semi_y * t.cos()))
    }

    fn domain(&self) -> CurveDomain {
        self.domain
    }
}
