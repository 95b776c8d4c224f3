use std::f64::consts::{FRAC_PI_2, TAU};

use crate::error::{GeometryError, Result};
use crate::geometry::polyline::Aabb;
use crate::math::{Point2, Vector2, TOLERANCE};

use super::{Curve, CurveDomain};

/// A circular arc parametrized by arc length.
///
/// `P(s) = center + radius * (cos(a), sin(a))` with
/// `a = start_angle + s / radius`, for `s` in `[0, radius * sweep]`.
/// Unit-speed by construction, so the curve parameter doubles as arc
/// position and boundary offsets stay in geometric units.
#[derive(Debug, Clone)]
pub struct CircleArc {
    center: Point2,
    radius: f64,
    start_angle: f64,
    sweep: f64,
    domain: CurveDomain,
}

impl CircleArc {
    /// Creates an arc sweeping `sweep` radians counterclockwise from
    /// `start_angle`.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius or the sweep is not positive.
    pub fn new(center: Point2, radius: f64, start_angle: f64, sweep: f64) -> Result<Self> {
        if radius < TOLERANCE {
            return Err(GeometryError::Degenerate("circle radius must be positive".into()).into());
        }
        if sweep < TOLERANCE {
            return Err(GeometryError::Degenerate("arc sweep must be positive".into()).into());
        }
        let domain = CurveDomain::new(0.0, radius * sweep)?;
        Ok(Self {
            center,
            radius,
            start_angle,
            sweep,
            domain,
        })
    }

    /// Creates a full circle starting at angle zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is not positive.
    pub fn full(center: Point2, radius: f64) -> Result<Self> {
        Self::new(center, radius, 0.0, TAU)
    }

    /// Returns the center of the circle.
    #[must_use]
    pub fn center(&self) -> &Point2 {
        &self.center
    }

    /// Returns the radius.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Returns the angle at arc position zero.
    #[must_use]
    pub fn start_angle(&self) -> f64 {
        self.start_angle
    }

    /// Returns the angular extent in radians.
    #[must_use]
    pub fn sweep(&self) -> f64 {
        self.sweep
    }

    fn angle_at(&self, s: f64) -> f64 {
        self.start_angle + s / self.radius
    }
}

impl Curve for CircleArc {
    fn position(&self, s: f64) -> Result<Point2> {
        self.domain.check("s", s)?;
        let a = self.angle_at(s);
        Ok(self.center + Vector2::new(a.cos(), a.sin()) * self.radius)
    }

    fn tangent(&self, s: f64) -> Result<Vector2> {
        self.domain.check("s", s)?;
        let a = self.angle_at(s);
        // unit speed: dP/ds has norm 1
        Ok(Vector2::new(-a.sin(), a.cos()))
    }

    fn domain(&self) -> CurveDomain {
        self.domain
    }

    fn bounding_box(&self) -> Result<Aabb> {
        let mut points = vec![self.start_point()?, self.end_point()?];
        let end_angle = self.start_angle + self.sweep;
        // axis extremes sit at quarter-turn multiples inside the sweep
        let k0 = (self.start_angle / FRAC_PI_2).ceil() as i64;
        let k1 = (end_angle / FRAC_PI_2).floor() as i64;
        for k in k0..=k1 {
            let a = FRAC_PI_2 * k as f64;
            points.push(self.center + Vector2::new(a.cos(), a.sin()) * self.radius);
        }
        Aabb::from_points(&points)
            .ok_or_else(|| GeometryError::Degenerate("cannot bound an empty arc".into()).into())
    }
}
