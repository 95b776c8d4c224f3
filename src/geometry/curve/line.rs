use crate::error::{GeometryError, Result};
use crate::geometry::polyline::Aabb;
use crate::math::{Point2, Vector2, TOLERANCE};

use super::{Curve, CurveDomain};

/// A straight segment between two points, parametrized by arc length.
///
/// `P(s) = start + s * direction` for `s` in `[0, |end - start|]`, with
/// `direction` the unit vector from start to end.
#[derive(Debug, Clone)]
pub struct Line {
    start: Point2,
    end: Point2,
    direction: Vector2,
    domain: CurveDomain,
}

impl Line {
    /// Creates a segment from `start` to `end`.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoints coincide.
    pub fn new(start: Point2, end: Point2) -> Result<Self> {
        let chord = end - start;
        let length = chord.norm();
        if length < TOLERANCE {
            return Err(GeometryError::Degenerate("segment endpoints coincide".into()).into());
        }
        let domain = CurveDomain::new(0.0, length)?;
        Ok(Self {
            start,
            end,
            direction: chord / length,
            domain,
        })
    }

    /// Returns the start point.
    #[must_use]
    pub fn start(&self) -> &Point2 {
        &self.start
    }

    /// Returns the end point.
    #[must_use]
    pub fn end(&self) -> &Point2 {
        &self.end
    }

    /// Returns the unit direction from start to end.
    #[must_use]
    pub fn direction(&self) -> &Vector2 {
        &self.direction
    }

    /// Returns the segment length.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.domain.t1()
    }
}

impl Curve for Line {
    fn position(&self, s: f64) -> Result<Point2> {
        self.domain.check("s", s)?;
        Ok(self.start + self.direction * s)
    }

    fn tangent(&self, s: f64) -> Result<Vector2> {
        self.domain.check("s", s)?;
        Ok(self.direction)
    }

    fn domain(&self) -> CurveDomain {
        self.domain
    }

    fn bounding_box(&self) -> Result<Aabb> {
        Aabb::from_points(&[self.start, self.end])
            .ok_or_else(|| GeometryError::Degenerate("cannot bound an empty segment".into()).into())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn position_interpolates() {
        let l = Line::new(Point2::new(0.0, 0.0), Point2::new(3.0, 4.0)).unwrap();
        assert!((l.length() - 5.0).abs() < 1e-12);
        let mid = l.position(2.5).unwrap();
        assert!((mid - Point2::new(1.5, 2.0)).norm() < 1e-12);
    }

    #[test]
    fn endpoints_are_exact() {
        let l = Line::new(Point2::new(1.0, 1.0), Point2::new(1.0, 3.0)).unwrap();
        assert!((l.start_point().unwrap() - Point2::new(1.0, 1.0)).norm() < 1e-12);
        assert!((l.end_point().unwrap() - Point2::new(1.0, 3.0)).norm() < 1e-9);
    }

    #[test]
    fn tangent_is_constant_unit() {
        let l = Line::new(Point2::new(0.0, 0.0), Point2::new(2.0, 0.0)).unwrap();
        let t = l.tangent(1.0).unwrap();
        assert!((t - Vector2::new(1.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn rejects_out_of_domain() {
        let l = Line::new(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)).unwrap();
        assert!(l.position(1.5).is_err());
    }

    #[test]
    fn coincident_endpoints() {
        assert!(Line::new(Point2::new(1.0, 1.0), Point2::new(1.0, 1.0)).is_err());
    }
}
