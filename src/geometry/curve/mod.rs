mod circle;
mod ellipse;
mod function;
mod line;

pub use circle::CircleArc;
pub use ellipse::EllipseArc;
pub use function::FunctionCurve;
pub use line::Line;

use crate::error::{GeometryError, Result};
use crate::geometry::polyline::{Aabb, Polyline};
use crate::math::{Point2, Vector2};

const BOX_SAMPLES: usize = 64;

/// Parameter domain for a curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveDomain {
    t0: f64,
    t1: f64,
}

impl CurveDomain {
    /// Creates a new curve domain over `[t0, t1]`.
    ///
    /// # Errors
    ///
    /// Returns an error if `t1` is below `t0`.
    pub fn new(t0: f64, t1: f64) -> Result<Self> {
        if t1 < t0 {
            return Err(GeometryError::InvalidDomain { t0, t1 }.into());
        }
        Ok(Self { t0, t1 })
    }

    /// Start of the parameter range.
    #[must_use]
    pub fn t0(&self) -> f64 {
        self.t0
    }

    /// End of the parameter range.
    #[must_use]
    pub fn t1(&self) -> f64 {
        self.t1
    }

    /// Extent of the parameter range.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.t1 - self.t0
    }

    /// Returns whether `t` lies within the range.
    #[must_use]
    pub fn contains(&self, t: f64) -> bool {
        t >= self.t0 && t <= self.t1
    }

    /// Validates that `t` lies within the range.
    ///
    /// # Errors
    ///
    /// Returns an error naming `parameter` if `t` is out of range.
    pub fn check(&self, parameter: &'static str, t: f64) -> Result<()> {
        if self.contains(t) {
            Ok(())
        } else {
            Err(GeometryError::ParameterOutOfRange {
                parameter,
                value: t,
                min: self.t0,
                max: self.t1,
            }
            .into())
        }
    }
}

/// Trait for parametric curves in the plane.
///
/// Implementations are shared read-only across simulation workers, hence
/// the `Send + Sync` bound. The tangent is the parametric velocity `dP/dt`
/// and is deliberately left unnormalized: the bounce objective function
/// differentiates through it.
pub trait Curve: std::fmt::Debug + Send + Sync {
    /// Evaluates the curve position at parameter `t`.
    ///
    /// # Errors
    ///
    /// Returns an error if `t` is outside the curve domain.
    fn position(&self, t: f64) -> Result<Point2>;

    /// Evaluates the curve derivative at parameter `t`.
    ///
    /// # Errors
    ///
    /// Returns an error if `t` is outside the curve domain.
    fn tangent(&self, t: f64) -> Result<Vector2>;

    /// Returns the parameter domain of the curve.
    fn domain(&self) -> CurveDomain;

    /// Evaluates the curve at the start of its domain.
    ///
    /// # Errors
    ///
    /// Returns an error if evaluation fails.
    fn start_point(&self) -> Result<Point2> {
        self.position(self.domain().t0())
    }

    /// Evaluates the curve at the end of its domain.
    ///
    /// # Errors
    ///
    /// Returns an error if evaluation fails.
    fn end_point(&self) -> Result<Point2> {
        self.position(self.domain().t1())
    }

    /// Samples the curve into a polyline with at least two points.
    ///
    /// # Errors
    ///
    /// Returns an error if any sample evaluation fails.
    fn polyline(&self, samples: usize) -> Result<Polyline> {
        let domain = self.domain();
        let n = samples.max(2);
        let last = (n - 1) as f64;
        let mut points = Vec::with_capacity(n);
        for i in 0..n {
            // the far end is evaluated exactly so fp drift cannot leave the domain
            let t = if i == n - 1 {
                domain.t1()
            } else {
                domain.t0() + domain.length() * (i as f64) / last
            };
            points.push(self.position(t)?);
        }
        Ok(Polyline::new(points))
    }

    /// Returns an axis-aligned box enclosing a sampled approximation of the
    /// curve.
    ///
    /// # Errors
    ///
    /// Returns an error if sampling fails.
    fn bounding_box(&self) -> Result<Aabb> {
        let polyline = self.polyline(BOX_SAMPLES)?;
        polyline.aabb().ok_or_else(|| {
            GeometryError::Degenerate("cannot bound an empty polyline".into()).into()
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::CaromError;

    #[test]
    fn domain_rejects_reversed_range() {
        let r = CurveDomain::new(1.0, 0.0);
        assert!(matches!(
            r,
            Err(CaromError::Geometry(GeometryError::InvalidDomain { .. }))
        ));
    }

    #[test]
    fn domain_contains_endpoints() {
        let d = CurveDomain::new(-1.0, 2.0).unwrap();
        assert!(d.contains(-1.0));
        assert!(d.contains(2.0));
        assert!(!d.contains(2.0 + 1e-12));
    }

    #[test]
    fn degenerate_domain_is_allowed() {
        let d = CurveDomain::new(0.5, 0.5).unwrap();
        assert!(d.contains(0.5));
        assert!((d.length()).abs() < f64::EPSILON);
    }

    #[test]
    fn check_names_the_parameter() {
        let d = CurveDomain::new(0.0, 1.0).unwrap();
        let err = d.check("s", 2.0).unwrap_err();
        assert!(err.to_string().contains('s'));
    }
}
