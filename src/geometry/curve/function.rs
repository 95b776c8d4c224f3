use std::fmt;

use crate::error::Result;
use crate::math::{Point2, Vector2};

use super::{Curve, CurveDomain};

/// Scalar evaluator supplied by an external expression layer.
pub type Evaluator = dyn Fn(f64) -> f64 + Send + Sync;

/// A curve defined by externally supplied coordinate evaluators.
///
/// Boundary definitions arrive as textual expressions; the expression
/// layer differentiates them and hands this type one value and one
/// derivative evaluator per coordinate. The kernel never parses
/// expressions itself.
pub struct FunctionCurve {
    x: Box<Evaluator>,
    y: Box<Evaluator>,
    dx: Box<Evaluator>,
    dy: Box<Evaluator>,
    domain: CurveDomain,
}

impl FunctionCurve {
    /// Creates a curve from coordinate evaluators over `[t0, t1]`.
    ///
    /// `x`/`y` evaluate the position, `dx`/`dy` its first derivative.
    ///
    /// # Errors
    ///
    /// Returns an error if `t1` is below `t0`.
    pub fn new<X, Y, DX, DY>(t0: f64, t1: f64, x: X, y: Y, dx: DX, dy: DY) -> Result<Self>
    where
        X: Fn(f64) -> f64 + Send + Sync + 'static,
        Y: Fn(f64) -> f64 + Send + Sync + 'static,
        DX: Fn(f64) -> f64 + Send + Sync + 'static,
        DY: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        let domain = CurveDomain::new(t0, t1)?;
        Ok(Self {
            x: Box::new(x),
            y: Box::new(y),
            dx: Box::new(dx),
            dy: Box::new(dy),
            domain,
        })
    }
}

impl fmt::Debug for FunctionCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionCurve")
            .field("domain", &self.domain)
            .finish_non_exhaustive()
    }
}

impl Curve for FunctionCurve {
    fn position(&self, t: f64) -> Result<Point2> {
        self.domain.check("t", t)?;
        Ok(Point2::new((self.x)(t), (self.y)(t)))
    }

    fn tangent(&self, t: f64) -> Result<Vector2> {
        self.domain.check("t", t)?;
        Ok(Vector2::new((self.dx)(t), (self.dy)(t)))
    }

    fn domain(&self) -> CurveDomain {
        self.domain
    }
}
