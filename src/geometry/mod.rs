pub mod boundary;
pub mod curve;
pub mod polyline;

pub use boundary::{Boundary, SegmentId};
pub use curve::{CircleArc, Curve, CurveDomain, EllipseArc, FunctionCurve, Line};
pub use polyline::{Aabb, Polyline, PolylineCache};
