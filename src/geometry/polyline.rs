use std::sync::{Arc, Mutex};

use crate::error::Result;
use crate::math::Point2;

/// Axis-aligned bounding box in the plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Point2,
    /// Maximum corner.
    pub max: Point2,
}

impl Aabb {
    /// Returns the smallest box enclosing `points`, or `None` when empty.
    #[must_use]
    pub fn from_points(points: &[Point2]) -> Option<Self> {
        let first = points.first()?;
        let mut min = *first;
        let mut max = *first;
        for p in &points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some(Self { min, max })
    }

    /// Returns the smallest box enclosing both boxes.
    #[must_use]
    pub fn merged(&self, other: &Self) -> Self {
        Self {
            min: Point2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    /// Returns whether `point` lies inside the box (bounds inclusive).
    #[must_use]
    pub fn contains(&self, point: &Point2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Width of the box.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Height of the box.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
}

/// Ordered point sampling of a curve.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    points: Vec<Point2>,
}

impl Polyline {
    /// Creates a polyline from its sample points.
    #[must_use]
    pub fn new(points: Vec<Point2>) -> Self {
        Self { points }
    }

    /// Returns the sample points in order.
    #[must_use]
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    /// Number of sample points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns whether the polyline has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the bounding box of the sample points, or `None` when empty.
    #[must_use]
    pub fn aabb(&self) -> Option<Aabb> {
        Aabb::from_points(&self.points)
    }
}

/// Lazy cache for curve polylines.
///
/// Keeps the finest sampling built so far and serves coarser requests from
/// it. Cloning yields an empty cache.
#[derive(Debug, Default)]
pub struct PolylineCache {
    slot: Mutex<Option<(usize, Arc<Polyline>)>>,
}

impl PolylineCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached polyline when it was built with at least
    /// `samples` points, otherwise builds, caches and returns a new one.
    ///
    /// # Errors
    ///
    /// Propagates errors from `build`.
    pub fn get_or_build<F>(&self, samples: usize, build: F) -> Result<Arc<Polyline>>
    where
        F: FnOnce(usize) -> Result<Polyline>,
    {
        let mut slot = match self.slot.lock() {
            Ok(guard) => guard,
            // a poisoned slot still holds a structurally valid polyline
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some((cached_samples, polyline)) = slot.as_ref() {
            if *cached_samples >= samples {
                return Ok(Arc::clone(polyline));
            }
        }
        let polyline = Arc::new(build(samples)?);
        *slot = Some((samples, Arc::clone(&polyline)));
        Ok(polyline)
    }

    /// Drops any cached sampling.
    pub fn invalidate(&self) {
        let mut slot = match self.slot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *slot = None;
    }
}

impl Clone for PolylineCache {
    fn clone(&self) -> Self {
        Self::new()
    }
}
