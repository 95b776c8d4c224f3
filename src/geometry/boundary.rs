use slotmap::SlotMap;

use crate::error::{BoundaryError, Result};
use crate::geometry::curve::Curve;
use crate::geometry::polyline::{Aabb, Polyline, PolylineCache};
use crate::math::{Point2, Vector2, CONTINUITY_TOLERANCE};

slotmap::new_key_type! {
    /// Unique identifier for a boundary segment.
    pub struct SegmentId;
}

#[derive(Debug)]
struct SegmentData {
    curve: Box<dyn Curve>,
    cache: PolylineCache,
}

/// An ordered composition of curves forming one boundary.
///
/// Segments live in a generational arena; a separate ordered key list and
/// a prefix-sum offset table define the global parameter. Segment `i`
/// spans the half-open interval `[offsets[i], offsets[i + 1])`, the final
/// segment additionally owns its right endpoint. When the boundary is
/// periodic the parameter is reduced into `[0, total_length)` first.
#[derive(Debug)]
pub struct Boundary {
    segments: SlotMap<SegmentId, SegmentData>,
    order: Vec<SegmentId>,
    offsets: Vec<f64>,
    periodic: bool,
    tolerance: f64,
}

impl Boundary {
    /// Creates an empty boundary.
    #[must_use]
    pub fn new(periodic: bool) -> Self {
        Self::with_tolerance(periodic, CONTINUITY_TOLERANCE)
    }

    /// Creates an empty boundary with a custom continuity tolerance.
    #[must_use]
    pub fn with_tolerance(periodic: bool, tolerance: f64) -> Self {
        Self {
            segments: SlotMap::with_key(),
            order: Vec::new(),
            offsets: vec![0.0],
            periodic,
            tolerance,
        }
    }

    /// Creates a boundary from curves in traversal order.
    #[must_use]
    pub fn from_curves(curves: Vec<Box<dyn Curve>>, periodic: bool) -> Self {
        let mut boundary = Self::new(periodic);
        for curve in curves {
            boundary.push_curve(curve);
        }
        boundary
    }

    /// Appends a curve at the end of the traversal order.
    pub fn push_curve(&mut self, curve: Box<dyn Curve>) -> SegmentId {
        let id = self.segments.insert(SegmentData {
            curve,
            cache: PolylineCache::new(),
        });
        self.order.push(id);
        self.rebuild_offsets();
        id
    }

    /// Removes the curve at `index`, or returns `None` when out of bounds.
    pub fn remove_curve(&mut self, index: usize) -> Option<Box<dyn Curve>> {
        if index >= self.order.len() {
            return None;
        }
        let id = self.order.remove(index);
        let data = self.segments.remove(id)?;
        self.rebuild_offsets();
        Some(data.curve)
    }

    /// Replaces the curve at `index`, returning the previous one.
    ///
    /// Out-of-bounds indices return `None` and drop `curve`.
    pub fn replace_curve(&mut self, index: usize, curve: Box<dyn Curve>) -> Option<Box<dyn Curve>> {
        let id = *self.order.get(index)?;
        let data = self.segments.get_mut(id)?;
        let old = std::mem::replace(
            data,
            SegmentData {
                curve,
                cache: PolylineCache::new(),
            },
        );
        self.rebuild_offsets();
        Some(old.curve)
    }

    /// Returns the curve at `index`.
    #[must_use]
    pub fn curve(&self, index: usize) -> Option<&dyn Curve> {
        let id = *self.order.get(index)?;
        Some(self.segments[id].curve.as_ref())
    }

    /// Returns the current traversal index of a segment, or `None` when it
    /// has been removed.
    #[must_use]
    pub fn index_of(&self, id: SegmentId) -> Option<usize> {
        self.order.iter().position(|&other| other == id)
    }

    /// Number of segments.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.order.len()
    }

    /// Returns whether the boundary has no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns whether the global parameter wraps around.
    #[must_use]
    pub fn periodic(&self) -> bool {
        self.periodic
    }

    /// Continuity tolerance used by the validation queries.
    #[must_use]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Total extent of the global parameter.
    #[must_use]
    pub fn total_length(&self) -> f64 {
        self.offsets.last().copied().unwrap_or(0.0)
    }

    /// Returns whether `s` maps onto the boundary.
    #[must_use]
    pub fn contains_parameter(&self, s: f64) -> bool {
        if self.order.is_empty() {
            false
        } else if self.periodic {
            true
        } else {
            s >= 0.0 && s <= self.total_length()
        }
    }

    /// Evaluates the boundary position at global parameter `s`.
    ///
    /// # Errors
    ///
    /// Returns an error when the boundary is empty or `s` is out of range
    /// on a non-periodic boundary.
    pub fn position(&self, s: f64) -> Result<Point2> {
        let (id, local) = self.locate(s)?;
        self.segments[id].curve.position(local)
    }

    /// Evaluates the boundary derivative at global parameter `s`.
    ///
    /// # Errors
    ///
    /// Returns an error when the boundary is empty or `s` is out of range
    /// on a non-periodic boundary.
    pub fn tangent(&self, s: f64) -> Result<Vector2> {
        let (id, local) = self.locate(s)?;
        self.segments[id].curve.tangent(local)
    }

    /// Returns the first point of the boundary.
    ///
    /// # Errors
    ///
    /// Returns an error when the boundary is empty.
    pub fn start_point(&self) -> Result<Point2> {
        self.position(0.0)
    }

    /// Returns the last point of the boundary.
    ///
    /// # Errors
    ///
    /// Returns an error when the boundary is empty.
    pub fn end_point(&self) -> Result<Point2> {
        match self.order.last() {
            Some(&id) => self.segments[id].curve.end_point(),
            None => Err(BoundaryError::Empty.into()),
        }
    }

    /// Returns whether consecutive segments join within the tolerance.
    ///
    /// An empty or single-segment boundary is trivially continuous.
    ///
    /// # Errors
    ///
    /// Returns an error if an endpoint evaluation fails.
    pub fn is_continuous(&self) -> Result<bool> {
        Ok(self.first_gap()?.is_none())
    }

    /// Returns whether the boundary is continuous and its last point joins
    /// its first point within the tolerance.
    ///
    /// # Errors
    ///
    /// Returns an error when the boundary is empty or an endpoint
    /// evaluation fails.
    pub fn is_closed(&self) -> Result<bool> {
        if !self.is_continuous()? {
            return Ok(false);
        }
        Ok(self.closure_gap()? <= self.tolerance)
    }

    /// Validates that the boundary is non-empty, continuous and closed.
    ///
    /// # Errors
    ///
    /// Returns the first violated condition.
    pub fn validate_closed(&self) -> Result<()> {
        if self.order.is_empty() {
            return Err(BoundaryError::Empty.into());
        }
        if let Some((index, gap)) = self.first_gap()? {
            return Err(BoundaryError::Discontinuous { index, gap }.into());
        }
        let gap = self.closure_gap()?;
        if gap > self.tolerance {
            return Err(BoundaryError::NotClosed { gap }.into());
        }
        Ok(())
    }

    /// Concatenates per-segment polylines, `samples` points per segment.
    ///
    /// Samplings are cached per segment and reused across calls.
    ///
    /// # Errors
    ///
    /// Returns an error if any sample evaluation fails.
    pub fn polyline(&self, samples: usize) -> Result<Polyline> {
        let mut points = Vec::new();
        for &id in &self.order {
            let segment = &self.segments[id];
            let sampled = segment
                .cache
                .get_or_build(samples, |n| segment.curve.polyline(n))?;
            points.extend_from_slice(sampled.points());
        }
        Ok(Polyline::new(points))
    }

    /// Returns the merged bounding box of all segments.
    ///
    /// # Errors
    ///
    /// Returns an error when the boundary is empty or sampling fails.
    pub fn bounding_box(&self) -> Result<Aabb> {
        let mut merged: Option<Aabb> = None;
        for &id in &self.order {
            let b = self.segments[id].curve.bounding_box()?;
            merged = Some(match merged {
                Some(m) => m.merged(&b),
                None => b,
            });
        }
        merged.ok_or_else(|| BoundaryError::Empty.into())
    }

    fn rebuild_offsets(&mut self) {
        self.offsets.clear();
        self.offsets.push(0.0);
        let mut total = 0.0;
        for &id in &self.order {
            total += self.segments[id].curve.domain().length();
            self.offsets.push(total);
        }
    }

    fn first_gap(&self) -> Result<Option<(usize, f64)>> {
        for (index, pair) in self.order.windows(2).enumerate() {
            let end = self.segments[pair[0]].curve.end_point()?;
            let start = self.segments[pair[1]].curve.start_point()?;
            let gap = (start - end).norm();
            if gap > self.tolerance {
                return Ok(Some((index, gap)));
            }
        }
        Ok(None)
    }

    fn closure_gap(&self) -> Result<f64> {
        match (self.order.first(), self.order.last()) {
            (Some(&first), Some(&last)) => {
                let start = self.segments[first].curve.start_point()?;
                let end = self.segments[last].curve.end_point()?;
                Ok((start - end).norm())
            }
            _ => Err(BoundaryError::Empty.into()),
        }
    }

    fn locate(&self, s: f64) -> Result<(SegmentId, f64)> {
        if self.order.is_empty() {
            return Err(BoundaryError::Empty.into());
        }
        let length = self.total_length();
        let s = if self.periodic {
            let mut reduced = s.rem_euclid(length);
            // fp can round the remainder up to the full period
            if reduced >= length {
                reduced = 0.0;
            }
            reduced
        } else {
            if !(0.0..=length).contains(&s) {
                return Err(BoundaryError::OutOfRange { value: s, length }.into());
            }
            s
        };
        let interior = &self.offsets[1..self.order.len()];
        let index = interior.partition_point(|&edge| edge <= s);
        let id = self.order[index];
        let domain = self.segments[id].curve.domain();
        let local = domain.t0() + (s - self.offsets[index]);
        // offset sums can drift by an ulp at segment ends
        Ok((id, local.clamp(domain.t0(), domain.t1())))
    }
}
