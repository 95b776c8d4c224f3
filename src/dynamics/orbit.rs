use crate::error::{DynamicsError, Result};
use crate::numerics::RootMethod;

use super::map::BilliardMap;
use super::state::{BilliardState, BounceRecord};

/// One trajectory of the billiard flow.
///
/// The history table grows by one row per bounce; row 0 holds the initial
/// state.
#[derive(Debug, Clone)]
pub struct Orbit {
    map: BilliardMap,
    initial: BilliardState,
    current: BilliardState,
    records: Vec<BounceRecord>,
}

impl Orbit {
    /// Creates an orbit at `initial`, recording row 0.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial position cannot be evaluated.
    pub fn new(map: BilliardMap, initial: BilliardState) -> Result<Self> {
        let point = map.boundary().position(initial.position)?;
        Ok(Self {
            map,
            initial,
            current: initial,
            records: vec![BounceRecord::new(initial, point)],
        })
    }

    /// Restores an orbit from a persisted history table.
    ///
    /// The first row provides the initial state, the last row the current
    /// one; a single-row table is a freshly created orbit.
    ///
    /// # Errors
    ///
    /// Returns an error when `records` is empty.
    pub fn from_records(map: BilliardMap, records: Vec<BounceRecord>) -> Result<Self> {
        let (initial, current) = match (records.first(), records.last()) {
            (Some(first), Some(last)) => (first.state(), last.state()),
            _ => return Err(DynamicsError::EmptyHistory.into()),
        };
        Ok(Self {
            map,
            initial,
            current,
            records,
        })
    }

    /// The state the orbit was created with.
    #[must_use]
    pub fn initial(&self) -> BilliardState {
        self.initial
    }

    /// The state reached by the latest bounce.
    #[must_use]
    pub fn current(&self) -> BilliardState {
        self.current
    }

    /// The history table, one row per bounce, row 0 included.
    #[must_use]
    pub fn records(&self) -> &[BounceRecord] {
        &self.records
    }

    /// Bounces taken so far.
    #[must_use]
    pub fn bounce_count(&self) -> usize {
        self.records.len().saturating_sub(1)
    }

    /// The map driving this orbit.
    #[must_use]
    pub fn map(&self) -> &BilliardMap {
        &self.map
    }

    /// Advances one bounce with the map's configured method.
    ///
    /// # Errors
    ///
    /// Returns an error when the bounce computation fails; the history is
    /// left untouched in that case.
    pub fn iterate(&mut self) -> Result<BounceRecord> {
        self.step(self.map.settings().method)
    }

    /// Advances one bounce with an explicit method.
    ///
    /// # Errors
    ///
    /// Returns an error when the bounce computation fails; the history is
    /// left untouched in that case.
    pub fn iterate_with(&mut self, method: RootMethod) -> Result<BounceRecord> {
        self.step(method)
    }

    fn step(&mut self, method: RootMethod) -> Result<BounceRecord> {
        let (next, point) = self.map.compute_with(self.current, method)?;
        let record = BounceRecord::new(next, point);
        self.records.push(record);
        self.current = next;
        Ok(record)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{Boundary, CircleArc};
    use crate::math::Point2;
    use std::f64::consts::{FRAC_PI_2, PI};
    use std::sync::Arc;

    fn circle_map() -> BilliardMap {
        let boundary = Boundary::from_curves(
            vec![Box::new(CircleArc::full(Point2::origin(), 1.0).unwrap())],
            true,
        );
        BilliardMap::new(Arc::new(boundary)).unwrap()
    }

    #[test]
    fn row_zero_is_the_initial_state() {
        let orbit = Orbit::new(circle_map(), BilliardState::new(0.0, FRAC_PI_2)).unwrap();
        assert_eq!(orbit.records().len(), 1);
        let row = orbit.records()[0];
        assert!((row.t).abs() < 1e-12);
        assert!((row.theta - FRAC_PI_2).abs() < 1e-12);
        assert!((row.point() - Point2::new(1.0, 0.0)).norm() < 1e-12);
        assert_eq!(orbit.bounce_count(), 0);
    }

    #[test]
    fn iterate_appends_and_advances() {
        let mut orbit = Orbit::new(circle_map(), BilliardState::new(0.0, FRAC_PI_2)).unwrap();
        let record = orbit.iterate().unwrap();
        assert!((record.t - PI).abs() < 1e-6);
        assert_eq!(orbit.records().len(), 2);
        assert!((orbit.current().position - PI).abs() < 1e-6);
        // the initial state is untouched
        assert!(orbit.initial().position.abs() < 1e-12);
    }

    #[test]
    fn diameter_orbit_returns_home() {
        let mut orbit = Orbit::new(circle_map(), BilliardState::new(0.0, FRAC_PI_2)).unwrap();
        orbit.iterate().unwrap();
        orbit.iterate().unwrap();
        assert_eq!(orbit.bounce_count(), 2);
        let home = orbit.current().position;
        // back at the start, possibly expressed as 0 or as the full period
        let distance = home.min((home - orbit.map().period()).abs());
        assert!(distance < 1e-6, "home = {home}");
    }

    #[test]
    fn restores_from_a_record_table() {
        let mut orbit = Orbit::new(circle_map(), BilliardState::new(0.0, FRAC_PI_2)).unwrap();
        orbit.iterate().unwrap();
        let table = orbit.records().to_vec();

        let restored = Orbit::from_records(circle_map(), table).unwrap();
        assert_eq!(restored.initial(), orbit.initial());
        assert_eq!(restored.current(), orbit.current());
        assert_eq!(restored.records(), orbit.records());
    }

    #[test]
    fn restored_orbit_keeps_iterating() {
        let mut orbit = Orbit::new(circle_map(), BilliardState::new(0.0, FRAC_PI_2)).unwrap();
        orbit.iterate().unwrap();
        let mut restored = Orbit::from_records(circle_map(), orbit.records().to_vec()).unwrap();

        orbit.iterate().unwrap();
        restored.iterate().unwrap();
        assert_eq!(orbit.records(), restored.records());
    }

    #[test]
    fn single_row_table_is_valid() {
        let orbit = Orbit::new(circle_map(), BilliardState::new(1.0, FRAC_PI_2)).unwrap();
        let restored = Orbit::from_records(circle_map(), orbit.records().to_vec()).unwrap();
        assert_eq!(restored.initial(), restored.current());
    }

    #[test]
    fn empty_table_is_rejected() {
        let err = Orbit::from_records(circle_map(), Vec::new()).unwrap_err();
        assert!(matches!(
            err,
            crate::error::CaromError::Dynamics(DynamicsError::EmptyHistory)
        ));
    }
}
