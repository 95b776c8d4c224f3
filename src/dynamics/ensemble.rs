use std::sync::mpsc;
use std::sync::Arc;

use rayon::prelude::*;

use crate::error::{DynamicsError, Result};
use crate::geometry::Boundary;
use crate::numerics::RootMethod;

use super::map::{BilliardMap, MapSettings};
use super::orbit::Orbit;
use super::state::BilliardState;

/// Progress notification emitted after each completed bounce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    /// Index of the orbit that bounced.
    pub orbit: usize,
    /// Bounce number within the current run, starting at 1.
    pub iteration: usize,
}

/// A collection of orbits sharing one boundary and one map.
#[derive(Debug)]
pub struct Ensemble {
    boundary: Arc<Boundary>,
    map: BilliardMap,
    orbits: Vec<Orbit>,
}

impl Ensemble {
    /// Creates an empty ensemble over `boundary` with default map settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the boundary is not periodic and closed.
    pub fn new(boundary: Arc<Boundary>) -> Result<Self> {
        Self::with_settings(boundary, MapSettings::default())
    }

    /// Creates an empty ensemble with explicit map settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the boundary is not periodic and closed.
    pub fn with_settings(boundary: Arc<Boundary>, settings: MapSettings) -> Result<Self> {
        let map = BilliardMap::with_settings(Arc::clone(&boundary), settings)?;
        Ok(Self {
            boundary,
            map,
            orbits: Vec::new(),
        })
    }

    /// The shared boundary.
    #[must_use]
    pub fn boundary(&self) -> &Arc<Boundary> {
        &self.boundary
    }

    /// Number of orbits.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orbits.len()
    }

    /// Whether the ensemble holds no orbits.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orbits.is_empty()
    }

    /// The orbit at `index`, if any.
    #[must_use]
    pub fn orbit(&self, index: usize) -> Option<&Orbit> {
        self.orbits.get(index)
    }

    /// All orbits in insertion order.
    #[must_use]
    pub fn orbits(&self) -> &[Orbit] {
        &self.orbits
    }

    /// Appends an orbit starting at `state`.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial position cannot be evaluated.
    pub fn add_orbit(&mut self, state: BilliardState) -> Result<()> {
        let orbit = Orbit::new(self.map.clone(), state)?;
        self.orbits.push(orbit);
        Ok(())
    }

    /// Appends one orbit per state.
    ///
    /// Orbits added before the failing state are kept.
    ///
    /// # Errors
    ///
    /// Returns an error if any initial position cannot be evaluated.
    pub fn add_orbits(&mut self, states: &[BilliardState]) -> Result<()> {
        for state in states {
            self.add_orbit(*state)?;
        }
        Ok(())
    }

    /// Removes and returns the orbit at `index`.
    pub fn remove_orbit(&mut self, index: usize) -> Option<Orbit> {
        if index < self.orbits.len() {
            Some(self.orbits.remove(index))
        } else {
            None
        }
    }

    /// Advances the orbits at `indices` by `iterations` bounces each, one
    /// orbit at a time.
    ///
    /// `on_step` observes every completed bounce. A failing orbit keeps the
    /// bounces it completed before the failure.
    ///
    /// # Errors
    ///
    /// Returns [`DynamicsError::NoSuchOrbit`] when an index is out of range
    /// and [`DynamicsError::OrbitFailed`] when a bounce computation fails.
    pub fn iterate_indices<F>(
        &mut self,
        indices: &[usize],
        iterations: usize,
        method: Option<RootMethod>,
        mut on_step: F,
    ) -> Result<()>
    where
        F: FnMut(ProgressEvent),
    {
        for &index in indices {
            if index >= self.orbits.len() {
                return Err(DynamicsError::NoSuchOrbit { index }.into());
            }
        }
        for &index in indices {
            for iteration in 1..=iterations {
                if let Err(source) = advance_orbit(&mut self.orbits[index], method) {
                    return Err(DynamicsError::OrbitFailed {
                        index,
                        source: Box::new(source),
                    }
                    .into());
                }
                on_step(ProgressEvent {
                    orbit: index,
                    iteration,
                });
            }
        }
        Ok(())
    }

    /// Advances every orbit by `iterations` bounces on the calling thread.
    ///
    /// # Errors
    ///
    /// Returns [`DynamicsError::OrbitFailed`] when a bounce computation
    /// fails; earlier orbits keep their new bounces.
    pub fn iterate_serial<F>(
        &mut self,
        iterations: usize,
        method: Option<RootMethod>,
        on_step: F,
    ) -> Result<()>
    where
        F: FnMut(ProgressEvent),
    {
        let indices: Vec<usize> = (0..self.orbits.len()).collect();
        self.iterate_indices(&indices, iterations, method, on_step)
    }

    /// Advances every orbit by `iterations` bounces across a worker pool.
    ///
    /// `workers` of zero lets the pool size itself. `on_step` runs on the
    /// calling thread; event order across orbits is unspecified. Orbits are
    /// independent, so every orbit runs to completion or to its own failure
    /// even when another orbit fails.
    ///
    /// # Errors
    ///
    /// Returns [`DynamicsError::WorkerPool`] when the pool cannot be built
    /// and [`DynamicsError::OrbitFailed`] for the lowest-indexed failing
    /// orbit; any further failures are logged.
    pub fn iterate_parallel<F>(
        &mut self,
        iterations: usize,
        workers: usize,
        method: Option<RootMethod>,
        mut on_step: F,
    ) -> Result<()>
    where
        F: FnMut(ProgressEvent),
    {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|err| DynamicsError::WorkerPool(err.to_string()))?;

        let (sender, receiver) = mpsc::channel::<ProgressEvent>();
        let orbits = &mut self.orbits;

        let mut failures = std::thread::scope(|scope| {
            let handle = scope.spawn(move || {
                pool.install(|| {
                    orbits
                        .par_iter_mut()
                        .enumerate()
                        .map_with(sender, |sender, (index, orbit)| {
                            for iteration in 1..=iterations {
                                if let Err(source) = advance_orbit(orbit, method) {
                                    return Some((index, source));
                                }
                                // the receiver outlives the workers
                                let _ = sender.send(ProgressEvent {
                                    orbit: index,
                                    iteration,
                                });
                            }
                            None
                        })
                        .flatten()
                        .collect::<Vec<_>>()
                })
            });

            // drains until every worker has dropped its sender clone
            for event in receiver.iter() {
                on_step(event);
            }

            handle
                .join()
                .map_err(|_| DynamicsError::WorkerPool(String::from("worker thread panicked")))
        })?;

        failures.sort_by_key(|(index, _)| *index);
        let mut failures = failures.into_iter();
        if let Some((index, source)) = failures.next() {
            for (index, source) in failures {
                log::warn!("orbit {index} failed: {source}");
            }
            return Err(DynamicsError::OrbitFailed {
                index,
                source: Box::new(source),
            }
            .into());
        }
        Ok(())
    }
}

fn advance_orbit(orbit: &mut Orbit, method: Option<RootMethod>) -> Result<()> {
    match method {
        Some(method) => orbit.iterate_with(method)?,
        None => orbit.iterate()?,
    };
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::CaromError;
    use crate::geometry::{CircleArc, Curve, Line};
    use crate::math::Point2;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn circle_boundary() -> Arc<Boundary> {
        Arc::new(Boundary::from_curves(
            vec![Box::new(CircleArc::full(Point2::origin(), 1.0).unwrap())],
            true,
        ))
    }

    fn square_boundary() -> Arc<Boundary> {
        let corners = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];
        let mut curves: Vec<Box<dyn Curve>> = Vec::new();
        for i in 0..4 {
            curves.push(Box::new(Line::new(corners[i], corners[(i + 1) % 4]).unwrap()));
        }
        Arc::new(Boundary::from_curves(curves, true))
    }

    fn seeded_states(count: u32) -> Vec<BilliardState> {
        (0..count)
            .map(|i| BilliardState::new(0.3 + 0.4 * f64::from(i), FRAC_PI_2 + 0.1 * f64::from(i)))
            .collect()
    }

    #[test]
    fn add_and_remove_orbits() {
        let mut ensemble = Ensemble::new(circle_boundary()).unwrap();
        assert!(ensemble.is_empty());
        ensemble.add_orbits(&seeded_states(3)).unwrap();
        assert_eq!(ensemble.len(), 3);

        let removed = ensemble.remove_orbit(1).unwrap();
        assert!((removed.initial().position - 0.7).abs() < 1e-12);
        assert_eq!(ensemble.len(), 2);
        assert!(ensemble.remove_orbit(5).is_none());
    }

    #[test]
    fn serial_and_parallel_agree() {
        let states = seeded_states(4);

        let mut serial = Ensemble::new(circle_boundary()).unwrap();
        serial.add_orbits(&states).unwrap();
        serial.iterate_serial(5, None, |_| {}).unwrap();

        let mut parallel = Ensemble::new(circle_boundary()).unwrap();
        parallel.add_orbits(&states).unwrap();
        parallel.iterate_parallel(5, 2, None, |_| {}).unwrap();

        for (a, b) in serial.orbits().iter().zip(parallel.orbits()) {
            assert_eq!(a.records(), b.records());
        }
    }

    #[test]
    fn progress_covers_every_bounce() {
        let mut ensemble = Ensemble::new(circle_boundary()).unwrap();
        ensemble.add_orbits(&seeded_states(3)).unwrap();

        let mut events = Vec::new();
        ensemble
            .iterate_parallel(4, 2, None, |event| events.push(event))
            .unwrap();

        assert_eq!(events.len(), 12);
        events.sort_by_key(|event| (event.orbit, event.iteration));
        let mut expected = Vec::new();
        for orbit in 0..3 {
            for iteration in 1..=4 {
                expected.push(ProgressEvent { orbit, iteration });
            }
        }
        assert_eq!(events, expected);
    }

    #[test]
    fn iterate_indices_touches_only_the_selection() {
        let mut ensemble = Ensemble::new(circle_boundary()).unwrap();
        ensemble.add_orbits(&seeded_states(3)).unwrap();

        ensemble.iterate_indices(&[1], 3, None, |_| {}).unwrap();
        assert_eq!(ensemble.orbit(0).unwrap().bounce_count(), 0);
        assert_eq!(ensemble.orbit(1).unwrap().bounce_count(), 3);
        assert_eq!(ensemble.orbit(2).unwrap().bounce_count(), 0);
    }

    #[test]
    fn unknown_index_is_rejected_before_any_bounce() {
        let mut ensemble = Ensemble::new(circle_boundary()).unwrap();
        ensemble.add_orbits(&seeded_states(2)).unwrap();

        let err = ensemble.iterate_indices(&[0, 7], 2, None, |_| {}).unwrap_err();
        assert!(matches!(
            err,
            CaromError::Dynamics(DynamicsError::NoSuchOrbit { index: 7 })
        ));
        assert_eq!(ensemble.orbit(0).unwrap().bounce_count(), 0);
    }

    #[test]
    fn explicit_method_overrides_the_settings() {
        let mut ensemble = Ensemble::new(circle_boundary()).unwrap();
        ensemble.add_orbit(BilliardState::new(0.0, FRAC_PI_2)).unwrap();
        ensemble
            .iterate_serial(1, Some(RootMethod::Bisection), |_| {})
            .unwrap();
        let record = ensemble.orbit(0).unwrap().records()[1];
        assert!((record.t - PI).abs() < 1e-6);
    }

    #[test]
    fn parallel_failure_names_the_orbit_and_spares_the_rest() {
        let mut ensemble = Ensemble::new(square_boundary()).unwrap();
        // the middle state aims straight into a corner, which leaves the
        // chord function without a sign change
        ensemble
            .add_orbits(&[
                BilliardState::new(0.5, FRAC_PI_2),
                BilliardState::new(1.0, 0.75 * PI),
                BilliardState::new(2.5, FRAC_PI_2),
            ])
            .unwrap();

        let err = ensemble.iterate_parallel(3, 2, None, |_| {}).unwrap_err();
        match err {
            CaromError::Dynamics(DynamicsError::OrbitFailed { index, source }) => {
                assert_eq!(index, 1);
                assert!(matches!(*source, CaromError::Solver(_)));
            }
            other => panic!("unexpected error: {other}"),
        }

        assert_eq!(ensemble.orbit(0).unwrap().bounce_count(), 3);
        assert_eq!(ensemble.orbit(1).unwrap().bounce_count(), 0);
        assert_eq!(ensemble.orbit(2).unwrap().bounce_count(), 3);
    }

    #[test]
    fn serial_failure_keeps_earlier_progress() {
        let mut ensemble = Ensemble::new(square_boundary()).unwrap();
        ensemble
            .add_orbits(&[
                BilliardState::new(0.5, FRAC_PI_2),
                BilliardState::new(1.0, 0.75 * PI),
            ])
            .unwrap();

        let err = ensemble.iterate_serial(2, None, |_| {}).unwrap_err();
        assert!(matches!(
            err,
            CaromError::Dynamics(DynamicsError::OrbitFailed { index: 1, .. })
        ));
        assert_eq!(ensemble.orbit(0).unwrap().bounce_count(), 2);
        assert_eq!(ensemble.orbit(1).unwrap().bounce_count(), 0);
    }
}
