//! The billiard map and the orbit machinery built on top of it.

pub mod ensemble;
pub mod map;
pub mod orbit;
pub mod state;

pub use ensemble::{Ensemble, ProgressEvent};
pub use map::{BilliardMap, MapSettings};
pub use orbit::Orbit;
pub use state::{BilliardState, BounceRecord};
