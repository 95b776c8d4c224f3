pub mod config;
pub mod dynamics;
pub mod error;
pub mod geometry;
pub mod math;
pub mod numerics;

pub use error::{CaromError, Result};
