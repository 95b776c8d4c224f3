use thiserror::Error;

/// Top-level error type for the Carom billiards kernel.
#[derive(Debug, Error)]
pub enum CaromError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Boundary(#[from] BoundaryError),

    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error(transparent)]
    Dynamics(#[from] DynamicsError),
}

/// Errors related to curve geometry.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("invalid curve domain: t1 = {t1} is below t0 = {t0}")]
    InvalidDomain { t0: f64, t1: f64 },

    #[error("parameter {parameter} = {value} lies outside [{min}, {max}]")]
    ParameterOutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("degenerate curve: {0}")]
    Degenerate(String),
}

/// Errors related to boundary composition.
#[derive(Debug, Error)]
pub enum BoundaryError {
    #[error("boundary has no segments")]
    Empty,

    #[error("segments {index} and {} are discontinuous (gap {gap})", index + 1)]
    Discontinuous { index: usize, gap: f64 },

    #[error("boundary is not closed (gap {gap})")]
    NotClosed { gap: f64 },

    #[error("parameter {value} is out of range [0, {length}] on a non-periodic boundary")]
    OutOfRange { value: f64, length: f64 },
}

/// Errors related to scalar root-finding.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("root is not bracketed: f({a}) = {fa}, f({b}) = {fb}")]
    NotBracketed { a: f64, b: f64, fa: f64, fb: f64 },

    #[error("unknown root-finding method: {0:?}")]
    UnknownMethod(String),
}

/// Errors related to billiard dynamics.
#[derive(Debug, Error)]
pub enum DynamicsError {
    #[error("billiard map requires a periodic boundary")]
    NonPeriodicBoundary,

    #[error("cannot rebuild an orbit from an empty record table")]
    EmptyHistory,

    #[error("no orbit at index {index}")]
    NoSuchOrbit { index: usize },

    #[error("orbit {index} failed during iteration")]
    OrbitFailed {
        index: usize,
        #[source]
        source: Box<CaromError>,
    },

    #[error("worker pool: {0}")]
    WorkerPool(String),
}

/// Convenience type alias for results using [`CaromError`].
pub type Result<T> = std::result::Result<T, CaromError>;
