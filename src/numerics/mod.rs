mod bisection;
mod newton;
mod regula_falsi;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CaromError, Result, SolverError};

/// Default accuracy on the root abscissa.
pub const DEFAULT_ACCURACY: f64 = 1e-13;

/// Default iteration budget for a root search.
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Scalar root-finding method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RootMethod {
    /// Newton-Raphson safeguarded by bisection.
    #[default]
    Newton,
    /// False position.
    #[serde(rename = "Regula Falsi")]
    RegulaFalsi,
    /// Interval halving.
    Bisection,
}

impl RootMethod {
    /// Canonical display name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Newton => "Newton",
            Self::RegulaFalsi => "Regula Falsi",
            Self::Bisection => "Bisection",
        }
    }
}

impl fmt::Display for RootMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RootMethod {
    type Err = CaromError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Newton" => Ok(Self::Newton),
            "Regula Falsi" => Ok(Self::RegulaFalsi),
            "Bisection" => Ok(Self::Bisection),
            _ => Err(SolverError::UnknownMethod(s.to_string()).into()),
        }
    }
}

/// Accuracy target and iteration budget shared by all solvers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverSettings {
    /// Absolute accuracy on the root abscissa.
    pub accuracy: f64,
    /// Iteration budget. Exhausting it is not an error; the solver returns
    /// its current estimate.
    pub max_iterations: usize,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            accuracy: DEFAULT_ACCURACY,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// Finds a root of `f` inside `[a, b]`.
///
/// `f` returns the function value and its derivative at the queried
/// abscissa; only [`RootMethod::Newton`] consults the derivative. The
/// returned estimate is best-effort: when the iteration budget runs out
/// the solver logs a warning and returns where it stopped, so callers
/// needing certainty must verify the residual themselves.
///
/// # Errors
///
/// Returns an error when `f(a)` and `f(b)` have the same sign or when an
/// evaluation of `f` fails.
pub fn find_root<F>(
    method: RootMethod,
    f: F,
    a: f64,
    b: f64,
    settings: &SolverSettings,
) -> Result<f64>
where
    F: FnMut(f64) -> Result<(f64, f64)>,
{
    match method {
        RootMethod::Newton => newton::solve(f, a, b, settings),
        RootMethod::RegulaFalsi => regula_falsi::solve(f, a, b, settings),
        RootMethod::Bisection => bisection::solve(f, a, b, settings),
    }
}

enum BracketCheck {
    /// An endpoint evaluated to exactly zero.
    RootAtEndpoint(f64),
    /// Valid sign change, with the endpoint values.
    SignChange { fa: f64, fb: f64 },
}

fn check_bracket<F>(f: &mut F, a: f64, b: f64) -> Result<BracketCheck>
where
    F: FnMut(f64) -> Result<(f64, f64)>,
{
    let (fa, _) = f(a)?;
    let (fb, _) = f(b)?;
    if fa == 0.0 {
        return Ok(BracketCheck::RootAtEndpoint(a));
    }
    if fb == 0.0 {
        return Ok(BracketCheck::RootAtEndpoint(b));
    }
    if fa.signum() == fb.signum() {
        return Err(SolverError::NotBracketed { a, b, fa, fb }.into());
    }
    Ok(BracketCheck::SignChange { fa, fb })
}
