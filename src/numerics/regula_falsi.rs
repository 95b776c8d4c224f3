use log::warn;

use crate::error::Result;

use super::{BracketCheck, SolverSettings};

/// False position: secant through the bracket endpoints, keeping the
/// bracket oriented so that the function is negative at `xl`.
pub(super) fn solve<F>(mut f: F, a: f64, b: f64, settings: &SolverSettings) -> Result<f64>
where
    F: FnMut(f64) -> Result<(f64, f64)>,
{
    let (fa, fb) = match super::check_bracket(&mut f, a, b)? {
        BracketCheck::RootAtEndpoint(x) => return Ok(x),
        BracketCheck::SignChange { fa, fb } => (fa, fb),
    };
    let (mut xl, mut xh, mut fl, mut fh) = if fa < 0.0 {
        (a, b, fa, fb)
    } else {
        (b, a, fb, fa)
    };
    let mut dx = xh - xl;
    let mut rtf = xl;
    for _ in 0..settings.max_iterations {
        rtf = xl + dx * fl / (fl - fh);
        let (value, _) = f(rtf)?;
        // replace the endpoint whose sign matches the new value; the
        // displacement of that endpoint is the convergence measure
        let displacement = if value < 0.0 {
            let d = xl - rtf;
            xl = rtf;
            fl = value;
            d
        } else {
            let d = xh - rtf;
            xh = rtf;
            fh = value;
            d
        };
        dx = xh - xl;
        if displacement.abs() < settings.accuracy || value == 0.0 {
            return Ok(rtf);
        }
    }
    warn!(
        "regula falsi: budget of {} iterations exhausted, returning {rtf}",
        settings.max_iterations
    );
    Ok(rtf)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::f64::consts::SQRT_2;

    fn settings(accuracy: f64) -> SolverSettings {
        SolverSettings {
            accuracy,
            max_iterations: 100,
        }
    }

    #[test]
    fn converges_on_a_parabola() {
        let root = solve(
            |x| Ok((x * x - 2.0, 2.0 * x)),
            0.0,
            2.0,
            &settings(1e-10),
        )
        .unwrap();
        assert!((root - SQRT_2).abs() < 1e-8);
    }

    #[test]
    fn converges_on_a_line() {
        let root = solve(|x| Ok((2.0 * x - 1.0, 2.0)), 0.0, 1.0, &settings(1e-12)).unwrap();
        // a straight secant lands on the root of a line in one step
        assert!((root - 0.5).abs() < 1e-12);
    }

    #[test]
    fn handles_reversed_orientation() {
        let root = solve(|x| Ok((1.0 - x, -1.0)), 0.0, 3.0, &settings(1e-10)).unwrap();
        assert!((root - 1.0).abs() < 1e-8);
    }

    #[test]
    fn exhausted_budget_returns_the_last_iterate() {
        let tight = SolverSettings {
            accuracy: 1e-30,
            max_iterations: 2,
        };
        let root = solve(|x| Ok((x * x - 2.0, 2.0 * x)), 0.0, 2.0, &tight).unwrap();
        // the estimate stays inside the bracket instead of collapsing to a
        // sentinel value
        assert!(root > 0.0 && root < 2.0);
    }
}
