use log::warn;

use crate::error::Result;

use super::{BracketCheck, SolverSettings};

/// Newton-Raphson iteration safeguarded by a shrinking bracket.
///
/// The bracket `[xl, xh]` is kept oriented so that the function is
/// negative at `xl`; any Newton step that leaves it, or that fails to
/// decently shrink the step before last, is replaced by a bisection step.
pub(super) fn solve<F>(mut f: F, a: f64, b: f64, settings: &SolverSettings) -> Result<f64>
where
    F: FnMut(f64) -> Result<(f64, f64)>,
{
    let fa = match super::check_bracket(&mut f, a, b)? {
        BracketCheck::RootAtEndpoint(x) => return Ok(x),
        BracketCheck::SignChange { fa, .. } => fa,
    };
    let (mut xl, mut xh) = if fa < 0.0 { (a, b) } else { (b, a) };
    let mut rts = 0.5 * (a + b);
    let mut dxold = (b - a).abs();
    let mut dx = dxold;
    let (mut value, mut deriv) = f(rts)?;
    for _ in 0..settings.max_iterations {
        // bisect when the newton step would leave the bracket or is not
        // shrinking fast enough
        if ((rts - xh) * deriv - value) * ((rts - xl) * deriv - value) > 0.0
            || (2.0 * value).abs() > (dxold * deriv).abs()
        {
            dxold = dx;
            dx = 0.5 * (xh - xl);
            rts = xl + dx;
            if xl == rts {
                return Ok(rts);
            }
        } else {
            dxold = dx;
            dx = value / deriv;
            let previous = rts;
            rts -= dx;
            if previous == rts {
                return Ok(rts);
            }
        }
        if dx.abs() < settings.accuracy {
            return Ok(rts);
        }
        (value, deriv) = f(rts)?;
        if value < 0.0 {
            xl = rts;
        } else {
            xh = rts;
        }
    }
    warn!(
        "newton: budget of {} iterations exhausted, returning {rts}",
        settings.max_iterations
    );
    Ok(rts)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, SQRT_2};

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
            &settings(1e-12),
        )
        .unwrap();
        assert!((root - SQRT_2).abs() < 1e-10);
    }

    #[test]
    fn converges_on_a_transcendental_function() {
        let root = solve(
            |x| Ok((x.cos(), -x.sin())),
            0.1,
            3.0,
            &settings(1e-12),
        )
        .unwrap();
        assert!((root - FRAC_PI_2).abs() < 1e-10);
    }

    #[test]
    fn bisects_past_a_flat_spot() {
        // f'(0) = 0; the safeguard must take over near the stationary point
        let root = solve(
            |x| Ok((x * x * x - 0.5, 3.0 * x * x)),
            -1.0,
            1.0,
            &settings(1e-12),
        )
        .unwrap();
        assert!((root - 0.5_f64.powf(1.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn works_with_a_decreasing_function() {
        let root = solve(|x| Ok((1.0 - x, -1.0)), 0.0, 3.0, &settings(1e-12)).unwrap();
        assert!((root - 1.0).abs() < 1e-10);
    }

    #[test]
    fn exhausted_budget_still_returns_an_estimate() {
        let tight = SolverSettings {
            accuracy: 1e-30,
            max_iterations: 3,
        };
        let root = solve(|x| Ok((x * x - 2.0, 2.0 * x)), 0.0, 2.0, &tight).unwrap();
        assert!(root > 0.0 && root < 2.0);
    }
}
