use log::warn;

use crate::error::Result;

use super::{BracketCheck, SolverSettings};

/// Interval halving, walking in from the side where the function is
/// negative.
pub(super) fn solve<F>(mut f: F, a: f64, b: f64, settings: &SolverSettings) -> Result<f64>
where
    F: FnMut(f64) -> Result<(f64, f64)>,
{
    let fa = match super::check_bracket(&mut f, a, b)? {
        BracketCheck::RootAtEndpoint(x) => return Ok(x),
        BracketCheck::SignChange { fa, .. } => fa,
    };
    let (mut rtb, mut dx) = if fa < 0.0 { (a, b - a) } else { (b, a - b) };
    for _ in 0..settings.max_iterations {
        dx *= 0.5;
        let xmid = rtb + dx;
        let (value, _) = f(xmid)?;
        if value <= 0.0 {
            rtb = xmid;
        }
        if dx.abs() < settings.accuracy || value == 0.0 {
            return Ok(rtb);
        }
    }
    warn!(
        "bisection: budget of {} iterations exhausted, returning {rtb}",
        settings.max_iterations
    );
    Ok(rtb)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::f64::consts::SQRT_2;

    #[test]
    fn converges_on_a_parabola() {
        let settings = SolverSettings {
            accuracy: 1e-10,
            max_iterations: 100,
        };
        let root = solve(|x| Ok((x * x - 2.0, 2.0 * x)), 0.0, 2.0, &settings).unwrap();
        assert!((root - SQRT_2).abs() < 1e-9);
    }

    #[test]
    fn halving_reaches_the_accuracy_in_log2_steps() {
        // |b - a| = 1 and acc = 1e-3 needs 10 halvings
        let settings = SolverSettings {
            accuracy: 1e-3,
            max_iterations: 10,
        };
        let root = solve(|x| Ok((x - 0.3, 1.0)), 0.0, 1.0, &settings).unwrap();
        assert!((root - 0.3).abs() < 1e-3);
    }

    #[test]
    fn works_with_a_decreasing_function() {
        let settings = SolverSettings {
            accuracy: 1e-10,
            max_iterations: 100,
        };
        let root = solve(|x| Ok((1.0 - x, -1.0)), 0.0, 3.0, &settings).unwrap();
        assert!((root - 1.0).abs() < 1e-9);
    }

    #[test]
    fn exhausted_budget_still_returns_an_estimate() {
        let tight = SolverSettings {
            accuracy: 1e-30,
            max_iterations: 4,
        };
        let root = solve(|x| Ok((x * x - 2.0, 2.0 * x)), 0.0, 2.0, &tight).unwrap();
        assert!(root > 0.0 && root < 2.0);
    }
}
