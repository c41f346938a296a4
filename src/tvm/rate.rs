//! Iterative solution of the TVM equation for the periodic rate
//!
//! Newton-Raphson on the TVM residual, started inside a bracketing interval
//! found by scanning a fixed rate grid; bisection over that bracket when Newton
//! stalls or leaves the admissible range. A rate is only returned after the
//! residual has been checked against tolerance.
//!
//! The grid is scanned from zero upward before the negative side. When the cash
//! flows change sign more than once the equation can have both a positive and a
//! negative root; the non-negative root is the one returned. Rates outside
//! `[min_rate, max_rate]` per period (-99% to 1000% by default) are never
//! reached and end in [`CalcError::NonConvergence`]; widen the range through
//! [`SolverConfig`] for extreme inputs.

use serde::{Deserialize, Serialize};

use super::equation::{annuity_factor, residual, residual_derivative};
use crate::error::{CalcError, CalcResult};

/// Periodic rates probed when looking for a sign change, ordered outward from zero
const SCAN_GRID: [f64; 21] = [
    0.0, 0.001, 0.0025, 0.005, 0.01, 0.02, 0.035, 0.05, 0.075, 0.1, 0.15, 0.2, 0.3, 0.5, 0.75,
    1.0, 2.0, 3.5, 5.0, 7.5, 10.0,
];
const NEGATIVE_GRID: [f64; 8] = [0.0, -0.001, -0.01, -0.05, -0.1, -0.25, -0.5, -0.9];

/// Rate solver settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Newton stops when the rate step is below this
    pub step_tolerance: f64,
    /// Residual must be below this fraction of the cash-flow scale
    pub residual_tolerance: f64,
    pub max_newton_iterations: u32,
    pub max_bisection_iterations: u32,
    /// Admissible periodic rate range
    pub min_rate: f64,
    pub max_rate: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            step_tolerance: 1e-12,
            residual_tolerance: 1e-8,
            max_newton_iterations: 100,
            max_bisection_iterations: 200,
            min_rate: -0.99,
            max_rate: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateMethod {
    ClosedForm,
    Newton,
    Bisection,
}

/// A periodic rate that satisfies the TVM equation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateSolution {
    pub periodic_rate: f64,
    pub iterations: u32,
    pub method: RateMethod,
}

/// The known values of a rate problem
#[derive(Debug, Clone, Copy)]
struct Knowns {
    n: f64,
    pv: f64,
    pmt: f64,
    fv: f64,
    b: f64,
}

impl Knowns {
    fn residual(&self, i: f64) -> f64 {
        residual(self.n, i, self.pv, self.pmt, self.fv, self.b)
    }

    fn derivative(&self, i: f64) -> f64 {
        residual_derivative(self.n, i, self.pv, self.pmt, self.b)
    }

    /// Magnitude of the largest term of the equation at rate `i`
    fn scale(&self, i: f64) -> f64 {
        let growth = (1.0 + i).powf(self.n);
        (self.pv * growth)
            .abs()
            .max((self.pmt * annuity_factor(i, self.n, self.b)).abs())
            .max(self.fv.abs())
            .max(1.0)
    }

    fn satisfied(&self, i: f64, config: &SolverConfig) -> bool {
        let res = self.residual(i);
        res.is_finite() && res.abs() <= config.residual_tolerance * self.scale(i)
    }
}

/// Solve `PV(1+i)^n + PMT(1+ib)[(1+i)^n − 1]/i + FV = 0` for `i`
pub fn solve_rate(
    n: f64,
    pv: f64,
    pmt: f64,
    fv: f64,
    b: f64,
    config: &SolverConfig,
) -> CalcResult<RateSolution> {
    if !(n > 0.0) {
        return Err(CalcError::domain("rate cannot be solved with zero periods"));
    }
    if pv == 0.0 && pmt == 0.0 && fv == 0.0 {
        return Err(CalcError::domain("all cash flows are zero; rate is indeterminate"));
    }
    let values = [pv, pmt, fv];
    let has_inflow = values.iter().any(|&v| v > 0.0);
    let has_outflow = values.iter().any(|&v| v < 0.0);
    if !has_inflow || !has_outflow {
        return Err(CalcError::domain(
            "cash flows must include both an inflow and an outflow to solve for the rate",
        ));
    }

    let k = Knowns { n, pv, pmt, fv, b };

    if k.satisfied(0.0, config) {
        return Ok(RateSolution { periodic_rate: 0.0, iterations: 0, method: RateMethod::ClosedForm });
    }

    // Lump sum: (1+i)^n = -FV/PV
    if pmt == 0.0 {
        let ratio = -fv / pv;
        let i = ratio.powf(1.0 / n) - 1.0;
        if i.is_finite() && k.satisfied(i, config) {
            return Ok(RateSolution { periodic_rate: i, iterations: 0, method: RateMethod::ClosedForm });
        }
    }

    let bracket = find_bracket(&k, config);
    let guess = match bracket {
        Some((lo, hi)) => 0.5 * (lo + hi),
        None => 0.01,
    };

    if let Some(solution) = newton(&k, guess, config) {
        return Ok(solution);
    }

    match bracket {
        Some((lo, hi)) => {
            log::warn!("newton did not converge from {:.6}; bisecting [{:.6}, {:.6}]", guess, lo, hi);
            bisection(&k, lo, hi, config)
        }
        None => Err(CalcError::NonConvergence {
            iterations: config.max_newton_iterations,
            residual: k.residual(guess).abs(),
        }),
    }
}

/// First adjacent grid pair (positive side first) where the residual changes sign
fn find_bracket(k: &Knowns, config: &SolverConfig) -> Option<(f64, f64)> {
    let admissible = |r: &f64| r.is_finite() && *r >= config.min_rate && *r <= config.max_rate;

    let positive: Vec<f64> = SCAN_GRID.iter().copied().filter(admissible).collect();
    let negative: Vec<f64> = NEGATIVE_GRID.iter().copied().filter(admissible).collect();

    for grid in [&positive, &negative] {
        for pair in grid.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let (fa, fb) = (k.residual(a), k.residual(b));
            if fa.is_finite() && fb.is_finite() && fa * fb <= 0.0 {
                return Some((a.min(b), a.max(b)));
            }
        }
    }
    None
}

fn newton(k: &Knowns, guess: f64, config: &SolverConfig) -> Option<RateSolution> {
    let mut rate = guess;

    for iteration in 1..=config.max_newton_iterations {
        let f = k.residual(rate);
        let df = k.derivative(rate);

        if !f.is_finite() || !df.is_finite() || df.abs() < 1e-20 {
            log::debug!("newton stalled at iteration {} (rate {:.8})", iteration, rate);
            return None;
        }

        let new_rate = (rate - f / df).clamp(config.min_rate, config.max_rate);
        log::debug!("newton iteration {}: rate {:.10} residual {:.3e}", iteration, new_rate, f);

        if (new_rate - rate).abs() < config.step_tolerance {
            return k.satisfied(new_rate, config).then_some(RateSolution {
                periodic_rate: new_rate,
                iterations: iteration,
                method: RateMethod::Newton,
            });
        }

        if k.satisfied(new_rate, config) && (new_rate - rate).abs() < config.step_tolerance.sqrt() {
            return Some(RateSolution {
                periodic_rate: new_rate,
                iterations: iteration,
                method: RateMethod::Newton,
            });
        }

        rate = new_rate;
    }

    None
}

fn bisection(k: &Knowns, mut low: f64, mut high: f64, config: &SolverConfig) -> CalcResult<RateSolution> {
    let mut f_low = k.residual(low);
    let mut mid = 0.5 * (low + high);

    for iteration in 1..=config.max_bisection_iterations {
        mid = 0.5 * (low + high);
        let f_mid = k.residual(mid);

        if k.satisfied(mid, config) || (high - low) / 2.0 < config.step_tolerance {
            if k.satisfied(mid, config) {
                return Ok(RateSolution {
                    periodic_rate: mid,
                    iterations: iteration,
                    method: RateMethod::Bisection,
                });
            }
            break;
        }

        if f_mid * f_low < 0.0 {
            high = mid;
        } else {
            low = mid;
            f_low = f_mid;
        }
    }

    Err(CalcError::NonConvergence {
        iterations: config.max_bisection_iterations,
        residual: k.residual(mid).abs(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tvm::equation::solve_fv;
    use approx::assert_abs_diff_eq;

    fn solve(n: f64, pv: f64, pmt: f64, fv: f64, b: f64) -> CalcResult<RateSolution> {
        solve_rate(n, pv, pmt, fv, b, &SolverConfig::default())
    }

    #[test]
    fn test_loan_rate() {
        // $10,000 loan, 12 payments of $900: about 2.92% per month
        let solution = solve(12.0, 10_000.0, -900.0, 0.0, 0.0).unwrap();
        assert_abs_diff_eq!(solution.periodic_rate, 0.029229, epsilon = 1e-5);
    }

    #[test]
    fn test_lump_sum_closed_form() {
        let solution = solve(10.0, -1_000.0, 0.0, 2_000.0, 0.0).unwrap();
        assert_eq!(solution.method, RateMethod::ClosedForm);
        assert_abs_diff_eq!(solution.periodic_rate, 2.0_f64.powf(0.1) - 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_rate_detected() {
        let solution = solve(10.0, 1_000.0, -100.0, 0.0, 0.0).unwrap();
        assert_eq!(solution.periodic_rate, 0.0);
    }

    #[test]
    fn test_negative_rate() {
        // Paid 1,000 per period for 10 periods on a 12,000 balance: negative yield
        let fv = solve_fv(10.0, -0.02, -12_000.0, 1_000.0, 0.0);
        let solution = solve(10.0, -12_000.0, 1_000.0, fv, 0.0).unwrap();
        assert_abs_diff_eq!(solution.periodic_rate, -0.02, epsilon = 1e-9);
    }

    #[test]
    fn test_default_tolerances() {
        let config = SolverConfig::default();
        assert_eq!(config.step_tolerance, 1e-12);
        assert_eq!(config.residual_tolerance, 1e-8);
        assert_eq!(config.max_newton_iterations, 100);
        assert_eq!(config.max_bisection_iterations, 200);
        assert_eq!((config.min_rate, config.max_rate), (-0.99, 10.0));
    }

    #[test]
    fn test_positive_root_preferred() {
        // Priced at -5% a year over 100 years; 18% a year fits the same flows
        let (n, pv, pmt) = (1_200.0, 10_000.0, -150.0);
        let priced = -0.05 / 12.0;
        let fv = solve_fv(n, priced, pv, pmt, 0.0);
        let k = Knowns { n, pv, pmt, fv, b: 0.0 };
        assert!(k.satisfied(priced, &SolverConfig::default()));

        let solution = solve(n, pv, pmt, fv, 0.0).unwrap();
        assert_abs_diff_eq!(solution.periodic_rate, 0.015, epsilon = 1e-5);
    }

    #[test]
    fn test_wider_range_reaches_extreme_rates() {
        // 400% a year compounded monthly, paid annually: above 10 per period
        let rate = (1.0_f64 + 4.0 / 12.0).powi(12) - 1.0;
        let fv = solve_fv(3.0, rate, -1_000.0, -100.0, 0.0);
        assert!(matches!(solve(3.0, -1_000.0, -100.0, fv, 0.0), Err(CalcError::NonConvergence { .. })));

        let config = SolverConfig { max_rate: 50.0, ..SolverConfig::default() };
        let solution = solve_rate(3.0, -1_000.0, -100.0, fv, 0.0, &config).unwrap();
        assert_abs_diff_eq!(solution.periodic_rate, rate, epsilon = 1e-6 * rate);
    }

    #[test]
    fn test_no_sign_change_is_domain_error() {
        assert!(matches!(solve(10.0, 1_000.0, 100.0, 50.0, 0.0), Err(CalcError::Domain(_))));
        assert!(matches!(solve(10.0, 0.0, 0.0, 0.0, 0.0), Err(CalcError::Domain(_))));
        assert!(matches!(solve(0.0, 1_000.0, -100.0, 0.0, 0.0), Err(CalcError::Domain(_))));
    }

    #[test]
    fn test_unreachable_rate_reports_non_convergence() {
        // Needs a periodic rate far above the admissible range
        let config = SolverConfig { max_rate: 0.5, ..SolverConfig::default() };
        let result = solve_rate(5.0, -1.0, -1.0, 1.0e9, 0.0, &config);
        assert!(matches!(result, Err(CalcError::NonConvergence { .. })));
    }

    #[test]
    fn test_recovers_rate_across_sweep() {
        let mut failures = Vec::new();
        for &n in &[1.0, 6.0, 12.0, 60.0, 120.0, 360.0, 600.0] {
            for &rate in &[0.0005, 0.002, 0.005, 0.01, 0.03, 0.08, 0.2, 0.5] {
                for &b in &[0.0, 1.0] {
                    for &(pv, pmt) in &[(10_000.0, -150.0), (-5_000.0, -100.0), (0.0, -250.0), (-20_000.0, 0.0)] {
                        let fv = solve_fv(n, rate, pv, pmt, b);
                        if !fv.is_finite() || fv.abs() > 1e14 {
                            continue;
                        }
                        let scale = Knowns { n, pv, pmt, fv, b }.scale(rate);
                        match solve(n, pv, pmt, fv, b) {
                            Ok(s) => {
                                let res = residual(n, s.periodic_rate, pv, pmt, fv, b);
                                if res.abs() > 1e-7 * scale {
                                    failures.push(format!("n={} rate={} b={} pv={} pmt={}: got {}", n, rate, b, pv, pmt, s.periodic_rate));
                                }
                            }
                            Err(e) => failures.push(format!("n={} rate={} b={} pv={} pmt={}: {}", n, rate, b, pv, pmt, e)),
                        }
                    }
                }
            }
        }
        assert!(failures.is_empty(), "failed cases: {:#?}", failures);
    }
}
