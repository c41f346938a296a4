//! The TVM equation, rate conversion and closed-form rearrangements
//!
//! `PV·(1+i)^n + PMT·(1+i·b)·[(1+i)^n − 1]/i + FV = 0`
//!
//! where `i` is the effective rate per payment period and `b` is 1 for
//! payments at the beginning of the period.

use crate::error::{CalcError, CalcResult};

/// Below this a periodic rate is treated as exactly zero
pub(crate) const ZERO_RATE: f64 = 1e-12;

/// Per-payment-period rate from a nominal annual percent rate
pub fn periodic_rate(iy: f64, py: u32, cy: u32) -> f64 {
    if py == cy {
        iy / 100.0 / py as f64
    } else {
        let ic = iy / 100.0 / cy as f64;
        (1.0 + ic).powf(cy as f64 / py as f64) - 1.0
    }
}

/// Nominal annual percent rate from a per-payment-period rate
pub fn annual_rate(i: f64, py: u32, cy: u32) -> f64 {
    if py == cy {
        i * py as f64 * 100.0
    } else {
        let ic = (1.0 + i).powf(py as f64 / cy as f64) - 1.0;
        ic * cy as f64 * 100.0
    }
}

/// Annuity accumulation factor `(1+i·b)·[(1+i)^n − 1]/i`, equal to `n` at zero rate
pub(crate) fn annuity_factor(i: f64, n: f64, b: f64) -> f64 {
    if i.abs() < ZERO_RATE {
        n
    } else {
        (1.0 + i * b) * ((1.0 + i).powf(n) - 1.0) / i
    }
}

/// Left-hand side of the TVM equation; zero when the five values are consistent
pub fn residual(n: f64, i: f64, pv: f64, pmt: f64, fv: f64, b: f64) -> f64 {
    pv * (1.0 + i).powf(n) + pmt * annuity_factor(i, n, b) + fv
}

/// Derivative of [`residual`] with respect to `i`
pub(crate) fn residual_derivative(n: f64, i: f64, pv: f64, pmt: f64, b: f64) -> f64 {
    if i.abs() < 1e-7 {
        // Central difference around zero where the analytic form cancels
        let h = 1e-6;
        return (residual(n, i + h, pv, pmt, 0.0, b) - residual(n, i - h, pv, pmt, 0.0, b)) / (2.0 * h);
    }

    let growth = (1.0 + i).powf(n);
    let d_growth = n * (1.0 + i).powf(n - 1.0);
    let bracket = (growth - 1.0) / i;
    let d_bracket = (d_growth * i - (growth - 1.0)) / (i * i);

    pv * d_growth + pmt * (b * bracket + (1.0 + i * b) * d_bracket)
}

pub fn solve_fv(n: f64, i: f64, pv: f64, pmt: f64, b: f64) -> f64 {
    -(pv * (1.0 + i).powf(n) + pmt * annuity_factor(i, n, b))
}

pub fn solve_pv(n: f64, i: f64, pmt: f64, fv: f64, b: f64) -> f64 {
    -(fv + pmt * annuity_factor(i, n, b)) / (1.0 + i).powf(n)
}

pub fn solve_pmt(n: f64, i: f64, pv: f64, fv: f64, b: f64) -> CalcResult<f64> {
    if n <= 0.0 {
        return Err(CalcError::domain("payment is undefined when the number of periods is zero"));
    }
    let factor = annuity_factor(i, n, b);
    if factor.abs() < f64::EPSILON {
        return Err(CalcError::domain("annuity factor is zero; payment cannot be determined"));
    }
    Ok(-(pv * (1.0 + i).powf(n) + fv) / factor)
}

pub fn solve_n(i: f64, pv: f64, pmt: f64, fv: f64, b: f64) -> CalcResult<f64> {
    let n = if i.abs() < ZERO_RATE {
        if pmt == 0.0 {
            return Err(CalcError::domain(
                "number of periods is undefined with zero rate and zero payment",
            ));
        }
        -(pv + fv) / pmt
    } else {
        // (1+i)^n · (PV + A) = A − FV with A = PMT·(1+i·b)/i
        let a = pmt * (1.0 + i * b) / i;
        let denominator = pv + a;
        if denominator.abs() < f64::EPSILON {
            return Err(CalcError::domain(
                "payment exactly offsets interest on the present value; balance never changes",
            ));
        }
        let ratio = (a - fv) / denominator;
        if ratio <= 0.0 {
            return Err(CalcError::domain(
                "no number of periods satisfies these values; check cash flow signs",
            ));
        }
        ratio.ln() / (1.0 + i).ln()
    };

    if !n.is_finite() || n < 0.0 {
        return Err(CalcError::domain(
            "no non-negative number of periods satisfies these values; check cash flow signs",
        ));
    }
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_rate_conversion_round_trip() {
        for &(iy, py, cy) in &[(6.0, 12, 12), (6.0, 12, 2), (9.5, 4, 365), (3.0, 1, 12), (0.0, 26, 4)] {
            let i = periodic_rate(iy, py, cy);
            assert_abs_diff_eq!(annual_rate(i, py, cy), iy, epsilon = 1e-10);
        }
        assert_abs_diff_eq!(periodic_rate(6.0, 12, 12), 0.005, epsilon = 1e-15);
    }

    #[test]
    fn test_residual_zero_on_solution() {
        let fv = solve_fv(36.0, 0.01, -5_000.0, -100.0, 1.0);
        assert_abs_diff_eq!(residual(36.0, 0.01, -5_000.0, -100.0, fv, 1.0), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_derivative_matches_finite_difference() {
        let (n, pv, pmt, b) = (60.0, 20_000.0, -400.0, 0.0);
        for &i in &[0.002, 0.01, 0.05, -0.01] {
            let h = 1e-7;
            let numeric = (residual(n, i + h, pv, pmt, 0.0, b) - residual(n, i - h, pv, pmt, 0.0, b)) / (2.0 * h);
            let analytic = residual_derivative(n, i, pv, pmt, b);
            assert!((numeric - analytic).abs() / analytic.abs() < 1e-5, "i={}", i);
        }
    }

    #[test]
    fn test_solve_n_zero_rate() {
        let n = solve_n(0.0, 1_000.0, -100.0, 0.0, 0.0).unwrap();
        assert_abs_diff_eq!(n, 10.0, epsilon = 1e-12);
        assert!(solve_n(0.0, 1_000.0, 0.0, 0.0, 0.0).is_err());
    }

    #[test]
    fn test_solve_n_wrong_signs() {
        // Deposits and balance both positive: nothing drives the equation to zero
        assert!(matches!(solve_n(0.01, 1_000.0, 100.0, 500.0, 0.0), Err(CalcError::Domain(_))));
    }

    #[test]
    fn test_solve_pmt_requires_periods() {
        assert!(solve_pmt(0.0, 0.01, 1_000.0, 0.0, 0.0).is_err());
    }
}
