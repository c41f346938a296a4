//! Five-variable TVM solver
//!
//! Given any four of N, I/Y, PV, PMT and FV, plus payments per year (P/Y),
//! compounding periods per year (C/Y) and payment timing, solve for the fifth.
//! Cash flow sign convention: money received is positive, money paid out is
//! negative.

use serde::{Deserialize, Serialize};

use super::equation::{self, periodic_rate};
use super::rate::{solve_rate, RateMethod, SolverConfig};
use crate::error::{CalcError, CalcResult};
use crate::frequency::PaymentTiming;
use crate::validation::Validator;

/// Which of the five variables is unknown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TvmVariable {
    N,
    Iy,
    Pv,
    Pmt,
    Fv,
}

impl std::fmt::Display for TvmVariable {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            TvmVariable::N => "N",
            TvmVariable::Iy => "I/Y",
            TvmVariable::Pv => "PV",
            TvmVariable::Pmt => "PMT",
            TvmVariable::Fv => "FV",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for TvmVariable {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('/', "").as_str() {
            "n" => Ok(TvmVariable::N),
            "iy" | "i" | "rate" => Ok(TvmVariable::Iy),
            "pv" => Ok(TvmVariable::Pv),
            "pmt" => Ok(TvmVariable::Pmt),
            "fv" => Ok(TvmVariable::Fv),
            other => Err(CalcError::invalid(format!(
                "unknown TVM variable '{other}' (expected n, iy, pv, pmt or fv)"
            ))),
        }
    }
}

/// Frequencies and timing shared by every TVM problem
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TvmTerms {
    /// Payments per year
    pub py: u32,
    /// Compounding periods per year
    pub cy: u32,
    pub timing: PaymentTiming,
}

impl Default for TvmTerms {
    fn default() -> Self {
        Self { py: 12, cy: 12, timing: PaymentTiming::End }
    }
}

impl TvmTerms {
    pub fn new(py: u32, cy: u32, timing: PaymentTiming) -> Self {
        Self { py, cy, timing }
    }

    /// Annual payments and compounding, end of period
    pub fn annual() -> Self {
        Self::new(1, 1, PaymentTiming::End)
    }
}

/// A TVM problem: one variant per unknown, each carrying exactly the four knowns
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "solve_for", rename_all = "lowercase")]
pub enum TvmProblem {
    N { iy: f64, pv: f64, pmt: f64, fv: f64 },
    Iy { n: f64, pv: f64, pmt: f64, fv: f64 },
    Pv { n: f64, iy: f64, pmt: f64, fv: f64 },
    Pmt { n: f64, iy: f64, pv: f64, fv: f64 },
    Fv { n: f64, iy: f64, pv: f64, pmt: f64 },
}

impl TvmProblem {
    pub fn unknown(&self) -> TvmVariable {
        match self {
            TvmProblem::N { .. } => TvmVariable::N,
            TvmProblem::Iy { .. } => TvmVariable::Iy,
            TvmProblem::Pv { .. } => TvmVariable::Pv,
            TvmProblem::Pmt { .. } => TvmVariable::Pmt,
            TvmProblem::Fv { .. } => TvmVariable::Fv,
        }
    }
}

/// Loosely-typed request: all five values optional plus the variable to solve for
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TvmRequest {
    pub solve_for: TvmVariable,
    #[serde(default)]
    pub n: Option<f64>,
    #[serde(default)]
    pub iy: Option<f64>,
    #[serde(default)]
    pub pv: Option<f64>,
    #[serde(default)]
    pub pmt: Option<f64>,
    #[serde(default)]
    pub fv: Option<f64>,
    #[serde(default = "default_per_year")]
    pub py: u32,
    /// Defaults to P/Y
    #[serde(default)]
    pub cy: Option<u32>,
    #[serde(default)]
    pub timing: PaymentTiming,
}

fn default_per_year() -> u32 {
    12
}

impl TvmRequest {
    pub fn terms(&self) -> TvmTerms {
        TvmTerms::new(self.py, self.cy.unwrap_or(self.py), self.timing)
    }

    /// Convert to a typed problem, reporting every missing known
    pub fn to_problem(&self) -> CalcResult<TvmProblem> {
        let fields = [
            (TvmVariable::N, "N", self.n),
            (TvmVariable::Iy, "I/Y", self.iy),
            (TvmVariable::Pv, "PV", self.pv),
            (TvmVariable::Pmt, "PMT", self.pmt),
            (TvmVariable::Fv, "FV", self.fv),
        ];
        let missing: Vec<&str> = fields
            .iter()
            .filter(|(var, _, value)| *var != self.solve_for && value.is_none())
            .map(|(_, name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(CalcError::InsufficientInput(format!(
                "solving for one TVM variable requires the other four; missing {}",
                missing.join(", ")
            )));
        }

        let n = self.n.unwrap_or(0.0);
        let iy = self.iy.unwrap_or(0.0);
        let pv = self.pv.unwrap_or(0.0);
        let pmt = self.pmt.unwrap_or(0.0);
        let fv = self.fv.unwrap_or(0.0);

        Ok(match self.solve_for {
            TvmVariable::N => TvmProblem::N { iy, pv, pmt, fv },
            TvmVariable::Iy => TvmProblem::Iy { n, pv, pmt, fv },
            TvmVariable::Pv => TvmProblem::Pv { n, iy, pmt, fv },
            TvmVariable::Pmt => TvmProblem::Pmt { n, iy, pv, fv },
            TvmVariable::Fv => TvmProblem::Fv { n, iy, pv, pmt },
        })
    }

    pub fn solve(&self) -> CalcResult<TvmResult> {
        solve(&self.to_problem()?, &self.terms())
    }
}

/// A consistent set of all five TVM values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TvmResult {
    pub solved_for: TvmVariable,
    pub n: f64,
    pub iy: f64,
    pub pv: f64,
    pub pmt: f64,
    pub fv: f64,
    pub py: u32,
    pub cy: u32,
    pub timing: PaymentTiming,
    /// Effective rate per payment period
    pub periodic_rate: f64,
    /// Set when I/Y was found iteratively
    pub rate_method: Option<RateMethod>,
}

impl TvmResult {
    pub fn terms(&self) -> TvmTerms {
        TvmTerms::new(self.py, self.cy, self.timing)
    }

    /// Residual of the TVM equation for these values
    pub fn residual(&self) -> f64 {
        equation::residual(self.n, self.periodic_rate, self.pv, self.pmt, self.fv, self.timing.flag())
    }
}

/// Solve with the default rate solver settings
pub fn solve(problem: &TvmProblem, terms: &TvmTerms) -> CalcResult<TvmResult> {
    solve_with(problem, terms, &SolverConfig::default())
}

pub fn solve_with(problem: &TvmProblem, terms: &TvmTerms, config: &SolverConfig) -> CalcResult<TvmResult> {
    validate(problem, terms)?;
    let b = terms.timing.flag();

    let (n, iy, pv, pmt, fv, rate_method) = match *problem {
        TvmProblem::Fv { n, iy, pv, pmt } => {
            let i = checked_rate(iy, terms)?;
            (n, iy, pv, pmt, equation::solve_fv(n, i, pv, pmt, b), None)
        }
        TvmProblem::Pv { n, iy, pmt, fv } => {
            let i = checked_rate(iy, terms)?;
            (n, iy, equation::solve_pv(n, i, pmt, fv, b), pmt, fv, None)
        }
        TvmProblem::Pmt { n, iy, pv, fv } => {
            let i = checked_rate(iy, terms)?;
            (n, iy, pv, equation::solve_pmt(n, i, pv, fv, b)?, fv, None)
        }
        TvmProblem::N { iy, pv, pmt, fv } => {
            let i = checked_rate(iy, terms)?;
            (equation::solve_n(i, pv, pmt, fv, b)?, iy, pv, pmt, fv, None)
        }
        TvmProblem::Iy { n, pv, pmt, fv } => {
            let solution = solve_rate(n, pv, pmt, fv, b, config)?;
            let iy = equation::annual_rate(solution.periodic_rate, terms.py, terms.cy);
            log::debug!(
                "solved I/Y={:.8}% via {:?} in {} iterations",
                iy,
                solution.method,
                solution.iterations
            );
            (n, iy, pv, pmt, fv, Some(solution.method))
        }
    };

    for (name, value) in [("N", n), ("I/Y", iy), ("PV", pv), ("PMT", pmt), ("FV", fv)] {
        if !value.is_finite() {
            return Err(CalcError::domain(format!("{name} is not finite for these inputs")));
        }
    }

    Ok(TvmResult {
        solved_for: problem.unknown(),
        n,
        iy,
        pv,
        pmt,
        fv,
        py: terms.py,
        cy: terms.cy,
        timing: terms.timing,
        periodic_rate: periodic_rate(iy, terms.py, terms.cy),
        rate_method,
    })
}

fn checked_rate(iy: f64, terms: &TvmTerms) -> CalcResult<f64> {
    let i = periodic_rate(iy, terms.py, terms.cy);
    if !(i > -1.0) || !i.is_finite() {
        return Err(CalcError::domain("I/Y gives a periodic rate of -100% or less"));
    }
    Ok(i)
}

fn validate(problem: &TvmProblem, terms: &TvmTerms) -> CalcResult<()> {
    let mut v = Validator::new();
    v.check(terms.py > 0, "P/Y must be a positive integer")
        .check(terms.cy > 0, "C/Y must be a positive integer");

    let (n, iy, pv, pmt, fv) = match *problem {
        TvmProblem::N { iy, pv, pmt, fv } => (None, Some(iy), pv, Some(pmt), Some(fv)),
        TvmProblem::Iy { n, pv, pmt, fv } => (Some(n), None, pv, Some(pmt), Some(fv)),
        TvmProblem::Pv { n, iy, pmt, fv } => (Some(n), Some(iy), 0.0, Some(pmt), Some(fv)),
        TvmProblem::Pmt { n, iy, pv, fv } => (Some(n), Some(iy), pv, None, Some(fv)),
        TvmProblem::Fv { n, iy, pv, pmt } => (Some(n), Some(iy), pv, Some(pmt), None),
    };

    if let Some(n) = n {
        v.non_negative("N", n);
    }
    if let Some(iy) = iy {
        v.finite("I/Y", iy);
    }
    v.finite("PV", pv);
    if let Some(pmt) = pmt {
        v.finite("PMT", pmt);
    }
    if let Some(fv) = fv {
        v.finite("FV", fv);
    }
    v.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_fv_scenario() {
        // 20,000 invested at 6% for 10 years, withdrawing 2,000 a year.
        // FV is reported with the receiving sign, so the balance left is -FV.
        let result = solve(
            &TvmProblem::Fv { n: 10.0, iy: 6.0, pv: 20_000.0, pmt: -2_000.0 },
            &TvmTerms::annual(),
        )
        .unwrap();

        let g = 1.06_f64.powi(10);
        let expected = -(20_000.0 * g - 2_000.0 * (g - 1.0) / 0.06);
        assert_abs_diff_eq!(result.fv, expected, epsilon = 1e-6);
        assert_abs_diff_eq!(result.fv, -9_455.36, epsilon = 0.01);
        assert_abs_diff_eq!(result.residual(), 0.0, epsilon = 1e-8);
    }

    #[test]
    fn test_fv_then_pv_round_trip() {
        let terms = TvmTerms::new(12, 12, PaymentTiming::Beginning);
        let fv = solve(&TvmProblem::Fv { n: 48.0, iy: 4.5, pv: -12_500.0, pmt: -300.0 }, &terms)
            .unwrap()
            .fv;
        let pv = solve(&TvmProblem::Pv { n: 48.0, iy: 4.5, pmt: -300.0, fv }, &terms)
            .unwrap()
            .pv;
        assert_abs_diff_eq!(pv, -12_500.0, epsilon = 1e-6);
    }

    #[test]
    fn test_pmt_mortgage() {
        let result = solve(
            &TvmProblem::Pmt { n: 360.0, iy: 6.0, pv: 200_000.0, fv: 0.0 },
            &TvmTerms::default(),
        )
        .unwrap();
        assert_abs_diff_eq!(result.pmt, -1_199.10, epsilon = 0.01);
    }

    #[test]
    fn test_n_solves_mortgage_term() {
        let terms = TvmTerms::default();
        let pmt = solve(&TvmProblem::Pmt { n: 360.0, iy: 6.0, pv: 200_000.0, fv: 0.0 }, &terms)
            .unwrap()
            .pmt;
        let result = solve(&TvmProblem::N { iy: 6.0, pv: 200_000.0, pmt, fv: 0.0 }, &terms).unwrap();
        assert_abs_diff_eq!(result.n, 360.0, epsilon = 1e-6);
    }

    #[test]
    fn test_n_zero_rate() {
        let result = solve(
            &TvmProblem::N { iy: 0.0, pv: 1_000.0, pmt: -50.0, fv: 0.0 },
            &TvmTerms::default(),
        )
        .unwrap();
        assert_abs_diff_eq!(result.n, 20.0, epsilon = 1e-12);
    }

    #[test]
    fn test_iy_recovers_rate() {
        let terms = TvmTerms::default();
        let pmt = solve(&TvmProblem::Pmt { n: 60.0, iy: 7.25, pv: 25_000.0, fv: 0.0 }, &terms)
            .unwrap()
            .pmt;
        let result = solve(&TvmProblem::Iy { n: 60.0, pv: 25_000.0, pmt, fv: 0.0 }, &terms).unwrap();
        assert_abs_diff_eq!(result.iy, 7.25, epsilon = 1e-7);
        assert!(result.rate_method.is_some());
    }

    #[test]
    fn test_iy_with_mismatched_frequencies() {
        // Monthly payments, semiannual compounding
        let terms = TvmTerms::new(12, 2, PaymentTiming::End);
        let fv = solve(&TvmProblem::Fv { n: 120.0, iy: 5.0, pv: -10_000.0, pmt: -100.0 }, &terms)
            .unwrap()
            .fv;
        let result = solve(&TvmProblem::Iy { n: 120.0, pv: -10_000.0, pmt: -100.0, fv }, &terms).unwrap();
        assert_abs_diff_eq!(result.iy, 5.0, epsilon = 1e-7);
        assert_abs_diff_eq!(result.periodic_rate, 1.025_f64.powf(2.0 / 12.0) - 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_zero_rate_fv() {
        let result = solve(
            &TvmProblem::Fv { n: 10.0, iy: 0.0, pv: -1_000.0, pmt: -100.0 },
            &TvmTerms::annual(),
        )
        .unwrap();
        assert_abs_diff_eq!(result.fv, 2_000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_request_reports_missing_knowns() {
        let request = TvmRequest {
            solve_for: TvmVariable::Fv,
            n: Some(10.0),
            iy: None,
            pv: Some(100.0),
            pmt: None,
            fv: None,
            py: 12,
            cy: None,
            timing: PaymentTiming::End,
        };
        match request.solve() {
            Err(CalcError::InsufficientInput(msg)) => {
                assert!(msg.contains("I/Y"));
                assert!(msg.contains("PMT"));
                assert!(!msg.contains("FV"));
            }
            other => panic!("expected insufficient input, got {:?}", other),
        }
    }

    #[test]
    fn test_problem_deserializes_from_tag() {
        let problem: TvmProblem =
            serde_json::from_str(r#"{"solve_for":"pmt","n":36,"iy":5,"pv":15000,"fv":0}"#).unwrap();
        assert_eq!(problem.unknown(), TvmVariable::Pmt);
    }

    #[test]
    fn test_invalid_terms() {
        let err = solve(
            &TvmProblem::Fv { n: -1.0, iy: 5.0, pv: 0.0, pmt: 0.0 },
            &TvmTerms::new(0, 0, PaymentTiming::End),
        )
        .unwrap_err();
        assert_eq!(err.messages().len(), 3);
    }

    #[test]
    fn test_rate_below_minus_hundred_is_domain_error() {
        let result = solve(
            &TvmProblem::Fv { n: 1.0, iy: -150.0, pv: 100.0, pmt: 0.0 },
            &TvmTerms::annual(),
        );
        assert!(matches!(result, Err(CalcError::Domain(_))));
    }
}
