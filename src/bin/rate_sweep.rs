//! Sweep the I/Y solver across terms, rates and cash flow shapes
//!
//! Each case prices a problem at a known rate, solves the rate back from the
//! priced values, and records the error and solver method. Results go to a
//! CSV file; the run fails if any case misses.
//!
//! Environment:
//! - `SWEEP_MAX_RATE`: highest annual rate in percent (default 30)
//! - `SWEEP_RATE_STEP`: rate step in percent (default 0.25)
//! - `SWEEP_MAX_YEARS`: longest term in years (default 40)
//! - `SWEEP_OUTPUT`: output CSV path (default rate_sweep.csv)

use std::env;
use std::fs::File;
use std::io::Write;
use std::time::Instant;

use anyhow::{Context, Result};
use rayon::prelude::*;

use finance_calculators::tvm::{solve, RateMethod, TvmProblem, TvmTerms};
use finance_calculators::PaymentTiming;

const TERMS_MONTHS: [u32; 12] = [1, 2, 3, 6, 12, 24, 36, 60, 120, 240, 360, 480];

#[derive(Debug, Clone, Copy)]
enum Shape {
    /// Borrow PV, repay with PMT
    Loan,
    /// Deposit PV and PMT, withdraw FV
    Savings,
    /// Borrow PV, pay PMT and a balloon at the end
    Balloon,
}

#[derive(Debug, Clone, Copy)]
struct Case {
    shape: Shape,
    months: u32,
    annual_rate: f64,
    timing: PaymentTiming,
}

#[derive(Debug)]
struct Outcome {
    case: Case,
    solved_rate: Option<f64>,
    method: Option<RateMethod>,
    error: Option<String>,
}

impl Outcome {
    fn abs_error(&self) -> Option<f64> {
        self.solved_rate.map(|r| (r - self.case.annual_rate).abs())
    }

    fn passed(&self) -> bool {
        self.abs_error().is_some_and(|e| e < 1e-4)
    }
}

fn env_or(name: &str, default: f64) -> Result<f64> {
    match env::var(name) {
        Ok(raw) => raw.parse().with_context(|| format!("{name} must be a number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

fn run_case(case: Case) -> Outcome {
    let terms = TvmTerms::new(12, 12, case.timing);
    let n = case.months as f64;
    let iy = case.annual_rate;

    let priced = match case.shape {
        Shape::Loan => solve(&TvmProblem::Pmt { n, iy, pv: 25_000.0, fv: 0.0 }, &terms),
        Shape::Savings => solve(&TvmProblem::Fv { n, iy, pv: -1_000.0, pmt: -100.0 }, &terms),
        Shape::Balloon => solve(&TvmProblem::Pmt { n, iy, pv: 25_000.0, fv: -10_000.0 }, &terms),
    };

    let solved = priced.and_then(|p| solve(&TvmProblem::Iy { n, pv: p.pv, pmt: p.pmt, fv: p.fv }, &terms));
    match solved {
        Ok(r) => Outcome { case, solved_rate: Some(r.iy), method: r.rate_method, error: None },
        Err(e) => Outcome { case, solved_rate: None, method: None, error: Some(e.to_string()) },
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let max_rate = env_or("SWEEP_MAX_RATE", 30.0)?;
    let step = env_or("SWEEP_RATE_STEP", 0.25)?;
    let max_years = env_or("SWEEP_MAX_YEARS", 40.0)?;
    let output_path = env::var("SWEEP_OUTPUT").unwrap_or_else(|_| "rate_sweep.csv".to_string());
    anyhow::ensure!(step > 0.0, "SWEEP_RATE_STEP must be greater than zero");

    let rate_count = (max_rate / step).floor() as usize + 1;
    let mut cases = Vec::new();
    for &months in TERMS_MONTHS.iter().filter(|&&m| m as f64 <= max_years * 12.0) {
        for k in 0..rate_count {
            for shape in [Shape::Loan, Shape::Savings, Shape::Balloon] {
                for timing in [PaymentTiming::End, PaymentTiming::Beginning] {
                    cases.push(Case { shape, months, annual_rate: k as f64 * step, timing });
                }
            }
        }
    }

    println!("Running {} rate solver cases...", cases.len());
    let start = Instant::now();

    let outcomes: Vec<Outcome> = cases.par_iter().map(|&case| run_case(case)).collect();

    println!("Sweep complete in {:?}", start.elapsed());

    let mut file = File::create(&output_path).with_context(|| format!("creating {output_path}"))?;
    writeln!(file, "Shape,Months,Timing,AnnualRate,SolvedRate,AbsError,Method,Error")?;
    for o in &outcomes {
        writeln!(
            file,
            "{:?},{},{},{:.4},{},{},{},{}",
            o.case.shape,
            o.case.months,
            o.case.timing,
            o.case.annual_rate,
            o.solved_rate.map(|r| format!("{r:.10}")).unwrap_or_default(),
            o.abs_error().map(|e| format!("{e:.3e}")).unwrap_or_default(),
            o.method.map(|m| format!("{m:?}")).unwrap_or_default(),
            o.error.as_deref().unwrap_or("").replace(',', ";"),
        )?;
    }
    println!("Output written to {}", output_path);

    let failures: Vec<&Outcome> = outcomes.iter().filter(|o| !o.passed()).collect();
    let worst = outcomes.iter().filter_map(Outcome::abs_error).fold(0.0, f64::max);
    let count = |method| outcomes.iter().filter(|o| o.method == Some(method)).count();

    println!("\nSweep Summary:");
    println!("  Cases:        {}", outcomes.len());
    println!("  Closed form:  {}", count(RateMethod::ClosedForm));
    println!("  Newton:       {}", count(RateMethod::Newton));
    println!("  Bisection:    {}", count(RateMethod::Bisection));
    println!("  Worst error:  {:.3e} percentage points", worst);
    println!("  Failures:     {}", failures.len());

    for o in failures.iter().take(10) {
        log::warn!("failed case {:?}: {:?}", o.case, o.error);
    }
    anyhow::ensure!(failures.is_empty(), "{} of {} cases failed", failures.len(), outcomes.len());

    Ok(())
}
