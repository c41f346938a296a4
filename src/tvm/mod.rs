//! Time Value of Money
//!
//! Solves the five-variable TVM equation for any one of N, I/Y, PV, PMT or FV.
//! Closed-form rearrangements cover N, PV, PMT and FV; I/Y is found iteratively
//! (see [`rate`]).

mod equation;
pub mod rate;
mod solver;
mod schedule;

pub use equation::{annual_rate, periodic_rate, residual};
pub use rate::{solve_rate, RateMethod, RateSolution, SolverConfig};
pub use schedule::BalanceRow;
pub use solver::{solve, solve_with, TvmProblem, TvmRequest, TvmResult, TvmTerms, TvmVariable};
