//! Finance Calculators - Deterministic financial calculation library
//!
//! This library provides:
//! - Time-value-of-money solver for any one of N, I/Y, PV, PMT and FV
//! - Loan payments and amortization schedules
//! - Simple, compound and continuous interest, investment and annuity growth
//!   with mismatched contribution and compounding frequencies
//! - Margin, discount and ROI solvers working from any two known values
//! - Cash back versus low-interest financing, auto lease payments and the
//!   marriage penalty on swappable federal tax tables

pub mod error;
pub mod validation;
pub mod frequency;
pub mod amortization;
pub mod growth;
pub mod tvm;
pub mod calculators;
pub mod tax;
pub mod format;
pub mod request;

// Re-export commonly used types
pub use error::{CalcError, CalcResult};
pub use frequency::{Frequency, PaymentTiming};
pub use amortization::{AmortizationSchedule, LoanInput};
pub use tvm::{TvmProblem, TvmRequest, TvmResult, TvmTerms};
pub use tax::{TaxTable, TaxTables};
pub use request::{CalculatorRequest, CalculatorResponse};
