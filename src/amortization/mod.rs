//! Level-payment amortization: payment primitive, schedules and the loan calculator

mod payment;
mod schedule;
mod loan;

pub use payment::{payment, payment_due};
pub use schedule::{AmortizationRow, AmortizationSchedule, ScheduleTotals};
pub use loan::{LoanInput, LoanResult};
