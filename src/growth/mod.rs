//! Interest and growth calculators
//!
//! - Simple interest (no compounding)
//! - Compound interest with regular contributions, discrete or continuous
//! - Investment engine with independent contribution and compounding frequencies
//! - Annuity accumulation and payout

mod simple;
mod compound;
mod investment;
mod annuity;

pub use simple::{SimpleInterestInput, SimpleInterestResult};
pub use compound::{CompoundInput, CompoundResult};
pub use investment::{Contribution, InvestmentInput, InvestmentResult, YearRow};
pub use annuity::{AnnuityInput, AnnuityPayoutInput, AnnuityPayoutResult};
