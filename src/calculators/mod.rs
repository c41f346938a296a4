//! Domain calculators built on the amortization primitive and tax tables
//!
//! Margin, discount and ROI take any two related values and derive the rest;
//! each has a tagged input enum with one variant per valid pair and an
//! optional-field request that picks the variant.

pub mod auto_lease;
pub mod cash_back;
pub mod discount;
pub mod margin;
pub mod marriage_tax;
pub mod roi;

pub use auto_lease::{LeaseInput, LeaseRate, LeaseResult, ResidualValue};
pub use cash_back::{BreakEven, CashBackInput, CashBackResult, FinancingOption, Recommendation};
pub use discount::{DiscountInput, DiscountRequest, DiscountResult};
pub use margin::{MarginInput, MarginRequest, MarginResult};
pub use marriage_tax::{Filer, MarriageOutcome, MarriageTaxInput, MarriageTaxResult};
pub use roi::{HoldingPeriod, RoiInput, RoiRequest, RoiResult};
