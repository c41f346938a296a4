//! Profit margin and markup
//!
//! Five related quantities: cost, revenue, profit, margin and markup, with
//! `profit = revenue − cost`, `margin = profit / revenue` and
//! `markup = profit / cost`. Any two independent values determine the rest.

use serde::{Deserialize, Serialize};

use crate::error::{CalcError, CalcResult};
use crate::validation::Validator;

/// The pair of known values. Percentages are in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "given", rename_all = "snake_case")]
pub enum MarginInput {
    CostRevenue { cost: f64, revenue: f64 },
    CostProfit { cost: f64, profit: f64 },
    CostMargin { cost: f64, margin: f64 },
    CostMarkup { cost: f64, markup: f64 },
    RevenueProfit { revenue: f64, profit: f64 },
    RevenueMargin { revenue: f64, margin: f64 },
    RevenueMarkup { revenue: f64, markup: f64 },
    ProfitMargin { profit: f64, margin: f64 },
    ProfitMarkup { profit: f64, markup: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarginResult {
    pub cost: f64,
    pub revenue: f64,
    pub profit: f64,
    /// Percent of revenue
    pub margin: f64,
    /// Percent of cost; undefined when cost is zero
    pub markup: Option<f64>,
}

/// Optional-field form of the inputs, as entered in a form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarginRequest {
    pub cost: Option<f64>,
    pub revenue: Option<f64>,
    pub profit: Option<f64>,
    pub margin: Option<f64>,
    pub markup: Option<f64>,
}

impl MarginRequest {
    /// Pick the input variant from whichever two values are present.
    ///
    /// Cost and revenue are preferred when more than two are supplied.
    pub fn to_input(&self) -> CalcResult<MarginInput> {
        use MarginInput::*;

        let input = match (self.cost, self.revenue, self.profit, self.margin, self.markup) {
            (Some(cost), Some(revenue), ..) => CostRevenue { cost, revenue },
            (Some(cost), None, Some(profit), ..) => CostProfit { cost, profit },
            (Some(cost), None, None, Some(margin), _) => CostMargin { cost, margin },
            (Some(cost), None, None, None, Some(markup)) => CostMarkup { cost, markup },
            (None, Some(revenue), Some(profit), ..) => RevenueProfit { revenue, profit },
            (None, Some(revenue), None, Some(margin), _) => RevenueMargin { revenue, margin },
            (None, Some(revenue), None, None, Some(markup)) => RevenueMarkup { revenue, markup },
            (None, None, Some(profit), Some(margin), _) => ProfitMargin { profit, margin },
            (None, None, Some(profit), None, Some(markup)) => ProfitMarkup { profit, markup },
            _ => {
                return Err(CalcError::InsufficientInput(
                    "provide at least two of cost, revenue, profit, margin and markup \
                     (margin and markup together do not determine an amount)"
                        .to_string(),
                ))
            }
        };
        Ok(input)
    }

    pub fn calculate(&self) -> CalcResult<MarginResult> {
        self.to_input()?.calculate()
    }
}

impl MarginInput {
    fn validate(&self) -> CalcResult<()> {
        use MarginInput::*;

        let mut v = Validator::new();
        match *self {
            CostRevenue { cost, revenue } => {
                v.non_negative("cost", cost).non_negative("revenue", revenue);
            }
            CostProfit { cost, profit } => {
                v.non_negative("cost", cost).finite("profit", profit);
            }
            CostMargin { cost, margin } => {
                v.non_negative("cost", cost).percent_below_hundred("margin", margin);
            }
            CostMarkup { cost, markup } => {
                v.non_negative("cost", cost).non_negative("markup", markup);
            }
            RevenueProfit { revenue, profit } => {
                v.non_negative("revenue", revenue).finite("profit", profit);
            }
            RevenueMargin { revenue, margin } => {
                v.non_negative("revenue", revenue).percent_below_hundred("margin", margin);
            }
            RevenueMarkup { revenue, markup } => {
                v.non_negative("revenue", revenue).non_negative("markup", markup);
            }
            ProfitMargin { profit, margin } => {
                v.finite("profit", profit).percent_below_hundred("margin", margin);
            }
            ProfitMarkup { profit, markup } => {
                v.finite("profit", profit).non_negative("markup", markup);
            }
        }
        v.finish()
    }

    fn degenerate(&self) -> bool {
        use MarginInput::*;

        match *self {
            CostRevenue { cost, revenue } => cost == 0.0 && revenue == 0.0,
            CostProfit { cost, profit } => cost == 0.0 && profit == 0.0,
            CostMargin { cost, .. } | CostMarkup { cost, .. } => cost == 0.0,
            RevenueProfit { revenue, profit } => revenue == 0.0 && profit == 0.0,
            RevenueMargin { revenue, .. } | RevenueMarkup { revenue, .. } => revenue == 0.0,
            ProfitMargin { profit, .. } | ProfitMarkup { profit, .. } => profit == 0.0,
        }
    }

    pub fn calculate(&self) -> CalcResult<MarginResult> {
        use MarginInput::*;

        self.validate()?;
        if self.degenerate() {
            return Err(CalcError::InsufficientInput(
                "the supplied values are all zero; at least one amount must be non-zero".to_string(),
            ));
        }

        let (cost, revenue) = match *self {
            CostRevenue { cost, revenue } => (cost, revenue),
            CostProfit { cost, profit } => (cost, cost + profit),
            CostMargin { cost, margin } => (cost, cost / (1.0 - margin / 100.0)),
            CostMarkup { cost, markup } => (cost, cost * (1.0 + markup / 100.0)),
            RevenueProfit { revenue, profit } => (revenue - profit, revenue),
            RevenueMargin { revenue, margin } => (revenue * (1.0 - margin / 100.0), revenue),
            RevenueMarkup { revenue, markup } => (revenue / (1.0 + markup / 100.0), revenue),
            ProfitMargin { profit, margin } => {
                if margin == 0.0 {
                    return Err(CalcError::domain("a non-zero profit cannot have a zero margin"));
                }
                let revenue = profit / (margin / 100.0);
                (revenue - profit, revenue)
            }
            ProfitMarkup { profit, markup } => {
                if markup == 0.0 {
                    return Err(CalcError::domain("a non-zero profit cannot have a zero markup"));
                }
                let cost = profit / (markup / 100.0);
                (cost, cost + profit)
            }
        };

        let mut v = Validator::new();
        v.check(cost >= 0.0, "the values imply a negative cost")
            .check(revenue > 0.0, "the values imply a revenue of zero or less");
        v.finish()?;

        let profit = revenue - cost;
        Ok(MarginResult {
            cost,
            revenue,
            profit,
            margin: profit / revenue * 100.0,
            markup: (cost > 0.0).then(|| profit / cost * 100.0),
        })
    }
}
