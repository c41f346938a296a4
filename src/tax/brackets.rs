//! Progressive bracket schedules

use serde::{Deserialize, Serialize};

use crate::error::{CalcError, CalcResult};

/// One marginal bracket. `upper` is `None` for the top bracket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    pub lower: f64,
    pub upper: Option<f64>,
    /// Marginal rate as a fraction (0.22 for 22%)
    pub rate: f64,
}

impl Bracket {
    /// Portion of `income` that falls inside this bracket
    fn portion(&self, income: f64) -> f64 {
        let top = self.upper.map_or(income, |upper| income.min(upper));
        (top - self.lower).max(0.0)
    }
}

/// Ordered, contiguous brackets starting at zero
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Bracket>", into = "Vec<Bracket>")]
pub struct BracketSchedule {
    brackets: Vec<Bracket>,
}

impl BracketSchedule {
    /// Build from `(lower threshold, rate)` pairs; each bracket ends where the
    /// next one starts.
    pub fn from_thresholds(thresholds: &[(f64, f64)]) -> CalcResult<Self> {
        Self::new(Self::chain(thresholds))
    }

    /// Built-in tables skip validation; their tests check them instead
    pub(super) fn from_trusted(thresholds: &[(f64, f64)]) -> Self {
        Self { brackets: Self::chain(thresholds) }
    }

    fn chain(thresholds: &[(f64, f64)]) -> Vec<Bracket> {
        thresholds
            .iter()
            .enumerate()
            .map(|(i, &(lower, rate))| Bracket {
                lower,
                upper: thresholds.get(i + 1).map(|&(next, _)| next),
                rate,
            })
            .collect()
    }

    pub fn new(brackets: Vec<Bracket>) -> CalcResult<Self> {
        let mut messages = Vec::new();

        match brackets.first() {
            None => messages.push("a bracket schedule needs at least one bracket".to_string()),
            Some(first) if first.lower != 0.0 => {
                messages.push("the first bracket must start at zero".to_string())
            }
            _ => {}
        }
        for pair in brackets.windows(2) {
            if pair[0].upper != Some(pair[1].lower) {
                messages.push(format!("bracket starting at {} does not continue the previous one", pair[1].lower));
            }
        }
        for b in &brackets {
            if !(0.0..=1.0).contains(&b.rate) {
                messages.push(format!("bracket rate {} is not a fraction between 0 and 1", b.rate));
            }
            if let Some(upper) = b.upper {
                if !(upper > b.lower) {
                    messages.push(format!("bracket starting at {} must end above its start", b.lower));
                }
            }
        }
        if brackets.last().is_some_and(|b| b.upper.is_some()) {
            messages.push("the top bracket must be open-ended".to_string());
        }

        if messages.is_empty() {
            Ok(Self { brackets })
        } else {
            Err(CalcError::InvalidInput(messages))
        }
    }

    pub fn brackets(&self) -> &[Bracket] {
        &self.brackets
    }

    /// Tax on `income` applying each marginal rate to its slice
    pub fn tax(&self, income: f64) -> f64 {
        if income <= 0.0 {
            return 0.0;
        }
        self.brackets.iter().map(|b| b.rate * b.portion(income)).sum()
    }

    /// Tax on the slice of income between `from` and `to`, used to stack one
    /// kind of income on top of another
    pub fn tax_between(&self, from: f64, to: f64) -> f64 {
        (self.tax(to) - self.tax(from)).max(0.0)
    }

    pub fn marginal_rate(&self, income: f64) -> f64 {
        self.brackets
            .iter()
            .rev()
            .find(|b| income >= b.lower)
            .map_or(0.0, |b| b.rate)
    }
}

impl TryFrom<Vec<Bracket>> for BracketSchedule {
    type Error = CalcError;

    fn try_from(brackets: Vec<Bracket>) -> CalcResult<Self> {
        Self::new(brackets)
    }
}

impl From<BracketSchedule> for Vec<Bracket> {
    fn from(schedule: BracketSchedule) -> Self {
        schedule.brackets
    }
}
