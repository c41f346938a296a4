//! Display formatting for currency and percentages
//!
//! Calculations never round; these helpers are used only at the output
//! boundary.

/// `$1,234.56`, with a leading minus for negative amounts
pub fn currency(amount: f64) -> String {
    if !amount.is_finite() {
        return amount.to_string();
    }
    let cents = (amount.abs() * 100.0).round();
    let whole = (cents / 100.0).trunc() as u64;
    let frac = (cents % 100.0) as u64;
    let sign = if amount < 0.0 && cents > 0.0 { "-" } else { "" };
    format!("{sign}${}.{frac:02}", group_thousands(whole))
}

/// Percent value with the given number of decimals, e.g. `6.25%`
pub fn percent(value: f64, decimals: usize) -> String {
    format!("{value:.decimals$}%")
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
