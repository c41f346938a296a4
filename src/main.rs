//! Finance Calculators CLI
//!
//! Command-line interface for running any calculator, either from flags or
//! from a JSON request document.

use std::fs;
use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use finance_calculators::amortization::LoanInput;
use finance_calculators::calculators::{
    CashBackInput, DiscountRequest, Filer, HoldingPeriod, LeaseInput, LeaseRate, MarginRequest,
    MarriageTaxInput, ResidualValue, RoiRequest,
};
use finance_calculators::format::currency;
use finance_calculators::growth::{
    AnnuityInput, AnnuityPayoutInput, CompoundInput, Contribution, InvestmentInput, SimpleInterestInput,
};
use finance_calculators::tax::{load_tax_tables, TaxTables};
use finance_calculators::tvm::{TvmRequest, TvmVariable};
use finance_calculators::{CalculatorRequest, CalculatorResponse, Frequency, PaymentTiming};

#[derive(Parser)]
#[command(name = "finance_calculators")]
#[command(author, version, about = "Financial calculators: TVM, loans, growth, pricing and tax")]
struct Cli {
    /// Print the full result as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Directory of CSV tax tables (one subdirectory per year) layered over the built-in tables
    #[arg(long, env = "TAX_TABLE_DIR", global = true)]
    tax_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Solve for one of N, I/Y, PV, PMT or FV
    Tvm(TvmArgs),
    /// Loan payment and amortization schedule
    Loan(LoanArgs),
    /// Simple interest
    Simple(SimpleArgs),
    /// Compound interest with optional regular contributions
    Compound(CompoundArgs),
    /// Investment growth with a yearly breakdown
    Investment(InvestmentArgs),
    /// Annuity accumulation with annual and monthly additions
    Annuity(AnnuityArgs),
    /// Level payout a balance supports
    Payout(PayoutArgs),
    /// Margin and markup from any two values
    Margin(MarginArgs),
    /// Discount from any two values
    Discount(DiscountArgs),
    /// Return on investment from any two values
    Roi(RoiArgs),
    /// Cash back rebate versus low-interest financing
    CashBack(CashBackArgs),
    /// Auto lease payment
    Lease(LeaseArgs),
    /// Marriage penalty or bonus
    MarriageTax(MarriageTaxArgs),
    /// Evaluate a JSON request document from a file, or stdin when omitted
    Json {
        path: Option<PathBuf>,
    },
}

#[derive(Args)]
struct TvmArgs {
    /// Variable to solve for: n, iy, pv, pmt or fv
    #[arg(long)]
    solve: TvmVariable,
    #[arg(long, allow_hyphen_values = true)]
    n: Option<f64>,
    /// Nominal annual rate in percent
    #[arg(long, allow_hyphen_values = true)]
    iy: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    pv: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    pmt: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    fv: Option<f64>,
    /// Payments per year
    #[arg(long, default_value_t = 12)]
    py: u32,
    /// Compounding periods per year (defaults to P/Y)
    #[arg(long)]
    cy: Option<u32>,
    #[arg(long, default_value = "end")]
    timing: PaymentTiming,
    /// Print the period-by-period balance
    #[arg(long)]
    schedule: bool,
}

#[derive(Args)]
struct LoanArgs {
    #[arg(long)]
    amount: f64,
    /// Annual rate in percent
    #[arg(long)]
    rate: f64,
    #[arg(long)]
    years: f64,
    #[arg(long, default_value = "monthly")]
    frequency: Frequency,
    #[arg(long)]
    compounding: Option<Frequency>,
    /// First payment date (YYYY-MM-DD)
    #[arg(long)]
    start: Option<NaiveDate>,
    /// Print the amortization schedule
    #[arg(long)]
    schedule: bool,
}

#[derive(Args)]
struct SimpleArgs {
    #[arg(long)]
    principal: f64,
    #[arg(long)]
    rate: f64,
    #[arg(long)]
    years: f64,
}

#[derive(Args)]
struct CompoundArgs {
    #[arg(long)]
    principal: f64,
    #[arg(long)]
    rate: f64,
    #[arg(long)]
    years: f64,
    #[arg(long, default_value = "monthly")]
    compounding: Frequency,
    #[arg(long, default_value_t = 0.0)]
    contribution: f64,
    #[arg(long)]
    contribution_frequency: Option<Frequency>,
    #[arg(long, default_value = "end")]
    timing: PaymentTiming,
}

#[derive(Args)]
struct InvestmentArgs {
    #[arg(long)]
    initial: f64,
    #[arg(long)]
    rate: f64,
    #[arg(long)]
    years: f64,
    #[arg(long, default_value = "annually")]
    compounding: Frequency,
    #[arg(long, default_value_t = 0.0)]
    contribution: f64,
    #[arg(long, default_value = "monthly")]
    contribution_frequency: Frequency,
    #[arg(long, default_value = "end")]
    timing: PaymentTiming,
}

#[derive(Args)]
struct AnnuityArgs {
    #[arg(long)]
    principal: f64,
    #[arg(long, default_value_t = 0.0)]
    annual_addition: f64,
    #[arg(long, default_value_t = 0.0)]
    monthly_addition: f64,
    #[arg(long)]
    rate: f64,
    #[arg(long)]
    years: f64,
    #[arg(long, default_value = "end")]
    timing: PaymentTiming,
}

#[derive(Args)]
struct PayoutArgs {
    #[arg(long)]
    balance: f64,
    #[arg(long)]
    rate: f64,
    #[arg(long)]
    years: f64,
    #[arg(long, default_value = "monthly")]
    frequency: Frequency,
    #[arg(long, default_value = "end")]
    timing: PaymentTiming,
}

#[derive(Args)]
struct MarginArgs {
    #[arg(long)]
    cost: Option<f64>,
    #[arg(long)]
    revenue: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    profit: Option<f64>,
    #[arg(long)]
    margin: Option<f64>,
    #[arg(long)]
    markup: Option<f64>,
}

#[derive(Args)]
struct DiscountArgs {
    #[arg(long)]
    original: Option<f64>,
    #[arg(long)]
    percent: Option<f64>,
    #[arg(long)]
    amount: Option<f64>,
    #[arg(long = "final")]
    final_price: Option<f64>,
}

#[derive(Args)]
struct RoiArgs {
    #[arg(long)]
    invested: Option<f64>,
    #[arg(long)]
    returned: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    gain: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    roi: Option<f64>,
    /// Holding period in years
    #[arg(long, conflicts_with_all = ["start", "end"])]
    years: Option<f64>,
    #[arg(long, requires = "end")]
    start: Option<NaiveDate>,
    #[arg(long, requires = "start")]
    end: Option<NaiveDate>,
}

#[derive(Args)]
struct CashBackArgs {
    #[arg(long)]
    price: f64,
    #[arg(long)]
    cash_back: f64,
    /// Loan rate in percent when taking the cash back
    #[arg(long)]
    cash_back_rate: f64,
    /// Promotional rate in percent
    #[arg(long)]
    low_rate: f64,
    #[arg(long)]
    months: u32,
    #[arg(long, default_value_t = 0.0)]
    down: f64,
    #[arg(long, default_value_t = 0.0)]
    trade_in: f64,
    #[arg(long, default_value_t = 0.0)]
    tax: f64,
    #[arg(long, default_value_t = 0.0)]
    fees: f64,
}

#[derive(Args)]
struct LeaseArgs {
    #[arg(long)]
    price: f64,
    #[arg(long, default_value_t = 0.0)]
    down: f64,
    #[arg(long, default_value_t = 0.0)]
    trade_in: f64,
    #[arg(long, default_value_t = 0.0)]
    tax: f64,
    #[arg(long)]
    months: u32,
    #[arg(long, required_unless_present = "residual_percent")]
    residual: Option<f64>,
    #[arg(long, conflicts_with = "residual")]
    residual_percent: Option<f64>,
    /// APR in percent
    #[arg(long, required_unless_present = "money_factor")]
    apr: Option<f64>,
    #[arg(long, conflicts_with = "apr")]
    money_factor: Option<f64>,
}

#[derive(Args)]
struct MarriageTaxArgs {
    #[arg(long, default_value_t = 2024)]
    year: u16,
    #[arg(long)]
    first_wages: f64,
    #[arg(long, default_value_t = 0.0)]
    first_gains: f64,
    #[arg(long, default_value_t = 0)]
    first_children: u32,
    #[arg(long)]
    second_wages: f64,
    #[arg(long, default_value_t = 0.0)]
    second_gains: f64,
    #[arg(long, default_value_t = 0)]
    second_children: u32,
}

impl Command {
    fn into_request(self) -> Result<CalculatorRequest> {
        let request = match self {
            Command::Tvm(a) => CalculatorRequest::Tvm(TvmRequest {
                solve_for: a.solve,
                n: a.n,
                iy: a.iy,
                pv: a.pv,
                pmt: a.pmt,
                fv: a.fv,
                py: a.py,
                cy: a.cy,
                timing: a.timing,
            }),
            Command::Loan(a) => CalculatorRequest::Loan(LoanInput {
                payment_frequency: a.frequency,
                compounding: a.compounding,
                first_payment_date: a.start,
                ..LoanInput::new(a.amount, a.rate, a.years)
            }),
            Command::Simple(a) => CalculatorRequest::SimpleInterest(SimpleInterestInput {
                principal: a.principal,
                annual_rate: a.rate,
                years: a.years,
            }),
            Command::Compound(a) => CalculatorRequest::CompoundInterest(
                CompoundInput::new(a.principal, a.rate, a.years, a.compounding).with_contribution(
                    a.contribution,
                    a.contribution_frequency,
                    a.timing,
                ),
            ),
            Command::Investment(a) => {
                let mut input = InvestmentInput::new(a.initial, a.rate, a.years, a.compounding).with_timing(a.timing);
                if a.contribution != 0.0 {
                    input.contributions.push(Contribution::new(a.contribution, a.contribution_frequency));
                }
                CalculatorRequest::Investment(input)
            }
            Command::Annuity(a) => CalculatorRequest::Annuity(AnnuityInput {
                starting_principal: a.principal,
                annual_addition: a.annual_addition,
                monthly_addition: a.monthly_addition,
                annual_growth_rate: a.rate,
                years: a.years,
                timing: a.timing,
            }),
            Command::Payout(a) => CalculatorRequest::AnnuityPayout(AnnuityPayoutInput {
                balance: a.balance,
                annual_rate: a.rate,
                years: a.years,
                frequency: a.frequency,
                timing: a.timing,
            }),
            Command::Margin(a) => CalculatorRequest::Margin(MarginRequest {
                cost: a.cost,
                revenue: a.revenue,
                profit: a.profit,
                margin: a.margin,
                markup: a.markup,
            }),
            Command::Discount(a) => CalculatorRequest::Discount(DiscountRequest {
                original_price: a.original,
                discount_percent: a.percent,
                discount_amount: a.amount,
                final_price: a.final_price,
            }),
            Command::Roi(a) => {
                let period = match (a.years, a.start, a.end) {
                    (Some(years), _, _) => Some(HoldingPeriod::Years(years)),
                    (None, Some(start), Some(end)) => Some(HoldingPeriod::Dates { start, end }),
                    _ => None,
                };
                CalculatorRequest::Roi(RoiRequest {
                    invested: a.invested,
                    returned: a.returned,
                    gain: a.gain,
                    roi: a.roi,
                    period,
                })
            }
            Command::CashBack(a) => CalculatorRequest::CashBack(CashBackInput {
                vehicle_price: a.price,
                cash_back: a.cash_back,
                cash_back_rate: a.cash_back_rate,
                low_interest_rate: a.low_rate,
                term_months: a.months,
                down_payment: a.down,
                trade_in_value: a.trade_in,
                sales_tax_rate: a.tax,
                fees: a.fees,
            }),
            Command::Lease(a) => {
                let residual = match (a.residual, a.residual_percent) {
                    (Some(amount), _) => ResidualValue::Amount(amount),
                    (None, Some(pct)) => ResidualValue::Percent(pct),
                    (None, None) => anyhow::bail!("provide --residual or --residual-percent"),
                };
                let rate = match (a.apr, a.money_factor) {
                    (Some(apr), _) => LeaseRate::Apr(apr),
                    (None, Some(mf)) => LeaseRate::MoneyFactor(mf),
                    (None, None) => anyhow::bail!("provide --apr or --money-factor"),
                };
                CalculatorRequest::AutoLease(LeaseInput {
                    vehicle_price: a.price,
                    down_payment: a.down,
                    trade_in_value: a.trade_in,
                    sales_tax_rate: a.tax,
                    term_months: a.months,
                    residual,
                    rate,
                })
            }
            Command::MarriageTax(a) => CalculatorRequest::MarriageTax(MarriageTaxInput {
                year: a.year,
                first: Filer { wages: a.first_wages, capital_gains: a.first_gains, children: a.first_children },
                second: Filer {
                    wages: a.second_wages,
                    capital_gains: a.second_gains,
                    children: a.second_children,
                },
            }),
            Command::Json { path } => {
                let text = match path {
                    Some(path) => fs::read_to_string(&path)
                        .with_context(|| format!("reading request from {}", path.display()))?,
                    None => {
                        let mut text = String::new();
                        std::io::stdin().read_to_string(&mut text).context("reading request from stdin")?;
                        text
                    }
                };
                serde_json::from_str(&text).context("parsing calculator request")?
            }
        };
        Ok(request)
    }
}

fn print_summary(response: &CalculatorResponse) {
    let lines = response.summary();
    let width = lines.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    for (label, value) in lines {
        println!("  {:<width$}  {:>16}", label, value, width = width);
    }
}

fn print_details(response: &CalculatorResponse, tvm_schedule: bool, loan_schedule: bool) -> Result<()> {
    match response {
        CalculatorResponse::Loan(r) if loan_schedule => {
            println!();
            println!("{:>6} {:>12} {:>14} {:>14} {:>14} {:>16}", "Period", "Date", "Payment", "Principal", "Interest", "Balance");
            println!("{}", "-".repeat(82));
            for row in &r.schedule.rows {
                let date = row.date.map(|d| d.to_string()).unwrap_or_default();
                println!(
                    "{:>6} {:>12} {:>14.2} {:>14.2} {:>14.2} {:>16.2}",
                    row.period, date, row.payment, row.principal, row.interest, row.balance
                );
            }
        }
        CalculatorResponse::Loan(r) => {
            println!();
            println!("{:>5} {:>14} {:>14} {:>14} {:>16}", "Year", "Payments", "Principal", "Interest", "Balance");
            println!("{}", "-".repeat(67));
            for (idx, year) in r.yearly().iter().enumerate() {
                println!(
                    "{:>5} {:>14} {:>14} {:>14} {:>16}",
                    idx + 1,
                    currency(year.total_payments),
                    currency(year.total_principal),
                    currency(year.total_interest),
                    currency(year.final_balance)
                );
            }
        }
        CalculatorResponse::Tvm(r) if tvm_schedule => {
            println!();
            println!("{:>6} {:>16} {:>14} {:>14} {:>16}", "Period", "Start", "Interest", "Payment", "End");
            println!("{}", "-".repeat(70));
            for row in r.balance_schedule()? {
                println!(
                    "{:>6} {:>16.2} {:>14.2} {:>14.2} {:>16.2}",
                    row.period, row.start_balance, row.interest, row.payment, row.end_balance
                );
            }
        }
        CalculatorResponse::Investment(r) | CalculatorResponse::Annuity(r) => {
            println!();
            println!("{:>5} {:>16} {:>14} {:>14} {:>16}", "Year", "Start", "Added", "Interest", "End");
            println!("{}", "-".repeat(69));
            for row in &r.breakdown {
                println!(
                    "{:>5} {:>16} {:>14} {:>14} {:>16}",
                    row.year,
                    currency(row.start_balance),
                    currency(row.contributions),
                    currency(row.interest),
                    currency(row.end_balance)
                );
            }
        }
        _ => {}
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let tax_tables = match &cli.tax_dir {
        Some(dir) => load_tax_tables(dir).with_context(|| format!("loading tax tables from {}", dir.display()))?,
        None => TaxTables::builtin(),
    };

    let (tvm_schedule, loan_schedule) = match &cli.command {
        Command::Tvm(a) => (a.schedule, false),
        Command::Loan(a) => (false, a.schedule),
        _ => (false, false),
    };

    let request = cli.command.into_request()?;
    log::info!("running {} calculator", request.name());
    let response = request.evaluate(&tax_tables)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    println!("{}", request.name().replace('_', " ").to_uppercase());
    println!("{}", "=".repeat(40));
    print_summary(&response);
    print_details(&response, tvm_schedule, loan_schedule)?;

    Ok(())
}
