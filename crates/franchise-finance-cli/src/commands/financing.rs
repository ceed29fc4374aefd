use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use franchise_finance_core::financing::amortization::{analyse_loan, LoanInput};
use franchise_finance_core::financing::options::{analyse_financing, FinancingInput};

use crate::input;

/// Arguments for a single loan
#[derive(Args)]
pub struct EmiArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (12 = 12%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Term in months
    #[arg(long)]
    pub months: Option<u32>,

    /// Include the month-by-month amortization table
    #[arg(long)]
    pub schedule: bool,
}

pub fn run_emi(args: EmiArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan: LoanInput = match input::read_input(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => LoanInput {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            annual_rate_percent: args.rate.ok_or("--rate is required (or provide --input)")?,
            term_months: args.months.ok_or("--months is required (or provide --input)")?,
            include_schedule: args.schedule,
        },
    };

    let result = analyse_loan(&loan)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for financing coverage
#[derive(Args)]
pub struct FinancingArgs {
    /// Path to JSON input file with `options`, `selected` and `total_investment`
    #[arg(long)]
    pub input: Option<String>,

    /// Override the selected option ids (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub select: Option<Vec<String>>,
}

pub fn run_financing(args: FinancingArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut fin_input: FinancingInput = input::require_input(args.input.as_deref(), "financing")?;
    if let Some(select) = args.select {
        fin_input.selected = select;
    }
    let result = analyse_financing(&fin_input)?;
    Ok(serde_json::to_value(result)?)
}
