use clap::Args;
use serde_json::Value;

use franchise_finance_core::investment::aggregation::{analyse_investment, InvestmentInput};

use crate::input;

/// Arguments for the investment roll-up
#[derive(Args)]
pub struct InvestmentArgs {
    /// Path to JSON input file with an `items` array
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_investment(args: InvestmentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let inv_input: InvestmentInput = input::require_input(args.input.as_deref(), "investment")?;
    let result = analyse_investment(&inv_input)?;
    Ok(serde_json::to_value(result)?)
}
