use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use franchise_finance_core::projection::benchmarks::{Industry, LocationTier};
use franchise_finance_core::projection::roi::{default_scenarios, project_roi, RoiInput};
use franchise_finance_core::royalty::adjustments::VolumeDiscountEligibility;
use franchise_finance_core::royalty::schedule::RoyaltySchedule;

use crate::input;

/// Arguments for the ROI projection
#[derive(Args)]
pub struct RoiArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Total initial investment
    #[arg(long)]
    pub investment: Option<Decimal>,

    /// First-year revenue (defaults to the industry benchmark)
    #[arg(long)]
    pub revenue: Option<Decimal>,

    /// First-year operating costs, excluding franchise fees
    #[arg(long)]
    pub operating_costs: Option<Decimal>,

    /// Industry preset: food_beverage, retail, services or fitness
    #[arg(long)]
    pub industry: Option<String>,

    /// Location tier for the industry preset: tier1, tier2 or tier3
    #[arg(long, default_value = "tier2")]
    pub location: String,

    /// Flat royalty rate in percent
    #[arg(long, default_value = "6")]
    pub royalty_rate: Decimal,

    /// Annual revenue and cost growth in percent
    #[arg(long, default_value = "8")]
    pub growth: Decimal,

    /// Projection horizon in years
    #[arg(long, default_value = "5")]
    pub years: u32,

    /// Discount rate in percent for scenario NPV
    #[arg(long)]
    pub discount_rate: Option<Decimal>,
}

pub fn run_roi(args: RoiArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let roi_input: RoiInput = match input::read_input(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => RoiInput {
            total_investment: args
                .investment
                .ok_or("--investment is required (or provide --input)")?,
            base_revenue: args.revenue,
            base_operating_costs: args.operating_costs,
            industry: args
                .industry
                .as_deref()
                .map(str::parse::<Industry>)
                .transpose()?,
            location_tier: args.location.parse::<LocationTier>()?,
            schedule: RoyaltySchedule::fixed(args.royalty_rate),
            years: args.years,
            growth_rate_percent: args.growth,
            eligibility: VolumeDiscountEligibility::default(),
            scenarios: default_scenarios(),
            discount_rate_percent: args.discount_rate,
        },
    };

    let result = project_roi(&roi_input)?;
    Ok(serde_json::to_value(result)?)
}
