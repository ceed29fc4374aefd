use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use franchise_finance_core::royalty::adjustments::VolumeDiscountEligibility;
use franchise_finance_core::royalty::schedule::{
    resolve_schedule, MarketingFeeStructure, MarketingFeeType, RoyaltySchedule,
};
use franchise_finance_core::royalty::simulation::{simulate_fees, FeeSimulationInput};

use crate::input;

/// Arguments for a fee simulation
#[derive(Args)]
pub struct RoyaltyArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Revenue for the period
    #[arg(long)]
    pub revenue: Option<Decimal>,

    /// Flat royalty rate in percent (builds a fixed schedule)
    #[arg(long, default_value = "6")]
    pub rate: Decimal,

    /// Marketing fund contribution in percent of revenue
    #[arg(long, default_value = "2")]
    pub marketing_rate: Decimal,

    /// Franchisee operates several units
    #[arg(long)]
    pub multi_unit: bool,

    /// Franchisee qualifies for the loyalty discount
    #[arg(long)]
    pub loyalty: bool,
}

pub fn run_royalty(args: RoyaltyArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let sim_input: FeeSimulationInput = match input::read_input(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => {
            let revenue = args
                .revenue
                .ok_or("--revenue is required (or provide --input)")?;
            let mut schedule = RoyaltySchedule::fixed(args.rate);
            schedule.marketing_fee = MarketingFeeStructure {
                fee_type: MarketingFeeType::Percentage,
                value: args.marketing_rate,
                tiers: None,
            };
            if args.multi_unit || args.loyalty {
                if let Some(discounts) = schedule.volume_discounts.as_mut() {
                    discounts.enabled = true;
                }
            }
            FeeSimulationInput {
                schedule,
                revenue,
                eligibility: VolumeDiscountEligibility {
                    multi_unit_operator: args.multi_unit,
                    loyalty_eligible: args.loyalty,
                },
            }
        }
    };

    let result = simulate_fees(&sim_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for schedule validation
#[derive(Args)]
pub struct TiersArgs {
    /// Path to a JSON royalty schedule
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_tiers(args: TiersArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let schedule: RoyaltySchedule = input::require_input(args.input.as_deref(), "tiers")?;
    let resolved = resolve_schedule(&schedule)?;
    let gaps: Vec<Value> = resolved
        .tiers()
        .gaps()
        .into_iter()
        .map(|(from, to)| serde_json::json!({ "from": from, "to": to }))
        .collect();
    Ok(serde_json::json!({
        "result": resolved,
        "gaps": gaps,
    }))
}
