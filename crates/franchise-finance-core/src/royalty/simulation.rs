use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::types::*;
use crate::FranchiseFinanceResult;

use super::adjustments::{apply_adjustments, AdjustedRoyalty, VolumeDiscountEligibility};
use super::calculator::{calculate_royalty, RoyaltyResult};
use super::marketing::calculate_marketing_fee;
use super::schedule::{resolve_schedule, ResolvedMarketingFee, RoyaltySchedule, RoyaltyType};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeSimulationInput {
    pub schedule: RoyaltySchedule,
    /// Revenue for the period being simulated
    pub revenue: Money,
    #[serde(default)]
    pub eligibility: VolumeDiscountEligibility,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeSimulationOutput {
    pub schedule_type: RoyaltyType,
    pub revenue: Money,
    pub royalty: RoyaltyResult,
    pub adjusted: AdjustedRoyalty,
    pub marketing_fee: Money,
    /// Adjusted royalty plus marketing fee
    pub total_fees: Money,
    pub total_fee_rate_percent: Percent,
}

// ---------------------------------------------------------------------------
// Main calculation
// ---------------------------------------------------------------------------

/// Resolve a schedule and report every fee owed at one revenue figure.
pub fn simulate_fees(
    input: &FeeSimulationInput,
) -> FranchiseFinanceResult<ComputationOutput<FeeSimulationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let resolved = resolve_schedule(&input.schedule)?;
    let royalty = calculate_royalty(&resolved, input.revenue)?;
    let adjusted = apply_adjustments(&resolved, &royalty, input.revenue, &input.eligibility)?;
    let marketing_fee = calculate_marketing_fee(resolved.marketing_fee(), input.revenue)?;

    if resolved.schedule_type() == RoyaltyType::PerformanceBased && !resolved.incentives_enabled() {
        warnings.push(
            "Performance-based schedule has no enabled incentives; royalty matches the tiered computation"
                .into(),
        );
    }
    for (from, to) in resolved.tiers().gaps() {
        warnings.push(format!(
            "Royalty tiers leave revenue between {from} and {to} uncharged"
        ));
    }
    if let ResolvedMarketingFee::Tiered { tiers } = resolved.marketing_fee() {
        for (from, to) in tiers.gaps() {
            warnings.push(format!(
                "Marketing fee tiers leave revenue between {from} and {to} uncharged"
            ));
        }
    }
    if let ResolvedMarketingFee::Fixed { amount } = resolved.marketing_fee() {
        if input.revenue.is_zero() && !amount.is_zero() {
            warnings.push("Fixed marketing fee is owed even at zero revenue".into());
        }
    }

    let total_fees = adjusted.amount + marketing_fee;
    let output = FeeSimulationOutput {
        schedule_type: resolved.schedule_type(),
        revenue: input.revenue,
        total_fee_rate_percent: percent_of(total_fees, input.revenue),
        royalty,
        adjusted,
        marketing_fee,
        total_fees,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Franchise fee simulation: marginal-bracket royalty, incentives, marketing fund",
        &serde_json::json!({
            "schedule_type": resolved.schedule_type().as_str(),
            "tiers": resolved.tiers().len(),
            "revenue": input.revenue.to_string(),
            "incentives_enabled": resolved.incentives_enabled(),
            "volume_discounts_enabled": resolved.discounts_enabled(),
            "multi_unit_operator": input.eligibility.multi_unit_operator,
            "loyalty_eligible": input.eligibility.loyalty_eligible,
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::royalty::schedule::{MarketingFeeStructure, MarketingFeeType};
    use crate::royalty::tiers::RoyaltyTier;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn default_input(revenue: Money) -> FeeSimulationInput {
        FeeSimulationInput {
            schedule: RoyaltySchedule::default(),
            revenue,
            eligibility: VolumeDiscountEligibility::default(),
        }
    }

    #[test]
    fn test_default_schedule_simulation() {
        let out = simulate_fees(&default_input(dec!(2_400_000))).unwrap();
        let r = &out.result;
        assert_eq!(r.royalty.amount, dec!(144_000));
        assert_eq!(r.marketing_fee, dec!(48_000));
        assert_eq!(r.total_fees, dec!(192_000));
        assert_eq!(r.total_fee_rate_percent, dec!(8));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_zero_revenue() {
        let out = simulate_fees(&default_input(Decimal::ZERO)).unwrap();
        assert_eq!(out.result.total_fees, Decimal::ZERO);
        assert_eq!(out.result.total_fee_rate_percent, Decimal::ZERO);
    }

    #[test]
    fn test_warns_on_gaps_and_inert_performance_schedule() {
        let mut input = default_input(dec!(100_000));
        input.schedule.schedule_type = RoyaltyType::PerformanceBased;
        input.schedule.base_tiers = vec![
            RoyaltyTier::new(dec!(0), Some(dec!(50_000)), dec!(5)),
            RoyaltyTier::new(dec!(60_000), None, dec!(7)),
        ];
        input.schedule.marketing_fee = MarketingFeeStructure {
            fee_type: MarketingFeeType::Fixed,
            value: dec!(10_000),
            tiers: None,
        };
        let out = simulate_fees(&input).unwrap();
        assert_eq!(out.warnings.len(), 2);
        // 50,000 @ 5% + 40,000 @ 7%
        assert_eq!(out.result.royalty.amount, dec!(5_300));
        assert_eq!(out.result.total_fees, dec!(15_300));
    }

    #[test]
    fn test_invalid_schedule_stops_before_computation() {
        let mut input = default_input(dec!(1_000));
        input.schedule.base_tiers.clear();
        assert!(simulate_fees(&input).is_err());
    }
}
