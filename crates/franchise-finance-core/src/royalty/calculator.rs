use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::*;
use crate::FranchiseFinanceResult;

use super::schedule::{ResolvedSchedule, RoyaltyType};
use super::tiers::{apply_brackets, RoyaltyTier, TierSlice};
use super::validate_revenue;

/// Royalty owed at a revenue figure, before any incentive or discount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoyaltyResult {
    pub amount: Money,
    /// amount / revenue * 100, or 0 at zero revenue
    pub effective_rate_percent: Percent,
    /// Highest tier with a non-zero slice; for a fixed schedule, the sole tier
    pub binding_tier: Option<RoyaltyTier>,
    pub slices: Vec<TierSlice>,
}

/// Compute the royalty owed on `revenue`.
///
/// Fixed schedules charge the single tier's percentage on all revenue. Tiered
/// and performance-based schedules use marginal brackets: each tier charges
/// only the slice of revenue that falls inside its band. Incentives are not
/// applied here; see [`super::adjustments::apply_adjustments`].
pub fn calculate_royalty(
    schedule: &ResolvedSchedule,
    revenue: Money,
) -> FranchiseFinanceResult<RoyaltyResult> {
    validate_revenue(revenue)?;

    let tiers = schedule.tiers().tiers();
    match schedule.schedule_type() {
        RoyaltyType::Fixed => {
            let tier = &tiers[0];
            let amount = no_overflow(
                revenue
                    .checked_mul(tier.percentage)
                    .map(|v| v / Decimal::ONE_HUNDRED),
                "revenue",
            )?;
            let slices = if revenue.is_zero() {
                Vec::new()
            } else {
                vec![TierSlice {
                    min_revenue: tier.min_revenue,
                    max_revenue: tier.max_revenue,
                    percentage: tier.percentage,
                    taxable_revenue: revenue,
                    contribution: amount,
                }]
            };
            Ok(RoyaltyResult {
                amount,
                effective_rate_percent: if revenue.is_zero() {
                    Decimal::ZERO
                } else {
                    tier.percentage
                },
                binding_tier: Some(tier.clone()),
                slices,
            })
        }
        RoyaltyType::Tiered | RoyaltyType::PerformanceBased => {
            let outcome = apply_brackets(schedule.tiers(), revenue)?;
            Ok(RoyaltyResult {
                amount: outcome.amount,
                effective_rate_percent: percent_of(outcome.amount, revenue),
                binding_tier: outcome.binding_index.map(|i| tiers[i].clone()),
                slices: outcome.slices,
            })
        }
    }
}
