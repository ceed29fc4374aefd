use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::*;
use crate::FranchiseFinanceResult;

use super::calculator::RoyaltyResult;
use super::schedule::{IncentiveApplication, ResolvedSchedule};
use super::validate_revenue;

/// Facts about the franchisee that only the caller knows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeDiscountEligibility {
    #[serde(default)]
    pub multi_unit_operator: bool,
    #[serde(default)]
    pub loyalty_eligible: bool,
}

/// Royalty after performance incentives and volume discounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustedRoyalty {
    /// Royalty before adjustment
    pub base_amount: Money,
    pub amount: Money,
    pub effective_rate_percent: Percent,
    /// Points taken off by the performance incentive
    pub incentive_points: Percent,
    /// Points taken off by volume discounts
    pub discount_points: Percent,
    /// Marginal rate charged at the top of the binding tier after adjustment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjusted_binding_rate_percent: Option<Percent>,
    pub applied: bool,
}

/// Apply the schedule's enabled modifiers to a royalty result.
///
/// Incentive and discount points are summed and taken off the binding tier's
/// marginal rate only, floored at zero. Lower tiers are untouched. With
/// [`IncentiveApplication::AboveThreshold`] the incentive points cover only the
/// part of the binding slice above `bonus_threshold`; discount points always
/// cover the whole binding slice. Returns the input unchanged when no
/// modifier applies.
pub fn apply_adjustments(
    schedule: &ResolvedSchedule,
    royalty: &RoyaltyResult,
    revenue: Money,
    eligibility: &VolumeDiscountEligibility,
) -> FranchiseFinanceResult<AdjustedRoyalty> {
    validate_revenue(revenue)?;

    let mut incentive_points = Decimal::ZERO;
    let mut threshold = Decimal::ZERO;
    let mut application = IncentiveApplication::BindingTier;
    if let Some(incentives) = schedule.performance_incentives() {
        if incentives.enabled && revenue > incentives.bonus_threshold {
            incentive_points = incentives.bonus_reduction;
            threshold = incentives.bonus_threshold;
            application = incentives.application;
        }
    }

    let mut discount_points = Decimal::ZERO;
    if let Some(discounts) = schedule.volume_discounts() {
        if discounts.enabled {
            if eligibility.multi_unit_operator {
                discount_points += discounts.multi_unit_discount;
            }
            if eligibility.loyalty_eligible {
                discount_points += discounts.loyalty_discount;
            }
        }
    }

    let binding = match royalty.slices.last() {
        Some(slice) if !(incentive_points + discount_points).is_zero() => slice,
        _ => {
            return Ok(AdjustedRoyalty {
                base_amount: royalty.amount,
                amount: royalty.amount,
                effective_rate_percent: royalty.effective_rate_percent,
                incentive_points: Decimal::ZERO,
                discount_points: Decimal::ZERO,
                adjusted_binding_rate_percent: royalty.binding_tier.as_ref().map(|t| t.percentage),
                applied: false,
            });
        }
    };

    let rate = binding.percentage;
    let discounted_rate = (rate - discount_points).max(Decimal::ZERO);
    let full_rate = (rate - discount_points - incentive_points).max(Decimal::ZERO);

    let new_contribution = match application {
        IncentiveApplication::BindingTier => {
            binding.taxable_revenue * full_rate / Decimal::ONE_HUNDRED
        }
        IncentiveApplication::AboveThreshold => {
            let slice_top = binding.min_revenue + binding.taxable_revenue;
            let above_start = binding.min_revenue.max(threshold);
            let above = (slice_top - above_start).max(Decimal::ZERO);
            let below = binding.taxable_revenue - above;
            (below * discounted_rate + above * full_rate) / Decimal::ONE_HUNDRED
        }
    };

    let amount = royalty.amount - binding.contribution + new_contribution;

    tracing::debug!(
        %incentive_points,
        %discount_points,
        base = %royalty.amount,
        adjusted = %amount,
        "royalty adjustments applied"
    );

    Ok(AdjustedRoyalty {
        base_amount: royalty.amount,
        amount,
        effective_rate_percent: percent_of(amount, revenue),
        incentive_points,
        discount_points,
        adjusted_binding_rate_percent: Some(full_rate),
        applied: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::royalty::calculator::calculate_royalty;
    use crate::royalty::schedule::*;
    use crate::royalty::tiers::RoyaltyTier;
    use rust_decimal_macros::dec;

    fn schedule(
        incentives_on: bool,
        discounts_on: bool,
        application: IncentiveApplication,
    ) -> ResolvedSchedule {
        let schedule = RoyaltySchedule {
            schedule_type: RoyaltyType::PerformanceBased,
            base_tiers: vec![
                RoyaltyTier::new(dec!(0), Some(dec!(1_000_000)), dec!(5)),
                RoyaltyTier::new(dec!(1_000_000), None, dec!(8)),
            ],
            performance_incentives: Some(PerformanceIncentives {
                enabled: incentives_on,
                bonus_threshold: dec!(2_000_000),
                bonus_reduction: dec!(1),
                application,
            }),
            volume_discounts: Some(VolumeDiscounts {
                enabled: discounts_on,
                multi_unit_discount: dec!(0.5),
                loyalty_discount: dec!(0.25),
            }),
            ..RoyaltySchedule::default()
        };
        resolve_schedule(&schedule).unwrap()
    }

    fn run(
        resolved: &ResolvedSchedule,
        revenue: Decimal,
        eligibility: VolumeDiscountEligibility,
    ) -> AdjustedRoyalty {
        let royalty = calculate_royalty(resolved, revenue).unwrap();
        apply_adjustments(resolved, &royalty, revenue, &eligibility).unwrap()
    }

    #[test]
    fn test_identity_when_disabled() {
        let resolved = schedule(false, false, IncentiveApplication::BindingTier);
        let out = run(&resolved, dec!(2_400_000), VolumeDiscountEligibility::default());
        assert!(!out.applied);
        assert_eq!(out.amount, dec!(162_000));
        assert_eq!(out.amount, out.base_amount);
        assert_eq!(out.adjusted_binding_rate_percent, Some(dec!(8)));
    }

    #[test]
    fn test_incentive_below_threshold_not_applied() {
        let resolved = schedule(true, false, IncentiveApplication::BindingTier);
        let out = run(&resolved, dec!(1_500_000), VolumeDiscountEligibility::default());
        assert!(!out.applied);
        assert_eq!(out.amount, dec!(90_000));
    }

    #[test]
    fn test_incentive_on_binding_tier() {
        let resolved = schedule(true, false, IncentiveApplication::BindingTier);
        let out = run(&resolved, dec!(2_400_000), VolumeDiscountEligibility::default());
        // 1,000,000 @ 5% + 1,400,000 @ 7%
        assert!(out.applied);
        assert_eq!(out.amount, dec!(148_000));
        assert_eq!(out.incentive_points, dec!(1));
        assert_eq!(out.adjusted_binding_rate_percent, Some(dec!(7)));
    }

    #[test]
    fn test_incentive_above_threshold_only() {
        let resolved = schedule(true, false, IncentiveApplication::AboveThreshold);
        let out = run(&resolved, dec!(2_400_000), VolumeDiscountEligibility::default());
        // 1,000,000 @ 5% + 1,000,000 @ 8% + 400,000 @ 7%
        assert_eq!(out.amount, dec!(158_000));
    }

    #[test]
    fn test_discounts_are_additive() {
        let resolved = schedule(true, true, IncentiveApplication::BindingTier);
        let eligibility = VolumeDiscountEligibility {
            multi_unit_operator: true,
            loyalty_eligible: true,
        };
        let out = run(&resolved, dec!(2_400_000), eligibility);
        assert_eq!(out.discount_points, dec!(0.75));
        // 1,400,000 @ (8 - 1 - 0.75)%
        assert_eq!(out.amount, dec!(50_000) + dec!(87_500));
    }

    #[test]
    fn test_discounts_need_caller_flags() {
        let resolved = schedule(false, true, IncentiveApplication::BindingTier);
        let out = run(&resolved, dec!(2_400_000), VolumeDiscountEligibility::default());
        assert!(!out.applied);
    }

    #[test]
    fn test_rate_floored_at_zero() {
        let raw = RoyaltySchedule {
            performance_incentives: Some(PerformanceIncentives {
                enabled: true,
                bonus_threshold: dec!(100),
                bonus_reduction: dec!(10),
                application: IncentiveApplication::BindingTier,
            }),
            ..RoyaltySchedule::fixed(dec!(6))
        };
        let resolved = resolve_schedule(&raw).unwrap();
        let out = run(&resolved, dec!(1_000), VolumeDiscountEligibility::default());
        assert_eq!(out.amount, Decimal::ZERO);
        assert_eq!(out.effective_rate_percent, Decimal::ZERO);
        assert_eq!(out.adjusted_binding_rate_percent, Some(Decimal::ZERO));
    }

    #[test]
    fn test_zero_revenue_is_identity() {
        let resolved = schedule(true, true, IncentiveApplication::BindingTier);
        let eligibility = VolumeDiscountEligibility {
            multi_unit_operator: true,
            loyalty_eligible: false,
        };
        let out = run(&resolved, Decimal::ZERO, eligibility);
        assert_eq!(out.amount, Decimal::ZERO);
        assert_eq!(out.effective_rate_percent, Decimal::ZERO);
    }
}
