use rust_decimal::Decimal;

use crate::types::{no_overflow, Money};
use crate::FranchiseFinanceResult;

use super::schedule::ResolvedMarketingFee;
use super::tiers::apply_brackets;
use super::validate_revenue;

/// Marketing / ad-fund contribution at `revenue`.
///
/// A fixed fee is a flat periodic amount and ignores revenue; a tiered fee
/// runs the same marginal brackets as the royalty.
pub fn calculate_marketing_fee(
    fee: &ResolvedMarketingFee,
    revenue: Money,
) -> FranchiseFinanceResult<Money> {
    validate_revenue(revenue)?;

    Ok(match fee {
        ResolvedMarketingFee::Fixed { amount } => *amount,
        ResolvedMarketingFee::Percentage { percentage } => no_overflow(
            revenue
                .checked_mul(*percentage)
                .map(|v| v / Decimal::ONE_HUNDRED),
            "revenue",
        )?,
        ResolvedMarketingFee::Tiered { tiers } => apply_brackets(tiers, revenue)?.amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::royalty::schedule::{resolve_marketing_fee, MarketingFeeStructure, MarketingFeeType};
    use crate::royalty::tiers::RoyaltyTier;
    use rust_decimal_macros::dec;

    fn fee(fee_type: MarketingFeeType, value: Decimal, tiers: Option<Vec<RoyaltyTier>>) -> ResolvedMarketingFee {
        resolve_marketing_fee(&MarketingFeeStructure {
            fee_type,
            value,
            tiers,
        })
        .unwrap()
    }

    #[test]
    fn test_fixed_ignores_revenue() {
        let fixed = fee(MarketingFeeType::Fixed, dec!(50_000), None);
        assert_eq!(calculate_marketing_fee(&fixed, dec!(0)).unwrap(), dec!(50_000));
        assert_eq!(calculate_marketing_fee(&fixed, dec!(9_000_000)).unwrap(), dec!(50_000));
    }

    #[test]
    fn test_percentage_of_revenue() {
        let pct = fee(MarketingFeeType::Percentage, dec!(2), None);
        assert_eq!(calculate_marketing_fee(&pct, dec!(2_400_000)).unwrap(), dec!(48_000));
        assert_eq!(calculate_marketing_fee(&pct, dec!(0)).unwrap(), dec!(0));
    }

    #[test]
    fn test_tiered_uses_brackets() {
        let tiered = fee(
            MarketingFeeType::Tiered,
            Decimal::ZERO,
            Some(vec![
                RoyaltyTier::new(dec!(0), Some(dec!(500_000)), dec!(3)),
                RoyaltyTier::new(dec!(500_000), None, dec!(1)),
            ]),
        );
        // 500,000 @ 3% + 500,000 @ 1%
        assert_eq!(calculate_marketing_fee(&tiered, dec!(1_000_000)).unwrap(), dec!(20_000));
    }

    #[test]
    fn test_negative_revenue_rejected() {
        let pct = fee(MarketingFeeType::Percentage, dec!(2), None);
        assert!(calculate_marketing_fee(&pct, dec!(-10)).is_err());
    }

    #[test]
    fn test_revenue_above_max_amount_rejected() {
        let pct = fee(MarketingFeeType::Percentage, dec!(2), None);
        assert!(calculate_marketing_fee(&pct, Decimal::MAX).is_err());
    }
}
