use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::FranchiseFinanceError;
use crate::types::*;
use crate::FranchiseFinanceResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A revenue band charged at a single percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoyaltyTier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub min_revenue: Money,
    /// `None` marks the unbounded top tier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_revenue: Option<Money>,
    pub percentage: Percent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RoyaltyTier {
    pub fn new(min_revenue: Money, max_revenue: Option<Money>, percentage: Percent) -> Self {
        RoyaltyTier {
            id: None,
            min_revenue,
            max_revenue,
            percentage,
            description: None,
        }
    }

    /// Portion of `revenue` that falls inside this band.
    pub fn slice_of(&self, revenue: Money) -> Money {
        let top = match self.max_revenue {
            Some(max) => revenue.min(max),
            None => revenue,
        };
        (top - self.min_revenue).max(Decimal::ZERO)
    }
}

/// A tier list that has passed validation and is sorted ascending by
/// `min_revenue`. Only [`resolve_tiers`] constructs one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TierSchedule {
    tiers: Vec<RoyaltyTier>,
}

impl TierSchedule {
    pub fn tiers(&self) -> &[RoyaltyTier] {
        &self.tiers
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Revenue ranges between consecutive tiers that no tier covers.
    pub fn gaps(&self) -> Vec<(Money, Money)> {
        self.tiers
            .windows(2)
            .filter_map(|pair| match pair[0].max_revenue {
                Some(upper) if upper < pair[1].min_revenue => Some((upper, pair[1].min_revenue)),
                _ => None,
            })
            .collect()
    }
}

/// One tier's share of a bracket computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierSlice {
    pub min_revenue: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_revenue: Option<Money>,
    pub percentage: Percent,
    /// Revenue charged inside this tier
    pub taxable_revenue: Money,
    pub contribution: Money,
}

/// Result of running revenue through a tier schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct BracketOutcome {
    pub amount: Money,
    /// Only tiers with a non-zero slice, ascending
    pub slices: Vec<TierSlice>,
    /// Index into the schedule of the highest tier with a non-zero slice
    pub binding_index: Option<usize>,
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Validate a tier list and return it sorted ascending by `min_revenue`.
///
/// Tiers are never merged, clamped or dropped. Gaps between a bounded tier and
/// the next tier are allowed; revenue inside a gap is simply not charged.
pub fn resolve_tiers(tiers: &[RoyaltyTier]) -> FranchiseFinanceResult<TierSchedule> {
    if tiers.is_empty() {
        return Err(FranchiseFinanceError::Configuration(
            "A tier schedule needs at least one tier".into(),
        ));
    }

    let mut unbounded = 0usize;
    for (index, tier) in tiers.iter().enumerate() {
        validate_tier(index, tier)?;
        if tier.max_revenue.is_none() {
            unbounded += 1;
            if unbounded > 1 {
                return Err(FranchiseFinanceError::InvalidTier {
                    index,
                    reason: "Only one tier may have no max_revenue".into(),
                });
            }
        }
    }

    let mut sorted = tiers.to_vec();
    sorted.sort_by(|a, b| a.min_revenue.cmp(&b.min_revenue));

    for (index, pair) in sorted.windows(2).enumerate() {
        let (prev, cur) = (&pair[0], &pair[1]);
        match prev.max_revenue {
            None => {
                return Err(FranchiseFinanceError::OverlappingTiers {
                    index: index + 1,
                    min_revenue: cur.min_revenue,
                    previous_upper: "unbounded".into(),
                });
            }
            Some(upper) if cur.min_revenue < upper => {
                return Err(FranchiseFinanceError::OverlappingTiers {
                    index: index + 1,
                    min_revenue: cur.min_revenue,
                    previous_upper: upper.to_string(),
                });
            }
            Some(_) => {}
        }
    }

    tracing::debug!(tiers = sorted.len(), "tier schedule resolved");
    Ok(TierSchedule { tiers: sorted })
}

fn validate_tier(index: usize, tier: &RoyaltyTier) -> FranchiseFinanceResult<()> {
    if tier.min_revenue < Decimal::ZERO {
        return Err(FranchiseFinanceError::InvalidTier {
            index,
            reason: format!("min_revenue must be non-negative, got {}", tier.min_revenue),
        });
    }
    if tier.percentage < Decimal::ZERO || tier.percentage > Decimal::ONE_HUNDRED {
        return Err(FranchiseFinanceError::InvalidTier {
            index,
            reason: format!("percentage must be between 0 and 100, got {}", tier.percentage),
        });
    }
    if let Some(max) = tier.max_revenue {
        if max <= tier.min_revenue {
            return Err(FranchiseFinanceError::InvalidTier {
                index,
                reason: format!(
                    "max_revenue ({max}) must be greater than min_revenue ({})",
                    tier.min_revenue
                ),
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Marginal brackets
// ---------------------------------------------------------------------------

/// Split `revenue` across the schedule and charge each slice at its own tier's
/// percentage. Callers validate that `revenue` is non-negative; overflow is an
/// `InvalidInput` error on `revenue`.
pub fn apply_brackets(schedule: &TierSchedule, revenue: Money) -> FranchiseFinanceResult<BracketOutcome> {
    let mut amount = Decimal::ZERO;
    let mut slices = Vec::new();
    let mut binding_index = None;

    for (index, tier) in schedule.tiers.iter().enumerate() {
        let taxable = tier.slice_of(revenue);
        if taxable.is_zero() {
            continue;
        }
        let contribution = no_overflow(
            taxable
                .checked_mul(tier.percentage)
                .map(|v| v / Decimal::ONE_HUNDRED),
            "revenue",
        )?;
        amount = no_overflow(amount.checked_add(contribution), "revenue")?;
        binding_index = Some(index);
        slices.push(TierSlice {
            min_revenue: tier.min_revenue,
            max_revenue: tier.max_revenue,
            percentage: tier.percentage,
            taxable_revenue: taxable,
            contribution,
        });
    }

    Ok(BracketOutcome {
        amount,
        slices,
        binding_index,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
