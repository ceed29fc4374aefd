use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FranchiseFinanceError;
use crate::types::*;
use crate::FranchiseFinanceResult;

use super::tiers::{resolve_tiers, RoyaltyTier, TierSchedule};

// ---------------------------------------------------------------------------
// Schedule and fee types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RoyaltyType {
    /// One flat percentage of revenue
    Fixed,
    /// Marginal brackets
    Tiered,
    /// Marginal brackets with performance incentives on top
    PerformanceBased,
}

impl RoyaltyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoyaltyType::Fixed => "fixed",
            RoyaltyType::Tiered => "tiered",
            RoyaltyType::PerformanceBased => "performance_based",
        }
    }
}

impl FromStr for RoyaltyType {
    type Err = FranchiseFinanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fixed" => Ok(RoyaltyType::Fixed),
            "tiered" => Ok(RoyaltyType::Tiered),
            "performance_based" => Ok(RoyaltyType::PerformanceBased),
            other => Err(FranchiseFinanceError::Configuration(format!(
                "Unrecognized royalty schedule type '{other}' (expected fixed, tiered or performance_based)"
            ))),
        }
    }
}

impl TryFrom<String> for RoyaltyType {
    type Error = FranchiseFinanceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RoyaltyType> for String {
    fn from(value: RoyaltyType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for RoyaltyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MarketingFeeType {
    /// Flat periodic amount
    Fixed,
    /// Percentage of revenue
    Percentage,
    /// Marginal brackets over revenue
    Tiered,
}

impl MarketingFeeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketingFeeType::Fixed => "fixed",
            MarketingFeeType::Percentage => "percentage",
            MarketingFeeType::Tiered => "tiered",
        }
    }
}

impl FromStr for MarketingFeeType {
    type Err = FranchiseFinanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fixed" => Ok(MarketingFeeType::Fixed),
            "percentage" => Ok(MarketingFeeType::Percentage),
            "tiered" => Ok(MarketingFeeType::Tiered),
            other => Err(FranchiseFinanceError::Configuration(format!(
                "Unrecognized marketing fee type '{other}' (expected fixed, percentage or tiered)"
            ))),
        }
    }
}

impl TryFrom<String> for MarketingFeeType {
    type Error = FranchiseFinanceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MarketingFeeType> for String {
    fn from(value: MarketingFeeType) -> Self {
        value.as_str().to_string()
    }
}

/// How much of the binding tier the performance incentive covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncentiveApplication {
    /// The whole binding-tier slice once revenue clears the threshold
    #[default]
    BindingTier,
    /// Only the part of the binding-tier slice above the threshold
    AboveThreshold,
}

// ---------------------------------------------------------------------------
// Wire-form schedule
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketingFeeStructure {
    #[serde(rename = "type")]
    pub fee_type: MarketingFeeType,
    /// Flat amount for `fixed`, percentage points for `percentage`; ignored for `tiered`
    pub value: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiers: Option<Vec<RoyaltyTier>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceIncentives {
    pub enabled: bool,
    /// Revenue the franchisee must exceed before the reduction applies
    pub bonus_threshold: Money,
    /// Percentage points taken off the binding tier's rate
    pub bonus_reduction: Percent,
    #[serde(default)]
    pub application: IncentiveApplication,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeDiscounts {
    pub enabled: bool,
    /// Percentage points off for multi-unit operators
    pub multi_unit_discount: Percent,
    /// Percentage points off for loyalty-eligible tenure
    pub loyalty_discount: Percent,
}

/// A royalty schedule as the caller edits and ships it. Resolve it with
/// [`resolve_schedule`] before computing anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoyaltySchedule {
    #[serde(rename = "type")]
    pub schedule_type: RoyaltyType,
    pub base_tiers: Vec<RoyaltyTier>,
    pub marketing_fee: MarketingFeeStructure,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance_incentives: Option<PerformanceIncentives>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_discounts: Option<VolumeDiscounts>,
}

impl Default for RoyaltySchedule {
    /// 6% flat royalty with a 2% marketing fund; incentives and discounts off.
    fn default() -> Self {
        RoyaltySchedule {
            schedule_type: RoyaltyType::Fixed,
            base_tiers: vec![RoyaltyTier {
                id: Some("base".into()),
                min_revenue: Decimal::ZERO,
                max_revenue: None,
                percentage: dec!(6),
                description: Some("Standard royalty rate".into()),
            }],
            marketing_fee: MarketingFeeStructure {
                fee_type: MarketingFeeType::Percentage,
                value: dec!(2),
                tiers: None,
            },
            performance_incentives: Some(PerformanceIncentives {
                enabled: false,
                bonus_threshold: dec!(5_000_000),
                bonus_reduction: dec!(1),
                application: IncentiveApplication::BindingTier,
            }),
            volume_discounts: Some(VolumeDiscounts {
                enabled: false,
                multi_unit_discount: dec!(0.5),
                loyalty_discount: dec!(0.25),
            }),
        }
    }
}

impl RoyaltySchedule {
    /// Single-tier flat schedule at `percentage` with the default marketing fee.
    pub fn fixed(percentage: Percent) -> Self {
        let mut schedule = RoyaltySchedule::default();
        schedule.base_tiers[0].percentage = percentage;
        schedule
    }
}

// ---------------------------------------------------------------------------
// Resolved schedule
// ---------------------------------------------------------------------------

/// Marketing fee after validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResolvedMarketingFee {
    Fixed { amount: Money },
    Percentage { percentage: Percent },
    Tiered { tiers: TierSchedule },
}

/// A schedule that has passed every validation rule. Calculators accept only
/// this form, so they never re-check tier shapes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedSchedule {
    schedule_type: RoyaltyType,
    tiers: TierSchedule,
    marketing_fee: ResolvedMarketingFee,
    #[serde(skip_serializing_if = "Option::is_none")]
    performance_incentives: Option<PerformanceIncentives>,
    #[serde(skip_serializing_if = "Option::is_none")]
    volume_discounts: Option<VolumeDiscounts>,
}

impl ResolvedSchedule {
    pub fn schedule_type(&self) -> RoyaltyType {
        self.schedule_type
    }

    pub fn tiers(&self) -> &TierSchedule {
        &self.tiers
    }

    pub fn marketing_fee(&self) -> &ResolvedMarketingFee {
        &self.marketing_fee
    }

    pub fn performance_incentives(&self) -> Option<&PerformanceIncentives> {
        self.performance_incentives.as_ref()
    }

    pub fn volume_discounts(&self) -> Option<&VolumeDiscounts> {
        self.volume_discounts.as_ref()
    }

    pub fn incentives_enabled(&self) -> bool {
        self.performance_incentives
            .as_ref()
            .is_some_and(|p| p.enabled)
    }

    pub fn discounts_enabled(&self) -> bool {
        self.volume_discounts.as_ref().is_some_and(|v| v.enabled)
    }
}

/// Validate a schedule once and produce the trusted form.
pub fn resolve_schedule(schedule: &RoyaltySchedule) -> FranchiseFinanceResult<ResolvedSchedule> {
    let tiers = resolve_tiers(&schedule.base_tiers)?;

    if schedule.schedule_type == RoyaltyType::Fixed {
        let single = tiers.tiers();
        let zero_based =
            single.len() == 1 && single[0].min_revenue.is_zero() && single[0].max_revenue.is_none();
        if !zero_based {
            return Err(FranchiseFinanceError::Configuration(format!(
                "A fixed schedule needs exactly one tier starting at 0 with no max_revenue, got {} tier(s)",
                single.len()
            )));
        }
    }

    let marketing_fee = resolve_marketing_fee(&schedule.marketing_fee)?;

    if let Some(incentives) = &schedule.performance_incentives {
        if incentives.bonus_threshold <= Decimal::ZERO {
            return Err(FranchiseFinanceError::InvalidInput {
                field: "performance_incentives.bonus_threshold".into(),
                reason: "Bonus threshold must be greater than zero".into(),
            });
        }
        check_points(
            "performance_incentives.bonus_reduction",
            incentives.bonus_reduction,
        )?;
    }

    if let Some(discounts) = &schedule.volume_discounts {
        check_points(
            "volume_discounts.multi_unit_discount",
            discounts.multi_unit_discount,
        )?;
        check_points("volume_discounts.loyalty_discount", discounts.loyalty_discount)?;
    }

    tracing::debug!(
        schedule_type = %schedule.schedule_type,
        tiers = tiers.len(),
        "royalty schedule resolved"
    );

    Ok(ResolvedSchedule {
        schedule_type: schedule.schedule_type,
        tiers,
        marketing_fee,
        performance_incentives: schedule.performance_incentives.clone(),
        volume_discounts: schedule.volume_discounts.clone(),
    })
}

/// Validate a marketing fee definition on its own.
pub fn resolve_marketing_fee(
    fee: &MarketingFeeStructure,
) -> FranchiseFinanceResult<ResolvedMarketingFee> {
    if fee.value < Decimal::ZERO {
        return Err(FranchiseFinanceError::InvalidInput {
            field: "marketing_fee.value".into(),
            reason: "Marketing fee value must be non-negative".into(),
        });
    }
    check_amount(fee.value, "marketing_fee.value")?;

    match fee.fee_type {
        MarketingFeeType::Fixed => Ok(ResolvedMarketingFee::Fixed { amount: fee.value }),
        MarketingFeeType::Percentage => {
            check_points("marketing_fee.value", fee.value)?;
            Ok(ResolvedMarketingFee::Percentage {
                percentage: fee.value,
            })
        }
        MarketingFeeType::Tiered => match fee.tiers.as_deref() {
            Some(tiers) if !tiers.is_empty() => Ok(ResolvedMarketingFee::Tiered {
                tiers: resolve_tiers(tiers)?,
            }),
            _ => Err(FranchiseFinanceError::Configuration(
                "A tiered marketing fee needs a non-empty tiers list".into(),
            )),
        },
    }
}

fn check_points(field: &str, value: Percent) -> FranchiseFinanceResult<()> {
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err(FranchiseFinanceError::InvalidInput {
            field: field.into(),
            reason: format!("Must be between 0 and 100 percentage points, got {value}"),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
