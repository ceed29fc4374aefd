use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FranchiseFinanceError;
use crate::types::*;

/// Franchise sectors with published unit-economics benchmarks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Industry {
    #[serde(alias = "food-beverage")]
    FoodBeverage,
    Retail,
    Services,
    Fitness,
}

/// Typical single-unit economics for an [`Industry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndustryBenchmark {
    pub average_revenue: Money,
    /// Gross margin in percentage points; operating costs are the remainder
    pub gross_margin_percent: Percent,
    pub operating_margin_percent: Percent,
    pub break_even_months: u32,
}

impl Industry {
    pub fn as_str(&self) -> &'static str {
        match self {
            Industry::FoodBeverage => "food_beverage",
            Industry::Retail => "retail",
            Industry::Services => "services",
            Industry::Fitness => "fitness",
        }
    }

    pub fn benchmark(&self) -> IndustryBenchmark {
        let (average_revenue, gross_margin_percent, operating_margin_percent, break_even_months) =
            match self {
                Industry::FoodBeverage => (dec!(2_500_000), dec!(65), dec!(15), 18),
                Industry::Retail => (dec!(1_800_000), dec!(55), dec!(12), 24),
                Industry::Services => (dec!(1_200_000), dec!(75), dec!(25), 12),
                Industry::Fitness => (dec!(800_000), dec!(70), dec!(20), 15),
            };
        IndustryBenchmark {
            average_revenue,
            gross_margin_percent,
            operating_margin_percent,
            break_even_months,
        }
    }
}

impl FromStr for Industry {
    type Err = FranchiseFinanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "food_beverage" | "food-beverage" => Ok(Industry::FoodBeverage),
            "retail" => Ok(Industry::Retail),
            "services" => Ok(Industry::Services),
            "fitness" => Ok(Industry::Fitness),
            other => Err(FranchiseFinanceError::Configuration(format!(
                "Unrecognized industry '{other}' (expected food_beverage, retail, services or fitness)"
            ))),
        }
    }
}

impl fmt::Display for Industry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// City tier of the outlet. Metro sites sell more and cost more.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationTier {
    Tier1,
    #[default]
    Tier2,
    Tier3,
}

impl LocationTier {
    /// `(revenue multiplier, cost multiplier)`
    pub fn multipliers(&self) -> (Decimal, Decimal) {
        match self {
            LocationTier::Tier1 => (dec!(1.3), dec!(1.4)),
            LocationTier::Tier2 => (dec!(1.0), dec!(1.0)),
            LocationTier::Tier3 => (dec!(0.7), dec!(0.8)),
        }
    }
}

impl FromStr for LocationTier {
    type Err = FranchiseFinanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tier1" => Ok(LocationTier::Tier1),
            "tier2" => Ok(LocationTier::Tier2),
            "tier3" => Ok(LocationTier::Tier3),
            other => Err(FranchiseFinanceError::Configuration(format!(
                "Unrecognized location tier '{other}' (expected tier1, tier2 or tier3)"
            ))),
        }
    }
}

/// Benchmark first-year revenue and operating costs for an outlet.
///
/// Revenue is the industry average scaled by the location's revenue
/// multiplier. Costs are the non-gross-margin share of that revenue, scaled by
/// the location's cost multiplier.
pub fn benchmark_base(industry: Industry, location: LocationTier) -> (Money, Money) {
    let bench = industry.benchmark();
    let (revenue_mult, cost_mult) = location.multipliers();
    let revenue = bench.average_revenue * revenue_mult;
    (revenue, benchmark_costs(industry, location, revenue))
}

/// Operating costs implied by `revenue` under the industry's gross margin.
pub fn benchmark_costs(industry: Industry, location: LocationTier, revenue: Money) -> Money {
    let cost_share = Decimal::ONE - industry.benchmark().gross_margin_percent / Decimal::ONE_HUNDRED;
    revenue * cost_share * location.multipliers().1
}
