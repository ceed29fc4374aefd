use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FranchiseFinanceError;
use crate::royalty::adjustments::{apply_adjustments, VolumeDiscountEligibility};
use crate::royalty::calculator::calculate_royalty;
use crate::royalty::marketing::calculate_marketing_fee;
use crate::royalty::schedule::{resolve_schedule, ResolvedSchedule, RoyaltySchedule};
use crate::types::*;
use crate::FranchiseFinanceResult;

use super::benchmarks::{benchmark_base, benchmark_costs, Industry, LocationTier};

const MAX_PROJECTION_YEARS: u32 = 30;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiScenario {
    pub name: String,
    pub probability_percent: Percent,
    /// Scales the base revenue
    pub revenue_multiplier: Decimal,
    /// Scales the base operating costs
    pub cost_multiplier: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoiInput {
    pub total_investment: Money,
    /// First-year revenue before scenario multipliers. Falls back to the
    /// industry benchmark when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_revenue: Option<Money>,
    /// First-year operating costs, excluding royalty and marketing fees. Falls
    /// back to the industry's cost share of the base revenue when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_operating_costs: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<Industry>,
    #[serde(default)]
    pub location_tier: LocationTier,
    #[serde(default)]
    pub schedule: RoyaltySchedule,
    #[serde(default = "default_years")]
    pub years: u32,
    #[serde(default = "default_growth_rate")]
    pub growth_rate_percent: Percent,
    #[serde(default)]
    pub eligibility: VolumeDiscountEligibility,
    #[serde(default = "default_scenarios")]
    pub scenarios: Vec<RoiScenario>,
    /// Hurdle rate for the scenario NPV; no NPV is reported without one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_rate_percent: Option<Percent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiYear {
    pub year: u32,
    pub revenue: Money,
    pub operating_costs: Money,
    pub royalty: Money,
    pub marketing_fee: Money,
    pub total_expenses: Money,
    pub net_income: Money,
    pub cumulative_net_income: Money,
    /// (cumulative net income − investment) / investment × 100
    pub cumulative_roi_percent: Percent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioProjection {
    pub name: String,
    pub probability_percent: Percent,
    pub years: Vec<RoiYear>,
    pub final_roi_percent: Percent,
    pub break_even_year: Option<u32>,
    /// Mid-year estimate of the break-even month
    pub break_even_month: Option<u32>,
    pub irr_percent: Option<Percent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub npv: Option<Money>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiOutput {
    pub scenarios: Vec<ScenarioProjection>,
    /// Probability-weighted final cumulative ROI
    pub expected_final_roi_percent: Percent,
}

fn default_years() -> u32 {
    5
}

fn default_growth_rate() -> Percent {
    dec!(8)
}

/// Conservative / realistic / optimistic at 30 / 50 / 20 percent.
pub fn default_scenarios() -> Vec<RoiScenario> {
    vec![
        RoiScenario {
            name: "Conservative".into(),
            probability_percent: dec!(30),
            revenue_multiplier: dec!(0.8),
            cost_multiplier: dec!(1.1),
        },
        RoiScenario {
            name: "Realistic".into(),
            probability_percent: dec!(50),
            revenue_multiplier: dec!(1.0),
            cost_multiplier: dec!(1.0),
        },
        RoiScenario {
            name: "Optimistic".into(),
            probability_percent: dec!(20),
            revenue_multiplier: dec!(1.2),
            cost_multiplier: dec!(0.9),
        },
    ]
}

// ---------------------------------------------------------------------------
// Main calculation
// ---------------------------------------------------------------------------

/// Project franchise returns year by year under each scenario.
///
/// Royalty and marketing fees are charged through the resolved schedule at
/// each year's revenue, so tiered schedules and incentives flow into the
/// projection.
pub fn project_roi(input: &RoiInput) -> FranchiseFinanceResult<ComputationOutput<RoiOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let (base_revenue, base_costs) = resolve_base(input)?;
    validate_input(input, base_revenue, base_costs)?;
    let resolved = resolve_schedule(&input.schedule)?;
    let benchmark_months = input.industry.map(|i| i.benchmark().break_even_months);

    let mut scenarios = Vec::with_capacity(input.scenarios.len());
    let mut expected_final_roi_percent = Decimal::ZERO;

    for scenario in &input.scenarios {
        let projection =
            project_scenario(input, base_revenue, base_costs, &resolved, scenario, &mut warnings)?;
        expected_final_roi_percent = no_overflow(
            projection
                .final_roi_percent
                .checked_mul(scenario.probability_percent)
                .map(|v| v / Decimal::ONE_HUNDRED)
                .and_then(|v| expected_final_roi_percent.checked_add(v)),
            "scenarios",
        )?;
        match (projection.break_even_month, benchmark_months) {
            (None, _) => warnings.push(format!(
                "{} scenario does not break even within {} years",
                scenario.name, input.years
            )),
            (Some(month), Some(bench)) if month > bench => warnings.push(format!(
                "{} scenario breaks even around month {month}, later than the {}-month industry benchmark",
                scenario.name, bench
            )),
            _ => {}
        }
        scenarios.push(projection);
    }

    let output = RoiOutput {
        scenarios,
        expected_final_roi_percent,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Franchise ROI projection: scenario revenue growth net of operating costs, royalty and marketing fees",
        &serde_json::json!({
            "total_investment": input.total_investment.to_string(),
            "base_revenue": base_revenue.to_string(),
            "base_operating_costs": base_costs.to_string(),
            "industry": input.industry.map(|i| i.as_str()),
            "location_tier": input.location_tier,
            "years": input.years,
            "growth_rate_percent": input.growth_rate_percent.to_string(),
            "schedule_type": resolved.schedule_type().as_str(),
            "break_even_month": "year * 12 - 6",
            "discount_rate_percent": input.discount_rate_percent.map(|r| r.to_string()),
        }),
        warnings,
        elapsed,
        output,
    ))
}

fn project_scenario(
    input: &RoiInput,
    base_revenue: Money,
    base_costs: Money,
    resolved: &ResolvedSchedule,
    scenario: &RoiScenario,
    warnings: &mut Vec<String>,
) -> FranchiseFinanceResult<ScenarioProjection> {
    let growth = Decimal::ONE + input.growth_rate_percent / Decimal::ONE_HUNDRED;
    let scenario_field = format!("scenarios[{}]", scenario.name);
    let base_revenue = no_overflow(
        base_revenue.checked_mul(scenario.revenue_multiplier),
        &scenario_field,
    )?;
    let base_costs = no_overflow(base_costs.checked_mul(scenario.cost_multiplier), &scenario_field)?;

    let mut years = Vec::with_capacity(input.years as usize);
    let mut cash_flows = Vec::with_capacity(input.years as usize + 1);
    cash_flows.push(-input.total_investment);
    let mut cumulative = Decimal::ZERO;
    let mut break_even_year = None;

    for year in 1..=input.years {
        let compounded = growth.checked_powu(u64::from(year - 1)).and_then(|factor| {
            Some((
                base_revenue.checked_mul(factor)?,
                base_costs.checked_mul(factor)?,
            ))
        });
        let (revenue, operating_costs) =
            compounded.ok_or_else(|| FranchiseFinanceError::InvalidInput {
                field: "growth_rate_percent".into(),
                reason: format!("Growth compounding overflows by year {year}"),
            })?;

        let base_royalty = calculate_royalty(resolved, revenue)?;
        let royalty =
            apply_adjustments(resolved, &base_royalty, revenue, &input.eligibility)?.amount;
        let marketing_fee = calculate_marketing_fee(resolved.marketing_fee(), revenue)?;

        let total_expenses = no_overflow(
            operating_costs
                .checked_add(royalty)
                .and_then(|v| v.checked_add(marketing_fee)),
            "base_operating_costs",
        )?;
        let net_income = revenue - total_expenses;
        cumulative = no_overflow(cumulative.checked_add(net_income), "years")?;
        let cumulative_roi_percent = no_overflow(
            (cumulative - input.total_investment)
                .checked_div(input.total_investment)
                .and_then(|v| v.checked_mul(Decimal::ONE_HUNDRED)),
            "total_investment",
        )?;

        if break_even_year.is_none() && cumulative_roi_percent > Decimal::ZERO {
            break_even_year = Some(year);
        }

        cash_flows.push(net_income);
        years.push(RoiYear {
            year,
            revenue,
            operating_costs,
            royalty,
            marketing_fee,
            total_expenses,
            net_income,
            cumulative_net_income: cumulative,
            cumulative_roi_percent,
        });
    }

    let irr_percent = match crate::time_value::irr(&cash_flows, dec!(0.10)) {
        Ok(r) => Some(r * Decimal::ONE_HUNDRED),
        Err(e) => {
            warnings.push(format!("{} scenario IRR unavailable: {e}", scenario.name));
            None
        }
    };

    let npv = input
        .discount_rate_percent
        .map(|rate| crate::time_value::npv(rate / Decimal::ONE_HUNDRED, &cash_flows))
        .transpose()?;

    Ok(ScenarioProjection {
        name: scenario.name.clone(),
        probability_percent: scenario.probability_percent,
        final_roi_percent: years
            .last()
            .map(|y| y.cumulative_roi_percent)
            .unwrap_or_default(),
        years,
        break_even_year,
        break_even_month: break_even_year.map(|y| y * 12 - 6),
        irr_percent,
        npv,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Explicit base figures win; missing ones come from the industry benchmark.
fn resolve_base(input: &RoiInput) -> FranchiseFinanceResult<(Money, Money)> {
    let missing = |field: &str| FranchiseFinanceError::InvalidInput {
        field: field.into(),
        reason: "Required when no industry is given".into(),
    };
    match (input.base_revenue, input.base_operating_costs, input.industry) {
        (Some(revenue), Some(costs), _) => Ok((revenue, costs)),
        (None, costs, Some(industry)) => {
            let (revenue, bench_costs) = benchmark_base(industry, input.location_tier);
            Ok((revenue, costs.unwrap_or(bench_costs)))
        }
        (Some(revenue), None, Some(industry)) => {
            check_amount(revenue, "base_revenue")?;
            Ok((revenue, benchmark_costs(industry, input.location_tier, revenue)))
        }
        (None, _, None) => Err(missing("base_revenue")),
        (Some(_), None, None) => Err(missing("base_operating_costs")),
    }
}

fn validate_input(
    input: &RoiInput,
    base_revenue: Money,
    base_costs: Money,
) -> FranchiseFinanceResult<()> {
    if input.total_investment <= Decimal::ZERO {
        return Err(FranchiseFinanceError::InvalidInput {
            field: "total_investment".into(),
            reason: "Total investment must be greater than zero".into(),
        });
    }
    check_amount(input.total_investment, "total_investment")?;
    check_amount(base_revenue, "base_revenue")?;
    check_amount(base_costs, "base_operating_costs")?;
    if base_revenue < Decimal::ZERO {
        return Err(FranchiseFinanceError::InvalidInput {
            field: "base_revenue".into(),
            reason: "Base revenue must be non-negative".into(),
        });
    }
    if base_costs < Decimal::ZERO {
        return Err(FranchiseFinanceError::InvalidInput {
            field: "base_operating_costs".into(),
            reason: "Base operating costs must be non-negative".into(),
        });
    }
    if input.years == 0 || input.years > MAX_PROJECTION_YEARS {
        return Err(FranchiseFinanceError::InvalidInput {
            field: "years".into(),
            reason: format!("Projection horizon must be between 1 and {MAX_PROJECTION_YEARS} years"),
        });
    }
    if input.growth_rate_percent <= dec!(-100) {
        return Err(FranchiseFinanceError::InvalidInput {
            field: "growth_rate_percent".into(),
            reason: "Growth rate must be greater than -100%".into(),
        });
    }
    if input.scenarios.is_empty() {
        return Err(FranchiseFinanceError::InvalidInput {
            field: "scenarios".into(),
            reason: "At least one scenario is required".into(),
        });
    }

    let mut probability_sum = Decimal::ZERO;
    for (i, s) in input.scenarios.iter().enumerate() {
        if s.probability_percent < Decimal::ZERO || s.probability_percent > Decimal::ONE_HUNDRED {
            return Err(FranchiseFinanceError::InvalidInput {
                field: format!("scenarios[{i}].probability_percent"),
                reason: "Probability must be between 0 and 100".into(),
            });
        }
        if s.revenue_multiplier < Decimal::ZERO || s.cost_multiplier < Decimal::ZERO {
            return Err(FranchiseFinanceError::InvalidInput {
                field: format!("scenarios[{i}]"),
                reason: "Scenario multipliers must be non-negative".into(),
            });
        }
        probability_sum += s.probability_percent;
    }
    if probability_sum != Decimal::ONE_HUNDRED {
        return Err(FranchiseFinanceError::InvalidInput {
            field: "scenarios".into(),
            reason: format!("Scenario probabilities must sum to 100, got {probability_sum}"),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
