use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;

use franchise_finance_core::financing::amortization::{self, LoanInput};
use franchise_finance_core::financing::options::{self, FinancingInput};
use franchise_finance_core::investment::aggregation::{self, InvestmentInput};
use franchise_finance_core::projection::roi::{self, RoiInput};
use franchise_finance_core::royalty::adjustments::{self, VolumeDiscountEligibility};
use franchise_finance_core::royalty::calculator;
use franchise_finance_core::royalty::schedule::{self, RoyaltySchedule};
use franchise_finance_core::royalty::simulation::{self, FeeSimulationInput};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse_decimal(field: &str, raw: &str) -> NapiResult<Decimal> {
    raw.trim()
        .parse::<Decimal>()
        .map_err(|e| to_napi_error(format!("{field}: {e}")))
}

// ---------------------------------------------------------------------------
// Royalty
// ---------------------------------------------------------------------------

/// Validate a schedule and return its resolved form.
#[napi]
pub fn resolve_schedule(schedule_json: String) -> NapiResult<String> {
    let input: RoyaltySchedule = serde_json::from_str(&schedule_json).map_err(to_napi_error)?;
    let resolved = schedule::resolve_schedule(&input).map_err(to_napi_error)?;
    serde_json::to_string(&resolved).map_err(to_napi_error)
}

/// Base royalty and adjusted royalty for one revenue figure.
#[napi]
pub fn calculate_royalty(
    schedule_json: String,
    revenue: String,
    eligibility_json: Option<String>,
) -> NapiResult<String> {
    let input: RoyaltySchedule = serde_json::from_str(&schedule_json).map_err(to_napi_error)?;
    let eligibility: VolumeDiscountEligibility = match eligibility_json {
        Some(json) => serde_json::from_str(&json).map_err(to_napi_error)?,
        None => VolumeDiscountEligibility::default(),
    };
    let revenue = parse_decimal("revenue", &revenue)?;

    let resolved = schedule::resolve_schedule(&input).map_err(to_napi_error)?;
    let base = calculator::calculate_royalty(&resolved, revenue).map_err(to_napi_error)?;
    let adjusted = adjustments::apply_adjustments(&resolved, &base, revenue, &eligibility)
        .map_err(to_napi_error)?;
    serde_json::to_string(&serde_json::json!({
        "royalty": base,
        "adjusted": adjusted,
    }))
    .map_err(to_napi_error)
}

#[napi]
pub fn simulate_fees(input_json: String) -> NapiResult<String> {
    let input: FeeSimulationInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = simulation::simulate_fees(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Investment
// ---------------------------------------------------------------------------

#[napi]
pub fn aggregate_investment(input_json: String) -> NapiResult<String> {
    let input: InvestmentInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = aggregation::analyse_investment(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Financing
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_emi(input_json: String) -> NapiResult<String> {
    let input: LoanInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = amortization::analyse_loan(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn aggregate_financing(input_json: String) -> NapiResult<String> {
    let input: FinancingInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = options::analyse_financing(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

#[napi]
pub fn project_roi(input_json: String) -> NapiResult<String> {
    let input: RoiInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = roi::project_roi(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
