use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Instant;

use crate::error::FranchiseFinanceError;
use crate::types::*;
use crate::FranchiseFinanceResult;

use super::amortization::calculate_emi;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A lender's offer. Reference data: the engine only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancingOption {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Annual rate in percentage points
    pub interest_rate: Percent,
    pub term_months: u32,
    pub max_amount: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedFinancing {
    pub id: String,
    pub max_amount: Money,
    pub interest_rate: Percent,
    pub term_months: u32,
    /// EMI if the full `max_amount` is drawn
    pub periodic_payment: Money,
    pub total_interest: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancingSummary {
    pub total_financing_available: Money,
    /// Part of the investment not covered by the selected options
    pub self_funding_required: Money,
    pub coverage_percent: Percent,
    pub total_monthly_payment: Money,
    pub options: Vec<SelectedFinancing>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancingInput {
    pub options: Vec<FinancingOption>,
    #[serde(default)]
    pub selected: Vec<String>,
    pub total_investment: Money,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Sum the capacity of the selected options against the investment need.
///
/// Selection order is kept; a repeated id counts once. An id with no matching
/// option is an error rather than a silent zero.
pub fn aggregate_financing(
    options: &[FinancingOption],
    selected: &[String],
    total_investment: Money,
) -> FranchiseFinanceResult<FinancingSummary> {
    if total_investment < Decimal::ZERO {
        return Err(FranchiseFinanceError::InvalidInput {
            field: "total_investment".into(),
            reason: "Total investment must be non-negative".into(),
        });
    }
    check_amount(total_investment, "total_investment")?;

    let mut seen: HashSet<&str> = HashSet::new();
    let mut chosen = Vec::new();
    let mut total_financing_available = Decimal::ZERO;
    let mut total_monthly_payment = Decimal::ZERO;

    for id in selected {
        if !seen.insert(id.as_str()) {
            continue;
        }
        let option = options
            .iter()
            .find(|o| &o.id == id)
            .ok_or_else(|| FranchiseFinanceError::InvalidInput {
                field: "selected".into(),
                reason: format!("No financing option with id '{id}'"),
            })?;
        validate_option(option)?;

        let emi = calculate_emi(option.max_amount, option.interest_rate, option.term_months)?;
        total_financing_available += option.max_amount;
        total_monthly_payment += emi.periodic_payment;
        chosen.push(SelectedFinancing {
            id: option.id.clone(),
            max_amount: option.max_amount,
            interest_rate: option.interest_rate,
            term_months: option.term_months,
            periodic_payment: emi.periodic_payment,
            total_interest: emi.total_interest,
        });
    }

    let self_funding_required = (total_investment - total_financing_available).max(Decimal::ZERO);
    let covered = total_financing_available.min(total_investment);

    tracing::debug!(
        selected = chosen.len(),
        available = %total_financing_available,
        gap = %self_funding_required,
        "financing aggregated"
    );

    Ok(FinancingSummary {
        total_financing_available,
        self_funding_required,
        coverage_percent: percent_of(covered, total_investment),
        total_monthly_payment,
        options: chosen,
    })
}

/// Envelope form of [`aggregate_financing`].
pub fn analyse_financing(
    input: &FinancingInput,
) -> FranchiseFinanceResult<ComputationOutput<FinancingSummary>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let summary = aggregate_financing(&input.options, &input.selected, input.total_investment)?;

    if input.selected.is_empty() {
        warnings.push("No financing options selected; the investment is fully self-funded".into());
    }
    if summary.total_financing_available > input.total_investment {
        warnings.push(format!(
            "Selected financing ({}) exceeds the total investment ({}); monthly payments assume full drawdown",
            summary.total_financing_available, input.total_investment
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Financing capacity vs. investment need, with per-option EMI",
        &serde_json::json!({
            "options_offered": input.options.len(),
            "options_selected": summary.options.len(),
            "total_investment": input.total_investment.to_string(),
            "drawdown": "full max_amount per selected option",
        }),
        warnings,
        elapsed,
        summary,
    ))
}

fn validate_option(option: &FinancingOption) -> FranchiseFinanceResult<()> {
    let field = |name: &str| format!("options[{}].{name}", option.id);
    if option.interest_rate <= Decimal::ZERO {
        return Err(FranchiseFinanceError::InvalidInput {
            field: field("interest_rate"),
            reason: "Interest rate must be greater than zero".into(),
        });
    }
    if option.term_months == 0 {
        return Err(FranchiseFinanceError::InvalidInput {
            field: field("term_months"),
            reason: "Term must be at least one month".into(),
        });
    }
    if option.max_amount <= Decimal::ZERO {
        return Err(FranchiseFinanceError::InvalidInput {
            field: field("max_amount"),
            reason: "Maximum amount must be greater than zero".into(),
        });
    }
    check_amount(option.max_amount, &field("max_amount"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn option(id: &str, rate: Decimal, term: u32, max: Decimal) -> FinancingOption {
        FinancingOption {
            id: id.into(),
            name: None,
            provider: None,
            interest_rate: rate,
            term_months: term,
            max_amount: max,
        }
    }

    fn offers() -> Vec<FinancingOption> {
        vec![
            option("business-loan", dec!(11.5), 84, dec!(5_000_000)),
            option("equipment", dec!(12), 60, dec!(3_000_000)),
            option("working-capital", dec!(13.5), 36, dec!(1_500_000)),
        ]
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_gap_after_selection() {
        let s = aggregate_financing(&offers(), &ids(&["equipment", "working-capital"]), dec!(6_000_000))
            .unwrap();
        assert_eq!(s.total_financing_available, dec!(4_500_000));
        assert_eq!(s.self_funding_required, dec!(1_500_000));
        assert_eq!(s.coverage_percent, dec!(75));
        assert_eq!(s.options.len(), 2);
        assert_eq!(
            s.total_monthly_payment,
            s.options[0].periodic_payment + s.options[1].periodic_payment
        );
    }

    #[test]
    fn test_over_coverage_floors_gap_at_zero() {
        let s = aggregate_financing(&offers(), &ids(&["business-loan"]), dec!(2_000_000)).unwrap();
        assert_eq!(s.self_funding_required, Decimal::ZERO);
        assert_eq!(s.coverage_percent, dec!(100));
    }

    #[test]
    fn test_empty_selection() {
        let s = aggregate_financing(&offers(), &[], dec!(2_000_000)).unwrap();
        assert_eq!(s.total_financing_available, Decimal::ZERO);
        assert_eq!(s.self_funding_required, dec!(2_000_000));
        assert_eq!(s.total_monthly_payment, Decimal::ZERO);
    }

    #[test]
    fn test_repeated_id_counts_once() {
        let s = aggregate_financing(&offers(), &ids(&["equipment", "equipment"]), dec!(1)).unwrap();
        assert_eq!(s.total_financing_available, dec!(3_000_000));
    }

    #[test]
    fn test_unknown_id_rejected() {
        match aggregate_financing(&offers(), &ids(&["nope"]), dec!(1)).unwrap_err() {
            FranchiseFinanceError::InvalidInput { field, .. } => assert_eq!(field, "selected"),
            other => panic!("Expected InvalidInput, got: {other}"),
        }
    }

    #[test]
    fn test_invalid_reference_data_rejected() {
        let bad = vec![option("zero-rate", dec!(0), 12, dec!(1_000))];
        assert!(aggregate_financing(&bad, &ids(&["zero-rate"]), dec!(1)).is_err());
    }

    #[test]
    fn test_envelope_warns_on_empty_selection() {
        let input = FinancingInput {
            options: offers(),
            selected: vec![],
            total_investment: dec!(1_000_000),
        };
        let out = analyse_financing(&input).unwrap();
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_amounts_above_max_rejected() {
        let huge = vec![option("huge", dec!(10), 12, Decimal::MAX)];
        match aggregate_financing(&huge, &ids(&["huge"]), dec!(1)).unwrap_err() {
            FranchiseFinanceError::InvalidInput { field, .. } => {
                assert_eq!(field, "options[huge].max_amount")
            }
            other => panic!("Expected InvalidInput, got: {other}"),
        }
        assert!(aggregate_financing(&offers(), &[], Decimal::MAX).is_err());
    }
}
