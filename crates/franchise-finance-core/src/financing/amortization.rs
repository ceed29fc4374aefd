use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FranchiseFinanceError;
use crate::types::*;
use crate::FranchiseFinanceResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Longest loan accepted: 100 years of monthly payments.
pub const MAX_TERM_MONTHS: u32 = 1200;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanInput {
    pub principal: Money,
    /// Annual rate in percentage points (12 = 12%)
    pub annual_rate_percent: Percent,
    pub term_months: u32,
    /// Include the month-by-month table
    #[serde(default)]
    pub include_schedule: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationResult {
    /// Equated monthly instalment
    pub periodic_payment: Money,
    pub total_payment: Money,
    pub total_interest: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    pub month: u32,
    pub opening_balance: Money,
    pub payment: Money,
    pub interest: Money,
    pub principal: Money,
    pub closing_balance: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanOutput {
    pub principal: Money,
    pub annual_rate_percent: Percent,
    pub term_months: u32,
    pub periodic_payment: Money,
    pub total_payment: Money,
    pub total_interest: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Vec<AmortizationRow>>,
}

// ---------------------------------------------------------------------------
// EMI
// ---------------------------------------------------------------------------

/// Equated monthly payment that fully amortizes `principal` over `term_months`.
///
/// `payment = P·r·(1+r)^n / ((1+r)^n − 1)` with `r` the monthly rate; a zero
/// rate splits the principal evenly.
pub fn calculate_emi(
    principal: Money,
    annual_rate_percent: Percent,
    term_months: u32,
) -> FranchiseFinanceResult<AmortizationResult> {
    validate_loan(principal, annual_rate_percent, term_months)?;

    let n = Decimal::from(term_months);
    let r = monthly_rate(annual_rate_percent);

    let periodic_payment = if r.is_zero() {
        principal / n
    } else {
        let growth = (Decimal::ONE + r)
            .checked_powu(term_months as u64)
            .ok_or_else(|| out_of_range("term_months", annual_rate_percent, term_months))?;
        let denominator = growth - Decimal::ONE;
        if denominator.is_zero() {
            // Rate too small to register over the term at decimal precision
            principal / n
        } else {
            principal
                .checked_mul(r)
                .and_then(|v| v.checked_mul(growth))
                .and_then(|v| v.checked_div(denominator))
                .ok_or_else(|| out_of_range("principal", annual_rate_percent, term_months))?
        }
    };

    let total_payment = periodic_payment
        .checked_mul(n)
        .ok_or_else(|| out_of_range("principal", annual_rate_percent, term_months))?;
    Ok(AmortizationResult {
        periodic_payment,
        total_payment,
        total_interest: total_payment - principal,
    })
}

/// Month-by-month schedule for a level-payment loan.
///
/// Interest is charged on the opening balance each month. The last row pays
/// whatever balance remains, so the loan always closes at exactly zero.
pub fn build_amortization_schedule(
    principal: Money,
    annual_rate_percent: Percent,
    term_months: u32,
) -> FranchiseFinanceResult<Vec<AmortizationRow>> {
    let emi = calculate_emi(principal, annual_rate_percent, term_months)?;
    let r = monthly_rate(annual_rate_percent);

    let mut rows = Vec::with_capacity(term_months as usize);
    let mut balance = principal;

    for month in 1..=term_months {
        let opening = balance;
        let interest = opening
            .checked_mul(r)
            .ok_or_else(|| out_of_range("principal", annual_rate_percent, term_months))?;
        let principal_part = if month == term_months {
            opening
        } else {
            (emi.periodic_payment - interest).min(opening)
        };
        balance = opening - principal_part;
        rows.push(AmortizationRow {
            month,
            opening_balance: opening,
            payment: principal_part + interest,
            interest,
            principal: principal_part,
            closing_balance: balance,
        });
    }

    Ok(rows)
}

/// Envelope form covering an ad hoc loan query.
pub fn analyse_loan(input: &LoanInput) -> FranchiseFinanceResult<ComputationOutput<LoanOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let emi = calculate_emi(input.principal, input.annual_rate_percent, input.term_months)?;
    let schedule = if input.include_schedule {
        Some(build_amortization_schedule(
            input.principal,
            input.annual_rate_percent,
            input.term_months,
        )?)
    } else {
        None
    };

    if input.annual_rate_percent > dec!(36) {
        warnings.push(format!(
            "Annual rate of {}% is unusually high for franchise financing",
            input.annual_rate_percent
        ));
    }
    if emi.total_interest > input.principal {
        warnings.push("Total interest exceeds the principal borrowed".into());
    }

    let output = LoanOutput {
        principal: input.principal,
        annual_rate_percent: input.annual_rate_percent,
        term_months: input.term_months,
        periodic_payment: emi.periodic_payment,
        total_payment: emi.total_payment,
        total_interest: emi.total_interest,
        schedule,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Level-payment loan amortization (EMI)",
        &serde_json::json!({
            "principal": input.principal.to_string(),
            "annual_rate_percent": input.annual_rate_percent.to_string(),
            "term_months": input.term_months,
            "compounding": "monthly",
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn monthly_rate(annual_rate_percent: Percent) -> Decimal {
    annual_rate_percent / Decimal::ONE_HUNDRED / MONTHS_PER_YEAR
}

fn out_of_range(field: &str, annual_rate_percent: Percent, term_months: u32) -> FranchiseFinanceError {
    FranchiseFinanceError::InvalidLoanParameters {
        field: field.into(),
        reason: format!(
            "Compounding {annual_rate_percent}% over {term_months} months exceeds decimal range"
        ),
    }
}

fn validate_loan(
    principal: Money,
    annual_rate_percent: Percent,
    term_months: u32,
) -> FranchiseFinanceResult<()> {
    if principal <= Decimal::ZERO {
        return Err(FranchiseFinanceError::InvalidLoanParameters {
            field: "principal".into(),
            reason: "Principal must be greater than zero".into(),
        });
    }
    if principal > MAX_AMOUNT {
        return Err(FranchiseFinanceError::InvalidLoanParameters {
            field: "principal".into(),
            reason: format!("Principal must not exceed {MAX_AMOUNT}"),
        });
    }
    if term_months == 0 || term_months > MAX_TERM_MONTHS {
        return Err(FranchiseFinanceError::InvalidLoanParameters {
            field: "term_months".into(),
            reason: format!("Term must be between 1 and {MAX_TERM_MONTHS} months"),
        });
    }
    if annual_rate_percent < Decimal::ZERO {
        return Err(FranchiseFinanceError::InvalidLoanParameters {
            field: "annual_rate_percent".into(),
            reason: "Interest rate must be non-negative".into(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
