use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::FranchiseFinanceError;
use crate::FranchiseFinanceResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Percentage points (6 = 6%). Royalty, fee and loan rates travel in this form.
pub type Percent = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Only the time-value helpers use these.
pub type Rate = Decimal;

/// Largest revenue, principal or line amount accepted (10^20). Keeps every
/// product with a percentage well inside the 96-bit decimal range.
pub const MAX_AMOUNT: Money = dec!(100_000_000_000_000_000_000);

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Wrap a computed result in the standard envelope.
///
/// Warnings are echoed to the `tracing` subscriber so a CLI run with logging
/// enabled surfaces them even when the envelope itself is discarded.
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    for w in &warnings {
        tracing::warn!(methodology, "{w}");
    }
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

/// `part / whole * 100`, or zero when `whole` is zero.
pub fn percent_of(part: Money, whole: Money) -> Percent {
    if whole.is_zero() {
        Decimal::ZERO
    } else {
        part / whole * Decimal::ONE_HUNDRED
    }
}

/// Turn an overflowed `checked_*` result into `InvalidInput` on `field`.
pub(crate) fn no_overflow(value: Option<Decimal>, field: &str) -> FranchiseFinanceResult<Decimal> {
    value.ok_or_else(|| FranchiseFinanceError::InvalidInput {
        field: field.into(),
        reason: "Result exceeds the supported decimal range".into(),
    })
}

/// Reject amounts above [`MAX_AMOUNT`].
pub(crate) fn check_amount(value: Money, field: &str) -> FranchiseFinanceResult<()> {
    if value > MAX_AMOUNT {
        return Err(FranchiseFinanceError::InvalidInput {
            field: field.into(),
            reason: format!("Must not exceed {MAX_AMOUNT}"),
        });
    }
    Ok(())
}
