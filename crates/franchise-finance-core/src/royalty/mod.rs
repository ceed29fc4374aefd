pub mod adjustments;
pub mod calculator;
pub mod marketing;
pub mod schedule;
pub mod simulation;
pub mod tiers;

use rust_decimal::Decimal;

use crate::error::FranchiseFinanceError;
use crate::types::{check_amount, Money};
use crate::FranchiseFinanceResult;

pub(crate) fn validate_revenue(revenue: Money) -> FranchiseFinanceResult<()> {
    if revenue < Decimal::ZERO {
        return Err(FranchiseFinanceError::InvalidInput {
            field: "revenue".into(),
            reason: "Revenue must be non-negative".into(),
        });
    }
    check_amount(revenue, "revenue")
}
