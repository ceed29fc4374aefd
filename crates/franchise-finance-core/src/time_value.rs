use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::FranchiseFinanceError;
use crate::types::{Money, Rate};
use crate::FranchiseFinanceResult;

const CONVERGENCE_THRESHOLD: Decimal = dec!(0.0000001);
const MAX_IRR_ITERATIONS: u32 = 100;

/// Net Present Value of a series of period-end cash flows; index 0 is undiscounted.
pub fn npv(rate: Rate, cash_flows: &[Money]) -> FranchiseFinanceResult<Money> {
    if rate <= dec!(-1) {
        return Err(FranchiseFinanceError::InvalidInput {
            field: "rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }

    discounted_sums(rate, cash_flows)
        .map(|(value, _)| value)
        .ok_or_else(|| FranchiseFinanceError::InvalidInput {
            field: "rate".into(),
            reason: format!("Discounting at {rate} exceeds decimal range"),
        })
}

/// Internal Rate of Return using Newton-Raphson.
///
/// The derivative is accumulated alongside the NPV in a single pass using the
/// running discount factor, so no fractional powers are needed. A step whose
/// arithmetic leaves the decimal range ends the search with
/// `ConvergenceFailure`.
pub fn irr(cash_flows: &[Money], guess: Rate) -> FranchiseFinanceResult<Rate> {
    if cash_flows.len() < 2 {
        return Err(FranchiseFinanceError::InvalidInput {
            field: "cash_flows".into(),
            reason: "IRR requires at least 2 cash flows".into(),
        });
    }
    let has_outflow = cash_flows.iter().any(|cf| cf.is_sign_negative() && !cf.is_zero());
    let has_inflow = cash_flows.iter().any(|cf| cf.is_sign_positive() && !cf.is_zero());
    if !has_outflow || !has_inflow {
        return Err(FranchiseFinanceError::InvalidInput {
            field: "cash_flows".into(),
            reason: "IRR requires at least one negative and one positive cash flow".into(),
        });
    }

    let mut rate = guess;
    let mut npv_val = Decimal::ZERO;

    for i in 0..MAX_IRR_ITERATIONS {
        let failure = |last_delta| FranchiseFinanceError::ConvergenceFailure {
            function: "IRR".into(),
            iterations: i,
            last_delta,
        };

        let (value, dnpv) = discounted_sums(rate, cash_flows).ok_or_else(|| failure(npv_val))?;
        npv_val = value;

        if npv_val.abs() < CONVERGENCE_THRESHOLD {
            return Ok(rate);
        }
        if dnpv.is_zero() {
            return Err(failure(npv_val));
        }

        let step = npv_val.checked_div(dnpv).ok_or_else(|| failure(npv_val))?;
        rate = rate.checked_sub(step).ok_or_else(|| failure(npv_val))?;

        // Keep the iterate inside (-99%, 10000%)
        rate = rate.clamp(dec!(-0.99), dec!(100));
    }

    Err(FranchiseFinanceError::ConvergenceFailure {
        function: "IRR".into(),
        iterations: MAX_IRR_ITERATIONS,
        last_delta: npv_val,
    })
}

/// NPV and its derivative with respect to `rate`, or `None` once the running
/// discount factor leaves the decimal range.
fn discounted_sums(rate: Rate, cash_flows: &[Money]) -> Option<(Money, Decimal)> {
    let one_plus_r = Decimal::ONE.checked_add(rate)?;
    let mut discount = Decimal::ONE;
    let mut value = Decimal::ZERO;
    let mut derivative = Decimal::ZERO;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount = discount.checked_mul(one_plus_r)?;
        }
        if discount.is_zero() {
            return None;
        }
        value = value.checked_add(cf.checked_div(discount)?)?;
        if t > 0 {
            let weighted = Decimal::from(t as u64).checked_mul(*cf)?;
            let term = weighted.checked_div(discount.checked_mul(one_plus_r)?)?;
            derivative = derivative.checked_sub(term)?;
        }
    }

    Some((value, derivative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_npv_zero_rate_is_plain_sum() {
        let cfs = vec![dec!(-100), dec!(50), dec!(50), dec!(50)];
        assert_eq!(npv(dec!(0), &cfs).unwrap(), dec!(50));
    }

    #[test]
    fn test_npv_rejects_rate_at_minus_one() {
        assert!(npv(dec!(-1), &[dec!(-1), dec!(2)]).is_err());
    }

    #[test]
    fn test_irr_even_annuity() {
        // -1000, then three years of 400 => ~9.7%
        let cfs = vec![dec!(-1000), dec!(400), dec!(400), dec!(400)];
        let result = irr(&cfs, dec!(0.10)).unwrap();
        assert!((result - dec!(0.097)).abs() < dec!(0.01));
    }

    #[test]
    fn test_irr_requires_sign_change() {
        let cfs = vec![dec!(100), dec!(100)];
        match irr(&cfs, dec!(0.10)).unwrap_err() {
            FranchiseFinanceError::InvalidInput { field, .. } => assert_eq!(field, "cash_flows"),
            other => panic!("Expected InvalidInput, got: {other}"),
        }
    }

    #[test]
    fn test_irr_single_flow_rejected() {
        assert!(irr(&[dec!(-100)], dec!(0.1)).is_err());
    }

    #[test]
    fn test_irr_deep_loss_fails_without_panicking() {
        let mut cfs = vec![dec!(-100_000_000)];
        cfs.extend(std::iter::repeat(dec!(20_000)).take(20));
        match irr(&cfs, dec!(0.10)).unwrap_err() {
            FranchiseFinanceError::ConvergenceFailure { function, .. } => assert_eq!(function, "IRR"),
            other => panic!("Expected ConvergenceFailure, got: {other}"),
        }
    }

    #[test]
    fn test_npv_out_of_range_is_an_error() {
        let mut cfs = vec![dec!(-1)];
        cfs.extend(std::iter::repeat(dec!(1_000_000)).take(40));
        assert!(npv(dec!(-0.99), &cfs).is_err());
    }
}
