use franchise_finance_core::financing::amortization::*;
use franchise_finance_core::financing::options::*;
use franchise_finance_core::FranchiseFinanceError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// EMI
// ===========================================================================

#[test]
fn test_emi_formula() {
    let result = calculate_emi(dec!(500_000), dec!(12), 12).unwrap();
    assert!(
        (result.periodic_payment - dec!(44_424)).abs() <= dec!(1),
        "Expected EMI ~44,424, got {}",
        result.periodic_payment
    );
}

#[test]
fn test_emi_zero_rate() {
    let result = calculate_emi(dec!(120_000), Decimal::ZERO, 12).unwrap();
    assert_eq!(result.periodic_payment, dec!(10_000));
    assert_eq!(result.total_payment, dec!(120_000));
}

#[test]
fn test_emi_idempotent() {
    let a = calculate_emi(dec!(3_000_000), dec!(12), 60).unwrap();
    let b = calculate_emi(dec!(3_000_000), dec!(12), 60).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_longer_term_lowers_payment_raises_interest() {
    let short = calculate_emi(dec!(1_000_000), dec!(10), 36).unwrap();
    let long = calculate_emi(dec!(1_000_000), dec!(10), 84).unwrap();
    assert!(long.periodic_payment < short.periodic_payment);
    assert!(long.total_interest > short.total_interest);
}

#[test]
fn test_loan_input_json() {
    let json = r#"{"principal": 500000, "annual_rate_percent": 12, "term_months": 12, "include_schedule": true}"#;
    let input: LoanInput = serde_json::from_str(json).unwrap();
    let out = analyse_loan(&input).unwrap();
    let schedule = out.result.schedule.unwrap();
    assert_eq!(schedule.len(), 12);
    assert_eq!(schedule[11].closing_balance, Decimal::ZERO);
    // Interest share falls every month on a level-payment loan
    assert!(schedule.windows(2).all(|w| w[1].interest < w[0].interest));
}

#[test]
fn test_bad_loan_is_invalid_loan_parameters() {
    let input = LoanInput {
        principal: dec!(100),
        annual_rate_percent: dec!(12),
        term_months: 0,
        include_schedule: false,
    };
    assert!(matches!(
        analyse_loan(&input),
        Err(FranchiseFinanceError::InvalidLoanParameters { .. })
    ));
}

// ===========================================================================
// Financing aggregation
// ===========================================================================

fn bank_offers() -> Vec<FinancingOption> {
    serde_json::from_str(
        r#"[
        {"id": "sbi-loan", "name": "Business Loan", "provider": "State Bank", "interest_rate": 11.5, "term_months": 84, "max_amount": 5000000},
        {"id": "hdfc-equipment", "interest_rate": 12.0, "term_months": 60, "max_amount": 3000000},
        {"id": "icici-working-capital", "interest_rate": 13.5, "term_months": 36, "max_amount": 1500000}
    ]"#,
    )
    .unwrap()
}

#[test]
fn test_self_funding_gap() {
    let input = FinancingInput {
        options: bank_offers(),
        selected: vec!["icici-working-capital".into()],
        total_investment: dec!(2_500_000),
    };
    let out = analyse_financing(&input).unwrap();
    assert_eq!(out.result.total_financing_available, dec!(1_500_000));
    assert_eq!(out.result.self_funding_required, dec!(1_000_000));
    assert_eq!(out.result.coverage_percent, dec!(60));

    let emi = calculate_emi(dec!(1_500_000), dec!(13.5), 36).unwrap();
    assert_eq!(out.result.options[0].periodic_payment, emi.periodic_payment);
    assert_eq!(out.result.total_monthly_payment, emi.periodic_payment);
}

#[test]
fn test_selection_preserves_order() {
    let selected = vec!["icici-working-capital".to_string(), "sbi-loan".to_string()];
    let s = aggregate_financing(&bank_offers(), &selected, dec!(10_000_000)).unwrap();
    let ids: Vec<&str> = s.options.iter().map(|o| o.id.as_str()).collect();
    assert_eq!(ids, vec!["icici-working-capital", "sbi-loan"]);
    assert_eq!(s.self_funding_required, dec!(3_500_000));
}

#[test]
fn test_over_financed_warning() {
    let input = FinancingInput {
        options: bank_offers(),
        selected: vec!["sbi-loan".into()],
        total_investment: dec!(1_000_000),
    };
    let out = analyse_financing(&input).unwrap();
    assert_eq!(out.result.self_funding_required, Decimal::ZERO);
    assert_eq!(out.warnings.len(), 1);
}
