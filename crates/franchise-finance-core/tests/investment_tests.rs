use franchise_finance_core::investment::aggregation::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn item(id: &str, category: InvestmentCategory, amount: Decimal, required: bool) -> InvestmentItem {
    InvestmentItem {
        id: id.into(),
        category,
        name: format!("{} line", category.label()),
        amount,
        is_required: required,
        financing_available: false,
        payment_timing: PaymentTiming::Upfront,
        description: None,
    }
}

// ===========================================================================
// Known answers
// ===========================================================================

#[test]
fn test_franchise_outlet_breakdown() {
    let items = vec![
        item("fee", InvestmentCategory::FranchiseFee, dec!(800_000), true),
        item("fitout", InvestmentCategory::LeaseholdImprovements, dec!(900_000), true),
        item("stock", InvestmentCategory::InitialInventory, dec!(150_000), true),
        item("signage", InvestmentCategory::MarketingSignage, dec!(100_000), false),
        item("pos", InvestmentCategory::TechnologySoftware, dec!(50_000), false),
    ];
    let s = aggregate_investment(&items).unwrap();
    assert_eq!(s.total, dec!(2_000_000));
    assert_eq!(s.required_total, dec!(1_850_000));
    assert_eq!(s.optional_total, dec!(150_000));
    assert_eq!(
        s.by_category[&InvestmentCategory::FranchiseFee].percent_of_total,
        dec!(40)
    );
    assert_eq!(
        s.by_category[&InvestmentCategory::TechnologySoftware].percent_of_total,
        dec!(2.5)
    );
}

#[test]
fn test_snapshot_from_json_serializes_category_keys() {
    let json = r#"{"items": [
        {"id": "1", "category": "franchise_fee", "name": "Initial Franchise Fee", "amount": 800000,
         "is_required": true, "payment_timing": "upfront"},
        {"id": "2", "category": "equipment_fixtures", "name": "Kitchen", "amount": "1200000",
         "is_required": true, "financing_available": true}
    ]}"#;
    let input: InvestmentInput = serde_json::from_str(json).unwrap();
    let out = analyse_investment(&input).unwrap();
    assert_eq!(out.result.financeable_total, dec!(1_200_000));

    let value = serde_json::to_value(&out.result).unwrap();
    assert!(value["by_category"]["equipment_fixtures"].is_object());
    assert_eq!(value["by_category"]["franchise_fee"]["item_count"], 1);
}

#[test]
fn test_inputs_not_mutated() {
    let items = vec![item("a", InvestmentCategory::Other, dec!(10), true)];
    let before = items.clone();
    let _ = aggregate_investment(&items).unwrap();
    assert_eq!(items, before);
}

// ===========================================================================
// Properties
// ===========================================================================

fn items_strategy() -> impl Strategy<Value = Vec<InvestmentItem>> {
    prop::collection::vec((0usize..11, 0u64..10_000_000, any::<bool>(), any::<bool>()), 0..30)
        .prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, (cat, cents, required, financeable))| {
                    let mut it = item(
                        &format!("item-{i}"),
                        InvestmentCategory::ALL[cat],
                        Decimal::new(cents as i64, 2),
                        required,
                    );
                    it.financing_available = financeable;
                    it
                })
                .collect()
        })
}

proptest! {
    #[test]
    fn prop_category_totals_round_trip(items in items_strategy()) {
        let s = aggregate_investment(&items).unwrap();
        let by_category: Decimal = s.by_category.values().map(|c| c.amount).sum();
        let by_timing: Decimal = s.by_payment_timing.values().sum();
        prop_assert_eq!(by_category, s.total);
        prop_assert_eq!(by_timing, s.total);
        prop_assert_eq!(s.required_total + s.optional_total, s.total);
        prop_assert!(s.financeable_total <= s.total);
    }

    #[test]
    fn prop_shares_sum_to_hundred(items in items_strategy()) {
        let s = aggregate_investment(&items).unwrap();
        let share: Decimal = s.by_category.values().map(|c| c.percent_of_total).sum();
        if s.total.is_zero() {
            prop_assert_eq!(share, Decimal::ZERO);
        } else {
            prop_assert!((share - dec!(100)).abs() < dec!(0.000001));
        }
    }

    #[test]
    fn prop_aggregation_is_deterministic(items in items_strategy()) {
        prop_assert_eq!(aggregate_investment(&items).unwrap(), aggregate_investment(&items).unwrap());
    }
}
