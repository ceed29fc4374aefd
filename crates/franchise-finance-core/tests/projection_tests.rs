use franchise_finance_core::projection::roi::*;
use franchise_finance_core::royalty::schedule::{RoyaltySchedule, RoyaltyType};
use franchise_finance_core::royalty::tiers::RoyaltyTier;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn input() -> RoiInput {
    serde_json::from_str(
        r#"{"total_investment": 2500000, "base_revenue": 2500000, "base_operating_costs": 875000}"#,
    )
    .unwrap()
}

#[test]
fn test_default_projection_shape() {
    let out = project_roi(&input()).unwrap();
    assert_eq!(out.result.scenarios.len(), 3);
    for s in &out.result.scenarios {
        assert_eq!(s.years.len(), 5);
        let last = s.years.last().unwrap();
        assert_eq!(s.final_roi_percent, last.cumulative_roi_percent);
        assert_eq!(
            last.total_expenses,
            last.operating_costs + last.royalty + last.marketing_fee
        );
    }
}

#[test]
fn test_tiered_schedule_lowers_fee_load() {
    let flat = project_roi(&input()).unwrap();

    let mut tiered_input = input();
    tiered_input.schedule = RoyaltySchedule {
        schedule_type: RoyaltyType::Tiered,
        base_tiers: vec![
            RoyaltyTier::new(dec!(0), Some(dec!(2_000_000)), dec!(6)),
            RoyaltyTier::new(dec!(2_000_000), None, dec!(4)),
        ],
        ..RoyaltySchedule::default()
    };
    let tiered = project_roi(&tiered_input).unwrap();

    let flat_y1 = &flat.result.scenarios[1].years[0];
    let tiered_y1 = &tiered.result.scenarios[1].years[0];
    // 2,000,000 @ 6% + 500,000 @ 4%
    assert_eq!(tiered_y1.royalty, dec!(140_000));
    assert!(tiered_y1.net_income > flat_y1.net_income);
    assert!(
        tiered.result.expected_final_roi_percent > flat.result.expected_final_roi_percent
    );
}

#[test]
fn test_single_certain_scenario() {
    let mut i = input();
    i.scenarios = vec![RoiScenario {
        name: "Base".into(),
        probability_percent: dec!(100),
        revenue_multiplier: Decimal::ONE,
        cost_multiplier: Decimal::ONE,
    }];
    i.growth_rate_percent = Decimal::ZERO;
    let out = project_roi(&i).unwrap();
    let s = &out.result.scenarios[0];
    assert!(s.years.iter().all(|y| y.revenue == dec!(2_500_000)));
    assert_eq!(out.result.expected_final_roi_percent, s.final_roi_percent);
    // 5 × 1,425,000 = 7,125,000 against 2,500,000 invested
    assert_eq!(s.final_roi_percent, dec!(185));
}

#[test]
fn test_industry_preset_from_json() {
    let preset: RoiInput = serde_json::from_str(
        r#"{"total_investment": 2500000, "industry": "food-beverage", "location_tier": "tier3"}"#,
    )
    .unwrap();
    let out = project_roi(&preset).unwrap();
    let y1 = &out.result.scenarios[1].years[0];
    // 2.5M × 0.7 revenue; 35% of that × 0.8 costs
    assert_eq!(y1.revenue, dec!(1_750_000));
    assert_eq!(y1.operating_costs, dec!(490_000));
    assert_eq!(out.assumptions["location_tier"], "tier3");
}
