use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::time::Instant;

use crate::error::FranchiseFinanceError;
use crate::types::*;
use crate::FranchiseFinanceResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestmentCategory {
    FranchiseFee,
    EquipmentFixtures,
    LeaseholdImprovements,
    InitialInventory,
    WorkingCapital,
    MarketingSignage,
    TrainingTravel,
    ProfessionalFees,
    InsuranceDeposits,
    TechnologySoftware,
    Other,
}

impl InvestmentCategory {
    pub const ALL: [InvestmentCategory; 11] = [
        InvestmentCategory::FranchiseFee,
        InvestmentCategory::EquipmentFixtures,
        InvestmentCategory::LeaseholdImprovements,
        InvestmentCategory::InitialInventory,
        InvestmentCategory::WorkingCapital,
        InvestmentCategory::MarketingSignage,
        InvestmentCategory::TrainingTravel,
        InvestmentCategory::ProfessionalFees,
        InvestmentCategory::InsuranceDeposits,
        InvestmentCategory::TechnologySoftware,
        InvestmentCategory::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            InvestmentCategory::FranchiseFee => "Franchise Fee",
            InvestmentCategory::EquipmentFixtures => "Equipment & Fixtures",
            InvestmentCategory::LeaseholdImprovements => "Leasehold Improvements",
            InvestmentCategory::InitialInventory => "Initial Inventory",
            InvestmentCategory::WorkingCapital => "Working Capital",
            InvestmentCategory::MarketingSignage => "Marketing & Signage",
            InvestmentCategory::TrainingTravel => "Training & Travel",
            InvestmentCategory::ProfessionalFees => "Professional Fees",
            InvestmentCategory::InsuranceDeposits => "Insurance & Deposits",
            InvestmentCategory::TechnologySoftware => "Technology & Software",
            InvestmentCategory::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentTiming {
    #[default]
    Upfront,
    Monthly,
    Quarterly,
    Annual,
}

/// One line of a franchise's initial investment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentItem {
    pub id: String,
    pub category: InvestmentCategory,
    pub name: String,
    pub amount: Money,
    pub is_required: bool,
    #[serde(default)]
    pub financing_available: bool,
    #[serde(default)]
    pub payment_timing: PaymentTiming,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    /// Display name, e.g. "Equipment & Fixtures"
    pub label: String,
    pub amount: Money,
    pub percent_of_total: Percent,
    pub item_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentSummary {
    pub total: Money,
    pub required_total: Money,
    pub optional_total: Money,
    /// Sum of items flagged as eligible for financing
    pub financeable_total: Money,
    /// Only categories with at least one item
    pub by_category: BTreeMap<InvestmentCategory, CategoryTotal>,
    pub by_payment_timing: BTreeMap<PaymentTiming, Money>,
    pub item_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentInput {
    pub items: Vec<InvestmentItem>,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Roll a snapshot of line items into totals and category shares.
pub fn aggregate_investment(items: &[InvestmentItem]) -> FranchiseFinanceResult<InvestmentSummary> {
    validate_items(items)?;

    let mut total = Decimal::ZERO;
    let mut required_total = Decimal::ZERO;
    let mut financeable_total = Decimal::ZERO;
    let mut category_sums: BTreeMap<InvestmentCategory, (Money, usize)> = BTreeMap::new();
    let mut by_payment_timing: BTreeMap<PaymentTiming, Money> = BTreeMap::new();

    for item in items {
        total += item.amount;
        if item.is_required {
            required_total += item.amount;
        }
        if item.financing_available {
            financeable_total += item.amount;
        }
        let entry = category_sums
            .entry(item.category)
            .or_insert((Decimal::ZERO, 0));
        entry.0 += item.amount;
        entry.1 += 1;
        *by_payment_timing
            .entry(item.payment_timing)
            .or_insert(Decimal::ZERO) += item.amount;
    }

    let by_category = category_sums
        .into_iter()
        .map(|(category, (amount, item_count))| {
            (
                category,
                CategoryTotal {
                    label: category.label().to_string(),
                    amount,
                    percent_of_total: percent_of(amount, total),
                    item_count,
                },
            )
        })
        .collect();

    tracing::debug!(items = items.len(), %total, "investment aggregated");

    Ok(InvestmentSummary {
        total,
        required_total,
        optional_total: total - required_total,
        financeable_total,
        by_category,
        by_payment_timing,
        item_count: items.len(),
    })
}

/// Envelope form of [`aggregate_investment`].
pub fn analyse_investment(
    input: &InvestmentInput,
) -> FranchiseFinanceResult<ComputationOutput<InvestmentSummary>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let summary = aggregate_investment(&input.items)?;

    if input.items.is_empty() {
        warnings.push("No investment items supplied; all totals are zero".into());
    } else if !summary.by_category.contains_key(&InvestmentCategory::FranchiseFee) {
        warnings.push("No franchise fee line item present".into());
    }
    if !summary.by_category.contains_key(&InvestmentCategory::WorkingCapital) && !input.items.is_empty() {
        warnings.push("No working capital reserve included in the investment".into());
    }
    for item in input.items.iter().filter(|i| i.amount.is_zero()) {
        warnings.push(format!("Item '{}' has a zero amount", item.name));
    }

    let categories_without_items: Vec<&str> = InvestmentCategory::ALL
        .iter()
        .filter(|c| !summary.by_category.contains_key(*c))
        .map(InvestmentCategory::label)
        .collect();

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Franchise investment breakdown: category, required/optional and payment-timing totals",
        &serde_json::json!({
            "items": input.items.len(),
            "categories_without_items": categories_without_items,
        }),
        warnings,
        elapsed,
        summary,
    ))
}

fn validate_items(items: &[InvestmentItem]) -> FranchiseFinanceResult<()> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        if item.id.trim().is_empty() {
            return Err(FranchiseFinanceError::InvalidInput {
                field: format!("items[{i}].id"),
                reason: "Item id must not be empty".into(),
            });
        }
        if !seen.insert(item.id.as_str()) {
            return Err(FranchiseFinanceError::InvalidInput {
                field: format!("items[{i}].id"),
                reason: format!("Duplicate item id '{}'", item.id),
            });
        }
        if item.amount < Decimal::ZERO {
            return Err(FranchiseFinanceError::InvalidInput {
                field: format!("items[{i}].amount"),
                reason: "Item amount must be non-negative".into(),
            });
        }
        check_amount(item.amount, &format!("items[{i}].amount"))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
