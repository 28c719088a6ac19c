//! Plan models produced by the optimizer and the comparator.

use serde::{Deserialize, Serialize};

use super::request::DrugRequest;
use super::vial::VialOption;
use crate::pricing::PriceField;

/// Purchasing policy a plan was computed under.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PlanPolicy {
    /// Plan A: any vial in the catalog
    Cheapest,
    /// Plan B: originator-brand vials only
    OriginatorOnly,
}

impl PlanPolicy {
    pub fn label(&self) -> &'static str {
        match self {
            PlanPolicy::Cheapest => "Plan A: Cheapest",
            PlanPolicy::OriginatorOnly => "Plan B: Originator Only",
        }
    }

    /// Whether a vial may be used under this policy.
    pub fn admits(&self, option: &VialOption) -> bool {
        match self {
            PlanPolicy::Cheapest => true,
            PlanPolicy::OriginatorOnly => option.original_brand,
        }
    }
}

/// One vial and how many units of it to buy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    pub option: VialOption,
    pub quantity: u32,
}

impl LineItem {
    pub fn cost(&self) -> f64 {
        f64::from(self.quantity) * self.option.price
    }

    pub fn dose_mg(&self) -> f64 {
        f64::from(self.quantity) * self.option.strength_mg
    }
}

/// A purchasable combination of vials.
///
/// Only vials with a positive quantity are kept. Totals are always the sums
/// of the line items in order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Combination {
    pub line_items: Vec<LineItem>,
    pub total_cost: f64,
    pub total_dose_mg: f64,
}

impl Combination {
    /// Build a combination, dropping zero-quantity items and summing totals.
    pub fn from_line_items(items: impl IntoIterator<Item = LineItem>) -> Self {
        let line_items: Vec<LineItem> = items.into_iter().filter(|i| i.quantity > 0).collect();
        let total_cost = line_items.iter().map(LineItem::cost).sum();
        let total_dose_mg = line_items.iter().map(LineItem::dose_mg).sum();
        Self {
            line_items,
            total_cost,
            total_dose_mg,
        }
    }

    /// Total number of vials across all line items.
    pub fn total_units(&self) -> u64 {
        self.line_items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Quantity of the vial with the given code (0 if absent).
    pub fn quantity_of(&self, code: &str) -> u32 {
        self.line_items
            .iter()
            .filter(|i| i.option.code == code)
            .map(|i| i.quantity)
            .sum()
    }
}

/// Why a plan could not be produced.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InfeasibleReason {
    /// The catalog has no vials for the drug
    NoOptions,
    /// Vials exist, but none carries the selected price
    NoApplicablePrice,
    /// Priced vials exist, but none is an originator brand
    NoOriginatorOptions,
    /// The search found no covering combination
    NoCombination,
}

impl InfeasibleReason {
    pub fn message(&self) -> &'static str {
        match self {
            InfeasibleReason::NoOptions => "no vials listed for this drug",
            InfeasibleReason::NoApplicablePrice => "no vial carries the selected price",
            InfeasibleReason::NoOriginatorOptions => "no originator-brand vial available",
            InfeasibleReason::NoCombination => "no combination covers the requested dose",
        }
    }
}

/// Result of one optimizer run for one drug under one policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum PlanOutcome {
    Feasible(Combination),
    Infeasible(InfeasibleReason),
    Error(String),
}

impl PlanOutcome {
    pub fn is_feasible(&self) -> bool {
        matches!(self, PlanOutcome::Feasible(_))
    }

    pub fn combination(&self) -> Option<&Combination> {
        match self {
            PlanOutcome::Feasible(c) => Some(c),
            _ => None,
        }
    }

    /// Cost of a feasible plan.
    pub fn cost(&self) -> Option<f64> {
        self.combination().map(|c| c.total_cost)
    }
}

/// Batch totals per policy. Only feasible plans contribute to the costs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlanTotals {
    pub total_cost_a: f64,
    pub total_cost_b: f64,
    pub feasible_a: usize,
    pub feasible_b: usize,
    pub unresolved_a: usize,
    pub unresolved_b: usize,
}

impl PlanTotals {
    /// Fold one drug's pair of plans into the totals.
    pub fn record(&mut self, plan_a: &PlanOutcome, plan_b: &PlanOutcome) {
        match plan_a.cost() {
            Some(cost) => {
                self.total_cost_a += cost;
                self.feasible_a += 1;
            }
            None => self.unresolved_a += 1,
        }
        match plan_b.cost() {
            Some(cost) => {
                self.total_cost_b += cost;
                self.feasible_b += 1;
            }
            None => self.unresolved_b += 1,
        }
    }
}

/// Both plans for one drug request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanSet {
    pub request: DrugRequest,
    pub plan_a: PlanOutcome,
    pub plan_b: PlanOutcome,
    /// Totals over this entry and every entry before it in the batch
    pub running_totals: PlanTotals,
}

impl PlanSet {
    pub fn plan(&self, policy: PlanPolicy) -> &PlanOutcome {
        match policy {
            PlanPolicy::Cheapest => &self.plan_a,
            PlanPolicy::OriginatorOnly => &self.plan_b,
        }
    }
}

/// Result of comparing both policies across a batch of requests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comparison {
    pub price_field: PriceField,
    pub plan_sets: Vec<PlanSet>,
    pub totals: PlanTotals,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(code: &str, strength: f64, price: f64, qty: u32) -> LineItem {
        LineItem {
            option: VialOption::new(code, strength, price, false),
            quantity: qty,
        }
    }

    #[test]
    fn test_combination_drops_zero_quantities() {
        let combo = Combination::from_line_items(vec![
            item("A", 100.0, 50.0, 0),
            item("B", 500.0, 200.0, 1),
        ]);
        assert_eq!(combo.line_items.len(), 1);
        assert_eq!(combo.total_cost, 200.0);
        assert_eq!(combo.total_dose_mg, 500.0);
        assert_eq!(combo.total_units(), 1);
        assert_eq!(combo.quantity_of("A"), 0);
        assert_eq!(combo.quantity_of("B"), 1);
    }

    #[test]
    fn test_totals_skip_unresolved_plans() {
        let feasible = PlanOutcome::Feasible(Combination::from_line_items(vec![item(
            "A", 250.0, 40.0, 2,
        )]));
        let infeasible = PlanOutcome::Infeasible(InfeasibleReason::NoOriginatorOptions);

        let mut totals = PlanTotals::default();
        totals.record(&feasible, &infeasible);
        totals.record(&PlanOutcome::Error("bad dose".into()), &feasible);

        assert_eq!(totals.total_cost_a, 80.0);
        assert_eq!(totals.total_cost_b, 80.0);
        assert_eq!(totals.feasible_a, 1);
        assert_eq!(totals.unresolved_a, 1);
        assert_eq!(totals.feasible_b, 1);
        assert_eq!(totals.unresolved_b, 1);
    }

    #[test]
    fn test_policy_admits() {
        let generic = VialOption::new("G", 100.0, 10.0, false);
        let originator = VialOption::new("O", 100.0, 20.0, true);
        assert!(PlanPolicy::Cheapest.admits(&generic));
        assert!(PlanPolicy::Cheapest.admits(&originator));
        assert!(!PlanPolicy::OriginatorOnly.admits(&generic));
        assert!(PlanPolicy::OriginatorOnly.admits(&originator));
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let outcome = PlanOutcome::Infeasible(InfeasibleReason::NoOptions);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "infeasible");
        assert_eq!(json["detail"], "no_options");
    }
}
