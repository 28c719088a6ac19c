//! Side-by-side comparison of the cheapest and originator-only plans.
//!
//! Each request is solved twice. A failure on one plan never blocks the other
//! plan or later requests; every outcome is carried in the result.

use tracing::{debug, info, warn};

use crate::catalog::CatalogProvider;
use crate::models::{
    Comparison, DrugRequest, InfeasibleReason, PlanOutcome, PlanPolicy, PlanSet, PlanTotals,
    VialOption,
};
use crate::optimizer::{DoseCoverageOptimizer, OptimizerError};
use crate::pricing::{select_price_field_by_name, PriceField, PricingResult};

/// Runs both purchasing policies over a batch of requests.
pub struct PlanComparator<'a, C: CatalogProvider + ?Sized> {
    catalog: &'a C,
    optimizer: DoseCoverageOptimizer,
}

impl<'a, C: CatalogProvider + ?Sized> PlanComparator<'a, C> {
    /// Create a comparator over a catalog snapshot.
    pub fn new(catalog: &'a C, optimizer: DoseCoverageOptimizer) -> Self {
        Self { catalog, optimizer }
    }

    /// Compare both policies for every request, in request order.
    pub fn compare(&self, requests: &[DrugRequest], price_field: PriceField) -> Comparison {
        let mut totals = PlanTotals::default();
        let mut plan_sets = Vec::with_capacity(requests.len());

        for request in requests {
            let (plan_a, plan_b) = self.compare_request(request, price_field);
            totals.record(&plan_a, &plan_b);
            plan_sets.push(PlanSet {
                request: request.clone(),
                plan_a,
                plan_b,
                running_totals: totals.clone(),
            });
        }

        info!(
            requests = requests.len(),
            price_field = %price_field,
            total_cost_a = totals.total_cost_a,
            total_cost_b = totals.total_cost_b,
            unresolved_a = totals.unresolved_a,
            unresolved_b = totals.unresolved_b,
            "Plan comparison complete"
        );

        Comparison {
            price_field,
            plan_sets,
            totals,
        }
    }

    /// Compute (Plan A, Plan B) for one request.
    pub fn compare_request(
        &self,
        request: &DrugRequest,
        price_field: PriceField,
    ) -> (PlanOutcome, PlanOutcome) {
        if !request.has_valid_dose() {
            let message = OptimizerError::InvalidDose(request.dose_mg).to_string();
            warn!(drug = %request.drug, dose_mg = request.dose_mg, "Rejecting request with invalid dose");
            return (
                PlanOutcome::Error(message.clone()),
                PlanOutcome::Error(message),
            );
        }

        let options = match self.applicable_options(request, price_field) {
            Ok(options) => options,
            Err(outcome) => return (outcome.clone(), outcome),
        };

        let plan_a = self.plan(request, &options, PlanPolicy::Cheapest);
        let plan_b = self.plan(request, &options, PlanPolicy::OriginatorOnly);
        (plan_a, plan_b)
    }

    /// Priced, valid vials for a request, or the outcome both plans share.
    fn applicable_options(
        &self,
        request: &DrugRequest,
        price_field: PriceField,
    ) -> Result<Vec<VialOption>, PlanOutcome> {
        let rows = self.catalog.get_options(&request.drug).map_err(|e| {
            warn!(drug = %request.drug, error = %e, "Catalog lookup failed");
            PlanOutcome::Error(e.to_string())
        })?;
        if rows.is_empty() {
            warn!(drug = %request.drug, "No vials listed");
            return Err(PlanOutcome::Infeasible(InfeasibleReason::NoOptions));
        }

        let priced: Vec<VialOption> = rows.iter().filter_map(|r| r.to_option(price_field)).collect();
        if priced.is_empty() {
            warn!(drug = %request.drug, price_field = %price_field, "No vial carries the selected price");
            return Err(PlanOutcome::Infeasible(InfeasibleReason::NoApplicablePrice));
        }

        let valid: Vec<VialOption> = priced
            .into_iter()
            .filter(|option| match option.validate() {
                Ok(()) => true,
                Err(reason) => {
                    warn!(drug = %request.drug, %reason, "Dropping invalid catalog row");
                    false
                }
            })
            .collect();
        if valid.is_empty() {
            return Err(PlanOutcome::Infeasible(InfeasibleReason::NoOptions));
        }
        Ok(valid)
    }

    fn plan(&self, request: &DrugRequest, options: &[VialOption], policy: PlanPolicy) -> PlanOutcome {
        let admitted: Vec<VialOption> = options
            .iter()
            .filter(|o| policy.admits(o))
            .cloned()
            .collect();
        if admitted.is_empty() {
            debug!(drug = %request.drug, ?policy, "No vials admitted by policy");
            return PlanOutcome::Infeasible(InfeasibleReason::NoOriginatorOptions);
        }

        match self.optimizer.solve(&admitted, request.dose_mg) {
            Ok(combination) => {
                debug!(
                    drug = %request.drug,
                    ?policy,
                    cost = combination.total_cost,
                    dose_mg = combination.total_dose_mg,
                    "Plan found"
                );
                PlanOutcome::Feasible(combination)
            }
            Err(OptimizerError::Infeasible) => {
                warn!(drug = %request.drug, ?policy, "No covering combination found");
                PlanOutcome::Infeasible(InfeasibleReason::NoCombination)
            }
            Err(e) => {
                warn!(drug = %request.drug, ?policy, error = %e, "Optimizer failed");
                PlanOutcome::Error(e.to_string())
            }
        }
    }
}

/// Compare with the default optimizer configuration.
pub fn compare<C: CatalogProvider + ?Sized>(
    requests: &[DrugRequest],
    catalog: &C,
    price_field: PriceField,
) -> Comparison {
    PlanComparator::new(catalog, DoseCoverageOptimizer::default()).compare(requests, price_field)
}

/// Select the price field from user-facing labels, then compare.
///
/// An unknown market or setting fails the whole batch before any solving.
pub fn compare_by_labels<C: CatalogProvider + ?Sized>(
    requests: &[DrugRequest],
    catalog: &C,
    optimizer: DoseCoverageOptimizer,
    market: &str,
    setting: &str,
) -> PricingResult<Comparison> {
    let price_field = select_price_field_by_name(market, setting)?;
    Ok(PlanComparator::new(catalog, optimizer).compare(requests, price_field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogError, CatalogResult, InMemoryCatalog};
    use crate::models::CatalogVial;
    use crate::pricing::PricingError;

    fn vial(code: &str, drug: &str, strength: f64, price: f64, originator: bool) -> CatalogVial {
        CatalogVial::new(code.into(), drug.into(), strength, originator)
            .with_price(PriceField::OpdThai, price)
    }

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::new(vec![
            vial("GEN-250", "Drug X", 250.0, 40.0, false),
            vial("ORI-250", "Drug X", 250.0, 60.0, true),
            vial("GEN-100", "Generic Only", 100.0, 30.0, false),
            CatalogVial::new("IPD-ONLY".into(), "Inpatient Drug".into(), 100.0, true)
                .with_price(PriceField::IpdThai, 10.0),
        ])
    }

    #[test]
    fn test_plan_a_and_b_differ() {
        let requests = vec![DrugRequest::new("Drug X", 250.0)];
        let result = compare(&requests, &catalog(), PriceField::OpdThai);

        let set = &result.plan_sets[0];
        let plan_a = set.plan_a.combination().unwrap();
        assert_eq!(plan_a.quantity_of("GEN-250"), 1);
        assert_eq!(plan_a.total_cost, 40.0);

        let plan_b = set.plan_b.combination().unwrap();
        assert_eq!(plan_b.quantity_of("ORI-250"), 1);
        assert_eq!(plan_b.total_cost, 60.0);
    }

    #[test]
    fn test_no_originator_only_blocks_plan_b() {
        let requests = vec![DrugRequest::new("Generic Only", 200.0)];
        let result = compare(&requests, &catalog(), PriceField::OpdThai);

        let set = &result.plan_sets[0];
        assert_eq!(set.plan_a.cost(), Some(60.0));
        assert_eq!(
            set.plan_b,
            PlanOutcome::Infeasible(InfeasibleReason::NoOriginatorOptions)
        );
    }

    #[test]
    fn test_missing_price_field() {
        let requests = vec![DrugRequest::new("Inpatient Drug", 100.0)];
        let result = compare(&requests, &catalog(), PriceField::OpdThai);
        assert_eq!(
            result.plan_sets[0].plan_a,
            PlanOutcome::Infeasible(InfeasibleReason::NoApplicablePrice)
        );

        let result = compare(&requests, &catalog(), PriceField::IpdThai);
        assert_eq!(result.plan_sets[0].plan_b.cost(), Some(10.0));
    }

    #[test]
    fn test_partial_failures_do_not_abort_batch() {
        let requests = vec![
            DrugRequest::new("Drug X", 0.0),
            DrugRequest::new("Unknown", 100.0),
            DrugRequest::new("Generic Only", 200.0),
            DrugRequest::new("Drug X", 500.0),
        ];
        let result = compare(&requests, &catalog(), PriceField::OpdThai);

        assert_eq!(result.plan_sets.len(), 4);
        assert!(matches!(result.plan_sets[0].plan_a, PlanOutcome::Error(_)));
        assert!(matches!(result.plan_sets[0].plan_b, PlanOutcome::Error(_)));
        assert_eq!(
            result.plan_sets[1].plan_a,
            PlanOutcome::Infeasible(InfeasibleReason::NoOptions)
        );

        // Plan A: 60 + 80, Plan B: 120
        assert_eq!(result.totals.total_cost_a, 140.0);
        assert_eq!(result.totals.total_cost_b, 120.0);
        assert_eq!(result.totals.feasible_a, 2);
        assert_eq!(result.totals.unresolved_a, 2);
        assert_eq!(result.totals.feasible_b, 1);
        assert_eq!(result.totals.unresolved_b, 3);

        assert_eq!(result.plan_sets[2].running_totals.total_cost_a, 60.0);
        assert_eq!(result.plan_sets[3].running_totals, result.totals);
    }

    #[test]
    fn test_invalid_rows_dropped() {
        let catalog = InMemoryCatalog::new(vec![
            vial("BROKEN", "Drug Y", 0.0, 1.0, true),
            vial("OK", "Drug Y", 50.0, 5.0, true),
        ]);
        let requests = vec![DrugRequest::new("Drug Y", 100.0)];
        let result = compare(&requests, &catalog, PriceField::OpdThai);

        let plan = result.plan_sets[0].plan_a.combination().unwrap();
        assert_eq!(plan.quantity_of("OK"), 2);
        assert_eq!(plan.quantity_of("BROKEN"), 0);
    }

    #[test]
    fn test_invalid_selector_is_fatal() {
        let requests = vec![DrugRequest::new("Drug X", 250.0)];
        let err = compare_by_labels(
            &requests,
            &catalog(),
            DoseCoverageOptimizer::default(),
            "Martian",
            "OPD",
        )
        .unwrap_err();
        assert!(matches!(err, PricingError::InvalidPriceSelector { .. }));

        let ok = compare_by_labels(
            &requests,
            &catalog(),
            DoseCoverageOptimizer::default(),
            "Thai",
            "OPD",
        )
        .unwrap();
        assert_eq!(ok.price_field, PriceField::OpdThai);
    }

    struct FailingCatalog;

    impl CatalogProvider for FailingCatalog {
        fn get_options(&self, _drug: &str) -> CatalogResult<Vec<CatalogVial>> {
            Err(CatalogError::Unavailable("offline".into()))
        }

        fn drugs(&self) -> CatalogResult<Vec<String>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_catalog_error_recorded_per_request() {
        let requests = vec![DrugRequest::new("Drug X", 250.0)];
        let result = compare(&requests, &FailingCatalog, PriceField::OpdThai);
        match &result.plan_sets[0].plan_a {
            PlanOutcome::Error(message) => assert!(message.contains("offline")),
            other => panic!("expected error, got {:?}", other),
        }
        assert_eq!(result.totals.total_cost_a, 0.0);
    }
}
