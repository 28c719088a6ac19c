//! Golden scenario tests for the optimizer and the plan comparator.

use vial_plan_core::catalog::InMemoryCatalog;
use vial_plan_core::models::{CatalogVial, DrugRequest, InfeasibleReason, PlanOutcome, VialOption};
use vial_plan_core::optimizer::{solve, OptimizerError};
use vial_plan_core::pricing::PriceField;
use vial_plan_core::{compare, Database};

fn option(code: &str, strength: f64, price: f64, originator: bool) -> VialOption {
    VialOption::new(code, strength, price, originator)
}

fn catalog_vial(code: &str, drug: &str, strength: f64, price: f64, originator: bool) -> CatalogVial {
    CatalogVial::new(code.into(), drug.into(), strength, originator)
        .with_price(PriceField::IpdThai, price)
}

#[test]
fn test_large_vial_cheaper_than_many_small() {
    let options = vec![option("A", 100.0, 50.0, false), option("B", 500.0, 200.0, false)];
    let combo = solve(&options, 450.0).unwrap();

    assert_eq!(combo.line_items.len(), 1);
    assert_eq!(combo.line_items[0].option.code, "B");
    assert_eq!(combo.line_items[0].quantity, 1);
    assert_eq!(combo.total_cost, 200.0);
    assert_eq!(combo.total_dose_mg, 500.0);
}

#[test]
fn test_zero_dose_rejected() {
    let options = vec![option("A", 100.0, 30.0, false)];
    assert_eq!(solve(&options, 0.0), Err(OptimizerError::InvalidDose(0.0)));
}

#[test]
fn test_empty_originator_set_only_blocks_plan_b() {
    let catalog = InMemoryCatalog::new(vec![
        catalog_vial("G-100", "Generic Drug", 100.0, 25.0, false),
        catalog_vial("G-250", "Generic Drug", 250.0, 55.0, false),
    ]);
    let requests = vec![DrugRequest::new("Generic Drug", 200.0)];
    let result = compare(&requests, &catalog, PriceField::IpdThai);

    let set = &result.plan_sets[0];
    assert_eq!(
        set.plan_b,
        PlanOutcome::Infeasible(InfeasibleReason::NoOriginatorOptions)
    );
    let plan_a = set.plan_a.combination().unwrap();
    assert_eq!(plan_a.quantity_of("G-100"), 2);
    assert_eq!(plan_a.total_cost, 50.0);
    assert_eq!(result.totals.total_cost_b, 0.0);
}

#[test]
fn test_generic_vs_originator_same_strength() {
    let catalog = InMemoryCatalog::new(vec![
        catalog_vial("A", "Drug", 250.0, 40.0, false),
        catalog_vial("B", "Drug", 250.0, 60.0, true),
    ]);
    let requests = vec![DrugRequest::new("Drug", 250.0)];
    let result = compare(&requests, &catalog, PriceField::IpdThai);

    let plan_a = result.plan_sets[0].plan_a.combination().unwrap();
    assert_eq!(plan_a.quantity_of("A"), 1);
    assert_eq!(plan_a.total_cost, 40.0);

    let plan_b = result.plan_sets[0].plan_b.combination().unwrap();
    assert_eq!(plan_b.quantity_of("B"), 1);
    assert_eq!(plan_b.total_cost, 60.0);
}

#[test]
fn test_equal_cost_tie_prefers_smaller_dose() {
    // 1xA delivers 100mg and 1xB delivers 150mg, both for 100
    let options = vec![option("B", 150.0, 100.0, false), option("A", 100.0, 100.0, false)];
    for _ in 0..5 {
        let combo = solve(&options, 100.0).unwrap();
        assert_eq!(combo.quantity_of("A"), 1);
        assert_eq!(combo.quantity_of("B"), 0);
        assert_eq!(combo.total_dose_mg, 100.0);
    }
}

#[test]
fn test_equal_ratio_tie_is_deterministic() {
    // Same price per mg: 4xA, 2xA+1xB and 2xB all deliver 400mg for 400
    let forward = vec![option("A", 100.0, 100.0, false), option("B", 200.0, 200.0, false)];
    let reversed: Vec<VialOption> = forward.iter().rev().cloned().collect();

    let first = solve(&forward, 400.0).unwrap();
    assert_eq!(first.total_cost, 400.0);
    assert_eq!(first.total_dose_mg, 400.0);
    // Fewest vials wins
    assert_eq!(first.quantity_of("B"), 2);
    assert_eq!(first.quantity_of("A"), 0);

    assert_eq!(solve(&forward, 400.0).unwrap(), first);
    assert_eq!(solve(&reversed, 400.0).unwrap(), first);
}

#[test]
fn test_identifier_order_breaks_remaining_ties() {
    // Same strength and price: all units go to the smallest code
    let options = vec![option("VIAL-B", 50.0, 10.0, false), option("VIAL-A", 50.0, 10.0, false)];
    let combo = solve(&options, 120.0).unwrap();
    assert_eq!(combo.quantity_of("VIAL-A"), 3);
    assert_eq!(combo.quantity_of("VIAL-B"), 0);
}

#[test]
fn test_single_vial_beats_mixed_pair_at_equal_cost() {
    // 1xA and 1xB+1xC both deliver 2mg for 2
    let options = vec![
        option("C", 1.0, 1.0, false),
        option("B", 1.0, 1.0, false),
        option("A", 2.0, 2.0, false),
    ];
    let combo = solve(&options, 2.0).unwrap();
    assert_eq!(combo.quantity_of("A"), 1);
    assert_eq!(combo.quantity_of("B"), 0);
    assert_eq!(combo.quantity_of("C"), 0);
}

#[test]
fn test_mixed_strength_tie_resolved_by_sorted_codes() {
    // 2xX and 1xY+1xZ: same cost, dose and vial count; [X, X] < [Y, Z]
    let options = vec![
        option("Y", 3.0, 3.0, false),
        option("Z", 1.0, 1.0, false),
        option("X", 2.0, 2.0, false),
    ];
    let combo = solve(&options, 4.0).unwrap();
    assert_eq!(combo.quantity_of("X"), 2);
    assert_eq!(combo.quantity_of("Y"), 0);
    assert_eq!(combo.quantity_of("Z"), 0);

    // 1xA+1xB and 2xC: [A, B] < [C, C]
    let options = vec![
        option("C", 2.0, 2.0, false),
        option("A", 3.0, 3.0, false),
        option("B", 1.0, 1.0, false),
    ];
    let combo = solve(&options, 4.0).unwrap();
    assert_eq!(combo.quantity_of("A"), 1);
    assert_eq!(combo.quantity_of("B"), 1);
    assert_eq!(combo.quantity_of("C"), 0);
    assert_eq!(combo.total_cost, 4.0);
}

#[test]
fn test_database_backed_comparison() {
    let mut db = Database::open_in_memory().unwrap();
    db.import_vials(&[
        catalog_vial("RTX-100-G", "Rituximab", 100.0, 4_200.0, false),
        catalog_vial("RTX-500-G", "Rituximab", 500.0, 18_000.0, false),
        catalog_vial("RTX-100-O", "Rituximab", 100.0, 7_900.0, true),
        catalog_vial("RTX-500-O", "Rituximab", 500.0, 36_500.0, true),
    ])
    .unwrap();

    let requests = vec![DrugRequest::new("Rituximab", 700.0)];
    let result = compare(&requests, &db, PriceField::IpdThai);

    // 1x500 + 2x100 = 26_400 beats 2x500 = 36_000
    let plan_a = result.plan_sets[0].plan_a.combination().unwrap();
    assert_eq!(plan_a.quantity_of("RTX-500-G"), 1);
    assert_eq!(plan_a.quantity_of("RTX-100-G"), 2);
    assert_eq!(plan_a.total_cost, 26_400.0);

    // 1x500 + 2x100 = 52_300 vs 7x100 = 55_300 vs 2x500 = 73_000
    let plan_b = result.plan_sets[0].plan_b.combination().unwrap();
    assert_eq!(plan_b.total_cost, 52_300.0);
    assert_eq!(plan_b.total_dose_mg, 700.0);
}
