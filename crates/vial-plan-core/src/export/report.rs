//! Plan report rendering for presenters.

use serde::{Deserialize, Serialize};

use crate::models::{Comparison, PlanOutcome, PlanPolicy, PlanSet, PlanTotals};

/// Rendered comparison for one batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanReport {
    /// Report metadata
    pub metadata: ReportMetadata,
    /// One entry per request, in request order
    pub drugs: Vec<DrugReport>,
    /// Totals over feasible plans
    pub totals: PlanTotals,
}

/// Report metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Price column the plans were costed with
    pub price_field: String,
    /// Patient market label, e.g. "Thai"
    pub market: String,
    /// Care setting label, e.g. "OPD"
    pub care_setting: String,
    /// Generation timestamp
    pub generated_at: String,
}

/// Both plans for one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrugReport {
    pub request_id: String,
    pub drug: String,
    pub dose_mg: f64,
    pub plan_a: PolicyReport,
    pub plan_b: PolicyReport,
}

/// One plan, flattened for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyReport {
    pub policy: PlanPolicy,
    /// "feasible", "infeasible" or "error"
    pub status: String,
    pub total_cost: Option<f64>,
    pub total_dose_mg: Option<f64>,
    pub lines: Vec<ReportLine>,
    /// Reason the plan is missing
    pub message: Option<String>,
}

/// One vial line of a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportLine {
    pub code: String,
    pub strength_mg: f64,
    pub unit_price: f64,
    pub quantity: u32,
    pub line_cost: f64,
}

impl ReportLine {
    /// Human-readable line, e.g. `2 x 500 mg @ 200 [Code: RTX-500]`.
    pub fn describe(&self) -> String {
        format!(
            "{} x {} mg @ {} [Code: {}]",
            self.quantity, self.strength_mg, self.unit_price, self.code
        )
    }
}

impl PolicyReport {
    fn from_outcome(policy: PlanPolicy, outcome: &PlanOutcome) -> Self {
        match outcome {
            PlanOutcome::Feasible(combination) => Self {
                policy,
                status: "feasible".into(),
                total_cost: Some(combination.total_cost),
                total_dose_mg: Some(combination.total_dose_mg),
                lines: combination
                    .line_items
                    .iter()
                    .map(|item| ReportLine {
                        code: item.option.code.clone(),
                        strength_mg: item.option.strength_mg,
                        unit_price: item.option.price,
                        quantity: item.quantity,
                        line_cost: item.cost(),
                    })
                    .collect(),
                message: None,
            },
            PlanOutcome::Infeasible(reason) => Self {
                policy,
                status: "infeasible".into(),
                total_cost: None,
                total_dose_mg: None,
                lines: Vec::new(),
                message: Some(reason.message().to_string()),
            },
            PlanOutcome::Error(message) => Self {
                policy,
                status: "error".into(),
                total_cost: None,
                total_dose_mg: None,
                lines: Vec::new(),
                message: Some(message.clone()),
            },
        }
    }

    fn no_plan_text(&self) -> &'static str {
        match self.policy {
            PlanPolicy::Cheapest => "No valid combination (all brands)",
            PlanPolicy::OriginatorOnly => "No valid combination (original brand only)",
        }
    }
}

impl DrugReport {
    fn from_plan_set(set: &PlanSet) -> Self {
        Self {
            request_id: set.request.request_id.clone(),
            drug: set.request.drug.clone(),
            dose_mg: set.request.dose_mg,
            plan_a: PolicyReport::from_outcome(PlanPolicy::Cheapest, set.plan(PlanPolicy::Cheapest)),
            plan_b: PolicyReport::from_outcome(
                PlanPolicy::OriginatorOnly,
                set.plan(PlanPolicy::OriginatorOnly),
            ),
        }
    }

    fn plans(&self) -> [&PolicyReport; 2] {
        [&self.plan_a, &self.plan_b]
    }
}

impl PlanReport {
    /// Build a report from a finished comparison.
    pub fn from_comparison(comparison: &Comparison) -> Self {
        Self {
            metadata: ReportMetadata {
                price_field: comparison.price_field.column_name().to_string(),
                market: comparison.price_field.market().label().to_string(),
                care_setting: comparison.price_field.care_setting().label().to_string(),
                generated_at: chrono::Utc::now().to_rfc3339(),
            },
            drugs: comparison.plan_sets.iter().map(DrugReport::from_plan_set).collect(),
            totals: comparison.totals.clone(),
        }
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export to CSV format, one row per vial line (or per missing plan).
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();

        // Header
        csv.push_str("request_id,drug,dose_mg,policy,status,code,strength_mg,unit_price,quantity,line_cost,total_cost,total_dose_mg,message\n");

        for drug in &self.drugs {
            for plan in drug.plans() {
                let prefix = format!(
                    "{},{},{},{},{}",
                    escape_csv(&drug.request_id),
                    escape_csv(&drug.drug),
                    drug.dose_mg,
                    policy_key(plan.policy),
                    plan.status,
                );
                let total_cost = plan.total_cost.map(|c| c.to_string()).unwrap_or_default();
                let total_dose = plan.total_dose_mg.map(|d| d.to_string()).unwrap_or_default();
                let message = escape_csv(plan.message.as_deref().unwrap_or(""));

                if plan.lines.is_empty() {
                    csv.push_str(&format!(
                        "{},,,,,,{},{},{}\n",
                        prefix, total_cost, total_dose, message
                    ));
                }
                for line in &plan.lines {
                    csv.push_str(&format!(
                        "{},{},{},{},{},{},{},{},{}\n",
                        prefix,
                        escape_csv(&line.code),
                        line.strength_mg,
                        line.unit_price,
                        line.quantity,
                        line.line_cost,
                        total_cost,
                        total_dose,
                        message,
                    ));
                }
            }
        }

        csv
    }

    /// Plain-text rendering for terminals.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "Results ({} {}, {})\n",
            self.metadata.market, self.metadata.care_setting, self.metadata.price_field
        ));

        for drug in &self.drugs {
            out.push_str(&format!("\n{} ({} mg)\n", drug.drug, drug.dose_mg));
            for plan in drug.plans() {
                out.push_str(&format!("  {}\n", plan.policy.label()));
                match (plan.total_cost, plan.total_dose_mg) {
                    (Some(cost), Some(dose)) => {
                        out.push_str(&format!("  - Total Cost: {}\n", cost));
                        out.push_str(&format!("  - Total Dose: {} mg\n", dose));
                        for line in &plan.lines {
                            out.push_str(&format!("    - {}\n", line.describe()));
                        }
                    }
                    _ => {
                        out.push_str(&format!(
                            "  - {}: {}\n",
                            plan.no_plan_text(),
                            plan.message.as_deref().unwrap_or("unknown reason")
                        ));
                    }
                }
            }
        }

        out.push_str(&format!(
            "\nTotal Plan A: {} ({} of {} drugs)\n",
            self.totals.total_cost_a,
            self.totals.feasible_a,
            self.drugs.len()
        ));
        out.push_str(&format!(
            "Total Plan B: {} ({} of {} drugs)\n",
            self.totals.total_cost_b,
            self.totals.feasible_b,
            self.drugs.len()
        ));
        out
    }
}

fn policy_key(policy: PlanPolicy) -> &'static str {
    match policy {
        PlanPolicy::Cheapest => "plan_a",
        PlanPolicy::OriginatorOnly => "plan_b",
    }
}

/// Escape a string for CSV output.
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use crate::compare::compare;
    use crate::models::{CatalogVial, DrugRequest};
    use crate::pricing::PriceField;

    fn make_comparison() -> Comparison {
        let catalog = InMemoryCatalog::new(vec![
            CatalogVial::new("RTX-100".into(), "Rituximab".into(), 100.0, false)
                .with_price(PriceField::OpdThai, 50.0),
            CatalogVial::new("RTX-500".into(), "Rituximab".into(), 500.0, false)
                .with_price(PriceField::OpdThai, 200.0),
        ]);
        let requests = vec![DrugRequest::new("Rituximab", 450.0)];
        compare(&requests, &catalog, PriceField::OpdThai)
    }

    #[test]
    fn test_report_from_comparison() {
        let report = PlanReport::from_comparison(&make_comparison());

        assert_eq!(report.metadata.price_field, "OPD_Thai_Price");
        assert_eq!(report.metadata.market, "Thai");
        assert_eq!(report.metadata.care_setting, "OPD");
        assert_eq!(report.drugs.len(), 1);

        let plan_a = &report.drugs[0].plan_a;
        assert_eq!(plan_a.status, "feasible");
        assert_eq!(plan_a.total_cost, Some(200.0));
        assert_eq!(plan_a.lines[0].describe(), "1 x 500 mg @ 200 [Code: RTX-500]");

        let plan_b = &report.drugs[0].plan_b;
        assert_eq!(plan_b.status, "infeasible");
        assert_eq!(
            plan_b.message.as_deref(),
            Some("no originator-brand vial available")
        );
    }

    #[test]
    fn test_report_json() {
        let json = PlanReport::from_comparison(&make_comparison()).to_json().unwrap();
        assert!(json.contains("RTX-500"));
        assert!(json.contains("originator_only"));
    }

    #[test]
    fn test_report_csv() {
        let csv = PlanReport::from_comparison(&make_comparison()).to_csv();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3); // Header + plan A line + plan B placeholder
        assert!(lines[0].starts_with("request_id,drug"));
        assert!(lines[1].contains("plan_a,feasible,RTX-500"));
        assert!(lines[2].contains("plan_b,infeasible"));
        assert_eq!(lines[1].split(',').count(), 13);
        assert_eq!(lines[2].split(',').count(), 13);
    }

    #[test]
    fn test_report_text() {
        let text = PlanReport::from_comparison(&make_comparison()).to_text();
        assert!(text.starts_with("Results (Thai OPD, OPD_Thai_Price)"));
        assert!(text.contains("Rituximab (450 mg)"));
        assert!(text.contains("- Total Cost: 200"));
        assert!(text.contains("1 x 500 mg @ 200 [Code: RTX-500]"));
        assert!(text.contains("No valid combination (original brand only)"));
        assert!(text.contains("Total Plan A: 200 (1 of 1 drugs)"));
    }

    #[test]
    fn test_csv_escaping() {
        assert_eq!(escape_csv("simple"), "simple");
        assert_eq!(escape_csv("with,comma"), "\"with,comma\"");
        assert_eq!(escape_csv("with\"quote"), "\"with\"\"quote\"");
    }
}
