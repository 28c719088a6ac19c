//! Vial Plan Core Library
//!
//! Recommends the cheapest combination of drug vials that covers a requested
//! dose, and compares it with the cheapest originator-brand-only combination.
//!
//! # Architecture
//!
//! ```text
//!   RequestList          CatalogProvider         (market, care setting)
//!        │                (SQLite / memory)                │
//!        │                       │                  PriceSelector
//!        │                       │                         │
//!        └───────────────┬───────┴─────────────────────────┘
//!                        ▼
//!                 PlanComparator
//!                 ┌──────┴───────┐
//!                 ▼              ▼
//!     DoseCoverageOptimizer  DoseCoverageOptimizer
//!       (Plan A: all)        (Plan B: originator)
//!                 └──────┬───────┘
//!                        ▼
//!             Comparison → PlanReport (JSON / CSV / text)
//! ```
//!
//! # Modules
//!
//! - [`pricing`]: Price-field selection from market and care setting
//! - [`optimizer`]: Minimum-cost dose coverage solver
//! - [`compare`]: Plan A / Plan B comparison over a batch of requests
//! - [`catalog`]: Catalog provider trait and in-memory catalog
//! - [`db`]: SQLite-backed catalog
//! - [`session`]: Ordered request list
//! - [`export`]: Report rendering
//! - [`config`]: Optimizer configuration
//! - [`models`]: Domain types (CatalogVial, VialOption, Combination, PlanSet, etc.)

pub mod catalog;
pub mod compare;
pub mod config;
pub mod db;
pub mod export;
pub mod models;
pub mod optimizer;
pub mod pricing;
pub mod session;

// Re-export commonly used types
pub use catalog::{CatalogProvider, InMemoryCatalog};
pub use compare::{compare, compare_by_labels, PlanComparator};
pub use config::OptimizerConfig;
pub use db::Database;
pub use export::PlanReport;
pub use models::{
    CatalogVial, Combination, Comparison, DrugRequest, InfeasibleReason, LineItem, PlanOutcome,
    PlanPolicy, PlanSet, PlanTotals, VialOption, VialPrices,
};
pub use optimizer::{DoseCoverageOptimizer, OptimizerError};
pub use pricing::{select_price_field, select_price_field_by_name, CareSetting, MarketCategory, PriceField};
pub use session::RequestList;

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum VialPlanError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid price selector: {0}")]
    InvalidPriceSelector(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<db::DbError> for VialPlanError {
    fn from(e: db::DbError) -> Self {
        match e {
            db::DbError::Constraint(msg) => VialPlanError::InvalidInput(msg),
            other => VialPlanError::DatabaseError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for VialPlanError {
    fn from(e: serde_json::Error) -> Self {
        VialPlanError::SerializationError(e.to_string())
    }
}

impl From<pricing::PricingError> for VialPlanError {
    fn from(e: pricing::PricingError) -> Self {
        VialPlanError::InvalidPriceSelector(e.to_string())
    }
}

impl From<session::SessionError> for VialPlanError {
    fn from(e: session::SessionError) -> Self {
        VialPlanError::NotFound(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for VialPlanError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        VialPlanError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a catalog database at the given path.
#[uniffi::export]
pub fn open_planner(path: String) -> Result<Arc<VialPlanner>, VialPlanError> {
    let db = Database::open(&path)?;
    Ok(Arc::new(VialPlanner::new(db)))
}

/// Create a planner over an in-memory catalog (for testing).
#[uniffi::export]
pub fn open_planner_in_memory() -> Result<Arc<VialPlanner>, VialPlanError> {
    let db = Database::open_in_memory()?;
    Ok(Arc::new(VialPlanner::new(db)))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe planner session for FFI: a catalog plus a request list.
#[derive(uniffi::Object)]
pub struct VialPlanner {
    db: Arc<Mutex<Database>>,
    requests: Mutex<RequestList>,
    optimizer: DoseCoverageOptimizer,
}

impl VialPlanner {
    fn new(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            requests: Mutex::new(RequestList::new()),
            optimizer: DoseCoverageOptimizer::default(),
        }
    }

    fn comparison(&self, market: &str, setting: &str) -> Result<Comparison, VialPlanError> {
        let price_field = select_price_field_by_name(market, setting)?;
        let requests = self.requests.lock()?.snapshot();
        let db = self.db.lock()?;
        let comparator = PlanComparator::new(&*db, self.optimizer.clone());
        Ok(comparator.compare(&requests, price_field))
    }
}

#[uniffi::export]
impl VialPlanner {
    // =========================================================================
    // Catalog Operations
    // =========================================================================

    /// Add or update a catalog vial.
    pub fn upsert_vial(&self, vial: FfiVial) -> Result<(), VialPlanError> {
        let db = self.db.lock()?;
        db.upsert_vial(&vial.into())?;
        Ok(())
    }

    /// Get a catalog vial by code.
    pub fn get_vial(&self, code: String) -> Result<Option<FfiVial>, VialPlanError> {
        let db = self.db.lock()?;
        Ok(db.get_vial(&code)?.map(|v| v.into()))
    }

    /// All vials listed for a drug.
    pub fn vials_for_drug(&self, drug: String) -> Result<Vec<FfiVial>, VialPlanError> {
        let db = self.db.lock()?;
        let vials = db.vials_for_drug(&drug)?;
        Ok(vials.into_iter().map(|v| v.into()).collect())
    }

    /// Distinct drug names for selection.
    pub fn list_drugs(&self) -> Result<Vec<String>, VialPlanError> {
        let db = self.db.lock()?;
        Ok(db.list_drugs()?)
    }

    // =========================================================================
    // Request List Operations
    // =========================================================================

    /// Append a drug request, returning its ID.
    pub fn add_request(&self, drug: String, dose_mg: f64) -> Result<String, VialPlanError> {
        let mut requests = self.requests.lock()?;
        Ok(requests.add(drug, dose_mg))
    }

    /// Edit a drug request in place.
    pub fn update_request(
        &self,
        request_id: String,
        drug: String,
        dose_mg: f64,
    ) -> Result<(), VialPlanError> {
        let mut requests = self.requests.lock()?;
        requests.update(&request_id, drug, dose_mg)?;
        Ok(())
    }

    /// Remove a drug request.
    pub fn remove_request(&self, request_id: String) -> Result<(), VialPlanError> {
        let mut requests = self.requests.lock()?;
        requests.remove(&request_id)?;
        Ok(())
    }

    /// Current requests, in order.
    pub fn list_requests(&self) -> Result<Vec<FfiDrugRequest>, VialPlanError> {
        let requests = self.requests.lock()?;
        Ok(requests.iter().cloned().map(|r| r.into()).collect())
    }

    // =========================================================================
    // Planning Operations
    // =========================================================================

    /// Catalog price column for a market and care setting.
    pub fn price_field_for(&self, market: String, setting: String) -> Result<String, VialPlanError> {
        let field = select_price_field_by_name(&market, &setting)?;
        Ok(field.column_name().to_string())
    }

    /// Compute Plan A and Plan B for every request.
    pub fn run_comparison(
        &self,
        market: String,
        setting: String,
    ) -> Result<FfiComparison, VialPlanError> {
        Ok(self.comparison(&market, &setting)?.into())
    }

    /// Comparison report as JSON.
    pub fn export_report_json(&self, market: String, setting: String) -> Result<String, VialPlanError> {
        let comparison = self.comparison(&market, &setting)?;
        Ok(PlanReport::from_comparison(&comparison).to_json()?)
    }

    /// Comparison report as CSV.
    pub fn export_report_csv(&self, market: String, setting: String) -> Result<String, VialPlanError> {
        let comparison = self.comparison(&market, &setting)?;
        Ok(PlanReport::from_comparison(&comparison).to_csv())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe catalog vial.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiVial {
    pub code: String,
    pub drug: String,
    pub strength_mg: f64,
    pub original_brand: bool,
    pub description: Option<String>,
    pub opd_thai_price: Option<f64>,
    pub ipd_thai_price: Option<f64>,
    pub opd_international_price: Option<f64>,
    pub ipd_international_price: Option<f64>,
}

impl From<CatalogVial> for FfiVial {
    fn from(vial: CatalogVial) -> Self {
        Self {
            code: vial.code,
            drug: vial.drug,
            strength_mg: vial.strength_mg,
            original_brand: vial.original_brand,
            description: vial.description,
            opd_thai_price: vial.prices.opd_thai,
            ipd_thai_price: vial.prices.ipd_thai,
            opd_international_price: vial.prices.opd_international,
            ipd_international_price: vial.prices.ipd_international,
        }
    }
}

impl From<FfiVial> for CatalogVial {
    fn from(vial: FfiVial) -> Self {
        CatalogVial {
            code: vial.code,
            drug: vial.drug,
            strength_mg: vial.strength_mg,
            original_brand: vial.original_brand,
            description: vial.description,
            prices: VialPrices {
                opd_thai: vial.opd_thai_price,
                ipd_thai: vial.ipd_thai_price,
                opd_international: vial.opd_international_price,
                ipd_international: vial.ipd_international_price,
            },
        }
    }
}

/// FFI-safe drug request.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDrugRequest {
    pub request_id: String,
    pub drug: String,
    pub dose_mg: f64,
}

impl From<DrugRequest> for FfiDrugRequest {
    fn from(request: DrugRequest) -> Self {
        Self {
            request_id: request.request_id,
            drug: request.drug,
            dose_mg: request.dose_mg,
        }
    }
}

/// FFI-safe plan line.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiLineItem {
    pub code: String,
    pub strength_mg: f64,
    pub unit_price: f64,
    pub quantity: u32,
    pub original_brand: bool,
}

impl From<LineItem> for FfiLineItem {
    fn from(item: LineItem) -> Self {
        Self {
            code: item.option.code,
            strength_mg: item.option.strength_mg,
            unit_price: item.option.price,
            quantity: item.quantity,
            original_brand: item.option.original_brand,
        }
    }
}

/// FFI-safe plan outcome.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPlan {
    /// "feasible", "infeasible" or "error"
    pub status: String,
    pub total_cost: Option<f64>,
    pub total_dose_mg: Option<f64>,
    pub line_items: Vec<FfiLineItem>,
    pub message: Option<String>,
}

impl From<PlanOutcome> for FfiPlan {
    fn from(outcome: PlanOutcome) -> Self {
        match outcome {
            PlanOutcome::Feasible(combination) => Self {
                status: "feasible".into(),
                total_cost: Some(combination.total_cost),
                total_dose_mg: Some(combination.total_dose_mg),
                line_items: combination.line_items.into_iter().map(|i| i.into()).collect(),
                message: None,
            },
            PlanOutcome::Infeasible(reason) => Self {
                status: "infeasible".into(),
                total_cost: None,
                total_dose_mg: None,
                line_items: Vec::new(),
                message: Some(reason.message().to_string()),
            },
            PlanOutcome::Error(message) => Self {
                status: "error".into(),
                total_cost: None,
                total_dose_mg: None,
                line_items: Vec::new(),
                message: Some(message),
            },
        }
    }
}

/// FFI-safe pair of plans for one request.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPlanSet {
    pub request: FfiDrugRequest,
    pub plan_a: FfiPlan,
    pub plan_b: FfiPlan,
}

impl From<PlanSet> for FfiPlanSet {
    fn from(set: PlanSet) -> Self {
        Self {
            request: set.request.into(),
            plan_a: set.plan_a.into(),
            plan_b: set.plan_b.into(),
        }
    }
}

/// FFI-safe batch comparison.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiComparison {
    pub price_field: String,
    pub plan_sets: Vec<FfiPlanSet>,
    pub total_cost_a: f64,
    pub total_cost_b: f64,
    pub feasible_a: u32,
    pub feasible_b: u32,
    pub unresolved_a: u32,
    pub unresolved_b: u32,
}

impl From<Comparison> for FfiComparison {
    fn from(comparison: Comparison) -> Self {
        Self {
            price_field: comparison.price_field.column_name().to_string(),
            plan_sets: comparison.plan_sets.into_iter().map(|s| s.into()).collect(),
            total_cost_a: comparison.totals.total_cost_a,
            total_cost_b: comparison.totals.total_cost_b,
            feasible_a: count(comparison.totals.feasible_a),
            feasible_b: count(comparison.totals.feasible_b),
            unresolved_a: count(comparison.totals.unresolved_a),
            unresolved_b: count(comparison.totals.unresolved_b),
        }
    }
}

/// Narrow a request count for FFI, saturating at `u32::MAX`.
fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
