//! Drug request models.

use serde::{Deserialize, Serialize};

/// A requested dose of one drug.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DrugRequest {
    /// Stable ID within a request list
    pub request_id: String,
    /// Drug name as listed in the catalog
    pub drug: String,
    /// Requested dose in mg
    pub dose_mg: f64,
}

impl DrugRequest {
    /// Create a new request with a fresh ID.
    pub fn new(drug: impl Into<String>, dose_mg: f64) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            drug: drug.into(),
            dose_mg,
        }
    }

    /// A dose is valid when it is finite and strictly positive.
    pub fn has_valid_dose(&self) -> bool {
        self.dose_mg.is_finite() && self.dose_mg > 0.0
    }
}
