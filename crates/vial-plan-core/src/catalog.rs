//! Catalog access for the comparator.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::db::DbError;
use crate::models::CatalogVial;

/// Catalog errors.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Source of vial rows per drug.
///
/// Implementations must return the same rows for a drug for as long as one
/// batch comparison runs.
pub trait CatalogProvider {
    /// All vials listed for a drug, in catalog order.
    fn get_options(&self, drug: &str) -> CatalogResult<Vec<CatalogVial>>;

    /// Distinct drug names, sorted.
    fn drugs(&self) -> CatalogResult<Vec<String>>;
}

/// Catalog held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    vials: Vec<CatalogVial>,
}

impl InMemoryCatalog {
    pub fn new(vials: Vec<CatalogVial>) -> Self {
        Self { vials }
    }

    /// Add a vial, replacing any existing vial with the same code.
    pub fn insert(&mut self, vial: CatalogVial) {
        match self.vials.iter_mut().find(|v| v.code == vial.code) {
            Some(existing) => *existing = vial,
            None => self.vials.push(vial),
        }
    }

    pub fn len(&self) -> usize {
        self.vials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vials.is_empty()
    }
}

impl FromIterator<CatalogVial> for InMemoryCatalog {
    fn from_iter<I: IntoIterator<Item = CatalogVial>>(iter: I) -> Self {
        let mut catalog = InMemoryCatalog::default();
        for vial in iter {
            catalog.insert(vial);
        }
        catalog
    }
}

impl CatalogProvider for InMemoryCatalog {
    fn get_options(&self, drug: &str) -> CatalogResult<Vec<CatalogVial>> {
        Ok(self
            .vials
            .iter()
            .filter(|v| v.drug == drug)
            .cloned()
            .collect())
    }

    fn drugs(&self) -> CatalogResult<Vec<String>> {
        let names: BTreeSet<&str> = self.vials.iter().map(|v| v.drug.as_str()).collect();
        Ok(names.into_iter().map(String::from).collect())
    }
}
