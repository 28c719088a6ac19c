//! Ordered list of pending drug requests.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::DrugRequest;

/// Request list errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Request not found: {0}")]
    RequestNotFound(String),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Drug requests in the order they were added.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RequestList {
    requests: Vec<DrugRequest>,
}

impl RequestList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a request and return its ID.
    pub fn add(&mut self, drug: impl Into<String>, dose_mg: f64) -> String {
        let request = DrugRequest::new(drug, dose_mg);
        let id = request.request_id.clone();
        self.requests.push(request);
        id
    }

    /// Replace the drug and dose of an existing request, keeping its position.
    pub fn update(
        &mut self,
        request_id: &str,
        drug: impl Into<String>,
        dose_mg: f64,
    ) -> SessionResult<&DrugRequest> {
        let request = self
            .requests
            .iter_mut()
            .find(|r| r.request_id == request_id)
            .ok_or_else(|| SessionError::RequestNotFound(request_id.to_string()))?;
        request.drug = drug.into();
        request.dose_mg = dose_mg;
        Ok(request)
    }

    /// Remove a request, returning it.
    pub fn remove(&mut self, request_id: &str) -> SessionResult<DrugRequest> {
        let index = self
            .requests
            .iter()
            .position(|r| r.request_id == request_id)
            .ok_or_else(|| SessionError::RequestNotFound(request_id.to_string()))?;
        Ok(self.requests.remove(index))
    }

    pub fn get(&self, request_id: &str) -> Option<&DrugRequest> {
        self.requests.iter().find(|r| r.request_id == request_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DrugRequest> {
        self.requests.iter()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn clear(&mut self) {
        self.requests.clear();
    }

    /// Copy of the current requests for one comparison run.
    pub fn snapshot(&self) -> Vec<DrugRequest> {
        self.requests.clone()
    }
}

impl Extend<DrugRequest> for RequestList {
    fn extend<I: IntoIterator<Item = DrugRequest>>(&mut self, iter: I) {
        self.requests.extend(iter);
    }
}
