use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::request::{RequestError, TaxComputationRequest, ValidationError, parse_request_body};
use crate::calculations::{TaxComputationResult, compute_tax};
use crate::db::BracketStore;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaxServiceError {
    #[error(transparent)]
    InvalidRequest(#[from] RequestError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("No tax brackets found for country")]
    NoBracketsFound { country_code: String },

    /// The bracket store failed; carries the store's message.
    #[error("{0}")]
    Infrastructure(String),
}

/// Resolves a country's brackets and runs the progressive calculator on them.
///
/// The store is opened once per process and shared; the service itself holds
/// no other state.
pub struct TaxService<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for TaxService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> TaxService<S>
where
    S: BracketStore + ?Sized,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Computes tax for an already validated request.
    pub async fn compute(
        &self,
        request: &TaxComputationRequest,
    ) -> Result<TaxComputationResult, TaxServiceError> {
        let country_code = request.source_country_code.as_str();

        let brackets = self
            .store
            .resolve_brackets(country_code)
            .await
            .map_err(|e| {
                error!(country = country_code, error = %e, "bracket lookup failed");
                TaxServiceError::Infrastructure(e.to_string())
            })?;

        debug!(country = country_code, brackets = brackets.len(), "resolved brackets");
        if brackets.is_empty() {
            warn!(country = country_code, "no tax brackets for country");
            return Err(TaxServiceError::NoBracketsFound {
                country_code: country_code.to_string(),
            });
        }

        let result = compute_tax(request.annual_income, &brackets);
        info!(
            country = country_code,
            income = %request.annual_income,
            tax = %result.total_tax,
            "computed tax"
        );
        Ok(result)
    }

    /// Parses and validates a raw request body, then delegates to
    /// [`TaxService::compute`]. Nothing is looked up until the body is valid.
    pub async fn calculate_from_body(
        &self,
        body: &[u8],
    ) -> Result<TaxComputationResult, TaxServiceError> {
        let request = parse_request_body(body)
            .map_err(TaxServiceError::from)
            .and_then(|params| {
                TaxComputationRequest::from_params(&params).map_err(TaxServiceError::from)
            })
            .inspect_err(|e| warn!(error = %e, "rejected tax request"))?;

        self.compute(&request).await
    }
}
