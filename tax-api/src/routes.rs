use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;
use tax_core::{BracketContribution, Country, TaxComputationResult, TaxRepository, TaxService};
use tracing::{error, info};

use crate::error::ApiError;

pub const CALCULATE_TAX_PATH: &str = "/api/calculate-tax";
pub const COUNTRIES_PATH: &str = "/api/countries";
pub const HEALTH_PATH: &str = "/health";

/// Successful `POST /api/calculate-tax` body.
#[derive(Debug, Serialize)]
pub struct CalculateTaxResponse {
    #[serde(with = "rust_decimal::serde::float")]
    pub tax: Decimal,
    pub debug: Vec<BracketContribution>,
}

impl From<TaxComputationResult> for CalculateTaxResponse {
    fn from(result: TaxComputationResult) -> Self {
        Self {
            tax: result.total_tax,
            debug: result.breakdown,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CountryView {
    pub code: String,
    pub name: String,
    pub currency: String,
    pub flag: String,
}

impl From<Country> for CountryView {
    fn from(country: Country) -> Self {
        let flag = country.flag_emoji();
        Self {
            code: country.code,
            name: country.name,
            currency: country.currency,
            flag,
        }
    }
}

/// Builds the HTTP surface around a shared [`TaxService`].
///
/// The calculation route answers any method other than POST with a JSON 405;
/// unknown paths get a JSON 404.
pub fn router<R>(service: Arc<TaxService<R>>) -> Router
where
    R: TaxRepository + ?Sized + 'static,
{
    Router::new()
        .route(
            CALCULATE_TAX_PATH,
            post(calculate_tax_handler::<R>).fallback(method_not_allowed),
        )
        .route(COUNTRIES_PATH, get(countries_handler::<R>))
        .route(HEALTH_PATH, get(healthcheck))
        .fallback(route_not_found)
        .with_state(service)
}

pub(crate) async fn calculate_tax_handler<R>(
    State(service): State<Arc<TaxService<R>>>,
    body: Bytes,
) -> Response
where
    R: TaxRepository + ?Sized + 'static,
{
    info!(bytes = body.len(), "POST {CALCULATE_TAX_PATH}");
    match service.calculate_from_body(&body).await {
        Ok(result) => (StatusCode::OK, Json(CalculateTaxResponse::from(result))).into_response(),
        Err(err) => ApiError::from(err).into_response(),
    }
}

pub(crate) async fn countries_handler<R>(State(service): State<Arc<TaxService<R>>>) -> Response
where
    R: TaxRepository + ?Sized + 'static,
{
    info!("GET {COUNTRIES_PATH}");
    match service.store().list_countries().await {
        Ok(countries) => {
            let views: Vec<CountryView> = countries.into_iter().map(CountryView::from).collect();
            (StatusCode::OK, Json(views)).into_response()
        }
        Err(err) => {
            error!(error = %err, "listing countries failed");
            ApiError::from(err).into_response()
        }
    }
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

async fn route_not_found() -> ApiError {
    ApiError::RouteNotFound
}
