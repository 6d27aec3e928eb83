//! Parsing and validation of a raw calculation request.
//!
//! Callers post `{"sourceCode": "US", "salary": 100000}`. The body may also be
//! a JSON string that itself contains that object, which some clients send
//! when they double-encode.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::{Map, Value};
use thiserror::Error;

pub const SOURCE_CODE_FIELD: &str = "sourceCode";
pub const SALARY_FIELD: &str = "salary";

pub type RequestParams = Map<String, Value>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("Invalid JSON")]
    InvalidJson,

    #[error("Invalid request body")]
    InvalidRequestBody,
}

/// The first rule a request breaks. Checked in declaration order.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing or invalid sourceCode")]
    MissingSourceCountry,

    #[error("Missing or invalid salary")]
    MissingOrInvalidSalary,
}

/// A validated calculation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxComputationRequest {
    pub source_country_code: String,
    pub annual_income: Decimal,
}

impl TaxComputationRequest {
    pub fn new(
        source_country_code: impl Into<String>,
        annual_income: Decimal,
    ) -> Self {
        Self {
            source_country_code: source_country_code.into(),
            annual_income,
        }
    }

    /// Builds a request from decoded body parameters.
    ///
    /// `sourceCode` must be a non-empty string. `salary` may be a JSON number
    /// or a numeric string; its sign is not checked.
    pub fn from_params(params: &RequestParams) -> Result<Self, ValidationError> {
        let source_country_code = match params.get(SOURCE_CODE_FIELD) {
            Some(Value::String(code)) if !code.is_empty() => code.clone(),
            _ => return Err(ValidationError::MissingSourceCountry),
        };

        let annual_income = params
            .get(SALARY_FIELD)
            .and_then(salary_from_value)
            .ok_or(ValidationError::MissingOrInvalidSalary)?;

        Ok(Self {
            source_country_code,
            annual_income,
        })
    }
}

/// Checks `params` without keeping the parsed request.
pub fn validate_params(params: &RequestParams) -> Result<(), ValidationError> {
    TaxComputationRequest::from_params(params).map(|_| ())
}

/// Decodes a request body into its parameter object.
///
/// A body that decodes to a JSON string is decoded once more.
pub fn parse_request_body(body: &[u8]) -> Result<RequestParams, RequestError> {
    let value: Value = serde_json::from_slice(body).map_err(|_| RequestError::InvalidJson)?;

    let value = match value {
        Value::String(inner) => {
            serde_json::from_str(&inner).map_err(|_| RequestError::InvalidJson)?
        }
        other => other,
    };

    match value {
        Value::Object(params) => Ok(params),
        _ => Err(RequestError::InvalidRequestBody),
    }
}

fn salary_from_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => parse_number(&n.to_string()),
        Value::String(s) => parse_number(s.trim()),
        _ => None,
    }
}

fn parse_number(text: &str) -> Option<Decimal> {
    if text.is_empty() {
        return None;
    }
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}
