//! Request handling around the calculator: body decoding, validation and
//! bracket lookup.

mod request;
mod tax_service;

pub use request::{
    RequestError, RequestParams, SALARY_FIELD, SOURCE_CODE_FIELD, TaxComputationRequest,
    ValidationError, parse_request_body, validate_params,
};
pub use tax_service::{TaxService, TaxServiceError};
