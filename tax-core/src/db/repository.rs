use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Country, TaxBracket};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Read side of the bracket table: the only thing the tax service needs.
#[async_trait]
pub trait BracketStore: Send + Sync {
    /// Brackets for `country_code`, ordered by `min_income` ascending.
    ///
    /// An unknown country is not an error; it yields an empty vector.
    async fn resolve_brackets(
        &self,
        country_code: &str,
    ) -> Result<Vec<TaxBracket>, RepositoryError>;
}

#[async_trait]
pub trait TaxRepository: BracketStore {
    // Countries
    async fn get_country(
        &self,
        code: &str,
    ) -> Result<Country, RepositoryError>;
    async fn list_countries(&self) -> Result<Vec<Country>, RepositoryError>;

    // Tax brackets
    async fn insert_tax_bracket(
        &self,
        bracket: &TaxBracket,
    ) -> Result<(), RepositoryError>;

    async fn delete_tax_brackets(
        &self,
        country_code: &str,
    ) -> Result<(), RepositoryError>;

    /// Replaces the bracket table of every country in `schedules`.
    ///
    /// All or nothing: on error no country's table has changed.
    async fn replace_tax_brackets(
        &self,
        schedules: &BTreeMap<String, Vec<TaxBracket>>,
    ) -> Result<(), RepositoryError>;
}
