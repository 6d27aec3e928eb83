pub mod calculations;
pub mod db;
pub mod models;
pub mod service;

pub use calculations::{BracketContribution, NetSavings, TaxComputationResult, compute_tax, net_savings};
pub use db::{BracketStore, DbConfig, RepositoryError, RepositoryFactory, RepositoryRegistry, TaxRepository};
pub use models::*;
pub use service::{TaxComputationRequest, TaxService, TaxServiceError};
