//! Tax calculation modules.
//!
//! The progressive calculator is a pure function over an income and a
//! bracket table; net savings builds on its result.

pub mod common;
pub mod net_savings;
pub mod progressive;

pub use net_savings::{NetSavings, net_savings};
pub use progressive::{BracketContribution, TaxComputationResult, compute_tax};
