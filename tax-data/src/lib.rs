//! CSV ingestion of per-country income tax bracket tables.

mod loader;

pub use loader::{TaxBracketLoader, TaxBracketLoaderError, TaxBracketRecord};
