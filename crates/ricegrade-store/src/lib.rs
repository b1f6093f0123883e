//! Storage layer: DuckDB document store for inspection records.

mod error;
pub use error::StoreError;

mod duck;
pub use duck::InspectionStore;
