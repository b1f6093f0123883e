//! Core of Ricegrade: grading standards, the standards catalog, compliance
//! scoring of grain batches, and the inspection record built from it.

pub mod catalog;
pub mod format;
pub mod inspection;
pub mod model;
pub mod schema;
pub mod scorer;

pub use catalog::{Catalog, CatalogError, GradeError, Grading};
pub use format::{CompositionRow, bound_label, composition_rows, percent_label};
pub use inspection::{
    CreateInspection, HistoryFilter, HistoryPage, HistoryQuery, Inspection, PAGE_SIZE, RawBatch,
    ValidationError, parse_timestamp,
};
pub use model::{Grain, LowerBound, Measurement, ScoredCriterion, Standard, UpperBound};
pub use schema::inspections;
pub use scorer::{ScoreError, round2, score};
