//! Transformation module.
//!
//! The dataset engine and its stages:
//! - Terms: query term and alias resolution
//! - Filter: include/exclude rules per row
//! - Labels: record construction, labels and percentage flag
//! - Normalize, Dedup, Percentage, Sort: record-set stages
//! - Engine: runs the stages for one dataset
//! - Pipeline: fetch, parse and transform every dataset of a figure

pub mod dedup;
pub mod engine;
pub mod filter;
pub mod labels;
pub mod normalize;
pub mod percentage;
pub mod pipeline;
pub mod sort;
pub mod terms;

pub use engine::{transform_dataset, transform_rows, DatasetOutcome, DatasetStats};
pub use filter::{DatasetRules, Rejection, RowFilter};
pub use pipeline::{
    dataset_records, figure_to_records, transform_csv_file, transform_table, RunOptions,
};
pub use terms::{TermMapping, TermSet};
