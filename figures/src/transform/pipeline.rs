//! High-level pipeline API: figure configuration to records.
//!
//! Combines every step for each dataset in configuration order: fetch the
//! source, parse it, run the engine, then concatenate the results.
//!
//! # Example
//!
//! ```rust,ignore
//! use figures::{figure_to_records, ConsoleReporter, Figure, RunOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let figure = Figure::load("figure.json")?;
//!     let records = figure_to_records(&figure, "Auckland", RunOptions::default(), &ConsoleReporter).await?;
//!
//!     println!("{} records", records.len());
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::{Dataset, Figure};
use crate::error::{PipelineError, PipelineResult};
use crate::models::Record;
use crate::parser::{parse_csv_file_auto, Table};
use crate::report::{log_error, log_info, log_warning, log_warning_indent, Reporter};
use crate::source::SourceFetcher;

use super::engine::{transform_dataset, DatasetOutcome};

/// Options for a figure run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunOptions {
    /// Report a failing dataset and carry on with the rest instead of aborting
    pub continue_on_error: bool,
}

/// Produce the records of every dataset in `figure` for `term`.
pub async fn figure_to_records(
    figure: &Figure,
    term: &str,
    options: RunOptions,
    reporter: &dyn Reporter,
) -> PipelineResult<Vec<Record>> {
    let fetcher = SourceFetcher::new(&figure.input_path)?;
    let mut records = Vec::new();

    log_info(
        reporter,
        format!("Building figures for '{}' from {} datasets", term, figure.datasets.len()),
    );

    for dataset in &figure.datasets {
        match dataset_records(&fetcher, dataset, term, reporter).await {
            Ok(outcome) => records.extend(outcome.records),
            Err(e) if options.continue_on_error => {
                log_error(reporter, format!("Skipping '{}': {}", dataset.source, e));
            }
            Err(e) => return Err(e.in_dataset(dataset.source.as_str())),
        }
    }

    Ok(records)
}

/// Fetch, parse and transform a single dataset.
pub async fn dataset_records(
    fetcher: &SourceFetcher,
    dataset: &Dataset,
    term: &str,
    reporter: &dyn Reporter,
) -> PipelineResult<DatasetOutcome> {
    let path = fetcher.fetch(&dataset.source, reporter).await?;
    transform_csv_file(dataset, &path, term, reporter)
}

/// Run one dataset against a CSV file already on disk.
pub fn transform_csv_file(
    dataset: &Dataset,
    path: &Path,
    term: &str,
    reporter: &dyn Reporter,
) -> PipelineResult<DatasetOutcome> {
    let table = parse_csv_file_auto(path)?;
    transform_table(dataset, &table, term, reporter)
}

/// Run one dataset against a parsed table.
pub fn transform_table(
    dataset: &Dataset,
    table: &Table,
    term: &str,
    reporter: &dyn Reporter,
) -> PipelineResult<DatasetOutcome> {
    let missing = dataset.missing_columns(&table.headers);
    if !missing.is_empty() {
        log_warning(
            reporter,
            format!("'{}' has no column(s): {}", dataset.source, missing.join(", ")),
        );
    }
    if table.skipped > 0 {
        log_warning_indent(reporter, format!("{} malformed rows skipped", table.skipped), 1);
    }

    transform_dataset(dataset, table.rows(), term, reporter).map_err(PipelineError::from)
}
