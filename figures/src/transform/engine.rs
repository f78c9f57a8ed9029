//! Dataset engine: raw rows in, ordered records out.
//!
//! Stages run strictly in order for one dataset:
//!
//! 1. resolve the query term (and its aliases)
//! 2. filter rows, counting rejections by reason
//! 3. build records with labels and the percentage flag
//! 4. normalize units
//! 5. deduplicate to the latest observation
//! 6. convert flagged values to percentages
//! 7. drop zero values when configured
//! 8. sort

use serde::Serialize;

use crate::config::Dataset;
use crate::error::ConfigResult;
use crate::models::Record;
use crate::parser::Fields;
use crate::report::{log_error, log_info, log_info_indent, log_success, Reporter};

use super::dedup::deduplicate;
use super::filter::{DatasetRules, Rejection, RowFilter};
use super::labels::build_record;
use super::normalize::normalize_units;
use super::percentage::convert_percentages;
use super::sort::sort_records;
use super::terms::TermSet;

/// Per-dataset counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetStats {
    pub rows_read: usize,
    pub missing_selector: usize,
    pub excluded_by_selector: usize,
    pub excluded_by_measure: usize,
    pub excluded_by_category: usize,
    pub invalid_value: usize,
    /// Records removed by deduplication
    pub duplicates: usize,
    pub excluded_zero: usize,
    pub included: usize,
}

impl DatasetStats {
    fn reject(&mut self, reason: Rejection) {
        match reason {
            Rejection::MissingSelector => self.missing_selector += 1,
            Rejection::ExcludedBySelector => self.excluded_by_selector += 1,
            Rejection::ExcludedByMeasure => self.excluded_by_measure += 1,
            Rejection::ExcludedByCategory => self.excluded_by_category += 1,
        }
    }

    /// Labelled counters in report order
    pub fn counters(&self) -> [(&'static str, usize); 7] {
        [
            (Rejection::MissingSelector.tag(), self.missing_selector),
            (Rejection::ExcludedBySelector.tag(), self.excluded_by_selector),
            (Rejection::ExcludedByMeasure.tag(), self.excluded_by_measure),
            (Rejection::ExcludedByCategory.tag(), self.excluded_by_category),
            ("invalid-value", self.invalid_value),
            ("duplicate", self.duplicates),
            ("zero-value", self.excluded_zero),
        ]
    }
}

/// Records produced for one dataset plus its counters.
#[derive(Debug, Clone, Default)]
pub struct DatasetOutcome {
    pub records: Vec<Record>,
    pub stats: DatasetStats,
}

/// Resolve the term set for `dataset`, then run the engine over `rows`.
///
/// A missing or malformed term-mapping file fails the dataset.
pub fn transform_dataset<I, R>(
    dataset: &Dataset,
    rows: I,
    term: &str,
    reporter: &dyn Reporter,
) -> ConfigResult<DatasetOutcome>
where
    I: IntoIterator<Item = R>,
    R: Fields,
{
    let terms = TermSet::resolve(term, dataset.term_mapping.as_deref())?;
    if terms.len() > 1 {
        log_info_indent(
            reporter,
            format!("Term '{}' matches: {}", term, terms.selectors().join(", ")),
            1,
        );
    }
    Ok(transform_rows(dataset, rows, &terms, reporter))
}

/// Run the engine with an already resolved term set.
pub fn transform_rows<I, R>(
    dataset: &Dataset,
    rows: I,
    terms: &TermSet,
    reporter: &dyn Reporter,
) -> DatasetOutcome
where
    I: IntoIterator<Item = R>,
    R: Fields,
{
    let rules = DatasetRules::new(dataset);
    let filter = RowFilter::new(dataset, &rules, terms);
    let mut stats = DatasetStats::default();
    let mut records = Vec::new();

    for row in rows {
        stats.rows_read += 1;

        if let Err(reason) = filter.check(&row) {
            stats.reject(reason);
            continue;
        }

        match build_record(&row, dataset, &rules, terms) {
            Ok(mut record) => {
                normalize_units(&mut record);
                records.push(record);
            }
            Err(_) => stats.invalid_value += 1,
        }
    }

    let before = records.len();
    let mut records = deduplicate(records);
    stats.duplicates = before - records.len();

    convert_percentages(&mut records);

    if dataset.exclude_zero_values {
        let before = records.len();
        records.retain(|r| !r.value.is_some_and(|v| v.is_zero()));
        stats.excluded_zero = before - records.len();
    }

    sort_records(&mut records);
    stats.included = records.len();

    report_stats(dataset, &stats, reporter);

    DatasetOutcome { records, stats }
}

fn report_stats(dataset: &Dataset, stats: &DatasetStats, reporter: &dyn Reporter) {
    log_info(reporter, format!("Processing '{}'", dataset.source));
    log_info_indent(reporter, format!("{} rows read", stats.rows_read), 1);

    for (tag, count) in stats.counters() {
        if count > 0 {
            log_info_indent(reporter, format!("{} {}", count, tag), 1);
        }
    }

    if stats.included == 0 {
        log_error(reporter, "0 records included");
    } else {
        log_success(reporter, format!("{} records included", stats.included));
    }
}
