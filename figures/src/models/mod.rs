//! Domain models for the Fundamental Figures pipeline.
//!
//! - [`Record`] - One output row for a query term
//! - [`Dimensions`] - Ordered measure or category values of a record
//! - [`Dimension`] - One configured column's value on a record

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

// =============================================================================
// Dimensions
// =============================================================================

/// One measure or category column's value on a record.
#[derive(Debug, Clone, PartialEq)]
pub struct Dimension {
    /// Configured column name.
    pub column: String,
    /// Declaration position within the measure or category list.
    pub index: usize,
    /// Raw value read from the row (`None` when empty or absent).
    pub raw: Option<String>,
    /// Display label from the matched include entry.
    pub label: Option<String>,
    /// Position of the raw value in the column's include list.
    pub rank: Option<usize>,
    /// Inserted between this dimension and the next when formatting.
    pub separator: String,
}

impl Dimension {
    /// Label if present, otherwise the raw value.
    pub fn display(&self) -> Option<&str> {
        self.label.as_deref().or(self.raw.as_deref())
    }
}

/// Ordered dimension values keyed by configured column name.
///
/// The key set is fixed by the dataset configuration, so lookups are a short
/// linear scan in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dimensions(Vec<Dimension>);

impl Dimensions {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a dimension; callers push in declaration order.
    pub fn push(&mut self, dimension: Dimension) {
        self.0.push(dimension);
    }

    /// Look up a dimension by column name (case-insensitive).
    pub fn get(&self, column: &str) -> Option<&Dimension> {
        let column = column.to_lowercase();
        self.0.iter().find(|d| d.column.to_lowercase() == column)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Dimension> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Separator-joined display values, in declaration order.
    ///
    /// Dimensions with no value are skipped, together with their separator.
    pub fn formatted(&self) -> String {
        let mut parts = self
            .0
            .iter()
            .filter_map(|d| d.display().filter(|v| !v.trim().is_empty()).map(|v| (v, d)))
            .peekable();

        let mut out = String::new();
        while let Some((value, dimension)) = parts.next() {
            out.push_str(value);
            if parts.peek().is_some() {
                out.push_str(&dimension.separator);
            }
        }
        out
    }
}

impl<'a> IntoIterator for &'a Dimensions {
    type Item = &'a Dimension;
    type IntoIter = std::slice::Iter<'a, Dimension>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// =============================================================================
// Record
// =============================================================================

/// One resolved output row.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Presentation group, carried from the dataset.
    pub parent: Option<String>,
    /// Dataset source URI, carried from the dataset.
    pub source: String,
    /// Entity label, prefixed with the term when matched through an alias.
    pub selector: String,
    pub measures: Dimensions,
    pub categories: Dimensions,
    /// `None` when the source reports no value (see `null_reason`).
    pub value: Option<Decimal>,
    pub value_unit: Option<String>,
    pub value_label: Option<String>,
    pub null_reason: Option<String>,
    pub date: Option<String>,
    /// Name of the dataset's date column.
    pub date_label: Option<String>,
    /// Set when any matched include entry asked for percentage conversion.
    pub convert_to_percentage: bool,
}

impl Record {
    /// Formatted measure label, e.g. `"Population — Usually resident"`.
    pub fn measure_formatted(&self) -> String {
        self.measures.formatted()
    }

    /// Formatted category label.
    pub fn category_formatted(&self) -> String {
        self.categories.formatted()
    }

    /// Source URI without its `/download` segment.
    pub fn source_formatted(&self) -> String {
        DOWNLOAD_SEGMENT.replace_all(&self.source, "").into_owned()
    }
}

static DOWNLOAD_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)/download").expect("valid regex"));

// =============================================================================
// Tests
// =============================================================================
