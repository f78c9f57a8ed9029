//! Figure and dataset configuration.
//!
//! A figure file lists the datasets that make up one fact sheet. Each dataset
//! names its source, the selector column and the measure/category columns with
//! their include and exclude rules.
//!
//! ```json
//! {
//!   "datasets": [{
//!     "source": "https://figure.nz/table/abc/download",
//!     "parent": "Population",
//!     "measure": [{ "name": "Measure", "include": [{ "value": "Population" }] }],
//!     "category": [{ "name": "Sex", "include": [
//!       { "value": "Male", "convertToPercentage": true },
//!       { "value": "Female", "convertToPercentage": true }
//!     ]}]
//!   }]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult};

/// A complete fact-sheet configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Figure {
    /// Datasets, processed and concatenated in this order
    #[serde(default)]
    pub datasets: Vec<Dataset>,

    /// Directory downloaded source files are cached in
    #[serde(default = "default_input_path")]
    pub input_path: PathBuf,

    /// Directory rendered output is written to
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
}

fn default_input_path() -> PathBuf {
    PathBuf::from("./csv")
}

fn default_output_path() -> PathBuf {
    PathBuf::from("./output")
}

/// One data source and the rules for turning its rows into records.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    /// Location of the raw data (http(s) URI or local path)
    #[serde(alias = "uri")]
    pub source: String,

    /// Grouping label for presentation
    #[serde(default)]
    pub parent: Option<String>,

    /// Column identifying the queryable entity
    #[serde(default = "default_selector", alias = "discriminator")]
    pub selector: String,

    /// Measure dimensions, in declaration order
    #[serde(default, alias = "measures")]
    pub measure: Vec<Column>,

    /// Category dimensions, in declaration order
    #[serde(default, alias = "categories")]
    pub category: Vec<Column>,

    #[serde(default = "default_value")]
    pub value: String,

    #[serde(default = "default_value_unit")]
    pub value_unit: String,

    #[serde(default = "default_value_label")]
    pub value_label: String,

    #[serde(default = "default_null_reason")]
    pub null_reason: String,

    #[serde(default = "default_date")]
    pub date: String,

    /// Accept every row when this equals the query term
    #[serde(default, alias = "term")]
    pub all_selectors_match_term: Option<String>,

    /// JSON table of term → selector aliases
    #[serde(default, alias = "term-mapping")]
    pub term_mapping: Option<PathBuf>,

    /// Drop records whose final value is exactly zero
    #[serde(default, alias = "exclude-zero-values")]
    pub exclude_zero_values: bool,
}

fn default_selector() -> String {
    "Territorial Authority".to_string()
}

fn default_value() -> String {
    "Value".to_string()
}

fn default_value_unit() -> String {
    "Value Unit".to_string()
}

fn default_value_label() -> String {
    "Value Label".to_string()
}

fn default_null_reason() -> String {
    "Null Reason".to_string()
}

fn default_date() -> String {
    "Year".to_string()
}

/// A measure or category dimension.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Source column to read
    #[serde(alias = "column")]
    pub name: String,

    /// Inserted between this dimension and the next in a formatted label
    #[serde(default = "default_separator")]
    pub separator: String,

    /// Allow-list; order drives output ordering
    #[serde(default)]
    pub include: Vec<Include>,

    /// Raw values rejected outright
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Separator used when a column does not configure one.
pub const DEFAULT_SEPARATOR: &str = " — ";

fn default_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}

/// An allow-list entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Include {
    pub value: String,

    /// Display label substituted for the raw value
    #[serde(default)]
    pub label: Option<String>,

    #[serde(default, alias = "convert-to-percentage")]
    pub convert_to_percentage: bool,
}

impl Figure {
    /// Parse a figure from a JSON string
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a figure file from disk
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|error| ConfigError::Read {
            path: path.to_path_buf(),
            error,
        })?;
        serde_json::from_str(&content).map_err(|error| ConfigError::Json {
            path: path.to_path_buf(),
            error,
        })
    }

    /// Get a dataset by position
    pub fn dataset(&self, index: usize) -> ConfigResult<&Dataset> {
        self.datasets.get(index).ok_or(ConfigError::DatasetNotFound {
            index,
            count: self.datasets.len(),
        })
    }
}

impl Dataset {
    /// Create a dataset with default column names and no dimensions
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            parent: None,
            selector: default_selector(),
            measure: Vec::new(),
            category: Vec::new(),
            value: default_value(),
            value_unit: default_value_unit(),
            value_label: default_value_label(),
            null_reason: default_null_reason(),
            date: default_date(),
            all_selectors_match_term: None,
            term_mapping: None,
            exclude_zero_values: false,
        }
    }

    /// Set the parent label
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Add a measure dimension
    pub fn with_measure(mut self, column: Column) -> Self {
        self.measure.push(column);
        self
    }

    /// Add a category dimension
    pub fn with_category(mut self, column: Column) -> Self {
        self.category.push(column);
        self
    }

    /// Whether every row is accepted for `term`
    pub fn all_selectors_match(&self, term: &str) -> bool {
        self.all_selectors_match_term
            .as_deref()
            .is_some_and(|t| t.to_lowercase() == term.to_lowercase())
    }

    /// All source columns this dataset reads
    pub fn source_columns(&self) -> Vec<&str> {
        let mut columns = vec![self.selector.as_str()];
        columns.extend(self.measure.iter().map(|c| c.name.as_str()));
        columns.extend(self.category.iter().map(|c| c.name.as_str()));
        columns.extend([
            self.value.as_str(),
            self.value_unit.as_str(),
            self.value_label.as_str(),
            self.null_reason.as_str(),
            self.date.as_str(),
        ]);
        columns
    }

    /// Source columns absent from `headers` (case-insensitive)
    pub fn missing_columns(&self, headers: &[String]) -> Vec<String> {
        let headers: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
        self.source_columns()
            .into_iter()
            .filter(|col| !headers.contains(&col.to_lowercase()))
            .map(String::from)
            .collect()
    }
}

impl Column {
    /// Create a column with no include or exclude rules
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            separator: default_separator(),
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }

    /// Append an include entry
    pub fn include(mut self, entry: Include) -> Self {
        self.include.push(entry);
        self
    }

    /// Append an excluded raw value
    pub fn exclude(mut self, value: impl Into<String>) -> Self {
        self.exclude.push(value.into());
        self
    }

    /// Set the separator
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }
}

impl Include {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: None,
            convert_to_percentage: false,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn as_percentage(mut self) -> Self {
        self.convert_to_percentage = true;
        self
    }
}
