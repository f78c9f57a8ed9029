//! Error types for the Fundamental Figures pipeline.
//!
//! This module defines one error type per concern:
//!
//! - [`ConfigError`] - Figure file and term-mapping errors
//! - [`CsvError`] - CSV decoding and parsing errors
//! - [`SourceError`] - Dataset download / cache errors
//! - [`RenderError`] - Output rendering errors
//! - [`PipelineError`] - Top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::path::PathBuf;

use thiserror::Error;

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while loading a figure configuration or a term-mapping table.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a configuration file.
    #[error("Failed to read '{path}': {error}")]
    Read {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// Configuration file is not valid JSON for the expected shape.
    #[error("Invalid JSON in '{path}': {error}")]
    Json {
        path: PathBuf,
        #[source]
        error: serde_json::Error,
    },

    /// Figure JSON supplied inline could not be parsed.
    #[error("Invalid figure configuration: {0}")]
    Figure(#[from] serde_json::Error),

    /// A dataset index that does not exist in the figure.
    #[error("Dataset #{index} not found ({count} datasets configured)")]
    DatasetNotFound { index: usize, count: usize },
}

// =============================================================================
// CSV Parsing Errors
// =============================================================================

/// Errors during CSV parsing.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to decode the file content.
    #[error("Failed to decode content: {0}")]
    EncodingError(String),

    /// Invalid CSV format.
    #[error("Invalid CSV format: {0}")]
    ParseError(#[from] csv::Error),

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in CSV")]
    NoHeaders,
}

// =============================================================================
// Source Errors
// =============================================================================

/// Errors while locating or downloading a dataset source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// HTTP request could not be sent or the body could not be read.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The source is not a valid URI.
    #[error("Invalid source URI '{0}'")]
    InvalidUri(String),

    /// Server answered with an unexpected status.
    #[error("Response for '{uri}' failed with '{status}'")]
    Status { uri: String, status: String },

    /// A redirect response did not carry a usable `Location` header.
    #[error("Redirect from '{0}' has no usable Location header")]
    MissingLocation(String),

    /// Redirect chain did not settle.
    #[error("Too many redirects while resolving '{0}'")]
    TooManyRedirects(String),

    /// Local source file does not exist.
    #[error("Source file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Writing the cached file failed.
    #[error("Cache IO error: {0}")]
    IoError(#[from] std::io::Error),
}

// =============================================================================
// Render Errors
// =============================================================================

/// Errors while writing the record set to an output format.
#[derive(Debug, Error)]
pub enum RenderError {
    /// IO error.
    #[error("Render IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV writer error.
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Spreadsheet writer error.
    #[error("XLSX error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the main error type returned by
/// [`crate::transform::pipeline::figure_to_records`]. It wraps all
/// lower-level errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// CSV parsing error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Source acquisition error.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Render error.
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// A dataset failed; carries the dataset source for context.
    #[error("Dataset '{uri}' failed: {error}")]
    Dataset {
        uri: String,
        #[source]
        error: Box<PipelineError>,
    },
}

impl PipelineError {
    /// Attach the dataset source to an error raised while processing it.
    pub fn in_dataset(self, uri: impl Into<String>) -> Self {
        PipelineError::Dataset {
            uri: uri.into(),
            error: Box::new(self),
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // CsvError -> PipelineError
        let csv_err = CsvError::EmptyFile;
        let pipeline_err: PipelineError = csv_err.into();
        assert!(pipeline_err.to_string().contains("empty"));

        // SourceError -> PipelineError
        let source_err = SourceError::MissingLocation("https://figure.nz/table/abc".into());
        let pipeline_err: PipelineError = source_err.into();
        assert!(pipeline_err.to_string().contains("figure.nz/table/abc"));
    }

    #[test]
    fn test_dataset_context() {
        let err = PipelineError::from(CsvError::NoHeaders).in_dataset("https://figure.nz/x/download");
        let msg = err.to_string();
        assert!(msg.contains("https://figure.nz/x/download"));
        assert!(msg.contains("No headers"));
    }

    #[test]
    fn test_config_error_format() {
        let err = ConfigError::DatasetNotFound { index: 4, count: 2 };
        let msg = err.to_string();
        assert!(msg.contains("#4"));
        assert!(msg.contains("2 datasets"));
    }
}
