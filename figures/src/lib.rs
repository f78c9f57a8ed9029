//! # Fundamental Figures - per-region fact sheets from statistical CSVs
//!
//! Turns a declarative figure configuration plus the raw dataset files it
//! names into one filtered, deduplicated, normalized and ordered record set
//! for a single query term (usually a region).
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Source    │────▶│   Parser    │────▶│   Engine    │────▶│  Renderer   │
//! │ (http/file) │     │  (auto-enc) │     │ (8 stages)  │     │ json/csv/md │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use figures::{figure_to_records, ConsoleReporter, Figure, RunOptions};
//!
//! #[tokio::main]
//! async fn main() {
//!     let figure = Figure::load("figure.json").unwrap();
//!     let records = figure_to_records(&figure, "Auckland", RunOptions::default(), &ConsoleReporter)
//!         .await
//!         .unwrap();
//!     println!("{} records", records.len());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`config`] - Figure, dataset and column configuration
//! - [`models`] - Output records and their dimensions
//! - [`parser`] - CSV parsing with auto-detection
//! - [`source`] - Download and cache of dataset sources
//! - [`transform`] - Engine stages and pipeline
//! - [`render`] - JSON, CSV, spreadsheet and front-matter output
//! - [`report`] - Progress and diagnostics reporting

// Core modules
pub mod config;
pub mod error;
pub mod models;
pub mod report;

// Input
pub mod parser;
pub mod source;

// Transformation
pub mod transform;

// Output
pub mod render;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigError, ConfigResult, CsvError, CsvResult, PipelineError, PipelineResult, RenderError,
    RenderResult, SourceError, SourceResult,
};

// =============================================================================
// Re-exports - Configuration & Models
// =============================================================================

pub use config::{Column, Dataset, Figure, Include, DEFAULT_SEPARATOR};
pub use models::{Dimension, Dimensions, Record};

// =============================================================================
// Re-exports - Reporting
// =============================================================================

pub use report::{ConsoleReporter, LogEntry, LogLevel, MemoryReporter, NullReporter, Reporter};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    decode_content, detect_delimiter, detect_encoding, parse_bytes_auto, parse_csv_file_auto,
    parse_str, Fields, Row, Table,
};

// =============================================================================
// Re-exports - Source
// =============================================================================

pub use source::{HttpFile, SourceFetcher};

// =============================================================================
// Re-exports - Engine & Pipeline
// =============================================================================

pub use transform::{
    figure_to_records, transform_csv_file, transform_dataset, transform_rows, DatasetOutcome,
    DatasetStats, Rejection, RunOptions, TermMapping, TermSet,
};

// =============================================================================
// Re-exports - Rendering
// =============================================================================

pub use render::{render, render_to_file, Format};
