//! Output renderers.
//!
//! - [`json`] - records grouped `parent → measure → category`
//! - [`csv`] - one flat row per record
//! - [`xlsx`] - a workbook with one worksheet per parent
//! - [`jekyll`] - a front-matter page pointing at a data file of the same name

pub mod csv;
pub mod jekyll;
pub mod json;
pub mod xlsx;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::RenderResult;
use crate::models::Record;
use crate::report::{log_success, Reporter};

/// Output format selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Format {
    #[default]
    Json,
    Csv,
    Xlsx,
    Jekyll,
}

impl Format {
    /// File extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Csv => "csv",
            Format::Xlsx => "xlsx",
            Format::Jekyll => "md",
        }
    }

    /// Default output file for `term` under `output_dir`.
    pub fn default_path(&self, output_dir: &Path, term: &str) -> PathBuf {
        output_dir.join(format!("{}.{}", term, self.extension()))
    }
}

/// Render `records` into `writer`.
///
/// `path` only matters for [`Format::Jekyll`], whose front matter names the
/// data file after the output's stem.
pub fn render<W: Write>(records: &[Record], format: Format, path: &Path, writer: W) -> RenderResult<()> {
    match format {
        Format::Json => json::write_json(records, writer),
        Format::Csv => csv::write_csv(records, writer),
        Format::Xlsx => xlsx::write_xlsx(records, writer),
        Format::Jekyll => jekyll::write_front_matter(&jekyll::data_name(path), writer),
    }
}

/// Render `records` to `path`, creating parent directories as needed.
pub fn render_to_file(
    records: &[Record],
    format: Format,
    path: &Path,
    reporter: &dyn Reporter,
) -> RenderResult<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    render(records, format, path, &mut writer)?;
    writer.flush()?;

    log_success(reporter, format!("Wrote '{}'", path.display()));
    Ok(path.to_path_buf())
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::models::{Dimension, Dimensions, Record};
    use rust_decimal::Decimal;

    fn dims(column: &str, raw: &str, label: Option<&str>) -> Dimensions {
        let mut d = Dimensions::new();
        d.push(Dimension {
            column: column.into(),
            index: 0,
            raw: Some(raw.into()),
            label: label.map(String::from),
            rank: Some(0),
            separator: " — ".into(),
        });
        d
    }

    pub fn record(parent: &str, measure: &str, category: &str, value: Option<Decimal>) -> Record {
        Record {
            parent: Some(parent.into()),
            source: "https://figure.nz/table/abc/download".into(),
            selector: "Auckland".into(),
            measures: dims("Measure", measure, None),
            categories: dims("Sex", category, None),
            value,
            value_unit: Some("number".into()),
            value_label: Some("Number of people".into()),
            null_reason: None,
            date: Some("2020".into()),
            date_label: Some("Year".into()),
            convert_to_percentage: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{LogLevel, MemoryReporter};
    use rust_decimal::Decimal;

    #[test]
    fn test_default_path() {
        let path = Format::Csv.default_path(Path::new("./output"), "Auckland");
        assert_eq!(path, Path::new("./output/Auckland.csv"));
        assert_eq!(Format::Jekyll.extension(), "md");
        assert_eq!(Format::default(), Format::Json);
    }

    #[test]
    fn test_render_to_file_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("Auckland.json");
        let records = vec![fixtures::record("Population", "Population", "Male", Some(Decimal::from(5)))];
        let reporter = MemoryReporter::new();

        let written = render_to_file(&records, Format::Json, &path, &reporter).unwrap();
        assert_eq!(written, path);

        let content = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert!(value.get("Population").is_some());
        assert!(reporter.contains(LogLevel::Success, "Wrote"));
    }

    #[test]
    fn test_render_xlsx_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = Format::Xlsx.default_path(dir.path(), "Auckland");
        let records = vec![fixtures::record("Population", "Population", "Male", Some(Decimal::from(5)))];

        render_to_file(&records, Format::Xlsx, &path, &MemoryReporter::new()).unwrap();

        assert!(path.ends_with("Auckland.xlsx"));
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_render_jekyll_uses_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Auckland.md");

        render_to_file(&[], Format::Jekyll, &path, &MemoryReporter::new()).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "---\ndata: Auckland\n---\n\n");
    }
}
