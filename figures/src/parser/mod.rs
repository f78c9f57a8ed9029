//! CSV parsing with encoding and delimiter auto-detection.
//!
//! Produces a [`Table`] whose rows are looked up by column name, ignoring
//! header case: source files drift between `"Territorial Authority"` and
//! `"Territorial authority"` across editions.

use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{CsvError, CsvResult};

/// Named-field access to one raw row.
pub trait Fields {
    /// Trimmed value of `column`, `None` if the column is absent or the field empty.
    fn field(&self, column: &str) -> Option<&str>;
}

impl Fields for HashMap<String, String> {
    fn field(&self, column: &str) -> Option<&str> {
        let column = column.to_lowercase();
        self.iter()
            .find(|(k, _)| k.trim().to_lowercase() == column)
            .map(|(_, v)| v.trim())
            .filter(|v| !v.is_empty())
    }
}

/// A parsed CSV file.
#[derive(Debug, Clone)]
pub struct Table {
    /// Column headers as they appear in the file
    pub headers: Vec<String>,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
    /// Number of records the reader could not parse
    pub skipped: usize,
    index: HashMap<String, usize>,
    records: Vec<StringRecord>,
}

/// One row of a [`Table`].
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    index: &'a HashMap<String, usize>,
    record: &'a StringRecord,
}

impl<'a> Row<'a> {
    /// Field by column name; short rows read missing fields as `None`.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let i = *self.index.get(&column.trim().to_lowercase())?;
        self.record.get(i).map(str::trim).filter(|v| !v.is_empty())
    }
}

impl Fields for Row<'_> {
    fn field(&self, column: &str) -> Option<&str> {
        self.get(column)
    }
}

impl Table {
    /// Number of data rows
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate rows in file order
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> + '_ {
        self.records.iter().map(move |record| Row {
            index: &self.index,
            record,
        })
    }

    /// Whether a column exists (case-insensitive)
    pub fn has_column(&self, column: &str) -> bool {
        self.index.contains_key(&column.trim().to_lowercase())
    }
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse CSV text with an explicit delimiter.
///
/// Rows with more or fewer fields than the header are kept; records the
/// reader rejects are counted in [`Table::skipped`].
pub fn parse_str(content: &str, delimiter: char) -> CsvResult<Table> {
    if content.trim().is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(CsvError::NoHeaders);
    }

    let mut index = HashMap::new();
    for (i, header) in headers.iter().enumerate() {
        // First occurrence wins for duplicated headers.
        index.entry(header.to_lowercase()).or_insert(i);
    }

    let mut records = Vec::new();
    let mut skipped = 0;
    for result in reader.records() {
        match result {
            Ok(record) if record.iter().all(|f| f.is_empty()) => {}
            Ok(record) => records.push(record),
            Err(_) => skipped += 1,
        }
    }

    Ok(Table {
        headers,
        encoding: "utf-8".to_string(),
        delimiter,
        skipped,
        index,
        records,
    })
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> CsvResult<Table> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = detect_delimiter(&content);

    let mut table = parse_str(&content, delimiter)?;
    table.encoding = encoding;
    Ok(table)
}

/// Parse a CSV file with auto-detection of encoding and delimiter.
pub fn parse_csv_file_auto<P: AsRef<Path>>(path: P) -> CsvResult<Table> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes_auto(&bytes)
}
