//! Flat CSV output, one row per record.

use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

use crate::error::RenderResult;
use crate::models::Record;

#[derive(Debug, Serialize)]
struct Row<'a> {
    #[serde(rename = "Territorial Authority")]
    selector: &'a str,
    #[serde(rename = "Topic")]
    parent: Option<&'a str>,
    #[serde(rename = "Measure")]
    measure: String,
    #[serde(rename = "Category")]
    category: String,
    #[serde(rename = "Value")]
    value: Option<String>,
    #[serde(rename = "ValueUnit")]
    value_unit: Option<&'a str>,
    #[serde(rename = "ValueLabel")]
    value_label: Option<&'a str>,
    #[serde(rename = "NullReason")]
    null_reason: Option<&'a str>,
    #[serde(rename = "Date")]
    date: Option<&'a str>,
    #[serde(rename = "DateLabel")]
    date_label: Option<&'a str>,
    #[serde(rename = "Source")]
    source: String,
}

impl<'a> From<&'a Record> for Row<'a> {
    fn from(r: &'a Record) -> Self {
        Self {
            selector: &r.selector,
            parent: r.parent.as_deref(),
            measure: r.measure_formatted(),
            category: r.category_formatted(),
            value: r.value.map(format_value),
            value_unit: r.value_unit.as_deref(),
            value_label: r.value_label.as_deref(),
            null_reason: r.null_reason.as_deref(),
            date: r.date.as_deref(),
            date_label: r.date_label.as_deref(),
            source: r.source_formatted(),
        }
    }
}

/// Exact decimal text without trailing zeros.
fn format_value(value: Decimal) -> String {
    value.normalize().to_string()
}

/// Header row, also written when there are no records.
pub const HEADERS: [&str; 11] = [
    "Territorial Authority",
    "Topic",
    "Measure",
    "Category",
    "Value",
    "ValueUnit",
    "ValueLabel",
    "NullReason",
    "Date",
    "DateLabel",
    "Source",
];

pub fn write_csv<W: Write>(records: &[Record], writer: W) -> RenderResult<()> {
    let mut out = ::csv::WriterBuilder::new().has_headers(false).from_writer(writer);

    out.write_record(HEADERS)?;
    for record in records {
        out.serialize(Row::from(record))?;
    }
    out.flush()?;
    Ok(())
}
