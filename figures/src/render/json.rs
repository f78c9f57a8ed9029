//! Hierarchical JSON output.
//!
//! ```json
//! {
//!   "Population": {
//!     "Population count": {
//!       "Male": [ { "selector": "Auckland", "value": 100.0, ... } ]
//!     }
//!   }
//! }
//! ```
//!
//! Keys keep the order in which they first appear in the record list.

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};
use std::io::Write;

use crate::error::RenderResult;
use crate::models::Record;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Entry<'a> {
    selector: &'a str,
    #[serde(with = "rust_decimal::serde::float_option")]
    value: Option<Decimal>,
    value_unit: Option<&'a str>,
    value_label: Option<&'a str>,
    null_reason: Option<&'a str>,
    date: Option<&'a str>,
    date_label: Option<&'a str>,
    source: String,
}

impl<'a> From<&'a Record> for Entry<'a> {
    fn from(r: &'a Record) -> Self {
        Self {
            selector: &r.selector,
            value: r.value,
            value_unit: r.value_unit.as_deref(),
            value_label: r.value_label.as_deref(),
            null_reason: r.null_reason.as_deref(),
            date: r.date.as_deref(),
            date_label: r.date_label.as_deref(),
            source: r.source_formatted(),
        }
    }
}

/// Group records into the nested JSON document.
pub fn to_json_value(records: &[Record]) -> RenderResult<Value> {
    let mut root = Value::Object(Map::new());

    for record in records {
        let parent = record.parent.clone().unwrap_or_default();
        let entry = serde_json::to_value(Entry::from(record))?;

        // Missing intermediate keys are created as objects.
        let slot = &mut root[parent][record.measure_formatted()][record.category_formatted()];
        match slot {
            Value::Array(list) => list.push(entry),
            _ => *slot = Value::Array(vec![entry]),
        }
    }

    Ok(root)
}

/// Write the grouped document as pretty-printed JSON.
pub fn write_json<W: Write>(records: &[Record], writer: W) -> RenderResult<()> {
    let value = to_json_value(records)?;
    serde_json::to_writer_pretty(writer, &value)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::fixtures::record;

    #[test]
    fn test_grouping_and_order() {
        let records = vec![
            record("Population", "Population count", "Male", Some(Decimal::from(100))),
            record("Population", "Population count", "Female", Some(Decimal::from(90))),
            record("Income", "Median income", "Male", None),
        ];
        let value = to_json_value(&records).unwrap();

        let parents: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(parents, vec!["Population", "Income"]);

        let categories: Vec<&String> = value["Population"]["Population count"]
            .as_object()
            .unwrap()
            .keys()
            .collect();
        assert_eq!(categories, vec!["Male", "Female"]);

        let male = &value["Population"]["Population count"]["Male"][0];
        assert_eq!(male["selector"], "Auckland");
        assert_eq!(male["value"].as_f64(), Some(100.0));
        assert_eq!(male["valueUnit"], "number");
        assert_eq!(male["dateLabel"], "Year");
        assert_eq!(male["source"], "https://figure.nz/table/abc");

        assert!(value["Income"]["Median income"]["Male"][0]["value"].is_null());
    }

    #[test]
    fn test_values_are_numbers() {
        let records = vec![record("Population", "Population count", "Male", Some(Decimal::new(125, 1)))];
        let value = to_json_value(&records).unwrap();

        let entry = &value["Population"]["Population count"]["Male"][0]["value"];
        assert!(entry.is_number());
        assert_eq!(entry.as_f64(), Some(12.5));
    }

    #[test]
    fn test_same_key_appends() {
        let mut second = record("Population", "Population count", "Male", Some(Decimal::from(7)));
        second.selector = "Auckland — Waitemata".into();
        let records = vec![
            record("Population", "Population count", "Male", Some(Decimal::from(100))),
            second,
        ];
        let value = to_json_value(&records).unwrap();

        let list = value["Population"]["Population count"]["Male"].as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1]["selector"], "Auckland — Waitemata");
    }

    #[test]
    fn test_write_json() {
        let mut buf = Vec::new();
        write_json(&[], &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "{}");
    }
}
