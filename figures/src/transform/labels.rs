//! Turns an accepted raw row into a [`Record`].
//!
//! Substitutes include-list labels, ORs the percentage flag across all
//! matched dimensions, and prefixes alias-matched selectors with the term.

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::config::Dataset;
use crate::models::{Dimension, Dimensions, Record};
use crate::parser::Fields;

use super::filter::{ColumnRules, DatasetRules};
use super::terms::TermSet;

/// Value column text that is not a number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidValue(pub String);

/// Parse a value cell; empty is `None`, non-numeric text is an error.
pub fn parse_value(raw: Option<&str>) -> Result<Option<Decimal>, InvalidValue> {
    let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map(Some)
        .map_err(|_| InvalidValue(raw.to_string()))
}

/// Build a record from a row that passed [`super::filter::RowFilter`].
pub fn build_record<R: Fields>(
    row: &R,
    dataset: &Dataset,
    rules: &DatasetRules,
    terms: &TermSet,
) -> Result<Record, InvalidValue> {
    let value = parse_value(row.field(&dataset.value))?;

    let mut convert_to_percentage = false;
    let measures = resolve_dimensions(row, &rules.measures, &mut convert_to_percentage);
    let categories = resolve_dimensions(row, &rules.categories, &mut convert_to_percentage);

    let raw_selector = row.field(&dataset.selector).unwrap_or_default();
    let selector = if terms.is_exact(raw_selector) {
        raw_selector.to_string()
    } else {
        format!("{} — {}", terms.term(), raw_selector)
    };

    Ok(Record {
        parent: dataset.parent.clone(),
        source: dataset.source.clone(),
        selector,
        measures,
        categories,
        value,
        value_unit: owned(row.field(&dataset.value_unit)),
        value_label: owned(row.field(&dataset.value_label)),
        null_reason: owned(row.field(&dataset.null_reason)),
        date: owned(row.field(&dataset.date)),
        date_label: Some(dataset.date.clone()),
        convert_to_percentage,
    })
}

fn resolve_dimensions<R: Fields>(row: &R, columns: &[ColumnRules], convert: &mut bool) -> Dimensions {
    let mut dimensions = Dimensions::new();

    for (index, column) in columns.iter().enumerate() {
        let raw = row.field(&column.name);
        let matched = column.lookup(raw);

        if let Some((_, entry)) = matched {
            *convert |= entry.convert_to_percentage;
        }

        dimensions.push(Dimension {
            column: column.name.clone(),
            index,
            raw: owned(raw),
            label: matched
                .and_then(|(_, entry)| entry.label.as_deref())
                .filter(|l| !l.trim().is_empty())
                .map(String::from),
            rank: matched.map(|(rank, _)| rank),
            separator: column.separator.clone(),
        });
    }

    dimensions
}

fn owned(value: Option<&str>) -> Option<String> {
    value.map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Column, Include};
    use std::collections::HashMap;

    fn row(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn dataset() -> Dataset {
        Dataset::new("https://figure.nz/table/abc/download")
            .with_parent("Population")
            .with_measure(
                Column::new("Measure")
                    .include(Include::new("Pop").with_label("Population"))
                    .with_separator(" by "),
            )
            .with_measure(Column::new("Group"))
            .with_category(
                Column::new("Sex")
                    .include(Include::new("Male").as_percentage())
                    .include(Include::new("Female").with_label(" ")),
            )
    }

    #[test]
    fn test_labels_and_flag() {
        let dataset = dataset();
        let rules = DatasetRules::new(&dataset);
        let terms = TermSet::new("Auckland");
        let r = row(&[
            ("Territorial Authority", "Auckland"),
            ("Measure", "pop"),
            ("Group", "Resident"),
            ("Sex", "Male"),
            ("Value", "1200"),
            ("Value Unit", "number"),
            ("Year", "2020"),
        ]);

        let record = build_record(&r, &dataset, &rules, &terms).unwrap();
        assert_eq!(record.selector, "Auckland");
        assert_eq!(record.measure_formatted(), "Population by Resident");
        assert_eq!(record.category_formatted(), "Male");
        assert!(record.convert_to_percentage);
        assert_eq!(record.value, Some(Decimal::from(1200)));
        assert_eq!(record.date.as_deref(), Some("2020"));
        assert_eq!(record.date_label.as_deref(), Some("Year"));
        assert_eq!(record.parent.as_deref(), Some("Population"));
        assert_eq!(record.measures.get("Measure").unwrap().rank, Some(0));
        assert_eq!(record.measures.get("Group").unwrap().rank, None);
    }

    #[test]
    fn test_blank_label_ignored() {
        let dataset = dataset();
        let rules = DatasetRules::new(&dataset);
        let terms = TermSet::new("Auckland");
        let r = row(&[("Territorial Authority", "Auckland"), ("Measure", "Pop"), ("Sex", "female")]);

        let record = build_record(&r, &dataset, &rules, &terms).unwrap();
        assert_eq!(record.category_formatted(), "female");
        assert!(!record.convert_to_percentage);
        assert_eq!(record.value, None);
    }

    #[test]
    fn test_alias_selector_prefixed() {
        let dataset = dataset();
        let rules = DatasetRules::new(&dataset);
        let mapping = crate::transform::terms::TermMapping::new([("Auckland", vec!["Waitemata"])]);
        let terms = TermSet::with_mapping("Auckland", &mapping);
        let r = row(&[("Territorial Authority", "Waitemata"), ("Measure", "Pop"), ("Sex", "Male")]);

        let record = build_record(&r, &dataset, &rules, &terms).unwrap();
        assert_eq!(record.selector, "Auckland — Waitemata");
    }

    #[test]
    fn test_all_selectors_match_prefixed() {
        let mut dataset = dataset();
        dataset.all_selectors_match_term = Some("New Zealand".into());
        let rules = DatasetRules::new(&dataset);
        let terms = TermSet::new("New Zealand");
        let r = row(&[("Territorial Authority", "Total NZ"), ("Measure", "Pop"), ("Sex", "Male")]);

        let record = build_record(&r, &dataset, &rules, &terms).unwrap();
        assert_eq!(record.selector, "New Zealand — Total NZ");
    }

    #[test]
    fn test_exact_match_case_insensitive_unmodified() {
        let dataset = dataset();
        let rules = DatasetRules::new(&dataset);
        let terms = TermSet::new("auckland");
        let r = row(&[("Territorial Authority", "Auckland"), ("Measure", "Pop"), ("Sex", "Male")]);

        let record = build_record(&r, &dataset, &rules, &terms).unwrap();
        assert_eq!(record.selector, "Auckland");
    }

    #[test]
    fn test_invalid_value() {
        let dataset = dataset();
        let rules = DatasetRules::new(&dataset);
        let terms = TermSet::new("Auckland");
        let r = row(&[("Territorial Authority", "Auckland"), ("Measure", "Pop"), ("Value", "n/a")]);

        let err = build_record(&r, &dataset, &rules, &terms).unwrap_err();
        assert_eq!(err, InvalidValue("n/a".into()));
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value(Some(" 12.5 ")).unwrap(), Some(Decimal::new(125, 1)));
        assert_eq!(parse_value(Some("1e3")).unwrap(), Some(Decimal::from(1000)));
        assert_eq!(parse_value(Some("")).unwrap(), None);
        assert_eq!(parse_value(None).unwrap(), None);
        assert!(parse_value(Some("abc")).is_err());
    }
}
