//! Percentage renormalization.
//!
//! Within each `(selector, formatted measure)` group, records whose include
//! entry asked for it are rewritten as a share of the group total. Other
//! records in the group keep their absolute values.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::models::Record;

static NUMBER_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)number").expect("valid regex"));

const PERCENTAGE_UNIT: &str = "percentage";

/// Convert flagged values to percentages of their group total.
pub fn convert_percentages(records: &mut [Record]) {
    let mut groups: HashMap<(String, String), Vec<usize>> = HashMap::new();
    for (i, record) in records.iter().enumerate() {
        groups
            .entry((record.selector.clone(), record.measure_formatted()))
            .or_default()
            .push(i);
    }

    for members in groups.values() {
        let Some(total) = group_total(records, members) else {
            continue;
        };
        if total.is_zero() {
            continue;
        }

        for &i in members {
            convert(&mut records[i], total);
        }
    }
}

/// Sum of non-null values, `None` when the group has none or the sum overflows.
fn group_total(records: &[Record], members: &[usize]) -> Option<Decimal> {
    let mut values = members.iter().filter_map(|&i| records[i].value);
    let first = values.next()?;
    values.try_fold(first, |acc, v| acc.checked_add(v))
}

fn convert(record: &mut Record, total: Decimal) {
    if !record.convert_to_percentage {
        return;
    }
    let Some(value) = record.value else {
        return;
    };
    let Some(share) = value
        .checked_div(total)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
    else {
        return;
    };

    record.value = Some(share);
    record.value_unit = Some(PERCENTAGE_UNIT.to_string());
    record.value_label = record
        .value_label
        .as_deref()
        .map(|label| NUMBER_WORD.replace_all(label, "%").into_owned());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Dimension, Dimensions};

    fn dims(column: &str, raw: &str) -> Dimensions {
        let mut d = Dimensions::new();
        d.push(Dimension {
            column: column.into(),
            index: 0,
            raw: Some(raw.into()),
            label: None,
            rank: None,
            separator: " — ".into(),
        });
        d
    }

    fn record(measure: &str, category: &str, value: Option<i64>, convert: bool) -> Record {
        Record {
            parent: None,
            source: "a.csv".into(),
            selector: "Auckland".into(),
            measures: dims("Measure", measure),
            categories: dims("Sex", category),
            value: value.map(Decimal::from),
            value_unit: Some("number".into()),
            value_label: Some("Number of people".into()),
            null_reason: None,
            date: Some("2020".into()),
            date_label: None,
            convert_to_percentage: convert,
        }
    }

    #[test]
    fn test_flagged_records_converted() {
        let mut records = vec![
            record("Population", "Male", Some(100), true),
            record("Population", "Female", Some(100), true),
        ];
        convert_percentages(&mut records);

        for r in &records {
            assert_eq!(r.value, Some(Decimal::from(50)));
            assert_eq!(r.value_unit.as_deref(), Some("percentage"));
            assert_eq!(r.value_label.as_deref(), Some("% of people"));
        }
    }

    #[test]
    fn test_unflagged_records_keep_absolute_values() {
        let mut records = vec![
            record("Population", "Male", Some(30), true),
            record("Population", "Total", Some(70), false),
        ];
        convert_percentages(&mut records);

        assert_eq!(records[0].value, Some(Decimal::from(30)));
        assert_eq!(records[0].value_unit.as_deref(), Some("percentage"));
        assert_eq!(records[1].value, Some(Decimal::from(70)));
        assert_eq!(records[1].value_unit.as_deref(), Some("number"));
    }

    #[test]
    fn test_groups_are_per_measure() {
        let mut records = vec![
            record("Population", "Male", Some(25), true),
            record("Population", "Female", Some(75), true),
            record("Dwellings", "Male", Some(10), true),
        ];
        convert_percentages(&mut records);

        assert_eq!(records[0].value, Some(Decimal::from(25)));
        assert_eq!(records[1].value, Some(Decimal::from(75)));
        assert_eq!(records[2].value, Some(Decimal::from(100)));
    }

    #[test]
    fn test_zero_and_null_totals_pass_through() {
        let mut records = vec![
            record("Population", "Male", Some(0), true),
            record("Population", "Female", Some(0), true),
            record("Dwellings", "Male", None, true),
        ];
        let before = records.clone();
        convert_percentages(&mut records);

        assert_eq!(records, before);
    }

    #[test]
    fn test_overflowing_total_passes_through() {
        let huge = Decimal::from_str_exact("50000000000000000000000000000").unwrap();
        let mut records = vec![
            record("Population", "Male", None, true),
            record("Population", "Female", None, true),
        ];
        records[0].value = Some(huge);
        records[1].value = Some(huge);
        let before = records.clone();
        convert_percentages(&mut records);

        assert_eq!(records, before);
    }

    #[test]
    fn test_null_values_do_not_contribute() {
        let mut records = vec![
            record("Population", "Male", Some(40), true),
            record("Population", "Female", None, true),
        ];
        convert_percentages(&mut records);

        assert_eq!(records[0].value, Some(Decimal::from(100)));
        assert_eq!(records[1].value, None);
        assert_eq!(records[1].value_unit.as_deref(), Some("number"));
    }

    #[test]
    fn test_percentages_sum_to_hundred() {
        let mut records = vec![
            record("Population", "A", Some(1), true),
            record("Population", "B", Some(1), true),
            record("Population", "C", Some(1), true),
        ];
        convert_percentages(&mut records);

        let sum: Decimal = records.iter().filter_map(|r| r.value).sum();
        assert!((sum - Decimal::ONE_HUNDRED).abs() < Decimal::new(1, 6));
    }
}
