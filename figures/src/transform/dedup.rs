//! Latest-value deduplication.
//!
//! Datasets carry every historical edition of an observation. Rows sharing
//! `(selector, formatted measure, formatted category)` collapse to the one with
//! the latest date; equal dates keep the highest value (a merged region can
//! appear twice in one edition).

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::Record;

/// Grouping key: selector plus formatted measure and category labels.
pub type DedupKey = (String, String, String);

pub fn dedup_key(record: &Record) -> DedupKey {
    (
        record.selector.clone(),
        record.measure_formatted(),
        record.category_formatted(),
    )
}

/// Keep one record per key; groups stay in order of first appearance.
pub fn deduplicate(records: Vec<Record>) -> Vec<Record> {
    let mut slots: HashMap<DedupKey, usize> = HashMap::new();
    let mut kept: Vec<Record> = Vec::new();

    for record in records {
        match slots.get(&dedup_key(&record)) {
            Some(&i) => {
                if newer(&record, &kept[i]) == Ordering::Greater {
                    kept[i] = record;
                }
            }
            None => {
                slots.insert(dedup_key(&record), kept.len());
                kept.push(record);
            }
        }
    }

    kept
}

/// Orders by date, then value; `None` sorts lowest for both.
fn newer(a: &Record, b: &Record) -> Ordering {
    a.date.cmp(&b.date).then_with(|| a.value.cmp(&b.value))
}
