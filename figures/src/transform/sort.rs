//! Output ordering.
//!
//! Selector first, then for each measure and then each category dimension in
//! declaration order: include-list position (unlisted last), then raw value.
//! All string comparisons ignore case. `sort_by` is stable, so records with
//! equal keys keep their relative order.

use std::cmp::Ordering;

use crate::models::{Dimensions, Record};

/// Sort records in place.
pub fn sort_records(records: &mut [Record]) {
    records.sort_by(compare);
}

fn compare(a: &Record, b: &Record) -> Ordering {
    compare_text(Some(&a.selector), Some(&b.selector))
        .then_with(|| compare_dimensions(&a.measures, &b.measures))
        .then_with(|| compare_dimensions(&a.categories, &b.categories))
}

fn compare_dimensions(a: &Dimensions, b: &Dimensions) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        let ordering = compare_rank(x.rank, y.rank)
            .then_with(|| compare_text(x.raw.as_deref(), y.raw.as_deref()));
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Present ranks ascending; absent after all present.
fn compare_rank(a: Option<usize>, b: Option<usize>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Case-insensitive; absent after all present.
fn compare_text(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.to_lowercase().cmp(&y.to_lowercase()),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
