//! Row acceptance rules.
//!
//! Include and exclude lists are folded into hash lookups once per dataset
//! ([`DatasetRules`]); [`RowFilter::check`] then runs per row.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::config::{Column, Dataset, Include};
use crate::parser::Fields;

use super::terms::TermSet;

/// Why a row was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    MissingSelector,
    ExcludedBySelector,
    ExcludedByMeasure,
    ExcludedByCategory,
}

impl Rejection {
    /// Stable tag used in diagnostics
    pub fn tag(&self) -> &'static str {
        match self {
            Rejection::MissingSelector => "missing-selector",
            Rejection::ExcludedBySelector => "excluded-by-selector",
            Rejection::ExcludedByMeasure => "excluded-by-measure",
            Rejection::ExcludedByCategory => "excluded-by-category",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Precomputed lookups for one measure or category column.
#[derive(Debug, Clone)]
pub struct ColumnRules {
    pub name: String,
    pub separator: String,
    includes: Vec<Include>,
    /// lowercased value → first position in `includes`
    include_index: HashMap<String, usize>,
    /// lowercased excluded values
    exclude: HashSet<String>,
}

impl ColumnRules {
    pub fn from_column(column: &Column) -> Self {
        let mut include_index = HashMap::new();
        for (i, entry) in column.include.iter().enumerate() {
            include_index.entry(entry.value.to_lowercase()).or_insert(i);
        }

        Self {
            name: column.name.clone(),
            separator: column.separator.clone(),
            includes: column.include.clone(),
            include_index,
            exclude: column.exclude.iter().map(|v| v.to_lowercase()).collect(),
        }
    }

    /// Whether an include list is configured
    pub fn has_include(&self) -> bool {
        !self.includes.is_empty()
    }

    pub fn has_exclude(&self) -> bool {
        !self.exclude.is_empty()
    }

    /// Whether `raw` is in the exclude set
    pub fn is_excluded(&self, raw: Option<&str>) -> bool {
        raw.is_some_and(|v| self.exclude.contains(&v.to_lowercase()))
    }

    /// Whether `raw` passes the include list (always true without one)
    pub fn is_included(&self, raw: Option<&str>) -> bool {
        !self.has_include() || self.lookup(raw).is_some()
    }

    /// Matching include entry and its position
    pub fn lookup(&self, raw: Option<&str>) -> Option<(usize, &Include)> {
        let i = *self.include_index.get(&raw?.to_lowercase())?;
        Some((i, &self.includes[i]))
    }

    /// Exclusion first, then inclusion membership
    pub fn accepts(&self, raw: Option<&str>) -> bool {
        !(self.has_exclude() && self.is_excluded(raw)) && self.is_included(raw)
    }
}

/// Column rules for a whole dataset, built once and reused for every row.
#[derive(Debug, Clone)]
pub struct DatasetRules {
    pub measures: Vec<ColumnRules>,
    pub categories: Vec<ColumnRules>,
}

impl DatasetRules {
    pub fn new(dataset: &Dataset) -> Self {
        Self {
            measures: dataset.measure.iter().map(ColumnRules::from_column).collect(),
            categories: dataset.category.iter().map(ColumnRules::from_column).collect(),
        }
    }
}

/// Applies selector, measure and category rules to raw rows.
pub struct RowFilter<'a> {
    dataset: &'a Dataset,
    rules: &'a DatasetRules,
    terms: &'a TermSet,
    all_selectors_match: bool,
}

impl<'a> RowFilter<'a> {
    pub fn new(dataset: &'a Dataset, rules: &'a DatasetRules, terms: &'a TermSet) -> Self {
        Self {
            dataset,
            rules,
            terms,
            all_selectors_match: dataset.all_selectors_match(terms.term()),
        }
    }

    /// Accept or reject a row; the first failing rule decides the reason.
    pub fn check<R: Fields>(&self, row: &R) -> Result<(), Rejection> {
        let selector = row
            .field(&self.dataset.selector)
            .ok_or(Rejection::MissingSelector)?;

        if !self.terms.contains(selector) && !self.all_selectors_match {
            return Err(Rejection::ExcludedBySelector);
        }

        if !passes(&self.rules.measures, row) {
            return Err(Rejection::ExcludedByMeasure);
        }

        if !passes(&self.rules.categories, row) {
            return Err(Rejection::ExcludedByCategory);
        }

        Ok(())
    }
}

/// Dimensions are ANDed: every column's rules must accept the row.
fn passes<R: Fields>(columns: &[ColumnRules], row: &R) -> bool {
    columns.iter().all(|c| c.accepts(row.field(&c.name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn row(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn dataset() -> Dataset {
        Dataset::new("a.csv")
            .with_measure(Column::new("Measure").include(Include::new("Population")))
            .with_category(
                Column::new("Sex")
                    .include(Include::new("Male"))
                    .include(Include::new("Female"))
                    .exclude("Total"),
            )
    }

    #[test]
    fn test_accepts_matching_row() {
        let dataset = dataset();
        let rules = DatasetRules::new(&dataset);
        let terms = TermSet::new("Auckland");
        let filter = RowFilter::new(&dataset, &rules, &terms);

        let r = row(&[("Territorial Authority", "auckland"), ("Measure", "POPULATION"), ("Sex", "male")]);
        assert_eq!(filter.check(&r), Ok(()));
    }

    #[test]
    fn test_rejection_reasons_in_order() {
        let dataset = dataset();
        let rules = DatasetRules::new(&dataset);
        let terms = TermSet::new("Auckland");
        let filter = RowFilter::new(&dataset, &rules, &terms);

        let missing = row(&[("Measure", "Dwellings"), ("Sex", "Total")]);
        assert_eq!(filter.check(&missing), Err(Rejection::MissingSelector));

        let other = row(&[("Territorial Authority", "Wellington"), ("Measure", "Dwellings")]);
        assert_eq!(filter.check(&other), Err(Rejection::ExcludedBySelector));

        let measure = row(&[("Territorial Authority", "Auckland"), ("Measure", "Dwellings"), ("Sex", "Total")]);
        assert_eq!(filter.check(&measure), Err(Rejection::ExcludedByMeasure));

        let excluded = row(&[("Territorial Authority", "Auckland"), ("Measure", "Population"), ("Sex", "Total")]);
        assert_eq!(filter.check(&excluded), Err(Rejection::ExcludedByCategory));

        let absent = row(&[("Territorial Authority", "Auckland"), ("Measure", "Population")]);
        assert_eq!(filter.check(&absent), Err(Rejection::ExcludedByCategory));
    }

    #[test]
    fn test_all_selectors_match_term() {
        let mut dataset = dataset();
        dataset.all_selectors_match_term = Some("New Zealand".into());
        let rules = DatasetRules::new(&dataset);

        let terms = TermSet::new("new zealand");
        let filter = RowFilter::new(&dataset, &rules, &terms);
        let r = row(&[("Territorial Authority", "Total NZ"), ("Measure", "Population"), ("Sex", "Female")]);
        assert_eq!(filter.check(&r), Ok(()));

        let terms = TermSet::new("Auckland");
        let filter = RowFilter::new(&dataset, &rules, &terms);
        assert_eq!(filter.check(&r), Err(Rejection::ExcludedBySelector));
    }

    #[test]
    fn test_exclude_without_include() {
        let dataset = Dataset::new("a.csv").with_measure(Column::new("Measure").exclude("Total"));
        let rules = DatasetRules::new(&dataset);
        let terms = TermSet::new("Auckland");
        let filter = RowFilter::new(&dataset, &rules, &terms);

        let kept = row(&[("Territorial Authority", "Auckland"), ("Measure", "Anything")]);
        let dropped = row(&[("Territorial Authority", "Auckland"), ("Measure", "total")]);
        let empty = row(&[("Territorial Authority", "Auckland")]);

        assert_eq!(filter.check(&kept), Ok(()));
        assert_eq!(filter.check(&dropped), Err(Rejection::ExcludedByMeasure));
        assert_eq!(filter.check(&empty), Ok(()));
    }

    #[test]
    fn test_filter_is_deterministic() {
        let dataset = dataset();
        let rules = DatasetRules::new(&dataset);
        let terms = TermSet::new("Auckland");
        let filter = RowFilter::new(&dataset, &rules, &terms);

        let rows = [
            row(&[("Territorial Authority", "Auckland"), ("Measure", "Population"), ("Sex", "Male")]),
            row(&[("Territorial Authority", "Hamilton"), ("Measure", "Population"), ("Sex", "Male")]),
            row(&[("Measure", "Population")]),
        ];
        let first: Vec<_> = rows.iter().map(|r| filter.check(r)).collect();
        let second: Vec<_> = rows.iter().map(|r| filter.check(r)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_lookup_returns_first_position() {
        let column = Column::new("Sex")
            .include(Include::new("Male").with_label("Men"))
            .include(Include::new("male").with_label("Duplicate"));
        let rules = ColumnRules::from_column(&column);

        let (i, entry) = rules.lookup(Some("MALE")).unwrap();
        assert_eq!(i, 0);
        assert_eq!(entry.label.as_deref(), Some("Men"));
        assert!(rules.lookup(None).is_none());
        assert_eq!(Rejection::ExcludedByMeasure.to_string(), "excluded-by-measure");
    }
}
