//! Spreadsheet output.
//!
//! One worksheet per parent, in first-appearance order. Each row holds
//! selector, measure, category, value, value label, date, date label and
//! source; selector and measure are only written when either changes from
//! the previous row, so consecutive rows read as one block.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_xlsxwriter::{Format, FormatAlign, Workbook, Worksheet};
use std::io::Write;

use crate::error::RenderResult;
use crate::models::Record;

const MAX_SHEET_NAME: usize = 31;
const DEFAULT_SHEET_NAME: &str = "Figures";

const CURRENCY_FORMAT: &str = "$#,##0.00";
const PERCENT_FORMAT: &str = "0.00%";
const DECIMAL_FORMAT: &str = "#,##0.##";
const INTEGER_FORMAT: &str = "#,##0";

struct Formats {
    currency: Format,
    percent: Format,
    decimal: Format,
    integer: Format,
    null: Format,
}

impl Formats {
    fn new() -> Self {
        Self {
            currency: Format::new().set_num_format(CURRENCY_FORMAT),
            percent: Format::new().set_num_format(PERCENT_FORMAT),
            decimal: Format::new().set_num_format(DECIMAL_FORMAT),
            integer: Format::new().set_num_format(INTEGER_FORMAT),
            null: Format::new().set_align(FormatAlign::Right),
        }
    }
}

/// Build the workbook in memory.
pub fn to_workbook(records: &[Record]) -> RenderResult<Workbook> {
    let mut workbook = Workbook::new();
    let formats = Formats::new();
    let mut names: Vec<String> = Vec::new();

    for (parent, set) in group_by_parent(records) {
        let name = sheet_name(parent, &names);
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&name)?;
        populate(worksheet, &set, &formats)?;
        worksheet.autofit();
        names.push(name);
    }

    if names.is_empty() {
        workbook.add_worksheet().set_name(DEFAULT_SHEET_NAME)?;
    }

    Ok(workbook)
}

/// Write the workbook as `.xlsx` bytes.
pub fn write_xlsx<W: Write>(records: &[Record], mut writer: W) -> RenderResult<()> {
    let bytes = to_workbook(records)?.save_to_buffer()?;
    writer.write_all(&bytes)?;
    Ok(())
}

fn group_by_parent(records: &[Record]) -> Vec<(&str, Vec<&Record>)> {
    let mut groups: Vec<(&str, Vec<&Record>)> = Vec::new();
    for record in records {
        let parent = record.parent.as_deref().unwrap_or_default();
        match groups.iter_mut().find(|(p, _)| *p == parent) {
            Some((_, set)) => set.push(record),
            None => groups.push((parent, vec![record])),
        }
    }
    groups
}

fn populate(worksheet: &mut Worksheet, set: &[&Record], formats: &Formats) -> RenderResult<()> {
    let mut block: Option<(&str, String)> = None;

    for (row, record) in set.iter().enumerate() {
        let row = row as u32;
        let measure = record.measure_formatted();

        let same_block = block
            .as_ref()
            .is_some_and(|(selector, m)| *selector == record.selector && *m == measure);
        if !same_block {
            worksheet.write_string(row, 0, &record.selector)?;
            worksheet.write_string(row, 1, &measure)?;
            block = Some((record.selector.as_str(), measure));
        }

        worksheet.write_string(row, 2, record.category_formatted())?;
        write_value(worksheet, row, 3, record, formats)?;

        write_optional(worksheet, row, 4, record.value_label.as_deref())?;
        write_optional(worksheet, row, 5, record.date.as_deref())?;
        write_optional(worksheet, row, 6, record.date_label.as_deref())?;
        worksheet.write_string(row, 7, record.source_formatted())?;
    }

    Ok(())
}

fn write_value(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    record: &Record,
    formats: &Formats,
) -> RenderResult<()> {
    let Some(value) = record.value else {
        let reason = record.null_reason.as_deref().unwrap_or_default();
        worksheet.write_string_with_format(row, col, reason, &formats.null)?;
        return Ok(());
    };

    let unit = record.value_unit.as_deref().unwrap_or_default().to_lowercase();
    let number = value.to_f64().unwrap_or_default();
    match unit.as_str() {
        "nzd" => worksheet.write_number_with_format(row, col, number, &formats.currency)?,
        "percentage" => worksheet.write_number_with_format(row, col, number / 100.0, &formats.percent)?,
        _ if value.fract() != Decimal::ZERO => {
            worksheet.write_number_with_format(row, col, number, &formats.decimal)?
        }
        _ => worksheet.write_number_with_format(row, col, number, &formats.integer)?,
    };
    Ok(())
}

fn write_optional(worksheet: &mut Worksheet, row: u32, col: u16, value: Option<&str>) -> RenderResult<()> {
    if let Some(value) = value {
        worksheet.write_string(row, col, value)?;
    }
    Ok(())
}

/// Worksheet name for `parent`, unique among `taken` (case-insensitive).
///
/// Characters Excel rejects become `-`; names are cut to 31 characters.
pub fn sheet_name(parent: &str, taken: &[String]) -> String {
    let cleaned: String = parent
        .chars()
        .map(|c| if matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\') { '-' } else { c })
        .collect();
    let cleaned = cleaned.trim().trim_matches('\'');
    let base = if cleaned.is_empty() { DEFAULT_SHEET_NAME } else { cleaned };

    let is_taken = |name: &str| taken.iter().any(|t| t.to_lowercase() == name.to_lowercase());

    let mut name: String = base.chars().take(MAX_SHEET_NAME).collect();
    let mut n = 2;
    while is_taken(&name) {
        let suffix = format!(" ({})", n);
        let keep = MAX_SHEET_NAME - suffix.chars().count();
        name = base.chars().take(keep).collect::<String>() + &suffix;
        n += 1;
    }
    name
}
