//! Strict reader and writer for the 5-column iris CSV.

use std::path::Path;

use crate::model::IrisFeatures;

use super::{DatasetError, IrisRecord, Result};

/// Canonical column names, also the exact first line of every written file.
pub const CSV_HEADER: &str = "sepal_length,sepal_width,petal_length,petal_width,target";

const FEATURE_COLUMNS: [&str; 4] =
    ["sepal_length", "sepal_width", "petal_length", "petal_width"];

/// Read and validate a dataset file.
///
/// Errors on an empty file, a header-only file, a header that is not
/// [`CSV_HEADER`], and any row that does not parse as four finite floats
/// plus an integer target. Error messages carry 1-based line numbers.
pub fn read_csv(path: impl AsRef<Path>) -> Result<Vec<IrisRecord>> {
    let content = std::fs::read_to_string(path)?;
    parse_csv(&content)
}

/// Write records in the canonical format, header first.
pub fn write_csv(path: impl AsRef<Path>, records: &[IrisRecord]) -> Result<()> {
    if records.is_empty() {
        return Err(DatasetError::NoDataRows);
    }

    let mut out = String::with_capacity(CSV_HEADER.len() + 1 + records.len() * 24);
    out.push_str(CSV_HEADER);
    out.push('\n');
    for record in records {
        let f = record.features;
        out.push_str(&format!(
            "{},{},{},{},{}\n",
            f.sepal_length, f.sepal_width, f.petal_length, f.petal_width, record.target
        ));
    }

    std::fs::write(path, out)?;
    Ok(())
}

fn parse_csv(content: &str) -> Result<Vec<IrisRecord>> {
    if content.trim().is_empty() {
        return Err(DatasetError::EmptyFile);
    }

    let mut lines = content.lines().enumerate();
    let header = match lines.next() {
        Some((_, line)) => line.trim(),
        None => return Err(DatasetError::EmptyFile),
    };
    if header != CSV_HEADER {
        return Err(DatasetError::BadHeader(header.to_string()));
    }

    let mut records = Vec::new();
    for (idx, line) in lines {
        records.push(parse_row(line, idx + 1)?);
    }

    if records.is_empty() {
        return Err(DatasetError::NoDataRows);
    }
    Ok(records)
}

/// Parse one data row. `line_no` is the 1-based position in the file, used
/// verbatim in error messages.
pub(crate) fn parse_row(line: &str, line_no: usize) -> Result<IrisRecord> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() != 5 {
        return Err(DatasetError::ColumnCount { line: line_no, found: fields.len() });
    }

    let mut values = [0.0f64; 4];
    for (value, (field, column)) in
        values.iter_mut().zip(fields.iter().zip(FEATURE_COLUMNS.iter()))
    {
        let raw = field.trim();
        let parsed: f64 = raw.parse().map_err(|_| DatasetError::InvalidValue {
            line: line_no,
            column,
            value: raw.to_string(),
        })?;
        if !parsed.is_finite() {
            return Err(DatasetError::InvalidValue {
                line: line_no,
                column,
                value: raw.to_string(),
            });
        }
        *value = parsed;
    }

    let raw_target = fields[4].trim();
    let target: usize = raw_target.parse().map_err(|_| DatasetError::InvalidValue {
        line: line_no,
        column: "target",
        value: raw_target.to_string(),
    })?;

    Ok(IrisRecord::new(IrisFeatures::new(values[0], values[1], values[2], values[3]), target))
}
