//! CSV reader producing [`RecordSet`]s.
//!
//! The first non-blank row is the header. Every later row becomes one
//! [`TabularRecord`] in source order; blank lines are skipped.
//!
//! # Ragged Rows
//!
//! Rows whose width differs from the header's are handled according to
//! [`RowShapePolicy`]:
//!
//! - `Lenient` pads short rows with null and keeps the extra values of long
//!   rows as an array under [`OVERFLOW_KEY`]. Each such row is reported.
//! - `Strict` rejects the input at the first such row.
//!
//! Duplicate header names collapse into one key: the later column's value
//! wins, at the first column's position.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::model::{RecordSet, TabularRecord, OVERFLOW_KEY};
use super::report::{TransformIssue, TransformIssueCode, TransformReport};
use crate::error::EtlError;

/// How rows whose field count differs from the header are treated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RowShapePolicy {
    /// Pad short rows with null, keep extra fields under the overflow key.
    #[default]
    Lenient,
    /// Fail on the first ragged row or duplicate column.
    Strict,
}

/// Options for [`parse_tabular`].
#[derive(Clone, Debug)]
pub struct ParseOptions {
    pub policy: RowShapePolicy,
    pub delimiter: u8,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            policy: RowShapePolicy::Lenient,
            delimiter: b',',
        }
    }
}

impl ParseOptions {
    pub fn strict() -> Self {
        Self {
            policy: RowShapePolicy::Strict,
            ..Default::default()
        }
    }
}

/// Parses delimited text into records.
///
/// # Errors
/// Returns [`EtlError::MalformedInput`] if the text is empty or has no header
/// row, or (strict policy) on the first ragged row or duplicate column.
/// Returns [`EtlError::Csv`] if the CSV reader itself fails.
///
/// # Example
/// ```
/// use repo_etl::tabular::{parse_tabular, ParseOptions};
///
/// let (records, _report) = parse_tabular("a,b\n1,2\n", &ParseOptions::default())?;
/// assert_eq!(records.len(), 1);
/// assert_eq!(records.records()[0].get("b"), Some("2"));
/// # Ok::<(), repo_etl::EtlError>(())
/// ```
pub fn parse_tabular(
    text: &str,
    options: &ParseOptions,
) -> Result<(RecordSet, TransformReport), EtlError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    if text.trim().is_empty() {
        return Err(EtlError::malformed("input is empty; expected a header row"));
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let columns: Vec<String> = reader
        .headers()
        .map_err(|source| EtlError::Csv { source })?
        .iter()
        .map(str::to_string)
        .collect();
    if columns.is_empty() {
        return Err(EtlError::malformed("no header row found"));
    }

    let mut report = TransformReport::new(columns.len());
    check_header(&columns, options.policy, &mut report)?;
    let overflow_collides = columns.iter().any(|column| column == OVERFLOW_KEY);

    let mut records = RecordSet::new(columns.clone());
    for result in reader.records() {
        let row = result.map_err(|source| EtlError::Csv { source })?;
        let line = row
            .position()
            .map(|position| physical_line(text, position.byte()));
        let found = row.len();
        let expected = columns.len();

        if found != expected {
            let message = format!("expected {} fields, found {}", expected, found);
            if options.policy == RowShapePolicy::Strict {
                return Err(EtlError::malformed(match line {
                    Some(line) => format!("line {line}: {message}"),
                    None => message,
                }));
            }

            if found > expected {
                if overflow_collides {
                    return Err(EtlError::malformed(format!(
                        "line {}: row has extra fields but the header already has a '{}' column",
                        line.unwrap_or_default(),
                        OVERFLOW_KEY
                    )));
                }
                report.add(TransformIssue::new(
                    TransformIssueCode::OverflowRow,
                    line,
                    format!("{message}; extra values kept under '{OVERFLOW_KEY}'"),
                ));
            } else {
                report.add(TransformIssue::new(
                    TransformIssueCode::PaddedRow,
                    line,
                    format!("{message}; missing values set to null"),
                ));
            }
        }

        let mut record = TabularRecord::new();
        for (idx, column) in columns.iter().enumerate() {
            record.insert(column.as_str(), row.get(idx).map(str::to_string));
        }
        for value in row.iter().skip(expected) {
            record.push_overflow(value);
        }
        records.push(record);
    }

    report.rows = records.len();
    Ok((records, report))
}

/// Reads and parses a local CSV file.
pub fn read_csv_file(
    path: &Path,
    options: &ParseOptions,
) -> Result<(RecordSet, TransformReport), EtlError> {
    let mut text = String::new();
    File::open(path)?.read_to_string(&mut text)?;
    parse_tabular(&text, options)
}

/// 1-based line of the record the reader positioned at `offset`.
///
/// The reader's own line counter skips blank lines and miscounts quoted
/// newlines in CRLF files, so the line is counted from the text instead.
/// The offset may point at blank lines preceding the record.
fn physical_line(text: &str, offset: u64) -> u64 {
    let bytes = text.as_bytes();
    let mut start = usize::try_from(offset).map_or(bytes.len(), |o| o.min(bytes.len()));
    while matches!(bytes.get(start), Some(b'\r' | b'\n')) {
        start += 1;
    }
    bytes[..start].iter().filter(|&&b| b == b'\n').count() as u64 + 1
}

fn check_header(
    columns: &[String],
    policy: RowShapePolicy,
    report: &mut TransformReport,
) -> Result<(), EtlError> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for column in columns {
        *seen.entry(column.as_str()).or_default() += 1;
    }

    // Report in header order, once per name.
    for column in columns {
        let Some(count) = seen.remove(column.as_str()) else {
            continue;
        };
        if count > 1 {
            let message = format!("column '{}' appears {} times", column, count);
            if policy == RowShapePolicy::Strict {
                return Err(EtlError::malformed(message));
            }
            report.add(TransformIssue::new(
                TransformIssueCode::DuplicateColumn,
                Some(1),
                format!("{message}; the last value wins"),
            ));
        }
        if column.is_empty() {
            report.add(TransformIssue::new(
                TransformIssueCode::EmptyColumnName,
                Some(1),
                "header contains an empty column name",
            ));
        }
    }

    Ok(())
}
