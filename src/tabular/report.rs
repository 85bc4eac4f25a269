//! Transform report types for tracking how ragged input was handled.
//!
//! Mirrors the idea of a conversion report: counts plus a list of issues,
//! printable for humans and serializable for `--output json`.

use serde::Serialize;
use std::fmt;

/// A report generated while parsing tabular input.
#[derive(Clone, Debug, Default, Serialize)]
pub struct TransformReport {
    /// Number of data rows (records) produced.
    pub rows: usize,
    /// Number of header columns, duplicates included.
    pub columns: usize,
    /// Issues noticed while reading rows.
    pub issues: Vec<TransformIssue>,
}

impl TransformReport {
    pub fn new(columns: usize) -> Self {
        Self {
            columns,
            ..Default::default()
        }
    }

    pub fn add(&mut self, issue: TransformIssue) {
        self.issues.push(issue);
    }

    /// Count of issues with the given code.
    pub fn count(&self, code: TransformIssueCode) -> usize {
        self.issues.iter().filter(|i| i.code == code).count()
    }

    /// True when every row matched the header exactly.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

impl fmt::Display for TransformReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  {} rows, {} columns", self.rows, self.columns)?;

        if !self.issues.is_empty() {
            writeln!(f)?;
            writeln!(f, "Warnings ({}):", self.issues.len())?;
            for issue in &self.issues {
                writeln!(f, "  - {}", issue)?;
            }
        }

        Ok(())
    }
}

/// A single note about the shape of the input.
#[derive(Clone, Debug, Serialize)]
pub struct TransformIssue {
    pub code: TransformIssueCode,
    /// 1-based source line, when the issue belongs to a row.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u64>,
    pub message: String,
}

impl TransformIssue {
    pub fn new(code: TransformIssueCode, line: Option<u64>, message: impl Into<String>) -> Self {
        Self {
            code,
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for TransformIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "[{:?}] line {}: {}", self.code, line, self.message),
            None => write!(f, "[{:?}] {}", self.code, self.message),
        }
    }
}

/// Stable identifiers for transform issues.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformIssueCode {
    /// A row had fewer fields than the header; missing values became null.
    PaddedRow,
    /// A row had more fields than the header; extras went under the overflow key.
    OverflowRow,
    /// The header names the same column more than once.
    DuplicateColumn,
    /// A header column is the empty string.
    EmptyColumnName,
}
