//! Tabular data for repo-etl.
//!
//! This is the transform stage: CSV text goes in through
//! [`parse_tabular`], a [`RecordSet`] comes out, and [`serialize`] renders
//! it as a JSON array of objects.
//!
//! Values are never typed: every present cell is a JSON string, so
//! `"10"` stays `"10"`.
//!
//! # Example
//!
//! ```
//! use repo_etl::tabular::{parse_tabular, serialize, ParseOptions};
//!
//! let (records, report) = parse_tabular("ticker,price\nAAA,10\n", &ParseOptions::default())?;
//! assert_eq!(report.rows, 1);
//! let json = serialize(&records)?;
//! assert!(json.contains("\"ticker\": \"AAA\""));
//! # Ok::<(), repo_etl::EtlError>(())
//! ```

pub mod io_csv;
pub mod io_json;
mod model;
mod report;

pub use io_csv::{parse_tabular, read_csv_file, ParseOptions, RowShapePolicy};
pub use io_json::{serialize, write_json_file};
pub use model::{RecordSet, TabularRecord, OVERFLOW_KEY};
pub use report::{TransformIssue, TransformIssueCode, TransformReport};
