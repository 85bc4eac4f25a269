//! JSON rendering of record sets.
//!
//! Output is a top-level array with one object per record, indented by two
//! spaces. Column order within each object follows the header; values are
//! strings, or null for padded columns.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::model::RecordSet;
use crate::error::EtlError;

/// Renders records as an indented JSON document.
pub fn serialize(records: &RecordSet) -> Result<String, EtlError> {
    serde_json::to_string_pretty(records).map_err(|source| EtlError::JsonWrite { source })
}

/// Writes records to a local JSON file.
pub fn write_json_file(path: &Path, records: &RecordSet) -> Result<(), EtlError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, records)
        .map_err(|source| EtlError::JsonWrite { source })?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    Ok(())
}
