//! Record types produced by the CSV reader.

use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// Key under which values beyond the header's width are kept.
pub const OVERFLOW_KEY: &str = "_overflow";

/// One data row: column name to value, in header order.
///
/// A `None` value marks a column the row was too short to fill. Values past
/// the last column are kept in [`TabularRecord::overflow`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TabularRecord {
    fields: IndexMap<String, Option<String>>,
    overflow: Vec<String>,
}

impl TabularRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `column`. A repeated column keeps its first position and takes
    /// the new value.
    pub fn insert(&mut self, column: impl Into<String>, value: Option<String>) {
        self.fields.insert(column.into(), value);
    }

    pub fn push_overflow(&mut self, value: impl Into<String>) {
        self.overflow.push(value.into());
    }

    /// Value of `column`; `None` if the column is unknown or was padded.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).and_then(|value| value.as_deref())
    }

    /// Iterates fields in column order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.fields
            .iter()
            .map(|(column, value)| (column.as_str(), value.as_deref()))
    }

    pub fn overflow(&self) -> &[String] {
        &self.overflow
    }
}

impl Serialize for TabularRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let extra = usize::from(!self.overflow.is_empty());
        let mut map = serializer.serialize_map(Some(self.fields.len() + extra))?;
        for (column, value) in &self.fields {
            map.serialize_entry(column, value)?;
        }
        if !self.overflow.is_empty() {
            map.serialize_entry(OVERFLOW_KEY, &self.overflow)?;
        }
        map.end()
    }
}

/// All records of one CSV document, in source row order.
///
/// Serializes as a bare JSON array of records.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordSet {
    columns: Vec<String>,
    records: Vec<TabularRecord>,
}

impl RecordSet {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            records: Vec::new(),
        }
    }

    pub fn push(&mut self, record: TabularRecord) {
        self.records.push(record);
    }

    /// Header columns as read, duplicates included.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[TabularRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TabularRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a TabularRecord;
    type IntoIter = std::slice::Iter<'a, TabularRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl Serialize for RecordSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.records.len()))?;
        for record in &self.records {
            seq.serialize_element(record)?;
        }
        seq.end()
    }
}
