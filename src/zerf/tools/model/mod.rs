use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Requisition number column of the ERF report.
pub const ERF_NUMBER: &str = "ERF Number";
/// Line item column of the ERF report.
pub const ITEM: &str = "Item";
/// Schedule line status column.
pub const SCHED_LINE_STATUS: &str = "ERF Sched Line Status";
/// Commodity classification column.
pub const COMMODITY_TYPE: &str = "Commodity Type";
/// Receiving plant column.
pub const SHIP_TO_PLANT: &str = "Ship-To-Plant";
/// Purchasing group column.
pub const PURCHASING_GROUP: &str = "PGr";
/// Column the derived unique key is written to by default.
pub const UNIQUE_ID: &str = "Unique_ID";

/// A single cell as exported by the ERP report.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum CellValue {
    /// Plain text cell.
    Text(String),
    /// Numeric cell. Excel stores integers as floats as well.
    Number(f64),
    /// Boolean cell.
    Boolean(bool),
    /// Blank cell. A valid state, not an error.
    #[default]
    Empty,
}

impl CellValue {
    /// Renders the value the way it reads in the spreadsheet.
    ///
    /// Integral numbers print without a fractional part so that a plant code
    /// stored as `6100.0` renders as `6100`.
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Text(value) => value.clone(),
            CellValue::Number(value) => value.to_string(),
            CellValue::Boolean(value) => value.to_string(),
            CellValue::Empty => String::new(),
        }
    }

    /// Returns `true` for empty cells and text that is whitespace only.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(value) => value.trim().is_empty(),
            CellValue::Number(_) | CellValue::Boolean(_) => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Boolean(value)
    }
}

/// One exported row, keyed by field name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, CellValue>,
}

impl Record {
    /// Creates a record without any fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variant of [`Record::insert`].
    pub fn with(mut self, field: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.insert(field, value);
        self
    }

    /// Inserts or replaces a field value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<CellValue>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Returns the value stored for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&CellValue> {
        self.fields.get(field)
    }

    /// Returns the textual form of `field`; absent fields read as blank.
    pub fn text(&self, field: &str) -> String {
        self.get(field).map(CellValue::to_text).unwrap_or_default()
    }

    /// Returns `true` when `field` is absent, empty, or whitespace only.
    pub fn is_blank(&self, field: &str) -> bool {
        self.get(field).is_none_or(CellValue::is_blank)
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<CellValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (field, value) in iter {
            record.insert(field, value);
        }
        record
    }
}

/// An ordered sequence of records sharing one column schema.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Dataset {
    columns: Vec<String>,
    records: Vec<Record>,
}

impl Dataset {
    /// Creates an empty dataset with the given column schema.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            records: Vec::new(),
        }
    }

    /// Creates a dataset from a schema and records in input order.
    pub fn from_records(columns: Vec<String>, records: Vec<Record>) -> Self {
        Self { columns, records }
    }

    /// Builds a dataset from positional rows aligned with `columns`. Short rows
    /// are padded with blanks.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let records = rows
            .into_iter()
            .map(|row| {
                let mut cells = row.into_iter();
                columns
                    .iter()
                    .map(|column| (column.clone(), cells.next().unwrap_or_default()))
                    .collect()
            })
            .collect();
        Self { columns, records }
    }

    /// Column names in sheet order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Records in input order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Consumes the dataset and returns its parts.
    pub fn into_parts(self) -> (Vec<String>, Vec<Record>) {
        (self.columns, self.records)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` when the dataset has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns `true` when the schema carries `column`.
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|existing| existing == column)
    }

    /// Appends a record.
    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    /// Materialises the records as positional rows following the schema.
    pub fn to_rows(&self) -> Vec<Vec<CellValue>> {
        self.records
            .iter()
            .map(|record| {
                self.columns
                    .iter()
                    .map(|column| record.get(column).cloned().unwrap_or_default())
                    .collect()
            })
            .collect()
    }
}
