//! In-memory tables: the boundary between typed record collections and whatever
//! produced or consumes rows of named columns (spreadsheet exports, CSV, dataframes).

use crate::error::{Result, TradeSeriesError};
use crate::schema::{AnalysisResult, BusinessMetrics, QuarterlyRecord, TradeRecord};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Named columns and rows of JSON cells. Rows shorter than the header read as blank
/// (`null`) in the missing positions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// True when the table has no rows, whatever its header.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Serializes typed records into a table with the record kind's column order.
    pub fn from_records<T: TabularRecord>(records: &[T]) -> Result<Self> {
        let columns: Vec<String> = T::COLUMNS.iter().map(|c| c.to_string()).collect();
        let mut rows = Vec::with_capacity(records.len());

        for record in records {
            let value = serde_json::to_value(record)?;
            let row = T::COLUMNS
                .iter()
                .map(|column| value.get(*column).cloned().unwrap_or(Value::Null))
                .collect();
            rows.push(row);
        }

        Ok(Self { columns, rows })
    }

    /// Reads the table back into typed records.
    ///
    /// A table without rows yields an empty collection regardless of its header. Missing
    /// required columns fail before any row is read; a cell of the wrong shape or a row
    /// that breaks a record invariant is a validation error naming the row.
    pub fn to_records<T: TabularRecord>(&self) -> Result<Vec<T>> {
        if self.is_empty() {
            return Ok(Vec::new());
        }

        let missing: Vec<String> = T::REQUIRED
            .iter()
            .filter(|column| self.column_index(column).is_none())
            .map(|column| column.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(TradeSeriesError::StructuralInput { missing });
        }

        self.rows
            .iter()
            .enumerate()
            .map(|(index, row)| {
                let object: Map<String, Value> = self
                    .columns
                    .iter()
                    .enumerate()
                    .map(|(i, column)| (column.clone(), row.get(i).cloned().unwrap_or(Value::Null)))
                    .collect();

                let record: T = serde_json::from_value(Value::Object(object)).map_err(|e| {
                    TradeSeriesError::Validation {
                        record: format!("row {}", index + 1),
                        details: e.to_string(),
                    }
                })?;
                record.validate()?;
                Ok(record)
            })
            .collect()
    }
}

/// A record kind with a fixed table layout.
pub trait TabularRecord: Serialize + DeserializeOwned {
    /// Output column order.
    const COLUMNS: &'static [&'static str];
    /// Columns that must be present to read the kind back.
    const REQUIRED: &'static [&'static str];

    fn validate(&self) -> Result<()>;
}

impl TabularRecord for TradeRecord {
    const COLUMNS: &'static [&'static str] = &["date", "amount"];
    const REQUIRED: &'static [&'static str] = &["date", "amount"];

    fn validate(&self) -> Result<()> {
        TradeRecord::validate(self)
    }
}

impl TabularRecord for AnalysisResult {
    const COLUMNS: &'static [&'static str] = &["date", "amount", "mom", "yoy"];
    const REQUIRED: &'static [&'static str] = &["date", "amount"];

    fn validate(&self) -> Result<()> {
        AnalysisResult::validate(self)
    }
}

impl TabularRecord for QuarterlyRecord {
    const COLUMNS: &'static [&'static str] = &["quarter", "amount", "qoq", "yoy"];
    const REQUIRED: &'static [&'static str] = &["quarter", "amount"];

    fn validate(&self) -> Result<()> {
        QuarterlyRecord::validate(self)
    }
}

impl TabularRecord for BusinessMetrics {
    const COLUMNS: &'static [&'static str] = &[
        "date",
        "amount",
        "mom",
        "yoy",
        "business_days",
        "daily_avg",
        "daily_avg_mom",
        "daily_avg_yoy",
        "quarter_sum",
        "quarter_avg",
        "quarter_qoq",
        "quarter_yoy",
    ];
    const REQUIRED: &'static [&'static str] = &["date", "amount", "business_days", "daily_avg"];

    fn validate(&self) -> Result<()> {
        BusinessMetrics::validate(self)
    }
}
