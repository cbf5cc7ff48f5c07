use crate::error::Result;
use crate::schema::{
    AnalysisResult, BusinessMetrics, QuarterlyRecord, TradeRecord, YearRange,
};
use crate::tabular::{Table, TabularRecord};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Records that belong to a calendar year.
pub trait Periodic {
    fn year(&self) -> i32;
}

impl Periodic for TradeRecord {
    fn year(&self) -> i32 {
        self.date.year()
    }
}

impl Periodic for AnalysisResult {
    fn year(&self) -> i32 {
        self.date.year()
    }
}

impl Periodic for QuarterlyRecord {
    fn year(&self) -> i32 {
        self.quarter.year()
    }
}

impl Periodic for BusinessMetrics {
    fn year(&self) -> i32 {
        self.date.year()
    }
}

/// Keeps the records whose year falls inside `range` (inclusive), preserving order.
pub fn filter_by_year<T: Periodic + Clone>(records: &[T], range: YearRange) -> Vec<T> {
    records
        .iter()
        .filter(|r| range.contains(r.year()))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Trade,
    Analysis,
    Quarterly,
    Business,
}

impl RecordKind {
    /// Table columns for this kind, in output order.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            RecordKind::Trade => TradeRecord::COLUMNS,
            RecordKind::Analysis => AnalysisResult::COLUMNS,
            RecordKind::Quarterly => QuarterlyRecord::COLUMNS,
            RecordKind::Business => BusinessMetrics::COLUMNS,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordKind::Trade => "trade",
            RecordKind::Analysis => "analysis",
            RecordKind::Quarterly => "quarterly",
            RecordKind::Business => "business",
        };
        f.write_str(name)
    }
}

/// A homogeneous collection of one record kind, tagged with that kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", content = "records", rename_all = "snake_case")]
pub enum SeriesTable {
    Trade(Vec<TradeRecord>),
    Analysis(Vec<AnalysisResult>),
    Quarterly(Vec<QuarterlyRecord>),
    Business(Vec<BusinessMetrics>),
}

impl SeriesTable {
    pub fn kind(&self) -> RecordKind {
        match self {
            SeriesTable::Trade(_) => RecordKind::Trade,
            SeriesTable::Analysis(_) => RecordKind::Analysis,
            SeriesTable::Quarterly(_) => RecordKind::Quarterly,
            SeriesTable::Business(_) => RecordKind::Business,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SeriesTable::Trade(r) => r.len(),
            SeriesTable::Analysis(r) => r.len(),
            SeriesTable::Quarterly(r) => r.len(),
            SeriesTable::Business(r) => r.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn filter_by_year(&self, range: YearRange) -> SeriesTable {
        match self {
            SeriesTable::Trade(r) => SeriesTable::Trade(filter_by_year(r, range)),
            SeriesTable::Analysis(r) => SeriesTable::Analysis(filter_by_year(r, range)),
            SeriesTable::Quarterly(r) => SeriesTable::Quarterly(filter_by_year(r, range)),
            SeriesTable::Business(r) => SeriesTable::Business(filter_by_year(r, range)),
        }
    }

    pub fn to_table(&self) -> Result<Table> {
        match self {
            SeriesTable::Trade(r) => Table::from_records(r),
            SeriesTable::Analysis(r) => Table::from_records(r),
            SeriesTable::Quarterly(r) => Table::from_records(r),
            SeriesTable::Business(r) => Table::from_records(r),
        }
    }

    /// Reads a table as the given kind; the caller names the kind, the table never does.
    pub fn from_table(kind: RecordKind, table: &Table) -> Result<Self> {
        Ok(match kind {
            RecordKind::Trade => SeriesTable::Trade(table.to_records()?),
            RecordKind::Analysis => SeriesTable::Analysis(table.to_records()?),
            RecordKind::Quarterly => SeriesTable::Quarterly(table.to_records()?),
            RecordKind::Business => SeriesTable::Business(table.to_records()?),
        })
    }
}
