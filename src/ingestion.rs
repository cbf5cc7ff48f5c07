//! Period-label parsing: turns the raw `(period label, amount)` rows of an acquired
//! table into canonical monthly amounts.
//!
//! Source tables interleave year rows and month rows:
//!
//! ```text
//! 2023년   <total>
//! 01월     120
//! 02월     95
//! 2024년   <total>
//! 01월     130
//! ```
//!
//! The parser folds over the rows with a [`ParseState`] carrying the most recent year,
//! so every step is a pure function of `(state, row)`.

use crate::config::PeriodMarkers;
use crate::error::{Result, TradeSeriesError};
use crate::schema::{MonthKey, RawAmount, RawRow};
use crate::tabular::Table;
use log::debug;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

static DEFAULT_PARSER: OnceLock<PeriodParser> = OnceLock::new();

/// Classification of a single period label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodLabel {
    Year(i32),
    Month(u32),
    Other,
}

/// Year context carried from row to row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseState {
    #[default]
    NoYearContext,
    Year(i32),
}

/// A month row resolved against its year context.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedRow {
    pub date: MonthKey,
    pub amount: f64,
}

#[derive(Debug, Clone)]
pub struct PeriodParser {
    year_pattern: Regex,
    month_pattern: Regex,
}

impl PeriodParser {
    pub fn new(markers: &PeriodMarkers) -> Result<Self> {
        Ok(Self {
            year_pattern: compile_pattern(r"^([0-9]{4})", &markers.year)?,
            month_pattern: compile_pattern(r"^([0-9]{1,2})", &markers.month)?,
        })
    }

    /// Parser for the default `년` / `월` markers.
    pub fn global() -> &'static PeriodParser {
        DEFAULT_PARSER.get_or_init(|| {
            PeriodParser::new(&PeriodMarkers::default()).expect("default markers are valid")
        })
    }

    pub fn classify(&self, label: &str) -> PeriodLabel {
        let label = label.trim();

        if let Some(year) = capture_number::<i32>(&self.year_pattern, label) {
            return PeriodLabel::Year(year);
        }

        match capture_number::<u32>(&self.month_pattern, label) {
            Some(month) if (1..=12).contains(&month) => PeriodLabel::Month(month),
            _ => PeriodLabel::Other,
        }
    }

    /// One fold step: the next state, plus the monthly amount the row produced (if any).
    pub fn step(&self, state: ParseState, row: &RawRow) -> (ParseState, Option<ParsedRow>) {
        match (self.classify(&row.period_label), state) {
            (PeriodLabel::Year(year), _) => (ParseState::Year(year), None),
            (PeriodLabel::Month(month), ParseState::Year(year)) => {
                let parsed = MonthKey::new(year, month).ok().map(|date| ParsedRow {
                    date,
                    amount: row.amount.coerce(),
                });
                (state, parsed)
            }
            (PeriodLabel::Month(_), ParseState::NoYearContext) => {
                debug!(
                    "Dropping month row '{}' seen before any year row",
                    row.period_label
                );
                (state, None)
            }
            (PeriodLabel::Other, _) => (state, None),
        }
    }

    /// Parses rows in input order. Never fails: unrecognised rows are skipped and
    /// unreadable amounts count as zero.
    pub fn parse_rows(&self, rows: &[RawRow]) -> Vec<ParsedRow> {
        let (_, parsed) = rows.iter().fold(
            (ParseState::default(), Vec::with_capacity(rows.len())),
            |(state, mut acc), row| {
                let (next, emitted) = self.step(state, row);
                acc.extend(emitted);
                (next, acc)
            },
        );

        debug!(
            "Parsed {} monthly rows out of {} raw rows",
            parsed.len(),
            rows.len()
        );
        parsed
    }
}

fn compile_pattern(prefix: &str, marker: &str) -> Result<Regex> {
    Regex::new(&format!("{}{}", prefix, regex::escape(marker)))
        .map_err(|e| TradeSeriesError::InvalidConfig(format!("marker '{}': {}", marker, e)))
}

fn capture_number<T: std::str::FromStr>(pattern: &Regex, label: &str) -> Option<T> {
    pattern
        .captures(label)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Parses with the default markers.
pub fn parse_rows(rows: &[RawRow]) -> Vec<ParsedRow> {
    PeriodParser::global().parse_rows(rows)
}

/// Reads the first two columns of an acquired table, by position, as
/// `(period label, amount)` rows. Header names are not inspected.
pub fn extract_raw_rows(table: &Table) -> Result<Vec<RawRow>> {
    if table.is_empty() {
        return Ok(Vec::new());
    }
    if table.columns().len() < 2 {
        return Err(TradeSeriesError::TooFewColumns {
            found: table.columns().len(),
        });
    }

    Ok(table
        .rows()
        .iter()
        .map(|row| RawRow {
            period_label: row.first().map(label_from_cell).unwrap_or_default(),
            amount: row.get(1).map(amount_from_cell).unwrap_or(RawAmount::Blank),
        })
        .collect())
}

fn label_from_cell(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn amount_from_cell(cell: &Value) -> RawAmount {
    match cell {
        Value::Number(n) => n.as_f64().map_or(RawAmount::Blank, RawAmount::Number),
        Value::String(s) => RawAmount::Text(s.clone()),
        _ => RawAmount::Blank,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(label: &str, amount: f64) -> RawRow {
        RawRow::new(label, amount)
    }

    fn key(s: &str) -> MonthKey {
        s.parse().unwrap()
    }

    #[test]
    fn test_classify_labels() {
        let parser = PeriodParser::global();
        let cases = [
            ("2024년", PeriodLabel::Year(2024)),
            (" 2023년 ", PeriodLabel::Year(2023)),
            ("01월", PeriodLabel::Month(1)),
            ("1월", PeriodLabel::Month(1)),
            ("12월", PeriodLabel::Month(12)),
            ("13월", PeriodLabel::Other),
            ("00월", PeriodLabel::Other),
            ("123월", PeriodLabel::Other),
            ("합계", PeriodLabel::Other),
            ("2024", PeriodLabel::Other),
            ("", PeriodLabel::Other),
        ];
        for (label, expected) in cases {
            assert_eq!(parser.classify(label), expected, "label {:?}", label);
        }
    }

    #[test]
    fn test_step_transitions() {
        let parser = PeriodParser::global();

        let (state, out) = parser.step(ParseState::NoYearContext, &row("2024년", 999.0));
        assert_eq!(state, ParseState::Year(2024));
        assert!(out.is_none());

        let (state, out) = parser.step(state, &row("3월", 10.0));
        assert_eq!(state, ParseState::Year(2024));
        assert_eq!(
            out,
            Some(ParsedRow {
                date: key("2024-03"),
                amount: 10.0
            })
        );

        let (state, out) = parser.step(ParseState::NoYearContext, &row("3월", 10.0));
        assert_eq!(state, ParseState::NoYearContext);
        assert!(out.is_none());
    }

    #[test]
    fn test_parse_rows_carries_year_context() {
        let rows = vec![
            row("01월", 5.0),
            row("2023년", 300.0),
            row("01월", 100.0),
            row("2월", 110.0),
            row("합계", 210.0),
            row("2024년", 150.0),
            row("01월", 150.0),
        ];

        let parsed = parse_rows(&rows);
        let dates: Vec<String> = parsed.iter().map(|p| p.date.to_string()).collect();
        assert_eq!(dates, vec!["2023-01", "2023-02", "2024-01"]);
        assert_eq!(parsed[1].amount, 110.0);
    }

    #[test]
    fn test_unparsable_amounts_become_zero() {
        let rows = vec![
            RawRow::new("2024년", RawAmount::Blank),
            RawRow::new("01월", "-"),
            RawRow::new("02월", RawAmount::Blank),
            RawRow::new("03월", "1,500"),
        ];
        let amounts: Vec<f64> = parse_rows(&rows).iter().map(|p| p.amount).collect();
        assert_eq!(amounts, vec![0.0, 0.0, 1500.0]);
    }

    #[test]
    fn test_output_follows_input_order() {
        let rows = vec![
            row("2024년", 0.0),
            row("02월", 2.0),
            row("01월", 1.0),
        ];
        let dates: Vec<String> = parse_rows(&rows).iter().map(|p| p.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-02", "2024-01"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_rows(&[]).is_empty());
    }

    #[test]
    fn test_custom_markers() {
        let parser = PeriodParser::new(&PeriodMarkers {
            year: "Y".to_string(),
            month: "M".to_string(),
        })
        .unwrap();
        let parsed = parser.parse_rows(&[row("2022Y", 0.0), row("7M", 42.0), row("01월", 1.0)]);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].date, key("2022-07"));
    }

    #[test]
    fn test_extract_raw_rows() {
        let table = Table::new(
            vec!["기간".to_string(), "수출금액".to_string(), "증감률".to_string()],
            vec![
                vec![json!("2024년"), json!(300.0), json!(null)],
                vec![json!("01월"), json!("120"), json!(1.5)],
                vec![json!("02월")],
            ],
        );
        let rows = extract_raw_rows(&table).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].amount, RawAmount::Number(300.0));
        assert_eq!(rows[1].amount, RawAmount::Text("120".to_string()));
        assert_eq!(rows[2].amount, RawAmount::Blank);
    }

    #[test]
    fn test_extract_raw_rows_structural_errors() {
        let narrow = Table::new(vec!["period".to_string()], vec![vec![json!("2024년")]]);
        assert!(matches!(
            extract_raw_rows(&narrow),
            Err(TradeSeriesError::TooFewColumns { found: 1 })
        ));

        let empty = Table::new(Vec::new(), Vec::new());
        assert!(extract_raw_rows(&empty).unwrap().is_empty());
    }
}
