use crate::error::{Result, TradeSeriesError};
use crate::utils::{first_day_of_month, quarter_of_month};
use chrono::NaiveDate;
use schemars::gen::SchemaGenerator;
use schemars::schema::{InstanceType, Schema, SchemaObject};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MIN_YEAR: i32 = 0;
const MAX_YEAR: i32 = 9999;

/// Canonical monthly date key, written `YYYY-MM`.
///
/// Ordering is chronological, which is also the lexical order of the string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) || !(1..=12).contains(&month) {
            return Err(TradeSeriesError::InvalidMonthKey(format!(
                "{}-{}",
                year, month
            )));
        }
        Ok(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The same calendar month one year earlier.
    pub fn previous_year(&self) -> Option<Self> {
        Self::new(self.year - 1, self.month).ok()
    }

    pub fn quarter(&self) -> QuarterKey {
        QuarterKey {
            year: self.year,
            quarter: quarter_of_month(self.month),
        }
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        first_day_of_month(self.year, self.month)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = TradeSeriesError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || TradeSeriesError::InvalidMonthKey(s.to_string());
        let bytes = s.as_bytes();
        let well_formed = bytes.len() == 7
            && bytes[4] == b'-'
            && bytes[..4].iter().all(u8::is_ascii_digit)
            && bytes[5..].iter().all(u8::is_ascii_digit);
        if !well_formed {
            return Err(invalid());
        }

        let year = s[..4].parse().map_err(|_| invalid())?;
        let month = s[5..].parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }
}

impl TryFrom<String> for MonthKey {
    type Error = TradeSeriesError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<MonthKey> for String {
    fn from(key: MonthKey) -> Self {
        key.to_string()
    }
}

impl JsonSchema for MonthKey {
    fn schema_name() -> String {
        "MonthKey".to_string()
    }

    fn json_schema(_gen: &mut SchemaGenerator) -> Schema {
        pattern_string_schema(r"^\d{4}-\d{2}$", "Calendar month in YYYY-MM format")
    }
}

/// Calendar quarter key, written `YYYYQn`.
///
/// Quarters form an ordinal sequence (`2023Q4` + 1 = `2024Q1`) so comparisons such as
/// "the same quarter a year earlier" are plain arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QuarterKey {
    year: i32,
    quarter: u32,
}

impl QuarterKey {
    pub fn new(year: i32, quarter: u32) -> Result<Self> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) || !(1..=4).contains(&quarter) {
            return Err(TradeSeriesError::InvalidQuarterKey(format!(
                "{}Q{}",
                year, quarter
            )));
        }
        Ok(Self { year, quarter })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn quarter(&self) -> u32 {
        self.quarter
    }

    pub fn ordinal(&self) -> i64 {
        i64::from(self.year) * 4 + i64::from(self.quarter) - 1
    }

    pub fn from_ordinal(ordinal: i64) -> Option<Self> {
        let year = i32::try_from(ordinal.div_euclid(4)).ok()?;
        let quarter = u32::try_from(ordinal.rem_euclid(4)).ok()? + 1;
        Self::new(year, quarter).ok()
    }

    /// Moves `steps` quarters forward (negative steps move backward).
    pub fn shift(&self, steps: i64) -> Option<Self> {
        Self::from_ordinal(self.ordinal() + steps)
    }

    pub fn closing_month(&self) -> u32 {
        self.quarter * 3
    }
}

impl fmt::Display for QuarterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}Q{}", self.year, self.quarter)
    }
}

impl FromStr for QuarterKey {
    type Err = TradeSeriesError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || TradeSeriesError::InvalidQuarterKey(s.to_string());
        let bytes = s.as_bytes();
        let well_formed = bytes.len() == 6
            && bytes[..4].iter().all(u8::is_ascii_digit)
            && bytes[4] == b'Q'
            && bytes[5].is_ascii_digit();
        if !well_formed {
            return Err(invalid());
        }

        let year = s[..4].parse().map_err(|_| invalid())?;
        let quarter = s[5..].parse().map_err(|_| invalid())?;
        Self::new(year, quarter).map_err(|_| invalid())
    }
}

impl TryFrom<String> for QuarterKey {
    type Error = TradeSeriesError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<QuarterKey> for String {
    fn from(key: QuarterKey) -> Self {
        key.to_string()
    }
}

impl JsonSchema for QuarterKey {
    fn schema_name() -> String {
        "QuarterKey".to_string()
    }

    fn json_schema(_gen: &mut SchemaGenerator) -> Schema {
        pattern_string_schema(r"^\d{4}Q[1-4]$", "Calendar quarter in YYYYQn format")
    }
}

fn pattern_string_schema(pattern: &str, description: &str) -> Schema {
    let mut schema = SchemaObject {
        instance_type: Some(InstanceType::String.into()),
        ..Default::default()
    };
    schema.string().pattern = Some(pattern.to_string());
    schema.metadata().description = Some(description.to_string());
    schema.into()
}

/// An amount cell as it was found in the source table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum RawAmount {
    Number(f64),
    Text(String),
    Blank,
}

impl RawAmount {
    /// Numeric value of the cell. Blank, unparsable or non-finite cells count as zero.
    pub fn coerce(&self) -> f64 {
        let value = match self {
            RawAmount::Number(n) => *n,
            RawAmount::Text(text) => text.trim().replace(',', "").parse().unwrap_or(0.0),
            RawAmount::Blank => 0.0,
        };
        if value.is_finite() {
            value
        } else {
            0.0
        }
    }
}

impl From<f64> for RawAmount {
    fn from(value: f64) -> Self {
        RawAmount::Number(value)
    }
}

impl From<Option<f64>> for RawAmount {
    fn from(value: Option<f64>) -> Self {
        value.map_or(RawAmount::Blank, RawAmount::Number)
    }
}

impl From<&str> for RawAmount {
    fn from(value: &str) -> Self {
        RawAmount::Text(value.to_string())
    }
}

/// One row of an acquired table: a freeform period label and its amount cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RawRow {
    pub period_label: String,
    pub amount: RawAmount,
}

impl RawRow {
    pub fn new(period_label: impl Into<String>, amount: impl Into<RawAmount>) -> Self {
        Self {
            period_label: period_label.into(),
            amount: amount.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TradeRecord {
    #[schemars(description = "Canonical month (YYYY-MM)")]
    pub date: MonthKey,

    #[schemars(description = "Total traded amount for the month, never negative")]
    pub amount: f64,
}

impl TradeRecord {
    pub fn new(date: MonthKey, amount: f64) -> Result<Self> {
        let record = Self { date, amount };
        record.validate()?;
        Ok(record)
    }

    pub fn validate(&self) -> Result<()> {
        validate_non_negative(&self.date.to_string(), "amount", self.amount)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisResult {
    pub date: MonthKey,
    pub amount: f64,

    #[schemars(description = "Month-over-month change in percent (2 decimals)")]
    pub mom: Option<f64>,

    #[schemars(description = "Year-over-year change in percent against the same month a year earlier (2 decimals)")]
    pub yoy: Option<f64>,
}

impl AnalysisResult {
    pub fn validate(&self) -> Result<()> {
        validate_non_negative(&self.date.to_string(), "amount", self.amount)
    }
}

impl From<&TradeRecord> for AnalysisResult {
    fn from(record: &TradeRecord) -> Self {
        Self {
            date: record.date,
            amount: record.amount,
            mom: None,
            yoy: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QuarterlyRecord {
    pub quarter: QuarterKey,
    pub amount: f64,

    #[schemars(description = "Quarter-over-quarter change in percent (2 decimals)")]
    pub qoq: Option<f64>,

    #[schemars(description = "Change against the quarter four steps earlier, in percent (2 decimals)")]
    pub yoy: Option<f64>,
}

impl QuarterlyRecord {
    pub fn validate(&self) -> Result<()> {
        validate_non_negative(&self.quarter.to_string(), "amount", self.amount)
    }
}

/// A monthly record enriched with business-day adjusted figures.
///
/// The `quarter_*` fields are only ever set on the closing month (3, 6, 9 or 12) of a
/// quarter, and only when that month is the last one present for the quarter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BusinessMetrics {
    pub date: MonthKey,
    pub amount: f64,
    pub mom: Option<f64>,
    pub yoy: Option<f64>,

    #[schemars(description = "Weekdays in the month that are not public holidays")]
    pub business_days: u32,

    #[schemars(description = "amount / business_days, rounded to a whole number")]
    pub daily_avg: f64,

    #[schemars(description = "Month-over-month change of daily_avg in whole percent")]
    pub daily_avg_mom: Option<f64>,

    #[schemars(description = "Year-over-year change of daily_avg in whole percent")]
    pub daily_avg_yoy: Option<f64>,

    #[schemars(description = "Sum of daily_avg over the quarter's months")]
    pub quarter_sum: Option<f64>,

    #[schemars(description = "quarter_sum / 3, rounded to a whole number")]
    pub quarter_avg: Option<f64>,

    pub quarter_qoq: Option<f64>,
    pub quarter_yoy: Option<f64>,
}

impl BusinessMetrics {
    pub fn validate(&self) -> Result<()> {
        let record = self.date.to_string();
        validate_non_negative(&record, "amount", self.amount)?;
        validate_non_negative(&record, "daily_avg", self.daily_avg)
    }

    pub fn has_quarter_stats(&self) -> bool {
        self.quarter_sum.is_some()
            || self.quarter_avg.is_some()
            || self.quarter_qoq.is_some()
            || self.quarter_yoy.is_some()
    }
}

impl From<&AnalysisResult> for BusinessMetrics {
    fn from(result: &AnalysisResult) -> Self {
        Self {
            date: result.date,
            amount: result.amount,
            mom: result.mom,
            yoy: result.yoy,
            business_days: 0,
            daily_avg: 0.0,
            daily_avg_mom: None,
            daily_avg_yoy: None,
            quarter_sum: None,
            quarter_avg: None,
            quarter_qoq: None,
            quarter_yoy: None,
        }
    }
}

fn validate_non_negative(record: &str, field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(TradeSeriesError::Validation {
            record: record.to_string(),
            details: format!("{} must be a non-negative number, got {}", field, value),
        });
    }
    Ok(())
}

/// Inclusive range of calendar years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct YearRange {
    #[schemars(description = "First year kept (inclusive)")]
    pub start: i32,

    #[schemars(description = "Last year kept (inclusive)")]
    pub end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Result<Self> {
        let range = Self { start, end };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<()> {
        if self.start > self.end {
            return Err(TradeSeriesError::InvalidYearRange {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.start..=self.end).contains(&year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_key_parsing() {
        let key: MonthKey = "2024-01".parse().unwrap();
        assert_eq!(key.year(), 2024);
        assert_eq!(key.month(), 1);
        assert_eq!(key.to_string(), "2024-01");

        assert!("2024/01".parse::<MonthKey>().is_err());
        assert!("24-01".parse::<MonthKey>().is_err());
        assert!("2024-13".parse::<MonthKey>().is_err());
        assert!("2024-00".parse::<MonthKey>().is_err());
        assert!("2024-1".parse::<MonthKey>().is_err());
    }

    #[test]
    fn test_month_key_ordering_matches_text() {
        let mut keys: Vec<MonthKey> = ["2024-02", "2023-12", "2024-01"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        keys.sort();
        let text: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        assert_eq!(text, vec!["2023-12", "2024-01", "2024-02"]);
    }

    #[test]
    fn test_month_key_relations() {
        let key = MonthKey::new(2024, 5).unwrap();
        assert_eq!(key.previous_year(), Some(MonthKey::new(2023, 5).unwrap()));
        assert_eq!(key.quarter().to_string(), "2024Q2");
        assert_eq!(key.first_day(), NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(MonthKey::new(0, 1).unwrap().previous_year(), None);
    }

    #[test]
    fn test_quarter_key_arithmetic() {
        let q: QuarterKey = "2023Q4".parse().unwrap();
        assert_eq!(q.shift(1).unwrap().to_string(), "2024Q1");
        assert_eq!(q.shift(-4).unwrap().to_string(), "2022Q4");
        assert_eq!(q.shift(-3).unwrap().to_string(), "2023Q1");
        assert_eq!(q.closing_month(), 12);
        assert!("2023Q5".parse::<QuarterKey>().is_err());
        assert!("2023-Q1".parse::<QuarterKey>().is_err());
    }

    #[test]
    fn test_raw_amount_coercion() {
        assert_eq!(RawAmount::Number(12.5).coerce(), 12.5);
        assert_eq!(RawAmount::from(" 1,234 ").coerce(), 1234.0);
        assert_eq!(RawAmount::from("n/a").coerce(), 0.0);
        assert_eq!(RawAmount::from("NaN").coerce(), 0.0);
        assert_eq!(RawAmount::Blank.coerce(), 0.0);
        assert_eq!(RawAmount::from(None).coerce(), 0.0);
    }

    #[test]
    fn test_raw_amount_deserialization() {
        let amounts: Vec<RawAmount> = serde_json::from_str(r#"[1.5, "2", null]"#).unwrap();
        assert_eq!(
            amounts,
            vec![
                RawAmount::Number(1.5),
                RawAmount::Text("2".to_string()),
                RawAmount::Blank
            ]
        );
    }

    #[test]
    fn test_trade_record_validation() {
        let date = MonthKey::new(2024, 1).unwrap();
        assert!(TradeRecord::new(date, 1000.0).is_ok());
        assert!(TradeRecord::new(date, 0.0).is_ok());
        assert!(matches!(
            TradeRecord::new(date, -100.0),
            Err(TradeSeriesError::Validation { .. })
        ));
        assert!(TradeRecord::new(date, f64::NAN).is_err());
    }

    #[test]
    fn test_record_serialization() {
        let record = AnalysisResult {
            date: MonthKey::new(2024, 2).unwrap(),
            amount: 1500.0,
            mom: Some(50.0),
            yoy: None,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains(r#""date":"2024-02""#));

        let back: AnalysisResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);

        let bad = r#"{"date":"2024/02","amount":1.0,"mom":null,"yoy":null}"#;
        assert!(serde_json::from_str::<AnalysisResult>(bad).is_err());
    }

    #[test]
    fn test_year_range() {
        let range = YearRange::new(2023, 2024).unwrap();
        assert!(range.contains(2023));
        assert!(range.contains(2024));
        assert!(!range.contains(2025));
        assert!(YearRange::new(2025, 2024).is_err());
    }
}
