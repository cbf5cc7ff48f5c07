//! # Trade Series Builder
//!
//! A library for turning raw monthly trade tables (export/import statistics downloaded
//! as spreadsheets) into analysis-ready time series.
//!
//! ## Core Concepts
//!
//! - **Raw rows**: `(period label, amount)` pairs where a year row (`2024년`) sets the
//!   context for the month rows (`1월`, `2월`, ...) that follow it
//! - **Trade records**: one summed amount per `YYYY-MM` month, oldest first
//! - **Growth**: month-over-month and calendar-matched year-over-year change in percent
//! - **Quarterly roll-up**: quarter totals with QoQ and YoY change
//! - **Dashboard metrics**: business-day adjusted daily averages and quarter statistics,
//!   using an injected holiday calendar
//!
//! ## Example
//!
//! ```rust,ignore
//! use trade_series_builder::*;
//!
//! let rows = vec![
//!     RawRow::new("2023년", RawAmount::Blank),
//!     RawRow::new("1월", 100.0),
//!     RawRow::new("2월", 110.0),
//!     RawRow::new("2024년", RawAmount::Blank),
//!     RawRow::new("1월", 150.0),
//! ];
//!
//! let config = AnalyticsConfig::default();
//! let report = build_report(&rows, &config).unwrap();
//! assert_eq!(report.monthly[2].yoy, Some(50.0));
//!
//! let holidays = HolidaySet::new("KR", [chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()]);
//! let dashboard = build_dashboard(&report.monthly, &holidays, &config).unwrap();
//! ```

pub mod aggregation;
pub mod calendar;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod growth;
pub mod ingestion;
pub mod quarterly;
pub mod schema;
pub mod series;
pub mod tabular;
pub mod utils;

pub use aggregation::{aggregate_by_date, aggregate_records, merge_sources, sort_by_date};
pub use calendar::{HolidayCalendar, HolidaySet, NoHolidays};
pub use config::{AnalyticsConfig, PeriodMarkers};
pub use enrichment::{
    enrich, whole_percentage_change, with_business_days, with_daily_avg_mom,
    with_daily_avg_yoy, with_quarter_stats,
};
pub use error::{Result, TradeSeriesError};
pub use growth::{calculate_mom, calculate_mom_and_yoy, calculate_yoy, percentage_change};
pub use ingestion::{extract_raw_rows, parse_rows, ParseState, ParsedRow, PeriodLabel, PeriodParser};
pub use quarterly::{roll_up_quarters, MonthlyAmount};
pub use schema::*;
pub use series::{filter_by_year, Periodic, RecordKind, SeriesTable};
pub use tabular::{Table, TabularRecord};
pub use utils::*;

use log::{debug, info};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Monthly and quarterly analytics over the same history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Report {
    pub monthly: Vec<AnalysisResult>,
    pub quarterly: Vec<QuarterlyRecord>,
}

impl Report {
    /// The monthly (`date, amount, mom, yoy`) and quarterly (`quarter, amount, qoq, yoy`)
    /// output tables, in that order.
    pub fn to_tables(&self) -> Result<(Table, Table)> {
        Ok((
            Table::from_records(&self.monthly)?,
            Table::from_records(&self.quarterly)?,
        ))
    }

    pub fn filter_by_year(&self, range: YearRange) -> Report {
        Report {
            monthly: filter_by_year(&self.monthly, range),
            quarterly: filter_by_year(&self.quarterly, range),
        }
    }
}

pub struct TradeSeriesProcessor;

impl TradeSeriesProcessor {
    /// Parses, aggregates and computes MoM/YoY over the full history.
    pub fn process(rows: &[RawRow], config: &AnalyticsConfig) -> Result<Vec<AnalysisResult>> {
        let records = Self::collect_records(rows, config)?;
        Ok(calculate_mom_and_yoy(&records))
    }

    pub fn process_table(table: &Table, config: &AnalyticsConfig) -> Result<Vec<AnalysisResult>> {
        let rows = extract_raw_rows(table)?;
        Self::process(&rows, config)
    }

    /// Parses each source table on its own, so one source's year rows never leak into
    /// another's month rows, then sums all sources per month.
    pub fn process_sources(
        tables: &[Table],
        config: &AnalyticsConfig,
    ) -> Result<Vec<AnalysisResult>> {
        config.validate()?;
        let parser = parser_for(config)?;

        info!("Processing {} trade sources", tables.len());

        let sources = tables
            .iter()
            .map(|table| -> Result<Vec<ParsedRow>> {
                Ok(parser.parse_rows(&extract_raw_rows(table)?))
            })
            .collect::<Result<Vec<_>>>()?;

        let records = merge_sources(&sources)?;
        info!("Merged sources into {} monthly records", records.len());

        Ok(calculate_mom_and_yoy(&records))
    }

    pub fn process_quarterly<T: MonthlyAmount>(monthly: &[T]) -> Vec<QuarterlyRecord> {
        roll_up_quarters(monthly)
    }

    /// Monthly and quarterly analytics, computed on the full history and then narrowed to
    /// the configured year range.
    pub fn build_report(rows: &[RawRow], config: &AnalyticsConfig) -> Result<Report> {
        let records = Self::collect_records(rows, config)?;

        let report = Report {
            monthly: calculate_mom_and_yoy(&records),
            quarterly: roll_up_quarters(&records),
        };

        Ok(match config.year_range {
            Some(range) => {
                let filtered = report.filter_by_year(range);
                debug!(
                    "Year range {}..={} kept {} of {} months",
                    range.start,
                    range.end,
                    filtered.monthly.len(),
                    report.monthly.len()
                );
                filtered
            }
            None => report,
        })
    }

    pub fn build_report_from_table(table: &Table, config: &AnalyticsConfig) -> Result<Report> {
        let rows = extract_raw_rows(table)?;
        Self::build_report(&rows, config)
    }

    /// Enriches the full monthly history for the dashboard, then narrows it to the
    /// configured year range.
    pub fn build_dashboard<C>(
        monthly: &[AnalysisResult],
        calendar: &C,
        config: &AnalyticsConfig,
    ) -> Result<Vec<BusinessMetrics>>
    where
        C: HolidayCalendar + ?Sized,
    {
        config.validate()?;

        info!("Building dashboard metrics for {} months", monthly.len());
        let metrics = enrich(monthly, calendar);
        debug!(
            "{} months carry quarter statistics",
            metrics.iter().filter(|m| m.has_quarter_stats()).count()
        );

        Ok(match config.year_range {
            Some(range) => filter_by_year(&metrics, range),
            None => metrics,
        })
    }

    fn collect_records(rows: &[RawRow], config: &AnalyticsConfig) -> Result<Vec<TradeRecord>> {
        config.validate()?;
        let parser = parser_for(config)?;

        info!("Processing {} raw trade rows", rows.len());
        let parsed = parser.parse_rows(rows);

        let records = aggregate_by_date(&parsed)?;
        info!("Aggregated into {} monthly records", records.len());
        Ok(records)
    }
}

fn parser_for(config: &AnalyticsConfig) -> Result<Cow<'static, PeriodParser>> {
    if config.markers == PeriodMarkers::default() {
        Ok(Cow::Borrowed(PeriodParser::global()))
    } else {
        Ok(Cow::Owned(PeriodParser::new(&config.markers)?))
    }
}

pub fn process_trade_rows(rows: &[RawRow], config: &AnalyticsConfig) -> Result<Vec<AnalysisResult>> {
    TradeSeriesProcessor::process(rows, config)
}

pub fn build_report(rows: &[RawRow], config: &AnalyticsConfig) -> Result<Report> {
    TradeSeriesProcessor::build_report(rows, config)
}

pub fn build_dashboard<C>(
    monthly: &[AnalysisResult],
    calendar: &C,
    config: &AnalyticsConfig,
) -> Result<Vec<BusinessMetrics>>
where
    C: HolidayCalendar + ?Sized,
{
    TradeSeriesProcessor::build_dashboard(monthly, calendar, config)
}
