//! Business-day adjusted figures for the dashboard.
//!
//! Enrichment runs in four steps, each returning a new series:
//! business days and daily average, daily-average MoM, daily-average YoY, and the
//! quarter statistics. Daily-average growth is shown in whole percent, unlike the
//! 2-decimal monthly amount growth.

use crate::calendar::HolidayCalendar;
use crate::schema::{AnalysisResult, BusinessMetrics, MonthKey, QuarterKey};
use crate::utils::{is_quarter_closing_month, round_whole};
use log::debug;
use std::collections::{BTreeMap, HashMap};

/// Months per quarter, the divisor of the quarter average.
const MONTHS_PER_QUARTER: f64 = 3.0;

/// Percentage change rounded to a whole percent; `None` when `previous` is zero.
pub fn whole_percentage_change(current: f64, previous: f64) -> Option<f64> {
    if previous == 0.0 {
        return None;
    }
    Some(round_whole((current - previous) / previous * 100.0))
}

pub fn with_business_days<C>(monthly: &[AnalysisResult], calendar: &C) -> Vec<BusinessMetrics>
where
    C: HolidayCalendar + ?Sized,
{
    monthly
        .iter()
        .map(|result| {
            let business_days =
                calendar.business_days_in_month(result.date.year(), result.date.month());
            let daily_avg = if business_days > 0 {
                round_whole(result.amount / f64::from(business_days))
            } else {
                0.0
            };
            BusinessMetrics {
                business_days,
                daily_avg,
                ..BusinessMetrics::from(result)
            }
        })
        .collect()
}

/// Daily-average change against the preceding record.
pub fn with_daily_avg_mom(metrics: &[BusinessMetrics]) -> Vec<BusinessMetrics> {
    let mut previous: Option<f64> = None;

    metrics
        .iter()
        .map(|m| {
            let daily_avg_mom = previous.and_then(|prev| whole_percentage_change(m.daily_avg, prev));
            previous = Some(m.daily_avg);
            BusinessMetrics {
                daily_avg_mom,
                ..m.clone()
            }
        })
        .collect()
}

/// Daily-average change against the same calendar month a year earlier.
pub fn with_daily_avg_yoy(metrics: &[BusinessMetrics]) -> Vec<BusinessMetrics> {
    let avg_by_date: HashMap<MonthKey, f64> =
        metrics.iter().map(|m| (m.date, m.daily_avg)).collect();

    metrics
        .iter()
        .map(|m| {
            let daily_avg_yoy = m
                .date
                .previous_year()
                .and_then(|prev_date| avg_by_date.get(&prev_date))
                .and_then(|prev| whole_percentage_change(m.daily_avg, *prev));
            BusinessMetrics {
                daily_avg_yoy,
                ..m.clone()
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
struct QuarterStats {
    last_month: MonthKey,
    sum: f64,
    avg: f64,
    qoq: Option<f64>,
    yoy: Option<f64>,
}

fn quarter_stats(metrics: &[BusinessMetrics]) -> BTreeMap<QuarterKey, QuarterStats> {
    let mut grouped: BTreeMap<QuarterKey, (f64, MonthKey)> = BTreeMap::new();
    for m in metrics {
        let entry = grouped.entry(m.date.quarter()).or_insert((0.0, m.date));
        entry.0 += m.daily_avg;
        entry.1 = entry.1.max(m.date);
    }

    // QoQ and YoY step over the quarters present, by position.
    let avgs: Vec<f64> = grouped
        .values()
        .map(|(sum, _)| round_whole(sum / MONTHS_PER_QUARTER))
        .collect();

    grouped
        .into_iter()
        .enumerate()
        .map(|(i, (quarter, (sum, last_month)))| {
            let avg = avgs[i];
            let lagged = |lag: usize| {
                i.checked_sub(lag)
                    .and_then(|j| whole_percentage_change(avg, avgs[j]))
            };
            (
                quarter,
                QuarterStats {
                    last_month,
                    sum,
                    avg,
                    qoq: lagged(1),
                    yoy: lagged(4),
                },
            )
        })
        .collect()
}

/// Writes quarter statistics onto the closing month of each quarter.
///
/// A quarter is annotated only when its last month present is 3, 6, 9 or 12; a quarter
/// still in progress gets no annotation on any record.
pub fn with_quarter_stats(metrics: &[BusinessMetrics]) -> Vec<BusinessMetrics> {
    let stats = quarter_stats(metrics);

    let incomplete = stats
        .values()
        .filter(|s| !is_quarter_closing_month(s.last_month.month()))
        .count();
    if incomplete > 0 {
        debug!(
            "{} of {} quarters lack their closing month and stay unannotated",
            incomplete,
            stats.len()
        );
    }

    metrics
        .iter()
        .map(|m| {
            let closing = stats.get(&m.date.quarter()).filter(|s| {
                s.last_month == m.date && is_quarter_closing_month(m.date.month())
            });
            match closing {
                Some(s) => BusinessMetrics {
                    quarter_sum: Some(s.sum),
                    quarter_avg: Some(s.avg),
                    quarter_qoq: s.qoq,
                    quarter_yoy: s.yoy,
                    ..m.clone()
                },
                None => BusinessMetrics {
                    quarter_sum: None,
                    quarter_avg: None,
                    quarter_qoq: None,
                    quarter_yoy: None,
                    ..m.clone()
                },
            }
        })
        .collect()
}

/// Runs all four enrichment steps over a date-sorted monthly series.
pub fn enrich<C>(monthly: &[AnalysisResult], calendar: &C) -> Vec<BusinessMetrics>
where
    C: HolidayCalendar + ?Sized,
{
    let with_days = with_business_days(monthly, calendar);
    let with_mom = with_daily_avg_mom(&with_days);
    let with_yoy = with_daily_avg_yoy(&with_mom);
    with_quarter_stats(&with_yoy)
}
