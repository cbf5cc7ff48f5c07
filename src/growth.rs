use crate::schema::{AnalysisResult, MonthKey, TradeRecord};
use crate::utils::round_to;
use std::collections::HashMap;

/// Decimal places kept for amount growth figures.
pub const GROWTH_DECIMALS: i32 = 2;

/// Percentage change from `previous` to `current`, rounded to 2 decimals.
///
/// Returns `None` when `previous` is zero, since no meaningful change exists.
pub fn percentage_change(current: f64, previous: f64) -> Option<f64> {
    if previous == 0.0 {
        return None;
    }
    if current == previous {
        return Some(0.0);
    }
    Some(round_to(
        (current - previous) / previous * 100.0,
        GROWTH_DECIMALS,
    ))
}

/// Month-over-month change against the preceding record. Records must be sorted by date;
/// the first record has no MoM.
pub fn calculate_mom(records: &[TradeRecord]) -> Vec<AnalysisResult> {
    let mut previous: Option<f64> = None;

    records
        .iter()
        .map(|record| {
            let mom = previous.and_then(|prev| percentage_change(record.amount, prev));
            previous = Some(record.amount);
            AnalysisResult {
                mom,
                ..AnalysisResult::from(record)
            }
        })
        .collect()
}

/// Year-over-year change, matched by calendar month rather than by position, so gaps in
/// the series never pair a month with the wrong one.
pub fn calculate_yoy(results: &[AnalysisResult]) -> Vec<AnalysisResult> {
    let amount_by_date: HashMap<MonthKey, f64> =
        results.iter().map(|r| (r.date, r.amount)).collect();

    results
        .iter()
        .map(|result| {
            let yoy = result
                .date
                .previous_year()
                .and_then(|prev_date| amount_by_date.get(&prev_date))
                .and_then(|prev| percentage_change(result.amount, *prev));
            AnalysisResult {
                yoy,
                ..result.clone()
            }
        })
        .collect()
}

pub fn calculate_mom_and_yoy(records: &[TradeRecord]) -> Vec<AnalysisResult> {
    calculate_yoy(&calculate_mom(records))
}
