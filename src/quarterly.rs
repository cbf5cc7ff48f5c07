use crate::growth::percentage_change;
use crate::schema::{QuarterKey, QuarterlyRecord};
use log::debug;
use std::collections::BTreeMap;

/// Number of quarter steps between a quarter and the same quarter of the previous year.
pub const QUARTERS_PER_YEAR: i64 = 4;

/// Anything with a month key and an amount can be rolled up into quarters.
pub trait MonthlyAmount {
    fn quarter(&self) -> QuarterKey;
    fn amount(&self) -> f64;
}

impl MonthlyAmount for crate::schema::TradeRecord {
    fn quarter(&self) -> QuarterKey {
        self.date.quarter()
    }

    fn amount(&self) -> f64 {
        self.amount
    }
}

impl MonthlyAmount for crate::schema::AnalysisResult {
    fn quarter(&self) -> QuarterKey {
        self.date.quarter()
    }

    fn amount(&self) -> f64 {
        self.amount
    }
}

/// Rolls a monthly series up into calendar quarters.
///
/// QoQ compares each quarter with the one before it in the output. YoY looks up the
/// quarter exactly four steps earlier by period arithmetic, so a missing quarter yields
/// `None` instead of a comparison against the wrong quarter.
pub fn roll_up_quarters<T: MonthlyAmount>(monthly: &[T]) -> Vec<QuarterlyRecord> {
    let mut totals: BTreeMap<QuarterKey, f64> = BTreeMap::new();
    for record in monthly {
        *totals.entry(record.quarter()).or_insert(0.0) += record.amount();
    }

    debug!(
        "Rolled {} monthly records up into {} quarters",
        monthly.len(),
        totals.len()
    );

    let mut previous: Option<f64> = None;
    totals
        .iter()
        .map(|(quarter, amount)| {
            let qoq = previous.and_then(|prev| percentage_change(*amount, prev));
            previous = Some(*amount);

            let yoy = quarter
                .shift(-QUARTERS_PER_YEAR)
                .and_then(|prev_quarter| totals.get(&prev_quarter))
                .and_then(|prev| percentage_change(*amount, *prev));

            QuarterlyRecord {
                quarter: *quarter,
                amount: *amount,
                qoq,
                yoy,
            }
        })
        .collect()
}
