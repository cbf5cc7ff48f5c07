use crate::error::Result;
use crate::ingestion::ParsedRow;
use crate::schema::{MonthKey, TradeRecord};
use log::debug;
use std::collections::BTreeMap;

/// Sums every contribution per month and returns one record per month, oldest first.
///
/// Contributions for the same month (e.g. one row per region) are added together, never
/// averaged or replaced.
pub fn aggregate_by_date<'a, I>(entries: I) -> Result<Vec<TradeRecord>>
where
    I: IntoIterator<Item = &'a ParsedRow>,
{
    sum_by_date(entries.into_iter().map(|row| (row.date, row.amount)))
}

/// Same as [`aggregate_by_date`] for records that are already typed, e.g. series built
/// from separate downloads.
pub fn aggregate_records(records: &[TradeRecord]) -> Result<Vec<TradeRecord>> {
    sum_by_date(records.iter().map(|r| (r.date, r.amount)))
}

/// Combines several independently parsed sources into a single monthly series.
pub fn merge_sources(sources: &[Vec<ParsedRow>]) -> Result<Vec<TradeRecord>> {
    debug!("Merging {} parsed sources", sources.len());
    aggregate_by_date(sources.iter().flatten())
}

/// Stable sort by month.
pub fn sort_by_date(records: &[TradeRecord]) -> Vec<TradeRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by_key(|r| r.date);
    sorted
}

fn sum_by_date(entries: impl Iterator<Item = (MonthKey, f64)>) -> Result<Vec<TradeRecord>> {
    let mut totals: BTreeMap<MonthKey, f64> = BTreeMap::new();
    let mut contributions = 0usize;
    for (date, amount) in entries {
        *totals.entry(date).or_insert(0.0) += amount;
        contributions += 1;
    }

    debug!(
        "Aggregated {} contributions into {} months",
        contributions,
        totals.len()
    );

    totals
        .into_iter()
        .map(|(date, amount)| TradeRecord::new(date, amount))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TradeSeriesError;

    fn parsed(date: &str, amount: f64) -> ParsedRow {
        ParsedRow {
            date: date.parse().unwrap(),
            amount,
        }
    }

    fn record(date: &str, amount: f64) -> TradeRecord {
        TradeRecord::new(date.parse().unwrap(), amount).unwrap()
    }

    #[test]
    fn test_duplicates_are_summed() {
        let rows = vec![
            parsed("2024-01", 100.0),
            parsed("2024-02", 200.0),
            parsed("2024-01", 50.0),
        ];
        let result = aggregate_by_date(&rows).unwrap();
        assert_eq!(result, vec![record("2024-01", 150.0), record("2024-02", 200.0)]);
    }

    #[test]
    fn test_output_is_sorted() {
        let rows = vec![
            parsed("2024-03", 3.0),
            parsed("2023-12", 1.0),
            parsed("2024-01", 2.0),
        ];
        let result = aggregate_by_date(&rows).unwrap();
        assert!(result.windows(2).all(|w| w[0].date <= w[1].date));
        assert_eq!(sort_by_date(&result), result);
    }

    #[test]
    fn test_idempotent_on_unique_dates() {
        let once = aggregate_by_date(&[parsed("2024-02", 20.0), parsed("2024-01", 10.0)]).unwrap();
        let twice = aggregate_records(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate_by_date(&Vec::<ParsedRow>::new()).unwrap().is_empty());
        assert!(aggregate_records(&[]).unwrap().is_empty());
        assert!(merge_sources(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_merge_sources() {
        let east = vec![parsed("2024-01", 100.0), parsed("2024-02", 80.0)];
        let west = vec![parsed("2024-01", 40.0), parsed("2024-03", 10.0)];
        let merged = merge_sources(&[east, west]).unwrap();
        assert_eq!(
            merged,
            vec![
                record("2024-01", 140.0),
                record("2024-02", 80.0),
                record("2024-03", 10.0)
            ]
        );
    }

    #[test]
    fn test_negative_totals_are_rejected() {
        let rows = vec![parsed("2024-01", -5.0)];
        assert!(matches!(
            aggregate_by_date(&rows),
            Err(TradeSeriesError::Validation { .. })
        ));
    }

    #[test]
    fn test_sort_by_date_is_stable_copy() {
        let records = vec![record("2024-02", 2.0), record("2024-01", 1.0)];
        let sorted = sort_by_date(&records);
        assert_eq!(sorted[0].date.to_string(), "2024-01");
        assert_eq!(records[0].date.to_string(), "2024-02");
    }
}
