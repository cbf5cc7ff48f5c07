use chrono::{Datelike, Days, NaiveDate};

pub fn first_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_year = if month == 12 { year + 1 } else { year };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.checked_sub_days(Days::new(1))
}

/// Every calendar day of the given month, in order. Empty when the month does not exist.
pub fn days_of_month(year: i32, month: u32) -> Vec<NaiveDate> {
    let (Some(first), Some(last)) = (
        first_day_of_month(year, month),
        last_day_of_month(year, month),
    ) else {
        return Vec::new();
    };

    first
        .iter_days()
        .take_while(|d| *d <= last)
        .collect()
}

/// Calendar quarter (1-4) of a month number.
pub fn quarter_of_month(month: u32) -> u32 {
    (month.saturating_sub(1)) / 3 + 1
}

pub fn is_quarter_closing_month(month: u32) -> bool {
    matches!(month, 3 | 6 | 9 | 12)
}

pub fn is_weekend(date: NaiveDate) -> bool {
    date.weekday().number_from_monday() >= 6
}

/// Rounds to `decimals` places, ties to even.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

/// Rounds to a whole number, ties to even.
pub fn round_whole(value: f64) -> f64 {
    value.round_ties_even()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_day_of_month() {
        assert_eq!(
            last_day_of_month(2023, 2),
            NaiveDate::from_ymd_opt(2023, 2, 28)
        );
        assert_eq!(
            last_day_of_month(2024, 2),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert_eq!(
            last_day_of_month(2023, 12),
            NaiveDate::from_ymd_opt(2023, 12, 31)
        );
        assert_eq!(last_day_of_month(2023, 13), None);
    }

    #[test]
    fn test_days_of_month() {
        assert_eq!(days_of_month(2024, 2).len(), 29);
        assert_eq!(days_of_month(2023, 4).len(), 30);
        assert!(days_of_month(2023, 0).is_empty());
    }

    #[test]
    fn test_quarter_of_month() {
        assert_eq!(quarter_of_month(1), 1);
        assert_eq!(quarter_of_month(3), 1);
        assert_eq!(quarter_of_month(4), 2);
        assert_eq!(quarter_of_month(9), 3);
        assert_eq!(quarter_of_month(12), 4);
    }

    #[test]
    fn test_quarter_closing_months() {
        let closing: Vec<u32> = (1..=12).filter(|m| is_quarter_closing_month(*m)).collect();
        assert_eq!(closing, vec![3, 6, 9, 12]);
    }

    #[test]
    fn test_is_weekend() {
        // 2024-01-06 is a Saturday
        assert!(is_weekend(NaiveDate::from_ymd_opt(2024, 1, 6).unwrap()));
        assert!(is_weekend(NaiveDate::from_ymd_opt(2024, 1, 7).unwrap()));
        assert!(!is_weekend(NaiveDate::from_ymd_opt(2024, 1, 8).unwrap()));
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round_to(36.363636, 2), 36.36);
        assert_eq!(round_to(-20.0, 2), -20.0);
        assert_eq!(round_whole(2.5), 2.0);
        assert_eq!(round_whole(3.5), 4.0);
        assert_eq!(round_whole(-0.4), -0.0);
        assert_eq!(round_whole(7.6), 8.0);
    }
}
