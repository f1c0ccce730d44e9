//! Monthly index-futures settlement calendar.
//!
//! Contracts expire on the third Wednesday of every month. Exchange holidays
//! are not modelled.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc, Weekday};

/// Settlement date for the given month, `None` for an invalid month.
pub fn settlement_date(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_weekday_of_month_opt(year, month, Weekday::Wed, 3)
}

/// The first settlement date on or after `today`.
pub fn next_settlement(today: NaiveDate) -> Option<NaiveDate> {
    let this_month = settlement_date(today.year(), today.month())?;
    if today <= this_month {
        return Some(this_month);
    }
    let (year, month) = if today.month() == 12 {
        (today.year() + 1, 1)
    } else {
        (today.year(), today.month() + 1)
    };
    settlement_date(year, month)
}

/// Weekdays after `today` up to and including the next settlement date.
///
/// 0 on settlement day itself, 1 on the trading day before.
pub fn days_to_settlement(today: NaiveDate) -> Option<u32> {
    let target = next_settlement(today)?;
    let trading_days = today
        .iter_days()
        .skip(1)
        .take_while(|day| *day <= target)
        .filter(|day| !matches!(day.weekday(), Weekday::Sat | Weekday::Sun))
        .count();
    u32::try_from(trading_days).ok()
}

/// Calendar date at the exchange for the instant `now`.
pub fn market_date(now: DateTime<Utc>, utc_offset_hours: i32) -> NaiveDate {
    match FixedOffset::east_opt(utc_offset_hours.saturating_mul(3600)) {
        Some(offset) => now.with_timezone(&offset).date_naive(),
        None => {
            tracing::warn!(utc_offset_hours, "Invalid UTC offset, using UTC date");
            now.date_naive()
        }
    }
}

pub fn market_today(utc_offset_hours: i32) -> NaiveDate {
    market_date(Utc::now(), utc_offset_hours)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn third_wednesday() {
        assert_eq!(settlement_date(2026, 3), Some(date(2026, 3, 18)));
        assert_eq!(settlement_date(2026, 4), Some(date(2026, 4, 15)));
        assert_eq!(settlement_date(2026, 13), None);
    }

    #[test]
    fn next_settlement_rolls_over_year_end() {
        assert_eq!(next_settlement(date(2026, 12, 16)), Some(date(2026, 12, 16)));
        assert_eq!(next_settlement(date(2026, 12, 25)), Some(date(2027, 1, 20)));
    }

    #[test]
    fn counts_weekdays_only() {
        assert_eq!(days_to_settlement(date(2026, 3, 18)), Some(0));
        assert_eq!(days_to_settlement(date(2026, 3, 17)), Some(1));
        // Friday: Mon, Tue, Wed remain.
        assert_eq!(days_to_settlement(date(2026, 3, 13)), Some(3));
        // Saturday behaves like Friday.
        assert_eq!(days_to_settlement(date(2026, 3, 14)), Some(3));
    }

    #[test]
    fn day_after_settlement_targets_next_month() {
        // 2026-03-19 (Thu) -> 2026-04-15 (Wed): 19 weekdays.
        assert_eq!(days_to_settlement(date(2026, 3, 19)), Some(19));
    }

    #[test]
    fn market_date_applies_offset() {
        let now = Utc.with_ymd_and_hms(2026, 3, 17, 20, 0, 0).unwrap();
        assert_eq!(market_date(now, 8), date(2026, 3, 18));
        assert_eq!(market_date(now, 0), date(2026, 3, 17));
        assert_eq!(market_date(now, -5), date(2026, 3, 17));
    }
}
