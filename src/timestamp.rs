//! `date time [GMT]` argument parsing for `NEWGROUPS`/`NEWNEWS`
//!
//! Accepts both the legacy 2-digit year (`YYMMDD`, pivoting at the current
//! year's last two digits) and the 4-digit form (`YYYYMMDD`) alongside
//! `HHMMSS`. Always interpreted as UTC, matching the `DATE` command's
//! adoption of RFC time over the historical local-time behavior.

use chrono::{NaiveDate, TimeZone, Utc};

/// Parse a `NEWGROUPS`/`NEWNEWS` `date time` pair into unix seconds (UTC).
/// Returns `None` on malformed input.
pub fn parse_date_time(date: &str, time: &str) -> Option<i64> {
    if time.len() != 6 || !time.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let hour: u32 = time[0..2].parse().ok()?;
    let minute: u32 = time[2..4].parse().ok()?;
    let second: u32 = time[4..6].parse().ok()?;

    let (year, month, day) = match date.len() {
        8 if date.chars().all(|c| c.is_ascii_digit()) => {
            let year: i32 = date[0..4].parse().ok()?;
            let month: u32 = date[4..6].parse().ok()?;
            let day: u32 = date[6..8].parse().ok()?;
            (year, month, day)
        }
        6 if date.chars().all(|c| c.is_ascii_digit()) => {
            let two_digit: i32 = date[0..2].parse().ok()?;
            let current_year = Utc::now().year_two_digit();
            let year = if two_digit > current_year { 1900 + two_digit } else { 2000 + two_digit };
            let month: u32 = date[2..4].parse().ok()?;
            let day: u32 = date[4..6].parse().ok()?;
            (year, month, day)
        }
        _ => return None,
    };

    let naive_date = NaiveDate::from_ymd_opt(year, month, day)?;
    let naive_time = naive_date.and_hms_opt(hour, minute, second)?;
    Some(Utc.from_utc_datetime(&naive_time).timestamp())
}

trait YearTwoDigit {
    fn year_two_digit(self) -> i32;
}

impl YearTwoDigit for chrono::DateTime<Utc> {
    fn year_two_digit(self) -> i32 {
        use chrono::Datelike;
        self.year() % 100
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_four_digit_year() {
        let ts = parse_date_time("20260115", "133000").unwrap();
        let dt = Utc.timestamp_opt(ts, 0).unwrap();
        use chrono::Datelike;
        assert_eq!(dt.year(), 2026);
        assert_eq!(dt.month(), 1);
        assert_eq!(dt.day(), 15);
    }

    #[test]
    fn parses_two_digit_year_pivoting_on_current_year() {
        let ts = parse_date_time("260115", "000000").unwrap();
        let dt = Utc.timestamp_opt(ts, 0).unwrap();
        use chrono::Datelike;
        assert_eq!(dt.year(), 2026);
    }

    #[test]
    fn rejects_malformed_time() {
        assert!(parse_date_time("20260115", "1330").is_none());
    }

    #[test]
    fn rejects_malformed_date() {
        assert!(parse_date_time("2026-01", "133000").is_none());
    }
}
