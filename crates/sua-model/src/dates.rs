//! Fixed-width calendar date parsing.
//!
//! Regulatory layouts carry dates as eight contiguous digits (`YYYYMMDD`)
//! with no separators. Parsing is strict: the year must fall in
//! [1900, 2100] and the month/day combination must be a real calendar
//! date (leap years included).

use chrono::NaiveDate;
use thiserror::Error;

/// Lowest year accepted in an eight-digit date field.
pub const MIN_YEAR: i32 = 1900;
/// Highest year accepted in an eight-digit date field.
pub const MAX_YEAR: i32 = 2100;

/// Reasons an eight-digit date payload fails to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    #[error("expected 8 digits, got {actual} characters")]
    WrongLength { actual: usize },
    #[error("date contains non-digit characters")]
    NonNumeric,
    #[error("year {year} outside [{MIN_YEAR}, {MAX_YEAR}]")]
    YearOutOfRange { year: i32 },
    #[error("{value} is not a real calendar date")]
    NotACalendarDate { value: String },
    #[error("date {date} is after {limit}")]
    InFuture { date: NaiveDate, limit: NaiveDate },
}

/// Parse a strict `YYYYMMDD` payload.
pub fn parse_fixed_date(raw: &str) -> Result<NaiveDate, DateError> {
    if raw.len() != 8 {
        return Err(DateError::WrongLength { actual: raw.len() });
    }
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DateError::NonNumeric);
    }
    let year: i32 = raw[0..4].parse().map_err(|_| DateError::NonNumeric)?;
    let month: u32 = raw[4..6].parse().map_err(|_| DateError::NonNumeric)?;
    let day: u32 = raw[6..8].parse().map_err(|_| DateError::NonNumeric)?;
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(DateError::YearOutOfRange { year });
    }
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| DateError::NotACalendarDate {
        value: raw.to_string(),
    })
}

/// Parse a strict `YYYYMMDD` payload that must not lie after `limit`.
///
/// Used for fields the schema marks as never-in-the-future (for example a
/// file generation date checked against the evaluation date).
pub fn parse_fixed_date_not_after(raw: &str, limit: NaiveDate) -> Result<NaiveDate, DateError> {
    let date = parse_fixed_date(raw)?;
    if date > limit {
        return Err(DateError::InFuture { date, limit });
    }
    Ok(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_plain_date() {
        assert_eq!(parse_fixed_date("20240229").unwrap(), date(2024, 2, 29));
    }

    #[test]
    fn rejects_non_leap_february_29() {
        assert!(matches!(
            parse_fixed_date("19000229"),
            Err(DateError::NotACalendarDate { .. })
        ));
    }

    #[test]
    fn rejects_year_out_of_range() {
        assert!(matches!(
            parse_fixed_date("18991231"),
            Err(DateError::YearOutOfRange { year: 1899 })
        ));
        assert!(matches!(
            parse_fixed_date("21010101"),
            Err(DateError::YearOutOfRange { year: 2101 })
        ));
    }

    #[test]
    fn rejects_short_and_non_numeric() {
        assert!(matches!(
            parse_fixed_date("202401"),
            Err(DateError::WrongLength { actual: 6 })
        ));
        assert_eq!(parse_fixed_date("2024O101"), Err(DateError::NonNumeric));
    }

    #[test]
    fn enforces_not_after_limit() {
        let limit = date(2024, 6, 30);
        assert_eq!(
            parse_fixed_date_not_after("20240630", limit).unwrap(),
            limit
        );
        assert!(matches!(
            parse_fixed_date_not_after("20240701", limit),
            Err(DateError::InFuture { .. })
        ));
    }
}
