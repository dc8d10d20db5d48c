//! Reading and formatting the time and date columns of an export.

use chrono::{Datelike, NaiveDate, Timelike};

use crate::config::Cell;

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Reads the leading digits of a string, ignoring surrounding whitespace.
fn leading_number(s: &str) -> Option<u32> {
    let s = s.trim();
    let end = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(idx, _)| idx)
        .unwrap_or(s.len());
    s[..end].parse::<u32>().ok()
}

/// The time of a cell, in minutes after midnight.
///
/// Three representations are accepted: a fraction of a day, a date-time value
/// and a `HH:MM` string (optionally followed by AM or PM).
pub fn to_minutes(cell: &Cell) -> Option<u32> {
    match cell {
        // Blank time cells reach us as a zero from some readers.
        Cell::Number(f) if *f == 0.0 || !f.is_finite() => None,
        Cell::Number(f) => {
            let total = (f * MINUTES_PER_DAY as f64).round() as i64;
            Some(total.rem_euclid(MINUTES_PER_DAY) as u32)
        }
        Cell::Date(dt) => Some(dt.hour() * 60 + dt.minute()),
        Cell::Text(s) if s.contains(':') => {
            let mut parts = s.trim().splitn(2, ':');
            let mut hours = leading_number(parts.next()?)?;
            let rest = parts.next()?;
            let minutes = leading_number(rest)?;
            let suffix = rest.to_uppercase();
            if suffix.contains("PM") && hours < 12 {
                hours += 12;
            } else if suffix.contains("AM") && hours == 12 {
                hours = 0;
            }
            if hours > 23 || minutes > 59 {
                return None;
            }
            Some(hours * 60 + minutes)
        }
        _ => None,
    }
}

/// Formats a time on a 12-hour clock. Whole hours omit the minutes:
/// 780 gives `1 PM` and 810 gives `1:30 PM`.
pub fn format_time(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    let period = if hours % 24 >= 12 { "PM" } else { "AM" };
    let display_hours = match hours % 12 {
        0 => 12,
        h => h,
    };
    if mins > 0 {
        format!("{}:{:02} {}", display_hours, mins, period)
    } else {
        format!("{} {}", display_hours, period)
    }
}

/// `start - end`, or an empty string if either time is missing.
pub fn format_time_range(start: Option<u32>, end: Option<u32>) -> String {
    match (start, end) {
        (Some(s), Some(e)) => format!("{} - {}", format_time(s), format_time(e)),
        _ => String::new(),
    }
}

/// Formats a date cell as `M/D/YY`. Text is kept as written.
pub fn format_date(cell: &Cell) -> String {
    match cell {
        Cell::Date(dt) => format!(
            "{}/{}/{:02}",
            dt.month(),
            dt.day(),
            dt.year().rem_euclid(100)
        ),
        Cell::Empty => String::new(),
        other => other.text().trim().to_string(),
    }
}

fn expand_year(year: i32, digits: usize) -> i32 {
    if digits > 2 {
        year
    } else if year < 50 {
        2000 + year
    } else {
        1900 + year
    }
}

/// The month and year of a `M/D/YY` or `M/D/YYYY` date, reading only the
/// leading date of the text.
pub fn month_year(s: &str) -> Option<(u32, i32)> {
    let mut parts = s.trim().splitn(3, '/');
    let month_s = parts.next()?;
    let day_s = parts.next()?;
    let rest = parts.next()?;
    if month_s.is_empty()
        || month_s.len() > 2
        || !month_s.chars().all(|c| c.is_ascii_digit())
        || day_s.is_empty()
        || day_s.len() > 2
        || !day_s.chars().all(|c| c.is_ascii_digit())
    {
        return None;
    }
    let year_digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if year_digits.len() < 2 {
        return None;
    }
    let year_digits: String = year_digits.chars().take(4).collect();
    let year = year_digits.parse::<i32>().ok()?;
    let month = month_s.parse::<u32>().ok()?;
    Some((month, expand_year(year, year_digits.len())))
}

/// Parses a `M/D/YY` date, as produced by [format_date].
///
/// Two-digit years below 50 are in the 2000s, the others in the 1900s.
pub fn parse_short_date(s: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = s.trim().split('/').collect();
    match parts.as_slice() {
        [m, d, y] => {
            let month = leading_number(m)?;
            let day = leading_number(d)?;
            let y = y.trim();
            let year = leading_number(y)? as i32;
            NaiveDate::from_ymd_opt(expand_year(year, y.len()), month, day)
        }
        _ => None,
    }
}

/// Number of days between two formatted dates, if both can be read.
pub fn days_apart(a: &str, b: &str) -> Option<i64> {
    let da = parse_short_date(a)?;
    let db = parse_short_date(b)?;
    Some((da - db).num_days().abs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    #[test]
    fn fraction_of_day() {
        assert_eq!(to_minutes(&Cell::Number(0.5)), Some(720));
        assert_eq!(format_time(720), "12 PM");
        let half_past_noon = to_minutes(&Cell::Number(0.520833333)).unwrap();
        assert_eq!(format_time(half_past_noon), "12:30 PM");
    }

    #[test]
    fn colon_strings() {
        assert_eq!(to_minutes(&Cell::Text("13:00".to_string())), Some(780));
        assert_eq!(format_time(780), "1 PM");
        assert_eq!(format_time(810), "1:30 PM");
        assert_eq!(to_minutes(&Cell::Text("1:30 PM".to_string())), Some(810));
        assert_eq!(to_minutes(&Cell::Text("noon".to_string())), None);
    }

    #[test]
    fn out_of_range_clock_strings() {
        assert_eq!(to_minutes(&Cell::Text("99999999:00".to_string())), None);
        assert_eq!(to_minutes(&Cell::Text("24:00".to_string())), None);
        assert_eq!(to_minutes(&Cell::Text("9:75 AM".to_string())), None);
        assert_eq!(to_minutes(&Cell::Text("23:59".to_string())), Some(1439));
    }

    #[test]
    fn date_time_values() {
        let dt = NaiveDateTime::parse_from_str("1899-12-30 08:05:00", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(to_minutes(&Cell::Date(dt)), Some(485));
        assert_eq!(format_time(485), "8:05 AM");
    }

    #[test]
    fn midnight_and_ranges() {
        assert_eq!(format_time(0), "12 AM");
        assert_eq!(format_time_range(Some(540), Some(590)), "9 AM - 9:50 AM");
        assert_eq!(format_time_range(Some(540), None), "");
        assert_eq!(to_minutes(&Cell::Number(0.0)), None);
    }

    #[test]
    fn dates() {
        let dt = NaiveDateTime::parse_from_str("2025-01-13 00:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(format_date(&Cell::Date(dt)), "1/13/25");
        assert_eq!(format_date(&Cell::Text("1/13/25".to_string())), "1/13/25");
        assert_eq!(
            parse_short_date("1/13/25"),
            NaiveDate::from_ymd_opt(2025, 1, 13)
        );
        assert_eq!(
            parse_short_date("8/25/2025"),
            NaiveDate::from_ymd_opt(2025, 8, 25)
        );
        assert_eq!(parse_short_date("Jan 13"), None);
        assert_eq!(days_apart("1/13/25", "1/27/25"), Some(14));
        assert_eq!(days_apart("1/27/25", "1/13/25"), Some(14));
    }

    #[test]
    fn month_and_year() {
        assert_eq!(month_year("1/13/25"), Some((1, 2025)));
        assert_eq!(month_year("8/25/2025 - 12/12/2025"), Some((8, 2025)));
        assert_eq!(month_year("9/2/98"), Some((9, 1998)));
        assert_eq!(month_year("TBA"), None);
    }
}
