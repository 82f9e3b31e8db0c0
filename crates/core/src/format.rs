//! Moment-style date formatting.
//!
//! Host settings carry display patterns in moment.js syntax
//! (`YYYY-MM-DD`, `dddd, MMMM Do`, `HH:mm`), so that is what gets rendered
//! here. Text in square brackets is copied verbatim: `[Week] W` renders as
//! `Week 20`. Characters that are not part of a token pass through.
//!
//! Week tokens: `w`/`ww`/`wo`/`gggg` follow English week numbering (weeks
//! start on Sunday, week 1 contains January 1st); `W`/`WW`/`Wo`/`GGGG` are ISO.

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, TimeZone, Timelike, Weekday};

/// What an invalid or missing date renders as.
pub const INVALID_DATE: &str = "Invalid date";

/// Tokens, longest first so `MMMM` wins over `MM`.
const TOKENS: &[&str] = &[
    "YYYY", "GGGG", "gggg", "MMMM", "DDDD", "DDDo", "dddd", //
    "MMM", "DDD", "ddd", "SSS", //
    "YY", "MM", "Mo", "DD", "Do", "dd", "do", "HH", "hh", "kk", "mm", "ss", "SS", "ww", "wo",
    "WW", "Wo", //
    "Y", "Q", "M", "D", "d", "E", "e", "H", "h", "k", "m", "s", "S", "A", "a", "X", "x", "w",
    "W",
];

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Render `date` with a moment-style `pattern`, or [`INVALID_DATE`].
#[must_use]
pub fn format_date(date: Option<NaiveDateTime>, pattern: &str) -> String {
    match date {
        Some(date) => format_moment(&date, pattern),
        None => INVALID_DATE.to_string(),
    }
}

/// Render `date` with a moment-style `pattern`.
#[must_use]
pub fn format_moment(date: &NaiveDateTime, pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut rest = pattern;

    while let Some(first) = rest.chars().next() {
        if first == '[' {
            if let Some(end) = rest.find(']') {
                out.push_str(&rest[1..end]);
                rest = &rest[end + 1..];
                continue;
            }
        }

        if let Some(token) = TOKENS.iter().find(|token| rest.starts_with(**token)) {
            render_token(&mut out, date, token);
            rest = &rest[token.len()..];
        } else {
            out.push(first);
            rest = &rest[first.len_utf8()..];
        }
    }

    out
}

fn render_token(out: &mut String, date: &NaiveDateTime, token: &str) {
    let weekday = date.weekday().num_days_from_sunday() as usize;
    let month = date.month0() as usize;
    let hour12 = match date.hour() % 12 {
        0 => 12,
        h => h,
    };

    let rendered = match token {
        "YYYY" => format!("{:04}", date.year()),
        "YY" => format!("{:02}", date.year().rem_euclid(100)),
        "Y" => date.year().to_string(),
        "Q" => ((date.month0() / 3) + 1).to_string(),

        "MMMM" => MONTH_NAMES[month].to_string(),
        "MMM" => MONTH_NAMES[month][..3].to_string(),
        "MM" => format!("{:02}", date.month()),
        "Mo" => ordinal(date.month()),
        "M" => date.month().to_string(),

        "DDDD" => format!("{:03}", date.ordinal()),
        "DDDo" => ordinal(date.ordinal()),
        "DDD" => date.ordinal().to_string(),
        "DD" => format!("{:02}", date.day()),
        "Do" => ordinal(date.day()),
        "D" => date.day().to_string(),

        "dddd" => WEEKDAY_NAMES[weekday].to_string(),
        "ddd" => WEEKDAY_NAMES[weekday][..3].to_string(),
        "dd" => WEEKDAY_NAMES[weekday][..2].to_string(),
        "do" => ordinal(weekday as u32),
        "d" | "e" => weekday.to_string(),
        "E" => date.weekday().number_from_monday().to_string(),

        "HH" => format!("{:02}", date.hour()),
        "H" => date.hour().to_string(),
        "hh" => format!("{hour12:02}"),
        "h" => hour12.to_string(),
        "kk" => format!("{:02}", if date.hour() == 0 { 24 } else { date.hour() }),
        "k" => (if date.hour() == 0 { 24 } else { date.hour() }).to_string(),
        "mm" => format!("{:02}", date.minute()),
        "m" => date.minute().to_string(),
        "ss" => format!("{:02}", date.second()),
        "s" => date.second().to_string(),
        "SSS" => format!("{:03}", date.nanosecond() / 1_000_000),
        "SS" => format!("{:02}", date.nanosecond() / 10_000_000),
        "S" => (date.nanosecond() / 100_000_000).to_string(),
        "A" => (if date.hour() < 12 { "AM" } else { "PM" }).to_string(),
        "a" => (if date.hour() < 12 { "am" } else { "pm" }).to_string(),

        "X" => local_timestamp_millis(date).div_euclid(1000).to_string(),
        "x" => local_timestamp_millis(date).to_string(),

        "ww" => format!("{:02}", locale_week(date.date()).1),
        "wo" => ordinal(locale_week(date.date()).1),
        "w" => locale_week(date.date()).1.to_string(),
        "gggg" => format!("{:04}", locale_week(date.date()).0),
        "WW" => format!("{:02}", date.iso_week().week()),
        "Wo" => ordinal(date.iso_week().week()),
        "W" => date.iso_week().week().to_string(),
        "GGGG" => format!("{:04}", date.iso_week().year()),

        other => other.to_string(),
    };
    out.push_str(&rendered);
}

/// `1st`, `2nd`, `3rd`, `4th`, `11th`, `21st`, ...
#[must_use]
pub fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

/// Week-year and week number with Sunday-start weeks, week 1 holding January 1st.
fn locale_week(date: NaiveDate) -> (i32, u32) {
    let week_start = date.week(Weekday::Sun).first_day();
    let week_end = week_start + Duration::days(6);
    let year = week_end.year();

    let week_one = NaiveDate::from_ymd_opt(year, 1, 1)
        .map_or(week_start, |jan1| jan1.week(Weekday::Sun).first_day());
    let weeks = (week_start - week_one).num_days() / 7;
    (year, u32::try_from(weeks + 1).unwrap_or(1))
}

/// Milliseconds since the epoch, reading `date` as local time.
fn local_timestamp_millis(date: &NaiveDateTime) -> i64 {
    Local
        .from_local_datetime(date)
        .earliest()
        .map_or_else(|| date.and_utc().timestamp_millis(), |local| local.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Wednesday 2024-05-15 14:05:09.250
    fn sample() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 15)
            .unwrap()
            .and_hms_milli_opt(14, 5, 9, 250)
            .unwrap()
    }

    #[test]
    fn test_common_patterns() {
        let date = sample();
        assert_eq!(format_moment(&date, "YYYY-MM-DD"), "2024-05-15");
        assert_eq!(format_moment(&date, "HH:mm"), "14:05");
        assert_eq!(format_moment(&date, "h:mm A"), "2:05 PM");
        assert_eq!(format_moment(&date, "dddd, MMMM Do YYYY"), "Wednesday, May 15th 2024");
        assert_eq!(format_moment(&date, "ddd D MMM YY"), "Wed 15 May 24");
        assert_eq!(format_moment(&date, "DD.MM.YYYY HH:mm:ss.SSS"), "15.05.2024 14:05:09.250");
    }

    #[test]
    fn test_bracket_literals() {
        let date = sample();
        assert_eq!(format_moment(&date, "[Week] W"), "Week 20");
        assert_eq!(format_moment(&date, "[Today is] dddd"), "Today is Wednesday");
        // An unclosed bracket is plain text
        assert_eq!(format_moment(&date, "[YYYY"), "[2024");
    }

    #[test]
    fn test_week_numbers() {
        let date = sample();
        assert_eq!(format_moment(&date, "gggg-[W]ww"), "2024-W20");
        assert_eq!(format_moment(&date, "GGGG-[W]WW"), "2024-W20");

        // Sunday 2023-12-31 is in ISO week 52 of 2023 but in week 1 of 2024
        // when weeks start on Sunday
        let new_years_eve = NaiveDate::from_ymd_opt(2023, 12, 31)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(format_moment(&new_years_eve, "gggg w"), "2024 1");
        assert_eq!(format_moment(&new_years_eve, "GGGG W"), "2023 52");
    }

    #[test]
    fn test_twelve_hour_edges() {
        let midnight = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 30, 0)
            .unwrap();
        assert_eq!(format_moment(&midnight, "hh:mm a"), "12:30 am");
        assert_eq!(format_moment(&midnight, "k:mm"), "24:30");
        let noon = midnight + Duration::hours(12);
        assert_eq!(format_moment(&noon, "h A"), "12 PM");
    }

    #[test]
    fn test_ordinals() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(2), "2nd");
        assert_eq!(ordinal(3), "3rd");
        assert_eq!(ordinal(4), "4th");
        assert_eq!(ordinal(11), "11th");
        assert_eq!(ordinal(12), "12th");
        assert_eq!(ordinal(13), "13th");
        assert_eq!(ordinal(21), "21st");
        assert_eq!(ordinal(112), "112th");
    }

    #[test]
    fn test_invalid_date() {
        assert_eq!(format_date(None, "YYYY-MM-DD"), "Invalid date");
        assert_eq!(format_date(Some(sample()), "Q"), "2");
    }

    #[test]
    fn test_non_token_text_passes_through() {
        assert_eq!(format_moment(&sample(), "YYYY/MM/DD (!)"), "2024/05/15 (!)");
    }
}
