//! General-purpose natural language date recognition.
//!
//! [`DateRecognizer`] is the capability the resolver delegates to for
//! everything its own rules do not cover. [`CasualRecognizer`] is the
//! built-in English implementation and understands:
//! - Relative words: `now`, `today`, `tomorrow`, `yesterday`, `tonight`
//! - Time of day: `15:00`, `15:00:30`, `3:30pm`, `9am`, `noon`, `midnight`
//! - Weekdays: `monday`, `this friday`, `next friday`, `last tuesday`
//! - Relative periods: `this month`, `next week`, `last year`
//! - Relative offsets: `in 2 days`, `3 weeks ago`, `+15 minutes`, `a month from now`
//! - Month + day: `15 dec`, `march 15th`, `dec 25, 2025`
//! - Month alone: `june`, `february 2024`
//! - Numeric dates: `2024-02-29`, `2024/02/29`, `29.02.2024`, `2/29/2024`, `2/29`
//! - Special dates: `christmas`, `new year's eve`, `halloween`, `thanksgiving`
//! - Period boundaries: `end of month`, `eom`, `start of week`
//! - Quarters: `q1`, `next quarter`
//!
//! Any date expression may be followed by a time: `tomorrow at 9am`.
//! Expressions that name only a date resolve to the start of that day.

use chrono::{
    Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday,
};
use regex::Regex;
use std::sync::OnceLock;

use crate::ordinal::parse_ordinal;
use crate::weekday::weekday_from_name;

/// Options for a single recognition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Move ambiguous expressions (bare weekday, month and day without a
    /// year, time already passed today) to their next occurrence.
    pub forward_date: bool,
    /// First day of the week for `this`/`next`/`last` weekday and week
    /// boundary phrases. Sunday when unset.
    pub week_start: Option<Weekday>,
    /// Read `A/B` numeric dates as day/month instead of month/day.
    pub little_endian: bool,
}

impl ParseOptions {
    /// Forward-biased options with no week-start hint.
    #[must_use]
    pub fn forward() -> Self {
        Self {
            forward_date: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_week_start(mut self, day: Weekday) -> Self {
        self.week_start = Some(day);
        self
    }

    #[must_use]
    pub fn with_little_endian(mut self, little_endian: bool) -> Self {
        self.little_endian = little_endian;
        self
    }
}

/// Turns free text into a point in time relative to `reference`.
///
/// Returns `None` when the text has no confident interpretation.
pub trait DateRecognizer: Send + Sync {
    fn parse_date(
        &self,
        text: &str,
        reference: NaiveDateTime,
        options: &ParseOptions,
    ) -> Option<NaiveDateTime>;
}

/// Built-in casual English recognizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct CasualRecognizer;

const MONTH_NAMES: &str = r"jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?";

const UNITS: &str = r"seconds?|secs?|minutes?|mins?|hours?|hrs?|days?|weeks?|months?|years?";

/// Regex patterns, compiled once.
fn patterns() -> &'static DatePatterns {
    static PATTERNS: OnceLock<DatePatterns> = OnceLock::new();
    PATTERNS.get_or_init(DatePatterns::new)
}

struct DatePatterns {
    // Time of day: 15:00, 15:00:30, 3:30pm, 9am
    time_24h: Regex,
    time_12h: Regex,
    time_12h_bare: Regex,

    // Relative offsets: "in 2 days", "3 weeks ago", "+15 minutes"
    in_n_units: Regex,
    n_units_ago: Regex,
    n_units_from_now: Regex,
    signed_units: Regex,
    a_unit_ago: Regex,
    a_unit_from_now: Regex,

    // Month + day: "15 dec", "dec 15", "march 15th, 2025"
    day_month: Regex,
    month_day: Regex,
    month_only: Regex,

    // Numeric dates
    iso_date: Regex,
    slash_ymd: Regex,
    dot_dmy: Regex,
    slash_numeric: Regex,

    // Anchored to a relative period: "15th next month", "june next year"
    day_of_month_period: Regex,
    month_period_day: Regex,
    within_year_period: Regex,
    year_period_within: Regex,

    // "end of next month", "start of the week"
    period_boundary: Regex,

    // "<date> [at] <time>"
    date_then_time: Regex,
}

impl DatePatterns {
    fn new() -> Self {
        Self {
            // 15:00 or 15:00:30
            time_24h: Regex::new(r"^(\d{1,2}):(\d{2})(?::(\d{2}))?$").unwrap(),
            // 3:30pm, 3:30 pm
            time_12h: Regex::new(r"^(\d{1,2}):(\d{2})\s*(am|pm)$").unwrap(),
            // 9am, 9 am, 12pm
            time_12h_bare: Regex::new(r"^(\d{1,2})\s*(am|pm)$").unwrap(),

            in_n_units: Regex::new(&format!(r"^in\s+(\d+)\s+({UNITS})$")).unwrap(),
            n_units_ago: Regex::new(&format!(r"^(\d+)\s+({UNITS})\s+ago$")).unwrap(),
            n_units_from_now: Regex::new(&format!(r"^(\d+)\s+({UNITS})\s+from\s+now$")).unwrap(),
            signed_units: Regex::new(&format!(r"^([+-])\s*(\d+)\s*({UNITS})$")).unwrap(),
            a_unit_ago: Regex::new(&format!(r"^(?:a|an|one)\s+({UNITS})\s+ago$")).unwrap(),
            a_unit_from_now: Regex::new(&format!(
                r"^(?:in\s+(?:a|an|one)|(?:a|an|one)\s+)\s*({UNITS})(?:\s+from\s+now)?$"
            ))
            .unwrap(),

            day_month: Regex::new(&format!(
                r"^(\d{{1,2}})(?:st|nd|rd|th)?\s+(?:of\s+)?({MONTH_NAMES})\.?(?:,?\s+(\d{{4}}))?$"
            ))
            .unwrap(),
            month_day: Regex::new(&format!(
                r"^({MONTH_NAMES})\.?\s+(\d{{1,2}})(?:st|nd|rd|th)?(?:,?\s+(\d{{4}}))?$"
            ))
            .unwrap(),
            month_only: Regex::new(&format!(r"^({MONTH_NAMES})\.?(?:,?\s+(\d{{4}}))?$")).unwrap(),

            iso_date: Regex::new(
                r"^(\d{4})-(\d{1,2})-(\d{1,2})(?:[t ](\d{1,2}):(\d{2})(?::(\d{2}))?)?$",
            )
            .unwrap(),
            slash_ymd: Regex::new(r"^(\d{4})/(\d{1,2})/(\d{1,2})$").unwrap(),
            dot_dmy: Regex::new(r"^(\d{1,2})\.(\d{1,2})\.(\d{4})$").unwrap(),
            slash_numeric: Regex::new(r"^(\d{1,2})/(\d{1,2})(?:/(\d{4}|\d{2}))?$").unwrap(),

            day_of_month_period: Regex::new(
                r"^(?:the\s+)?([a-z0-9-]+)\s+(?:of\s+)?(?:the\s+)?(this|next|last|previous)\s+month$",
            )
            .unwrap(),
            month_period_day: Regex::new(
                r"^(this|next|last|previous)\s+month\s+(?:on\s+)?(?:the\s+)?([a-z0-9-]+)$",
            )
            .unwrap(),
            within_year_period: Regex::new(
                r"^(.+?)\s+(?:of\s+)?(this|next|last|previous)\s+year$",
            )
            .unwrap(),
            year_period_within: Regex::new(
                r"^(this|next|last|previous)\s+year\s+(?:in\s+|on\s+)?(.+)$",
            )
            .unwrap(),

            period_boundary: Regex::new(
                r"^(?:the\s+)?(end|start|beginning|first day|last day)\s+of\s+(?:the\s+)?(?:(this|next|last|previous)\s+)?(week|month|year)$",
            )
            .unwrap(),

            date_then_time: Regex::new(
                r"^(.+?)\s+(?:at\s+)?(\d{1,2}(?::\d{2}){0,2}\s*(?:am|pm)?|noon|midnight)$",
            )
            .unwrap(),
        }
    }
}

/// One recognition request, with the input already normalized.
struct Request<'a> {
    text: &'a str,
    reference: NaiveDateTime,
    options: &'a ParseOptions,
}

impl Request<'_> {
    fn today(&self) -> NaiveDate {
        self.reference.date()
    }

    fn week_start(&self) -> Weekday {
        self.options.week_start.unwrap_or(Weekday::Sun)
    }

    fn with_text<'b>(&'b self, text: &'b str) -> Request<'b> {
        Request {
            text,
            reference: self.reference,
            options: self.options,
        }
    }

    /// Month and day in the given year, or in the reference year, moved to
    /// next year when forward-biased and already past.
    fn month_day(&self, month: u32, day: u32, year: Option<i32>) -> Option<NaiveDate> {
        if let Some(year) = year {
            return NaiveDate::from_ymd_opt(year, month, day);
        }
        let today = self.today();
        let date = NaiveDate::from_ymd_opt(today.year(), month, day)?;
        if self.options.forward_date && date < today {
            NaiveDate::from_ymd_opt(today.year() + 1, month, day)
        } else {
            Some(date)
        }
    }
}

fn start_of_day(date: NaiveDate) -> Option<NaiveDateTime> {
    date.and_hms_opt(0, 0, 0)
}

/// How many days `day` is past the start of its week.
fn days_from_week_start(day: Weekday, week_start: Weekday) -> i64 {
    let offset = 7 + day.num_days_from_sunday() - week_start.num_days_from_sunday();
    i64::from(offset % 7)
}

fn start_of_week(date: NaiveDate, week_start: Weekday) -> NaiveDate {
    date - Duration::days(days_from_week_start(date.weekday(), week_start))
}

/// Periods away from the current one: this = 0, next = 1, last = -1.
fn period_step(modifier: &str) -> Option<i64> {
    match modifier {
        "this" => Some(0),
        "next" => Some(1),
        "last" | "previous" => Some(-1),
        _ => None,
    }
}

/// Longest run of words the embedded scan will try as one phrase.
const MAX_EMBEDDED_WORDS: usize = 8;

impl CasualRecognizer {
    /// Relative words: now, today, tomorrow, yesterday, tonight
    fn parse_relative_word(req: &Request<'_>) -> Option<NaiveDateTime> {
        let today = req.today();
        match req.text {
            "now" | "right now" => Some(req.reference),
            "today" => start_of_day(today),
            "tomorrow" | "tmr" | "tmrw" => start_of_day(today + Duration::days(1)),
            "yesterday" => start_of_day(today - Duration::days(1)),
            "tonight" => today.and_hms_opt(20, 0, 0),
            _ => None,
        }
    }

    /// Clock time: 15:00, 15:00:30, 3:30pm, 9am, noon, midnight
    fn parse_clock(text: &str) -> Option<NaiveTime> {
        let patterns = patterns();

        match text {
            "noon" | "midday" => return NaiveTime::from_hms_opt(12, 0, 0),
            "midnight" => return NaiveTime::from_hms_opt(0, 0, 0),
            _ => {}
        }

        if let Some(caps) = patterns.time_24h.captures(text) {
            let hour: u32 = caps[1].parse().ok()?;
            let min: u32 = caps[2].parse().ok()?;
            let sec: u32 = caps.get(3).map_or(Some(0), |m| m.as_str().parse().ok())?;
            return NaiveTime::from_hms_opt(hour, min, sec);
        }

        let (hour, min, ampm) = if let Some(caps) = patterns.time_12h.captures(text) {
            (caps[1].parse::<u32>().ok()?, caps[2].parse::<u32>().ok()?, caps[3].to_string())
        } else if let Some(caps) = patterns.time_12h_bare.captures(text) {
            (caps[1].parse::<u32>().ok()?, 0, caps[2].to_string())
        } else {
            return None;
        };

        if !(1..=12).contains(&hour) {
            return None;
        }
        // Convert to 24-hour
        let hour = match (ampm.as_str(), hour) {
            ("am", 12) => 0,
            ("pm", 12) => 12,
            ("pm", h) => h + 12,
            (_, h) => h,
        };
        NaiveTime::from_hms_opt(hour, min, 0)
    }

    /// Time of day on the reference date (tomorrow if passed and forward-biased)
    fn parse_time_of_day(req: &Request<'_>) -> Option<NaiveDateTime> {
        let time = Self::parse_clock(req.text)?;
        let at = req.today().and_time(time);
        if req.options.forward_date && at < req.reference {
            return Some(at + Duration::days(1));
        }
        Some(at)
    }

    /// Shift `from` by `n` of `unit`; calendar arithmetic for months and years.
    fn shift(from: NaiveDateTime, unit: &str, n: i64) -> Option<NaiveDateTime> {
        let months = |count: i64| -> Option<NaiveDateTime> {
            let magnitude = Months::new(u32::try_from(count.unsigned_abs()).ok()?);
            if count >= 0 {
                from.checked_add_months(magnitude)
            } else {
                from.checked_sub_months(magnitude)
            }
        };

        if unit.starts_with("sec") {
            from.checked_add_signed(Duration::try_seconds(n)?)
        } else if unit.starts_with("min") {
            from.checked_add_signed(Duration::try_minutes(n)?)
        } else if unit.starts_with('h') {
            from.checked_add_signed(Duration::try_hours(n)?)
        } else if unit.starts_with("day") {
            from.checked_add_signed(Duration::try_days(n)?)
        } else if unit.starts_with("week") {
            from.checked_add_signed(Duration::try_weeks(n)?)
        } else if unit.starts_with("month") {
            months(n)
        } else if unit.starts_with("year") {
            months(n.checked_mul(12)?)
        } else {
            None
        }
    }

    /// Relative offsets: "in 2 days", "3 weeks ago", "+15 minutes", "a month from now"
    fn parse_relative_offset(req: &Request<'_>) -> Option<NaiveDateTime> {
        let patterns = patterns();
        let text = req.text;

        if let Some(caps) = patterns.in_n_units.captures(text) {
            let n: i64 = caps[1].parse().ok()?;
            return Self::shift(req.reference, &caps[2], n);
        }
        if let Some(caps) = patterns.n_units_from_now.captures(text) {
            let n: i64 = caps[1].parse().ok()?;
            return Self::shift(req.reference, &caps[2], n);
        }
        if let Some(caps) = patterns.n_units_ago.captures(text) {
            let n: i64 = caps[1].parse().ok()?;
            return Self::shift(req.reference, &caps[2], -n);
        }
        if let Some(caps) = patterns.signed_units.captures(text) {
            let n: i64 = caps[2].parse().ok()?;
            let n = if &caps[1] == "-" { -n } else { n };
            return Self::shift(req.reference, &caps[3], n);
        }
        if let Some(caps) = patterns.a_unit_ago.captures(text) {
            return Self::shift(req.reference, &caps[1], -1);
        }
        if let Some(caps) = patterns.a_unit_from_now.captures(text) {
            return Self::shift(req.reference, &caps[1], 1);
        }
        None
    }

    /// Relative periods: this month, next week, last year
    fn parse_relative_period(req: &Request<'_>) -> Option<NaiveDateTime> {
        let (modifier, unit) = req.text.split_once(' ')?;
        let step = period_step(modifier)?;
        let today = start_of_day(req.today())?;
        match unit {
            "week" if step == 0 => start_of_day(start_of_week(req.today(), req.week_start())),
            "week" => Self::shift(today, "weeks", step),
            "month" => Self::shift(today, "months", step),
            "year" => Self::shift(today, "years", step),
            _ => None,
        }
    }

    /// A day inside a relative month or year: "15th next month",
    /// "next month on the 3rd", "june next year", "next year in march"
    fn parse_anchored_period(req: &Request<'_>) -> Option<NaiveDateTime> {
        let patterns = patterns();
        let text = req.text;

        let month_day = patterns
            .day_of_month_period
            .captures(text)
            .map(|caps| (caps.get(2), caps.get(1)))
            .or_else(|| {
                patterns
                    .month_period_day
                    .captures(text)
                    .map(|caps| (caps.get(1), caps.get(2)))
            });
        if let Some((Some(modifier), Some(day))) = month_day {
            let step = period_step(modifier.as_str())?;
            let day = parse_ordinal(day.as_str())?;
            let month = Self::shift(start_of_day(req.today())?, "months", step)?;
            return start_of_day(NaiveDate::from_ymd_opt(month.year(), month.month(), day)?);
        }

        let (modifier, within) = if let Some(caps) = patterns.within_year_period.captures(text) {
            (caps.get(2)?.as_str(), caps.get(1)?.as_str())
        } else if let Some(caps) = patterns.year_period_within.captures(text) {
            (caps.get(1)?.as_str(), caps.get(2)?.as_str())
        } else {
            return None;
        };
        let year = req.today().year() + i32::try_from(period_step(modifier)?).ok()?;

        // Month and day are read as-is within the target year
        let options = ParseOptions {
            forward_date: false,
            ..*req.options
        };
        let inner = Request {
            text: within,
            reference: start_of_day(NaiveDate::from_ymd_opt(year, 1, 1)?)?,
            options: &options,
        };
        Self::parse_month_day(&inner).or_else(|| Self::parse_month_only(&inner))
    }

    /// Weekdays: monday, this friday, next friday, last tuesday
    fn parse_weekday(req: &Request<'_>) -> Option<NaiveDateTime> {
        let (prefix, name) = match req.text.split_once(' ') {
            Some((prefix @ ("this" | "next" | "last" | "coming" | "on"), rest)) => (prefix, rest),
            Some(_) => return None,
            None => ("", req.text),
        };
        let target = weekday_from_name(name.trim_end_matches('.'))?;
        let today = req.today();
        let week_start = req.week_start();

        let this_week =
            start_of_week(today, week_start) + Duration::days(days_from_week_start(target, week_start));

        let date = match prefix {
            "this" => this_week,
            "next" => this_week + Duration::weeks(1),
            "last" => this_week - Duration::weeks(1),
            // "coming friday" and bare weekdays
            _ => {
                let ahead = i64::from(
                    (7 + target.num_days_from_sunday() - today.weekday().num_days_from_sunday())
                        % 7,
                );
                if req.options.forward_date || prefix == "coming" || ahead <= 3 {
                    today + Duration::days(ahead)
                } else {
                    // Closest occurrence: three or fewer days back
                    today - Duration::days(7 - ahead)
                }
            }
        };
        start_of_day(date)
    }

    /// Month + day: "15 dec", "dec 15", "march 15th, 2025"
    fn parse_month_day(req: &Request<'_>) -> Option<NaiveDateTime> {
        let patterns = patterns();

        let (day, month_str, year) = if let Some(caps) = patterns.day_month.captures(req.text) {
            (
                caps[1].parse::<u32>().ok()?,
                caps[2].to_string(),
                caps.get(3).and_then(|m| m.as_str().parse::<i32>().ok()),
            )
        } else if let Some(caps) = patterns.month_day.captures(req.text) {
            (
                caps[2].parse::<u32>().ok()?,
                caps[1].to_string(),
                caps.get(3).and_then(|m| m.as_str().parse::<i32>().ok()),
            )
        } else {
            return None;
        };

        if !(1..=31).contains(&day) {
            return None;
        }
        let month = month_name_to_number(&month_str)?;
        start_of_day(req.month_day(month, day, year)?)
    }

    /// Month alone: "june", "february 2024" (first of the month)
    fn parse_month_only(req: &Request<'_>) -> Option<NaiveDateTime> {
        let caps = patterns().month_only.captures(req.text)?;
        let month = month_name_to_number(&caps[1])?;
        let year = caps.get(2).and_then(|m| m.as_str().parse::<i32>().ok());

        let date = match year {
            Some(year) => NaiveDate::from_ymd_opt(year, month, 1)?,
            None => {
                let today = req.today();
                let year = if req.options.forward_date && month < today.month() {
                    today.year() + 1
                } else {
                    today.year()
                };
                NaiveDate::from_ymd_opt(year, month, 1)?
            }
        };
        start_of_day(date)
    }

    /// Numeric dates: 2024-02-29, 2024/02/29, 29.02.2024, 2/29/2024, 2/29
    fn parse_numeric_date(req: &Request<'_>) -> Option<NaiveDateTime> {
        let patterns = patterns();
        let text = req.text;

        if let Some(caps) = patterns.iso_date.captures(text) {
            let date = NaiveDate::from_ymd_opt(
                caps[1].parse().ok()?,
                caps[2].parse().ok()?,
                caps[3].parse().ok()?,
            )?;
            let hour: u32 = caps.get(4).map_or(Some(0), |m| m.as_str().parse().ok())?;
            let min: u32 = caps.get(5).map_or(Some(0), |m| m.as_str().parse().ok())?;
            let sec: u32 = caps.get(6).map_or(Some(0), |m| m.as_str().parse().ok())?;
            return date.and_hms_opt(hour, min, sec);
        }

        if let Some(caps) = patterns.slash_ymd.captures(text) {
            let date = NaiveDate::from_ymd_opt(
                caps[1].parse().ok()?,
                caps[2].parse().ok()?,
                caps[3].parse().ok()?,
            )?;
            return start_of_day(date);
        }

        if let Some(caps) = patterns.dot_dmy.captures(text) {
            let date = NaiveDate::from_ymd_opt(
                caps[3].parse().ok()?,
                caps[2].parse().ok()?,
                caps[1].parse().ok()?,
            )?;
            return start_of_day(date);
        }

        if let Some(caps) = patterns.slash_numeric.captures(text) {
            let a: u32 = caps[1].parse().ok()?;
            let b: u32 = caps[2].parse().ok()?;
            let (month, day) = if req.options.little_endian { (b, a) } else { (a, b) };
            let year = match caps.get(3) {
                Some(m) if m.as_str().len() == 2 => Some(2000 + m.as_str().parse::<i32>().ok()?),
                Some(m) => Some(m.as_str().parse::<i32>().ok()?),
                None => None,
            };
            return start_of_day(req.month_day(month, day, year)?);
        }

        None
    }

    /// Special dates: christmas, halloween, thanksgiving, etc.
    fn parse_special_date(req: &Request<'_>) -> Option<NaiveDateTime> {
        let date = match req.text {
            // Anything naming christmas is claimed before recognition
            "xmas" => req.month_day(12, 25, None)?,
            "new year's eve" | "new years eve" | "nye" => req.month_day(12, 31, None)?,
            "new years" | "new year" | "new years day" | "new year's day" => {
                req.month_day(1, 1, None)?
            }
            "halloween" => req.month_day(10, 31, None)?,
            "valentines" | "valentine's day" | "valentines day" => req.month_day(2, 14, None)?,
            "independence day" | "4th of july" | "fourth of july" => req.month_day(7, 4, None)?,
            "thanksgiving" => {
                // Fourth Thursday of November
                let year = req.today().year();
                let this_year = NaiveDate::from_weekday_of_month_opt(year, 11, Weekday::Thu, 4)?;
                if req.options.forward_date && this_year < req.today() {
                    NaiveDate::from_weekday_of_month_opt(year + 1, 11, Weekday::Thu, 4)?
                } else {
                    this_year
                }
            }
            _ => return None,
        };
        start_of_day(date)
    }

    /// Period boundaries: end of month, start of next year, eow, etc.
    fn parse_period_boundary(req: &Request<'_>) -> Option<NaiveDateTime> {
        let (end, step, unit) = match req.text {
            "eom" => (true, 0, "month"),
            "som" => (false, 0, "month"),
            "eoy" => (true, 0, "year"),
            "soy" => (false, 0, "year"),
            "eow" => (true, 0, "week"),
            "sow" => (false, 0, "week"),
            text => {
                let caps = patterns().period_boundary.captures(text)?;
                let end = matches!(caps.get(1)?.as_str(), "end" | "last day");
                let step = caps.get(2).map_or(Some(0), |m| period_step(m.as_str()))?;
                (end, step, caps.get(3)?.as_str())
            }
        };

        let today = start_of_day(req.today())?;
        let date = match unit {
            "week" => {
                let day = Self::shift(today, "weeks", step)?.date();
                let start = start_of_week(day, req.week_start());
                if end {
                    start + Duration::days(6)
                } else {
                    start
                }
            }
            "month" => {
                let day = Self::shift(today, "months", step)?.date();
                let first = NaiveDate::from_ymd_opt(day.year(), day.month(), 1)?;
                if end {
                    first.checked_add_months(Months::new(1))? - Duration::days(1)
                } else {
                    first
                }
            }
            _ => {
                let year = Self::shift(today, "years", step)?.year();
                if end {
                    NaiveDate::from_ymd_opt(year, 12, 31)?
                } else {
                    NaiveDate::from_ymd_opt(year, 1, 1)?
                }
            }
        };
        start_of_day(date)
    }

    /// Quarters: q1, q2, this quarter, next quarter
    fn parse_quarter(req: &Request<'_>) -> Option<NaiveDateTime> {
        let today = req.today();
        let year = today.year();
        let current = (today.month() - 1) / 3 + 1;

        let (target_year, quarter) = match req.text {
            "q1" => (year, 1),
            "q2" => (year, 2),
            "q3" => (year, 3),
            "q4" => (year, 4),
            "this quarter" => (year, current),
            "next quarter" if current == 4 => (year + 1, 1),
            "next quarter" => (year, current + 1),
            "last quarter" if current == 1 => (year - 1, 4),
            "last quarter" => (year, current - 1),
            _ => return None,
        };

        start_of_day(NaiveDate::from_ymd_opt(target_year, (quarter - 1) * 3 + 1, 1)?)
    }

    /// Try every date-level parser in order of specificity.
    fn parse_whole(req: &Request<'_>) -> Option<NaiveDateTime> {
        Self::parse_relative_word(req)
            .or_else(|| Self::parse_time_of_day(req))
            .or_else(|| Self::parse_relative_offset(req))
            .or_else(|| Self::parse_relative_period(req))
            .or_else(|| Self::parse_anchored_period(req))
            .or_else(|| Self::parse_weekday(req))
            .or_else(|| Self::parse_numeric_date(req))
            .or_else(|| Self::parse_month_day(req))
            .or_else(|| Self::parse_month_only(req))
            .or_else(|| Self::parse_special_date(req))
            .or_else(|| Self::parse_period_boundary(req))
            .or_else(|| Self::parse_quarter(req))
    }

    /// "<date> [at] <time>": "tomorrow at 9am", "next friday 15:30"
    fn parse_with_time(req: &Request<'_>) -> Option<NaiveDateTime> {
        let caps = patterns().date_then_time.captures(req.text)?;
        let time = Self::parse_clock(caps[2].trim())?;
        let date_req = req.with_text(caps[1].trim());
        let date = Self::parse_whole(&date_req)?;
        Some(date.date().and_time(time))
    }

    /// Longest run of words that reads as a date, leftmost on ties:
    /// "meeting next friday", "call mom tomorrow at 9am".
    fn parse_embedded(req: &Request<'_>) -> Option<NaiveDateTime> {
        let words: Vec<&str> = req.text.split(' ').collect();
        let longest = words.len().saturating_sub(1).min(MAX_EMBEDDED_WORDS);

        (1..=longest).rev().find_map(|len| {
            words.windows(len).find_map(|window| {
                let joined = window.join(" ");
                let phrase = joined.trim_matches([',', ';', '(', ')', '"']);
                if phrase.is_empty() {
                    return None;
                }
                let sub = req.with_text(phrase);
                Self::parse_whole(&sub).or_else(|| Self::parse_with_time(&sub))
            })
        })
    }
}

impl DateRecognizer for CasualRecognizer {
    fn parse_date(
        &self,
        text: &str,
        reference: NaiveDateTime,
        options: &ParseOptions,
    ) -> Option<NaiveDateTime> {
        let normalized = normalize(text);
        if normalized.is_empty() {
            return None;
        }
        let req = Request {
            text: &normalized,
            reference: reference.with_nanosecond(0).unwrap_or(reference),
            options,
        };
        Self::parse_whole(&req)
            .or_else(|| Self::parse_with_time(&req))
            .or_else(|| Self::parse_embedded(&req))
    }
}

/// Lowercase, collapse whitespace, drop trailing sentence punctuation.
fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
        .trim_end_matches(['.', ',', '!', '?'])
        .to_string()
}

/// Convert month name to number (1-12)
pub(crate) fn month_name_to_number(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    match lower.as_str() {
        s if s.starts_with("jan") => Some(1),
        s if s.starts_with("feb") => Some(2),
        s if s.starts_with("mar") => Some(3),
        s if s.starts_with("apr") => Some(4),
        "may" => Some(5),
        s if s.starts_with("jun") => Some(6),
        s if s.starts_with("jul") => Some(7),
        s if s.starts_with("aug") => Some(8),
        s if s.starts_with("sep") => Some(9),
        s if s.starts_with("oct") => Some(10),
        s if s.starts_with("nov") => Some(11),
        s if s.starts_with("dec") => Some(12),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Wednesday 2024-05-15 10:30
    fn reference() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 15)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    fn parse(text: &str) -> Option<NaiveDateTime> {
        CasualRecognizer.parse_date(text, reference(), &ParseOptions::default())
    }

    fn parse_forward(text: &str) -> Option<NaiveDateTime> {
        CasualRecognizer.parse_date(text, reference(), &ParseOptions::forward())
    }

    #[test]
    fn test_relative_words() {
        assert_eq!(parse("now"), Some(reference()));
        assert_eq!(parse("Today"), Some(date(2024, 5, 15)));
        assert_eq!(parse("tomorrow"), Some(date(2024, 5, 16)));
        assert_eq!(parse("yesterday"), Some(date(2024, 5, 14)));
    }

    #[test]
    fn test_time_of_day() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 15).unwrap();
        assert_eq!(parse("15:00"), day.and_hms_opt(15, 0, 0));
        assert_eq!(parse("15:00:30"), day.and_hms_opt(15, 0, 30));
        assert_eq!(parse("3:30pm"), day.and_hms_opt(15, 30, 0));
        assert_eq!(parse("12am"), day.and_hms_opt(0, 0, 0));
        assert_eq!(parse("noon"), day.and_hms_opt(12, 0, 0));
        assert_eq!(parse("25:00"), None);
        assert_eq!(parse("13pm"), None);
    }

    #[test]
    fn test_past_time_moves_forward() {
        let next_day = NaiveDate::from_ymd_opt(2024, 5, 16).unwrap();
        assert_eq!(parse_forward("9am"), next_day.and_hms_opt(9, 0, 0));
    }

    #[test]
    fn test_relative_offsets() {
        assert_eq!(parse("in 3 days"), Some(reference() + Duration::days(3)));
        assert_eq!(parse("2 weeks ago"), Some(reference() - Duration::weeks(2)));
        assert_eq!(parse("+15 minutes"), Some(reference() + Duration::minutes(15)));
        assert_eq!(parse("-1 hour"), Some(reference() - Duration::hours(1)));
        assert_eq!(parse("a week ago"), Some(reference() - Duration::weeks(1)));
        assert_eq!(
            parse("in 1 month"),
            NaiveDate::from_ymd_opt(2024, 6, 15).unwrap().and_hms_opt(10, 30, 0)
        );
        assert_eq!(
            parse("a year from now"),
            NaiveDate::from_ymd_opt(2025, 5, 15).unwrap().and_hms_opt(10, 30, 0)
        );
    }

    #[test]
    fn test_month_arithmetic_clamps() {
        let jan31 = NaiveDate::from_ymd_opt(2024, 1, 31)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let result = CasualRecognizer.parse_date("in 1 month", jan31, &ParseOptions::default());
        assert_eq!(result, Some(date(2024, 2, 29)));
    }

    #[test]
    fn test_relative_periods() {
        assert_eq!(parse("this month"), Some(date(2024, 5, 15)));
        assert_eq!(parse("next month"), Some(date(2024, 6, 15)));
        assert_eq!(parse("last year"), Some(date(2023, 5, 15)));
        assert_eq!(parse("next week"), Some(date(2024, 5, 22)));
    }

    #[test]
    fn test_weekdays_respect_week_start() {
        // Reference is a Wednesday
        let monday = ParseOptions::default().with_week_start(Weekday::Mon);
        let sunday = ParseOptions::default().with_week_start(Weekday::Sun);
        let this_sunday_mon = CasualRecognizer.parse_date("this sunday", reference(), &monday);
        let this_sunday_sun = CasualRecognizer.parse_date("this sunday", reference(), &sunday);
        assert_eq!(this_sunday_mon, Some(date(2024, 5, 19)));
        assert_eq!(this_sunday_sun, Some(date(2024, 5, 12)));

        let next_monday = CasualRecognizer.parse_date("next monday", reference(), &monday);
        assert_eq!(next_monday, Some(date(2024, 5, 20)));
        assert_eq!(parse("last friday"), Some(date(2024, 5, 10)));
    }

    #[test]
    fn test_bare_weekday() {
        assert_eq!(parse("friday"), Some(date(2024, 5, 17)));
        // Monday is two days back: closest occurrence
        assert_eq!(parse("monday"), Some(date(2024, 5, 13)));
        assert_eq!(parse_forward("monday"), Some(date(2024, 5, 20)));
        assert_eq!(parse_forward("wednesday"), Some(date(2024, 5, 15)));
    }

    #[test]
    fn test_month_day() {
        assert_eq!(parse("dec 15"), Some(date(2024, 12, 15)));
        assert_eq!(parse("15th of March"), Some(date(2024, 3, 15)));
        assert_eq!(parse_forward("march 15th"), Some(date(2025, 3, 15)));
        assert_eq!(parse_forward("june 15th"), Some(date(2024, 6, 15)));
        assert_eq!(parse("Dec 25, 2025"), Some(date(2025, 12, 25)));
        assert_eq!(parse("feb 30"), None);
    }

    #[test]
    fn test_month_only() {
        assert_eq!(parse("february"), Some(date(2024, 2, 1)));
        assert_eq!(parse_forward("february"), Some(date(2025, 2, 1)));
        assert_eq!(parse("june 2023"), Some(date(2023, 6, 1)));
    }

    #[test]
    fn test_numeric_dates() {
        assert_eq!(parse("2024-02-29"), Some(date(2024, 2, 29)));
        assert_eq!(parse("2024-2-9"), Some(date(2024, 2, 9)));
        assert_eq!(parse("2023-02-29"), None);
        assert_eq!(parse("2024/03/01"), Some(date(2024, 3, 1)));
        assert_eq!(parse("01.03.2024"), Some(date(2024, 3, 1)));
        assert_eq!(parse("3/4/2024"), Some(date(2024, 3, 4)));

        let british = ParseOptions::default().with_little_endian(true);
        let result = CasualRecognizer.parse_date("3/4/2024", reference(), &british);
        assert_eq!(result, Some(date(2024, 4, 3)));
    }

    #[test]
    fn test_special_dates() {
        assert_eq!(parse("xmas"), Some(date(2024, 12, 25)));
        assert_eq!(parse("new year's eve"), Some(date(2024, 12, 31)));
        assert_eq!(parse("thanksgiving"), Some(date(2024, 11, 28)));
        assert_eq!(parse_forward("valentines"), Some(date(2025, 2, 14)));
    }

    #[test]
    fn test_period_boundaries() {
        assert_eq!(parse("end of month"), Some(date(2024, 5, 31)));
        assert_eq!(parse("eoy"), Some(date(2024, 12, 31)));
        let monday = ParseOptions::default().with_week_start(Weekday::Mon);
        let start = CasualRecognizer.parse_date("start of week", reference(), &monday);
        assert_eq!(start, Some(date(2024, 5, 13)));
    }

    #[test]
    fn test_relative_period_boundaries() {
        assert_eq!(parse("end of next month"), Some(date(2024, 6, 30)));
        assert_eq!(parse("last day of next month"), Some(date(2024, 6, 30)));
        assert_eq!(parse("start of last year"), Some(date(2023, 1, 1)));
        assert_eq!(parse("end of the week"), Some(date(2024, 5, 18)));
        assert_eq!(parse("beginning of next week"), Some(date(2024, 5, 19)));
    }

    #[test]
    fn test_day_in_relative_month() {
        assert_eq!(parse("15th next month"), Some(date(2024, 6, 15)));
        assert_eq!(parse("next month 15th"), Some(date(2024, 6, 15)));
        assert_eq!(parse("next month on the 3rd"), Some(date(2024, 6, 3)));
        assert_eq!(parse("the first of last month"), Some(date(2024, 4, 1)));
    }

    #[test]
    fn test_month_in_relative_year() {
        assert_eq!(parse("june next year"), Some(date(2025, 6, 1)));
        assert_eq!(parse("dec 25 next year"), Some(date(2025, 12, 25)));
        assert_eq!(parse("next year in march"), Some(date(2025, 3, 1)));
        // Earlier than the reference month, but still in the named year
        assert_eq!(parse_forward("february last year"), Some(date(2023, 2, 1)));
    }

    #[test]
    fn test_date_inside_other_words() {
        assert_eq!(parse("meeting next friday"), Some(date(2024, 5, 24)));
        assert_eq!(
            parse("call mom tomorrow at 9am"),
            NaiveDate::from_ymd_opt(2024, 5, 16).unwrap().and_hms_opt(9, 0, 0)
        );
        assert_eq!(parse("report due in 3 days"), Some(reference() + Duration::days(3)));
        assert_eq!(parse("dentist on dec 15, then lunch"), Some(date(2024, 12, 15)));
    }

    #[test]
    fn test_quarters() {
        assert_eq!(parse("q3"), Some(date(2024, 7, 1)));
        assert_eq!(parse("next quarter"), Some(date(2024, 7, 1)));
        assert_eq!(parse("last quarter"), Some(date(2024, 1, 1)));
    }

    #[test]
    fn test_date_with_time() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 16).unwrap().and_hms_opt(9, 0, 0);
        assert_eq!(parse("tomorrow at 9am"), expected);
        assert_eq!(parse("Tomorrow 9:00"), expected);
    }

    #[test]
    fn test_unparseable() {
        assert_eq!(parse(""), None);
        assert_eq!(parse("   "), None);
        assert_eq!(parse("not a date"), None);
        assert_eq!(parse("month"), None);
    }
}
